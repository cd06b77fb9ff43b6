//! Pure pixel conversions between raw sensor frames and display frames.

/// Threshold applied to every color channel; values strictly above it
/// saturate to `THRESHOLD_MAX`, everything else goes to zero.
pub const COLOR_THRESHOLD: u8 = 127;
pub const THRESHOLD_MAX: u8 = 255;

/// Nominal maximum range of the depth camera, millimeters. Depth
/// samples are rescaled so this maps to 255 in the display frame.
pub const DEPTH_MAX_MM: u16 = 8000;

/// Rescale one depth sample (millimeters) to an 8-bit gray value.
///
/// Rounds to nearest; samples beyond `DEPTH_MAX_MM` clamp to 255.
pub fn scale_depth(depth_mm: u16) -> u8 {
    let d = u32::from(depth_mm.min(DEPTH_MAX_MM));
    ((d * u32::from(THRESHOLD_MAX) + u32::from(DEPTH_MAX_MM) / 2) / u32::from(DEPTH_MAX_MM)) as u8
}

/// Binary-threshold a BGRA frame into `dst`.
///
/// Applied independently to all four channels, alpha included, so a
/// fully opaque source pixel stays fully opaque.
///
/// # Panics
///
/// Panics if `src` and `dst` differ in length; callers size both from
/// the same `FrameGeometry`.
pub fn threshold_binary(src: &[u8], dst: &mut [u8]) {
    assert_eq!(src.len(), dst.len(), "threshold buffers must match");
    for (s, d) in src.iter().zip(dst.iter_mut()) {
        *d = if *s > COLOR_THRESHOLD { THRESHOLD_MAX } else { 0 };
    }
}

/// Rescale a raw 16-bit depth frame into an 8-bit grayscale `dst`.
///
/// # Panics
///
/// Panics if `src` and `dst` differ in length.
pub fn depth_to_gray(src: &[u16], dst: &mut [u8]) {
    assert_eq!(src.len(), dst.len(), "depth buffers must match");
    for (s, d) in src.iter().zip(dst.iter_mut()) {
        *d = scale_depth(*s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_boundary_values() {
        let src = [0, 126, 127, 128, 200, 255];
        let mut dst = [0u8; 6];
        threshold_binary(&src, &mut dst);
        assert_eq!(dst, [0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn threshold_covers_alpha_channel() {
        // One BGRA pixel with a bright alpha stays opaque.
        let src = [200, 50, 200, 255];
        let mut dst = [0u8; 4];
        threshold_binary(&src, &mut dst);
        assert_eq!(dst, [255, 0, 255, 255]);
    }

    #[test]
    fn threshold_is_idempotent() {
        let src = [0, 90, 130, 255];
        let mut once = [0u8; 4];
        threshold_binary(&src, &mut once);
        let mut twice = [0u8; 4];
        threshold_binary(&once, &mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn scale_depth_endpoints() {
        assert_eq!(scale_depth(0), 0);
        assert_eq!(scale_depth(DEPTH_MAX_MM), 255);
    }

    #[test]
    fn scale_depth_clamps_beyond_range() {
        assert_eq!(scale_depth(DEPTH_MAX_MM + 1), 255);
        assert_eq!(scale_depth(u16::MAX), 255);
    }

    #[test]
    fn scale_depth_rounds_to_nearest() {
        // 4000 * 255 / 8000 = 127.5 rounds up.
        assert_eq!(scale_depth(4000), 128);
        // 1000 * 255 / 8000 = 31.875 rounds up.
        assert_eq!(scale_depth(1000), 32);
        // 100 * 255 / 8000 = 3.1875 rounds down.
        assert_eq!(scale_depth(100), 3);
    }

    #[test]
    fn scale_depth_matches_float_rounding_everywhere() {
        for d in 0..=DEPTH_MAX_MM {
            let expected = (f64::from(d) * 255.0 / f64::from(DEPTH_MAX_MM)).round() as u8;
            assert_eq!(scale_depth(d), expected, "depth {d}");
        }
    }

    #[test]
    fn scale_depth_is_monotonic() {
        let mut prev = 0u8;
        for d in 0..=DEPTH_MAX_MM {
            let v = scale_depth(d);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn depth_to_gray_converts_every_sample() {
        let src = [0u16, 4000, 8000, 9000];
        let mut dst = [0u8; 4];
        depth_to_gray(&src, &mut dst);
        assert_eq!(dst, [0, 128, 255, 255]);
    }

    #[test]
    #[should_panic(expected = "threshold buffers must match")]
    fn threshold_rejects_mismatched_buffers() {
        let src = [0u8; 4];
        let mut dst = [0u8; 3];
        threshold_binary(&src, &mut dst);
    }
}
