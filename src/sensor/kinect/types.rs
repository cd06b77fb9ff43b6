//! Raw KCBv2 types and constants shared by the FFI layer and the mock.

use crate::sensor::types::FrameGeometry;

/// Windows HRESULT as returned by every KCBv2 call.
pub type HResult = i32;

pub const S_OK: HResult = 0;
/// No new frame is available yet — benign, the caller skips this cycle.
pub const E_PENDING: HResult = 0x8000_000A_u32 as HResult;
pub const E_FAIL: HResult = 0x8000_4005_u32 as HResult;

/// Sentinel returned by `KCBOpenDefaultSensor` when no device is found.
pub const KCB_INVALID_HANDLE: i32 = -1;

/// `ColorImageFormat_Bgra` from the Kinect runtime.
pub const COLOR_IMAGE_FORMAT_BGRA: i32 = 3;

/// Native frame geometry of the Kinect v2 color camera.
pub const COLOR_GEOMETRY: FrameGeometry = FrameGeometry::new(1920, 1080);
/// Native frame geometry of the Kinect v2 depth camera.
pub const DEPTH_GEOMETRY: FrameGeometry = FrameGeometry::new(512, 424);

/// Per-channel frame descriptor, mirrors `KCBFrameDescription`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct KcbFrameDescription {
    pub width: i32,
    pub height: i32,
    pub horizontal_field_of_view: f32,
    pub vertical_field_of_view: f32,
    pub diagonal_field_of_view: f32,
    pub length_in_pixels: u32,
    pub bytes_per_pixel: u32,
}

impl KcbFrameDescription {
    /// Build a descriptor from a geometry, filling derived fields.
    pub fn from_geometry(geometry: FrameGeometry, bytes_per_pixel: u32) -> Self {
        Self {
            width: geometry.width as i32,
            height: geometry.height as i32,
            horizontal_field_of_view: 0.0,
            vertical_field_of_view: 0.0,
            diagonal_field_of_view: 0.0,
            length_in_pixels: geometry.pixel_count() as u32,
            bytes_per_pixel,
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry::new(self.width.max(0) as u32, self.height.max(0) as u32)
    }
}

/// Human-readable label for the HRESULTs we expect from KCBv2.
pub fn error_description(hr: HResult) -> &'static str {
    match hr {
        S_OK => "S_OK",
        E_PENDING => "frame not ready (E_PENDING)",
        E_FAIL => "unspecified failure (E_FAIL)",
        _ => "unknown HRESULT",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_roundtrips_geometry() {
        let desc = KcbFrameDescription::from_geometry(DEPTH_GEOMETRY, 2);
        assert_eq!(desc.geometry(), DEPTH_GEOMETRY);
        assert_eq!(desc.length_in_pixels, 512 * 424);
        assert_eq!(desc.bytes_per_pixel, 2);
    }

    #[test]
    fn negative_dimensions_clamp_to_zero() {
        let desc = KcbFrameDescription {
            width: -1,
            height: -1,
            ..Default::default()
        };
        assert_eq!(desc.geometry(), FrameGeometry::new(0, 0));
    }

    #[test]
    fn error_descriptions_are_stable() {
        assert_eq!(error_description(S_OK), "S_OK");
        assert_eq!(error_description(E_PENDING), "frame not ready (E_PENDING)");
        assert_eq!(error_description(0x1234_5678), "unknown HRESULT");
    }
}
