//! Frame encoding for IPC transport.
//!
//! Display frames cross the IPC boundary as base64-encoded JPEG
//! (color) or PNG (depth, lossless so the grayscale levels survive).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageBuffer, Luma, Rgb};

/// Compress a BGRA display frame to JPEG at the given quality (1-100).
pub fn bgra_to_jpeg(data: &[u8], width: u32, height: u32, quality: u8) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(data.len() / 4 * 3);
    for px in data.chunks_exact(4) {
        rgb.extend_from_slice(&[px[2], px[1], px[0]]);
    }

    let img: ImageBuffer<Rgb<u8>, _> =
        ImageBuffer::from_raw(width, height, rgb).expect("invalid buffer dimensions");

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.write_with_encoder(encoder)
        .expect("JPEG encoding failed");
    buf
}

/// Compress an 8-bit grayscale display frame to PNG.
pub fn gray_to_png(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Luma<u8>, _> =
        ImageBuffer::from_raw(width, height, data).expect("invalid buffer dimensions");

    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    img.write_with_encoder(encoder)
        .expect("PNG encoding failed");
    buf
}

/// Base64-encode compressed bytes for the IPC payload.
pub fn to_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Synthetic BGRA gradient, fully opaque.
    fn make_test_bgra(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push((x % 256) as u8); // B
                data.push((y % 256) as u8); // G
                data.push(128); // R
                data.push(255); // A
            }
        }
        data
    }

    #[test]
    fn bgra_to_jpeg_produces_valid_jpeg_bytes() {
        let bgra = make_test_bgra(64, 48);
        let jpeg = bgra_to_jpeg(&bgra, 64, 48, 85);
        // JPEG files start with FF D8
        assert_eq!(jpeg[0], 0xFF);
        assert_eq!(jpeg[1], 0xD8);
    }

    #[test]
    fn bgra_to_jpeg_1080p_at_quality_85_under_300kb() {
        let bgra = make_test_bgra(1920, 1080);
        let jpeg = bgra_to_jpeg(&bgra, 1920, 1080, 85);
        assert!(
            jpeg.len() < 300_000,
            "JPEG size {} exceeds 300KB",
            jpeg.len()
        );
    }

    #[test]
    fn gray_to_png_produces_valid_png_bytes() {
        let gray: Vec<u8> = (0u16..512 * 4).map(|v| (v % 256) as u8).collect();
        let png = gray_to_png(&gray, 512, 4);
        // PNG signature
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn gray_to_png_is_lossless() {
        let gray: Vec<u8> = (0u16..256).map(|v| v as u8).collect();
        let png = gray_to_png(&gray, 16, 16);
        let decoded = image::load_from_memory(&png).unwrap().into_luma8();
        assert_eq!(decoded.as_raw().as_slice(), gray.as_slice());
    }

    #[test]
    fn to_base64_round_trips() {
        let encoded = to_base64(b"frame");
        assert_eq!(encoded, "ZnJhbWU=");
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"frame");
    }
}
