use serde::Serialize;
use std::fmt;

/// Frame channel delivered by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameChannel {
    Color,
    Depth,
}

impl FrameChannel {
    /// Bytes per pixel of the raw frame for this channel
    /// (4x8-bit packed BGRA for color, 1x16-bit for depth).
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Color => 4,
            Self::Depth => 2,
        }
    }

    /// Snake-case string identifier for IPC.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Depth => "depth",
        }
    }
}

/// Resolution of one frame channel, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels in a frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw frame size in bytes for the given channel.
    pub fn byte_len(&self, channel: FrameChannel) -> usize {
        self.pixel_count() * channel.bytes_per_pixel()
    }
}

impl fmt::Display for FrameGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A position in depth-frame pixel coordinates.
///
/// Layout matches the Kinect runtime's `DepthSpacePoint` so the struct
/// can cross the FFI boundary by value.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DepthSpacePoint {
    pub x: f32,
    pub y: f32,
}

/// A position in color-frame pixel coordinates.
///
/// The mapper yields non-finite coordinates for inputs it cannot
/// resolve (e.g. a depth sample of 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize)]
pub struct ColorSpacePoint {
    pub x: f32,
    pub y: f32,
}

/// A 3D position in sensor camera space, in meters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraSpacePoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Identification data for the connected sensor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorInfo {
    pub model: String,
    pub serial: Option<String>,
    pub simulated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_bytes_per_pixel() {
        assert_eq!(FrameChannel::Color.bytes_per_pixel(), 4);
        assert_eq!(FrameChannel::Depth.bytes_per_pixel(), 2);
    }

    #[test]
    fn channel_serialises_snake_case() {
        let json = serde_json::to_value(FrameChannel::Color).unwrap();
        assert_eq!(json, "color");
        let json = serde_json::to_value(FrameChannel::Depth).unwrap();
        assert_eq!(json, "depth");
    }

    #[test]
    fn geometry_pixel_count() {
        let geom = FrameGeometry::new(512, 424);
        assert_eq!(geom.pixel_count(), 512 * 424);
    }

    #[test]
    fn geometry_byte_len_per_channel() {
        let geom = FrameGeometry::new(1920, 1080);
        assert_eq!(geom.byte_len(FrameChannel::Color), 1920 * 1080 * 4);
        assert_eq!(geom.byte_len(FrameChannel::Depth), 1920 * 1080 * 2);
    }

    #[test]
    fn geometry_display() {
        assert_eq!(FrameGeometry::new(512, 424).to_string(), "512x424");
    }

    #[test]
    fn geometry_serialises_to_json() {
        let geom = FrameGeometry::new(512, 424);
        let json = serde_json::to_value(geom).unwrap();
        assert_eq!(json["width"], 512);
        assert_eq!(json["height"], 424);
    }

    #[test]
    fn points_have_ffi_compatible_layout() {
        assert_eq!(std::mem::size_of::<DepthSpacePoint>(), 8);
        assert_eq!(std::mem::size_of::<ColorSpacePoint>(), 8);
        assert_eq!(std::mem::size_of::<CameraSpacePoint>(), 12);
    }

    #[test]
    fn sensor_info_serialises_to_json() {
        let info = SensorInfo {
            model: "Kinect for Windows v2".to_string(),
            serial: None,
            simulated: false,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["model"], "Kinect for Windows v2");
        assert!(json["serial"].is_null());
        assert_eq!(json["simulated"], false);
    }
}
