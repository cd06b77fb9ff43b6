use crate::sensor::error::Result;
use crate::sensor::types::{
    CameraSpacePoint, ColorSpacePoint, DepthSpacePoint, FrameChannel, FrameGeometry, SensorInfo,
};

/// Hardware-agnostic depth sensor.
///
/// Implemented by `KinectSensor` (Kinect Common Bridge v2 runtime) and
/// `SimulatedSensor` (synthetic frames, no hardware). The sensor owns
/// the device lifetime: `open()` at startup, `close()` at shutdown.
pub trait DepthSensor: Send + Sync {
    /// Acquire the default device and begin frame delivery.
    ///
    /// Fails with `SensorError::DeviceUnavailable` when no compatible
    /// hardware is present; this is fatal and not retried.
    fn open(&self) -> Result<()>;

    /// Release the device. Idempotent once the sensor has been opened.
    fn close(&self) -> Result<()>;

    /// Whether the device is currently open.
    fn is_open(&self) -> bool;

    /// Identification data for this sensor.
    fn info(&self) -> SensorInfo;

    /// Frame geometry for a channel, fixed at open time for the whole
    /// session.
    fn geometry(&self, channel: FrameChannel) -> Result<FrameGeometry>;

    /// Copy the latest decoded BGRA color frame into `dst`.
    ///
    /// `dst` must be exactly width x height x 4 bytes. Returns
    /// `Ok(false)` when no frame is ready this cycle; `dst` is then
    /// left untouched.
    fn copy_color_frame(&self, dst: &mut [u8]) -> Result<bool>;

    /// Copy the latest raw 16-bit depth frame (millimeters) into `dst`.
    ///
    /// `dst` must be exactly width x height samples. Returns
    /// `Ok(false)` when no frame is ready this cycle.
    fn copy_depth_frame(&self, dst: &mut [u16]) -> Result<bool>;

    /// Map a depth-frame pixel at the given depth to color-frame
    /// coordinates. Unresolvable inputs yield non-finite coordinates.
    fn map_depth_point_to_color(
        &self,
        point: DepthSpacePoint,
        depth_mm: u16,
    ) -> Result<ColorSpacePoint>;

    /// Map a 3D camera-space point (meters) to color-frame coordinates.
    fn map_camera_point_to_color(&self, point: CameraSpacePoint) -> Result<ColorSpacePoint>;
}
