//! `KinectApi` trait — abstracts the KCBv2 runtime for testability.
//!
//! The real `Kcb` wrapper and the `MockKinect` both implement this
//! trait, allowing `KinectSensor<S>` to be generic over the runtime.

use crate::sensor::error::Result;
use crate::sensor::types::{CameraSpacePoint, ColorSpacePoint, DepthSpacePoint};

use super::types::KcbFrameDescription;

/// Opaque sensor handle used across the API boundary.
///
/// For the real runtime this wraps the `int` handle returned by
/// `KCBOpenDefaultSensor`; for the mock it is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorHandle(pub i32);

/// Abstraction over the KCBv2 runtime.
///
/// All methods take `&self` — implementations manage interior
/// mutability (the mock keeps its state behind a `Mutex`).
pub trait KinectApi: Send + Sync {
    /// Open the default sensor, returning its handle.
    fn open_default_sensor(&self) -> Result<SensorHandle>;

    /// Close a previously opened sensor.
    fn close_sensor(&self, handle: SensorHandle) -> Result<()>;

    /// Frame descriptor of the color channel (BGRA format).
    fn color_frame_description(&self, handle: SensorHandle) -> Result<KcbFrameDescription>;

    /// Frame descriptor of the depth channel.
    fn depth_frame_description(&self, handle: SensorHandle) -> Result<KcbFrameDescription>;

    /// Copy the latest BGRA color frame into `dst`.
    ///
    /// Returns `Ok(false)` when the runtime reports `E_PENDING`
    /// (no new frame this cycle).
    fn color_frame(&self, handle: SensorHandle, dst: &mut [u8]) -> Result<bool>;

    /// Copy the latest 16-bit depth frame into `dst`.
    fn depth_frame(&self, handle: SensorHandle, dst: &mut [u16]) -> Result<bool>;

    /// Map a depth pixel at the given depth to color-space coordinates.
    fn map_depth_point_to_color(
        &self,
        handle: SensorHandle,
        point: DepthSpacePoint,
        depth_mm: u16,
    ) -> Result<ColorSpacePoint>;

    /// Map a camera-space point to color-space coordinates.
    fn map_camera_point_to_color(
        &self,
        handle: SensorHandle,
        point: CameraSpacePoint,
    ) -> Result<ColorSpacePoint>;
}
