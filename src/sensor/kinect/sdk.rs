//! Safe KCBv2 wrapper.
//!
//! Only compiled when the `kinect` feature is enabled and the KCBv2
//! DLL is available. Production code uses this; tests use `MockKinect`
//! instead.

use crate::sensor::error::{Result, SensorError};
use crate::sensor::types::{CameraSpacePoint, ColorSpacePoint, DepthSpacePoint};

use super::api::{KinectApi, SensorHandle};
use super::ffi;
use super::types::{
    error_description, HResult, KcbFrameDescription, COLOR_IMAGE_FORMAT_BGRA, E_PENDING,
    KCB_INVALID_HANDLE, S_OK,
};

/// Safe wrapper around the KCBv2 runtime.
///
/// The runtime itself is stateless per-process; all per-sensor state
/// lives behind the handle returned by `open_default_sensor`.
pub struct Kcb {
    _private: (),
}

impl Kcb {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for Kcb {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate a non-S_OK HRESULT into a `SensorError`.
fn check(hr: HResult, call: &str) -> Result<()> {
    if hr == S_OK {
        Ok(())
    } else {
        Err(SensorError::Runtime(format!(
            "{call} failed: {} (0x{:08X})",
            error_description(hr),
            hr as u32
        )))
    }
}

impl KinectApi for Kcb {
    fn open_default_sensor(&self) -> Result<SensorHandle> {
        let handle = unsafe { ffi::KCBOpenDefaultSensor() };
        if handle == KCB_INVALID_HANDLE {
            return Err(SensorError::DeviceUnavailable(
                "KCBOpenDefaultSensor returned an invalid handle".to_string(),
            ));
        }
        Ok(SensorHandle(handle))
    }

    fn close_sensor(&self, handle: SensorHandle) -> Result<()> {
        let mut raw = handle.0;
        let hr = unsafe { ffi::KCBCloseSensor(&mut raw) };
        check(hr, "KCBCloseSensor")
    }

    fn color_frame_description(&self, handle: SensorHandle) -> Result<KcbFrameDescription> {
        let mut desc = KcbFrameDescription::default();
        let hr = unsafe {
            ffi::KCBGetColorFrameDescription(handle.0, COLOR_IMAGE_FORMAT_BGRA, &mut desc)
        };
        check(hr, "KCBGetColorFrameDescription")?;
        Ok(desc)
    }

    fn depth_frame_description(&self, handle: SensorHandle) -> Result<KcbFrameDescription> {
        let mut desc = KcbFrameDescription::default();
        let hr = unsafe { ffi::KCBGetDepthFrameDescription(handle.0, &mut desc) };
        check(hr, "KCBGetDepthFrameDescription")?;
        Ok(desc)
    }

    fn color_frame(&self, handle: SensorHandle, dst: &mut [u8]) -> Result<bool> {
        let mut timestamp: i64 = 0;
        let hr = unsafe {
            ffi::KCBGetColorFrame(handle.0, dst.len() as u32, dst.as_mut_ptr(), &mut timestamp)
        };
        if hr == E_PENDING {
            return Ok(false);
        }
        check(hr, "KCBGetColorFrame")?;
        Ok(true)
    }

    fn depth_frame(&self, handle: SensorHandle, dst: &mut [u16]) -> Result<bool> {
        let mut timestamp: i64 = 0;
        let hr = unsafe {
            ffi::KCBGetDepthFrame(handle.0, dst.len() as u32, dst.as_mut_ptr(), &mut timestamp)
        };
        if hr == E_PENDING {
            return Ok(false);
        }
        check(hr, "KCBGetDepthFrame")?;
        Ok(true)
    }

    fn map_depth_point_to_color(
        &self,
        handle: SensorHandle,
        point: DepthSpacePoint,
        depth_mm: u16,
    ) -> Result<ColorSpacePoint> {
        let mut out = ColorSpacePoint { x: 0.0, y: 0.0 };
        let hr = unsafe { ffi::KCBMapDepthPointToColorSpace(handle.0, point, depth_mm, &mut out) };
        check(hr, "KCBMapDepthPointToColorSpace")?;
        Ok(out)
    }

    fn map_camera_point_to_color(
        &self,
        handle: SensorHandle,
        point: CameraSpacePoint,
    ) -> Result<ColorSpacePoint> {
        let mut out = ColorSpacePoint { x: 0.0, y: 0.0 };
        let hr = unsafe { ffi::KCBMapCameraPointToColorSpace(handle.0, point, &mut out) };
        check(hr, "KCBMapCameraPointToColorSpace")?;
        Ok(out)
    }
}
