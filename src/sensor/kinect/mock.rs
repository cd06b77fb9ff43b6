//! Mock KCBv2 implementation for testing without the real DLLs.
//!
//! Uses a builder pattern to configure frame geometry, scripted
//! frames, per-channel readiness, and error injection. The coordinate
//! mapper follows a fixed pinhole model so mapping results are
//! deterministic.

use std::sync::Mutex;

use crate::sensor::error::{Result, SensorError};
use crate::sensor::types::{
    CameraSpacePoint, ColorSpacePoint, DepthSpacePoint, FrameGeometry,
};

use super::api::{KinectApi, SensorHandle};
use super::types::{KcbFrameDescription, COLOR_GEOMETRY, DEPTH_GEOMETRY};

/// Color camera intrinsics used by the mock's pinhole mapper.
const FX: f32 = 1081.37;
const FY: f32 = 1081.37;
const CX: f32 = 959.5;
const CY: f32 = 539.5;

/// Configurable error injection for a specific operation.
struct ErrorInjection {
    operation: &'static str,
    error: SensorError,
}

struct MockState {
    sensor_present: bool,
    open: bool,
    color_description: KcbFrameDescription,
    depth_description: KcbFrameDescription,
    color_frame: Option<Vec<u8>>,
    depth_frame: Option<Vec<u16>>,
    color_ready: bool,
    depth_ready: bool,
    error_injections: Vec<ErrorInjection>,
}

/// Mock KCBv2 runtime.
///
/// All state is behind a `Mutex` so the mock satisfies `Send + Sync`.
pub struct MockKinect {
    state: Mutex<MockState>,
}

impl MockKinect {
    /// Create a new mock with no sensor attached (`open` will fail).
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                sensor_present: false,
                open: false,
                color_description: KcbFrameDescription::from_geometry(COLOR_GEOMETRY, 4),
                depth_description: KcbFrameDescription::from_geometry(DEPTH_GEOMETRY, 2),
                color_frame: None,
                depth_frame: None,
                color_ready: true,
                depth_ready: true,
                error_injections: Vec::new(),
            }),
        }
    }

    /// Attach a sensor with native Kinect v2 geometry.
    pub fn with_sensor(self) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.sensor_present = true;
        }
        self
    }

    /// Attach a sensor with custom per-channel geometry (keeps test
    /// buffers small).
    pub fn with_geometry(self, color: FrameGeometry, depth: FrameGeometry) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.sensor_present = true;
            state.color_description = KcbFrameDescription::from_geometry(color, 4);
            state.depth_description = KcbFrameDescription::from_geometry(depth, 2);
        }
        self
    }

    /// Script the BGRA bytes returned on every color frame copy.
    pub fn with_color_frame(self, bytes: Vec<u8>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.color_frame = Some(bytes);
        }
        self
    }

    /// Script the depth samples returned on every depth frame copy.
    pub fn with_depth_frame(self, samples: Vec<u16>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.depth_frame = Some(samples);
        }
        self
    }

    /// Inject a one-shot error for a specific operation name.
    ///
    /// Operation names: `"open_default_sensor"`, `"close_sensor"`,
    /// `"color_frame_description"`, `"depth_frame_description"`,
    /// `"color_frame"`, `"depth_frame"`, `"map_depth_point_to_color"`,
    /// `"map_camera_point_to_color"`.
    pub fn with_error(self, operation: &'static str, error: SensorError) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.error_injections.push(ErrorInjection { operation, error });
        }
        self
    }

    /// Toggle whether a color frame is ready on the next copy.
    pub fn set_color_ready(&self, ready: bool) {
        self.state.lock().unwrap().color_ready = ready;
    }

    /// Toggle whether a depth frame is ready on the next copy.
    pub fn set_depth_ready(&self, ready: bool) {
        self.state.lock().unwrap().depth_ready = ready;
    }

    /// Replace the scripted depth frame at runtime.
    pub fn set_depth_frame(&self, samples: Vec<u16>) {
        self.state.lock().unwrap().depth_frame = Some(samples);
    }
}

impl Default for MockKinect {
    fn default() -> Self {
        Self::new()
    }
}

impl MockState {
    /// Consume an injected error for the given operation, if any.
    fn check_error(&mut self, operation: &str) -> Result<()> {
        if let Some(pos) = self
            .error_injections
            .iter()
            .position(|e| e.operation == operation)
        {
            let injection = self.error_injections.remove(pos);
            return Err(injection.error);
        }
        Ok(())
    }

    fn require_open(&self, handle: SensorHandle) -> Result<()> {
        if handle != SensorHandle(0) || !self.open {
            return Err(SensorError::Runtime(format!(
                "mock sensor handle {} is not open",
                handle.0
            )));
        }
        Ok(())
    }
}

impl KinectApi for MockKinect {
    fn open_default_sensor(&self) -> Result<SensorHandle> {
        let mut state = self.state.lock().unwrap();
        state.check_error("open_default_sensor")?;
        if !state.sensor_present {
            return Err(SensorError::DeviceUnavailable(
                "no mock sensor configured".to_string(),
            ));
        }
        state.open = true;
        Ok(SensorHandle(0))
    }

    fn close_sensor(&self, handle: SensorHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check_error("close_sensor")?;
        state.require_open(handle)?;
        state.open = false;
        Ok(())
    }

    fn color_frame_description(&self, handle: SensorHandle) -> Result<KcbFrameDescription> {
        let mut state = self.state.lock().unwrap();
        state.check_error("color_frame_description")?;
        state.require_open(handle)?;
        Ok(state.color_description)
    }

    fn depth_frame_description(&self, handle: SensorHandle) -> Result<KcbFrameDescription> {
        let mut state = self.state.lock().unwrap();
        state.check_error("depth_frame_description")?;
        state.require_open(handle)?;
        Ok(state.depth_description)
    }

    fn color_frame(&self, handle: SensorHandle, dst: &mut [u8]) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.check_error("color_frame")?;
        state.require_open(handle)?;
        if !state.color_ready {
            return Ok(false);
        }
        let Some(frame) = state.color_frame.as_ref() else {
            return Ok(false);
        };
        if frame.len() != dst.len() {
            return Err(SensorError::FrameCopy(format!(
                "color buffer is {} bytes, scripted frame is {}",
                dst.len(),
                frame.len()
            )));
        }
        dst.copy_from_slice(frame);
        Ok(true)
    }

    fn depth_frame(&self, handle: SensorHandle, dst: &mut [u16]) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.check_error("depth_frame")?;
        state.require_open(handle)?;
        if !state.depth_ready {
            return Ok(false);
        }
        let Some(frame) = state.depth_frame.as_ref() else {
            return Ok(false);
        };
        if frame.len() != dst.len() {
            return Err(SensorError::FrameCopy(format!(
                "depth buffer is {} samples, scripted frame is {}",
                dst.len(),
                frame.len()
            )));
        }
        dst.copy_from_slice(frame);
        Ok(true)
    }

    fn map_depth_point_to_color(
        &self,
        handle: SensorHandle,
        point: DepthSpacePoint,
        depth_mm: u16,
    ) -> Result<ColorSpacePoint> {
        let mut state = self.state.lock().unwrap();
        state.check_error("map_depth_point_to_color")?;
        state.require_open(handle)?;
        // The real mapper yields -infinity for a depth sample of 0.
        if depth_mm == 0 {
            return Ok(ColorSpacePoint {
                x: f32::NEG_INFINITY,
                y: f32::NEG_INFINITY,
            });
        }
        let d = f32::from(depth_mm);
        Ok(ColorSpacePoint {
            x: point.x * 2.0 + 40_000.0 / d,
            y: point.y * 2.0,
        })
    }

    fn map_camera_point_to_color(
        &self,
        handle: SensorHandle,
        point: CameraSpacePoint,
    ) -> Result<ColorSpacePoint> {
        let mut state = self.state.lock().unwrap();
        state.check_error("map_camera_point_to_color")?;
        state.require_open(handle)?;
        if point.z <= 0.0 {
            return Ok(ColorSpacePoint {
                x: f32::NEG_INFINITY,
                y: f32::NEG_INFINITY,
            });
        }
        Ok(ColorSpacePoint {
            x: CX + FX * point.x / point.z,
            y: CY + FY * point.y / point.z,
        })
    }
}
