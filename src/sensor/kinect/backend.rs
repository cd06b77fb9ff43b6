//! `DepthSensor` implementation on top of the KCBv2 runtime.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::sensor::backend::DepthSensor;
use crate::sensor::error::{Result, SensorError};
use crate::sensor::types::{
    CameraSpacePoint, ColorSpacePoint, DepthSpacePoint, FrameChannel, FrameGeometry, SensorInfo,
};

use super::api::{KinectApi, SensorHandle};

/// Per-session state held while the device is open.
struct OpenSensor {
    handle: SensorHandle,
    color: FrameGeometry,
    depth: FrameGeometry,
}

/// Kinect v2 sensor driven through a `KinectApi` runtime.
///
/// Generic over the runtime so tests can substitute `MockKinect` for
/// the real `Kcb` wrapper.
pub struct KinectSensor<S: KinectApi> {
    sdk: Arc<S>,
    state: Mutex<Option<OpenSensor>>,
}

impl<S: KinectApi> KinectSensor<S> {
    pub fn new(sdk: Arc<S>) -> Self {
        Self {
            sdk,
            state: Mutex::new(None),
        }
    }

    fn with_open<T>(&self, f: impl FnOnce(&OpenSensor) -> Result<T>) -> Result<T> {
        let state = self.state.lock();
        let open = state
            .as_ref()
            .ok_or_else(|| SensorError::Runtime("sensor not open".to_string()))?;
        f(open)
    }
}

impl<S: KinectApi> DepthSensor for KinectSensor<S> {
    fn open(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.is_some() {
            return Err(SensorError::Runtime("sensor already open".to_string()));
        }

        let handle = self.sdk.open_default_sensor()?;
        debug!("opened Kinect sensor, handle {}", handle.0);

        let descriptions = (|| {
            let color = self.sdk.color_frame_description(handle)?;
            let depth = self.sdk.depth_frame_description(handle)?;
            Ok((color, depth))
        })();
        let (color_desc, depth_desc) = match descriptions {
            Ok(pair) => pair,
            Err(e) => {
                // Don't leak the handle when setup fails halfway.
                if let Err(close_err) = self.sdk.close_sensor(handle) {
                    warn!("failed to close sensor after setup error: {close_err}");
                }
                return Err(e);
            }
        };

        let color = color_desc.geometry();
        let depth = depth_desc.geometry();
        info!("Kinect sensor open: color {color}, depth {depth}");

        *state = Some(OpenSensor {
            handle,
            color,
            depth,
        });
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let Some(open) = self.state.lock().take() else {
            return Ok(());
        };
        self.sdk.close_sensor(open.handle)?;
        info!("Kinect sensor closed");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.lock().is_some()
    }

    fn info(&self) -> SensorInfo {
        SensorInfo {
            model: "Kinect for Windows v2".to_string(),
            serial: None,
            simulated: false,
        }
    }

    fn geometry(&self, channel: FrameChannel) -> Result<FrameGeometry> {
        self.with_open(|open| {
            Ok(match channel {
                FrameChannel::Color => open.color,
                FrameChannel::Depth => open.depth,
            })
        })
    }

    fn copy_color_frame(&self, dst: &mut [u8]) -> Result<bool> {
        self.with_open(|open| {
            let expected = open.color.byte_len(FrameChannel::Color);
            if dst.len() != expected {
                return Err(SensorError::FrameCopy(format!(
                    "color buffer is {} bytes, expected {expected}",
                    dst.len()
                )));
            }
            self.sdk.color_frame(open.handle, dst)
        })
    }

    fn copy_depth_frame(&self, dst: &mut [u16]) -> Result<bool> {
        self.with_open(|open| {
            let expected = open.depth.pixel_count();
            if dst.len() != expected {
                return Err(SensorError::FrameCopy(format!(
                    "depth buffer is {} samples, expected {expected}",
                    dst.len()
                )));
            }
            self.sdk.depth_frame(open.handle, dst)
        })
    }

    fn map_depth_point_to_color(
        &self,
        point: DepthSpacePoint,
        depth_mm: u16,
    ) -> Result<ColorSpacePoint> {
        self.with_open(|open| self.sdk.map_depth_point_to_color(open.handle, point, depth_mm))
    }

    fn map_camera_point_to_color(&self, point: CameraSpacePoint) -> Result<ColorSpacePoint> {
        self.with_open(|open| self.sdk.map_camera_point_to_color(open.handle, point))
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::MockKinect;
    use super::super::types::{COLOR_GEOMETRY, DEPTH_GEOMETRY};
    use super::*;

    fn small_mock() -> MockKinect {
        MockKinect::new().with_geometry(FrameGeometry::new(2, 2), FrameGeometry::new(2, 1))
    }

    #[test]
    fn open_reports_native_geometry() {
        let sensor = KinectSensor::new(Arc::new(MockKinect::new().with_sensor()));
        sensor.open().unwrap();
        assert_eq!(sensor.geometry(FrameChannel::Color).unwrap(), COLOR_GEOMETRY);
        assert_eq!(sensor.geometry(FrameChannel::Depth).unwrap(), DEPTH_GEOMETRY);
    }

    #[test]
    fn open_without_device_fails() {
        let sensor = KinectSensor::new(Arc::new(MockKinect::new()));
        assert!(matches!(
            sensor.open(),
            Err(SensorError::DeviceUnavailable(_))
        ));
        assert!(!sensor.is_open());
    }

    #[test]
    fn double_open_is_rejected() {
        let sensor = KinectSensor::new(Arc::new(small_mock()));
        sensor.open().unwrap();
        assert!(sensor.open().is_err());
        assert!(sensor.is_open());
    }

    #[test]
    fn close_is_idempotent() {
        let sensor = KinectSensor::new(Arc::new(small_mock()));
        sensor.open().unwrap();
        sensor.close().unwrap();
        sensor.close().unwrap();
        assert!(!sensor.is_open());
    }

    #[test]
    fn description_failure_closes_the_handle() {
        let mock = small_mock().with_error(
            "color_frame_description",
            SensorError::Runtime("injected".to_string()),
        );
        let sdk = Arc::new(mock);
        let sensor = KinectSensor::new(Arc::clone(&sdk));
        assert!(sensor.open().is_err());
        assert!(!sensor.is_open());
        // The mock closed its handle, so a fresh open succeeds.
        sensor.open().unwrap();
    }

    #[test]
    fn frame_copy_requires_open_sensor() {
        let sensor = KinectSensor::new(Arc::new(small_mock()));
        let mut dst = [0u8; 16];
        assert!(matches!(
            sensor.copy_color_frame(&mut dst),
            Err(SensorError::Runtime(_))
        ));
    }

    #[test]
    fn frame_copy_validates_buffer_length() {
        let sensor = KinectSensor::new(Arc::new(small_mock()));
        sensor.open().unwrap();
        let mut dst = [0u8; 1];
        assert!(matches!(
            sensor.copy_color_frame(&mut dst),
            Err(SensorError::FrameCopy(_))
        ));
    }

    #[test]
    fn scripted_frames_flow_through() {
        let sdk = Arc::new(
            small_mock()
                .with_color_frame(vec![7u8; 16])
                .with_depth_frame(vec![4000u16; 2]),
        );
        let sensor = KinectSensor::new(sdk);
        sensor.open().unwrap();

        let mut color = [0u8; 16];
        assert!(sensor.copy_color_frame(&mut color).unwrap());
        assert_eq!(color, [7u8; 16]);

        let mut depth = [0u16; 2];
        assert!(sensor.copy_depth_frame(&mut depth).unwrap());
        assert_eq!(depth, [4000u16; 2]);
    }

    #[test]
    fn skipped_frame_leaves_buffer_untouched() {
        let sdk = Arc::new(small_mock().with_color_frame(vec![7u8; 16]));
        let sensor = KinectSensor::new(Arc::clone(&sdk));
        sensor.open().unwrap();

        sdk.set_color_ready(false);
        let mut color = [42u8; 16];
        assert!(!sensor.copy_color_frame(&mut color).unwrap());
        assert_eq!(color, [42u8; 16]);
    }

    #[test]
    fn mapping_requires_open_sensor() {
        let sensor = KinectSensor::new(Arc::new(small_mock()));
        assert!(sensor
            .map_depth_point_to_color(DepthSpacePoint { x: 0.0, y: 0.0 }, 4000)
            .is_err());
    }

    #[test]
    fn mapping_flows_through_runtime() {
        let sensor = KinectSensor::new(Arc::new(small_mock()));
        sensor.open().unwrap();
        let mapped = sensor
            .map_depth_point_to_color(DepthSpacePoint { x: 5.0, y: 3.0 }, 4000)
            .unwrap();
        assert_eq!(mapped.x, 5.0 * 2.0 + 10.0);
        assert_eq!(mapped.y, 6.0);
    }

    #[test]
    fn info_is_not_simulated() {
        let sensor = KinectSensor::new(Arc::new(small_mock()));
        let info = sensor.info();
        assert_eq!(info.model, "Kinect for Windows v2");
        assert!(!info.simulated);
    }

    #[test]
    fn sensor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KinectSensor<MockKinect>>();
    }
}
