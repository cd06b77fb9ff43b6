//! Synthetic depth sensor for development without hardware.
//!
//! Produces an animated BGRA gradient on the color channel and a
//! scrolling depth ramp on the depth channel. Coordinate mapping uses
//! a fixed pinhole model with published Kinect v2 intrinsics.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::debug;

use crate::sensor::backend::DepthSensor;
use crate::sensor::error::{Result, SensorError};
use crate::sensor::types::{
    CameraSpacePoint, ColorSpacePoint, DepthSpacePoint, FrameChannel, FrameGeometry, SensorInfo,
};

use super::kinect::types::{COLOR_GEOMETRY, DEPTH_GEOMETRY};

/// Environment variable that selects the simulated sensor.
pub const SIMULATED_KINECT_ENV: &str = "SIMULATED_KINECT";

/// Depth camera intrinsics (focal lengths and principal point, pixels).
const FX_D: f32 = 365.456;
const FY_D: f32 = 365.456;
const CX_D: f32 = 254.878;
const CY_D: f32 = 205.395;

/// Color camera intrinsics.
const FX_C: f32 = 1081.37;
const FY_C: f32 = 1081.37;
const CX_C: f32 = 959.5;
const CY_C: f32 = 539.5;

/// Horizontal offset between the depth and color cameras, meters.
const BASELINE_M: f32 = 0.052;

/// Largest depth value the ramp produces, millimeters.
const MAX_RAMP_MM: u16 = 8000;

pub struct SimulatedSensor {
    color: FrameGeometry,
    depth: FrameGeometry,
    open: AtomicBool,
    tick: AtomicU64,
}

impl SimulatedSensor {
    /// Simulated sensor with native Kinect v2 geometry.
    pub fn new() -> Self {
        Self::with_geometry(COLOR_GEOMETRY, DEPTH_GEOMETRY)
    }

    /// Simulated sensor with custom geometry (keeps test buffers small).
    pub fn with_geometry(color: FrameGeometry, depth: FrameGeometry) -> Self {
        Self {
            color,
            depth,
            open: AtomicBool::new(false),
            tick: AtomicU64::new(0),
        }
    }

    /// Whether `SIMULATED_KINECT` requests the simulated sensor.
    pub fn is_enabled() -> bool {
        std::env::var(SIMULATED_KINECT_ENV)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    fn require_open(&self) -> Result<()> {
        if !self.open.load(Ordering::Acquire) {
            return Err(SensorError::Runtime("sensor not open".to_string()));
        }
        Ok(())
    }

    /// Project a camera-space point through the color pinhole.
    fn project_color(point: CameraSpacePoint) -> ColorSpacePoint {
        if point.z <= 0.0 {
            return ColorSpacePoint {
                x: f32::NEG_INFINITY,
                y: f32::NEG_INFINITY,
            };
        }
        ColorSpacePoint {
            x: CX_C + FX_C * point.x / point.z,
            y: CY_C + FY_C * point.y / point.z,
        }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthSensor for SimulatedSensor {
    fn open(&self) -> Result<()> {
        if self.open.swap(true, Ordering::AcqRel) {
            return Err(SensorError::Runtime("sensor already open".to_string()));
        }
        debug!(
            "simulated sensor open: color {}, depth {}",
            self.color, self.depth
        );
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn info(&self) -> SensorInfo {
        SensorInfo {
            model: "Simulated Kinect v2".to_string(),
            serial: Some("SIM-0001".to_string()),
            simulated: true,
        }
    }

    fn geometry(&self, channel: FrameChannel) -> Result<FrameGeometry> {
        self.require_open()?;
        Ok(match channel {
            FrameChannel::Color => self.color,
            FrameChannel::Depth => self.depth,
        })
    }

    fn copy_color_frame(&self, dst: &mut [u8]) -> Result<bool> {
        self.require_open()?;
        let expected = self.color.byte_len(FrameChannel::Color);
        if dst.len() != expected {
            return Err(SensorError::FrameCopy(format!(
                "color buffer is {} bytes, expected {expected}",
                dst.len()
            )));
        }
        let tick = self.tick.fetch_add(1, Ordering::Relaxed);
        let width = self.color.width as usize;
        for (i, px) in dst.chunks_exact_mut(4).enumerate() {
            let x = (i % width) as u64;
            let y = (i / width) as u64;
            px[0] = ((x + tick) & 0xFF) as u8; // B
            px[1] = ((y + tick) & 0xFF) as u8; // G
            px[2] = ((x + y) & 0xFF) as u8; // R
            px[3] = 255; // A
        }
        Ok(true)
    }

    fn copy_depth_frame(&self, dst: &mut [u16]) -> Result<bool> {
        self.require_open()?;
        let expected = self.depth.pixel_count();
        if dst.len() != expected {
            return Err(SensorError::FrameCopy(format!(
                "depth buffer is {} samples, expected {expected}",
                dst.len()
            )));
        }
        let tick = self.tick.load(Ordering::Relaxed);
        let width = self.depth.width as u64;
        for (i, sample) in dst.iter_mut().enumerate() {
            let x = i as u64 % width;
            // Scrolling ramp across the frame, capped at the sensor's
            // nominal maximum range.
            *sample = (((x + tick) * 16) % u64::from(MAX_RAMP_MM) + 1) as u16;
        }
        Ok(true)
    }

    fn map_depth_point_to_color(
        &self,
        point: DepthSpacePoint,
        depth_mm: u16,
    ) -> Result<ColorSpacePoint> {
        self.require_open()?;
        if depth_mm == 0 {
            return Ok(ColorSpacePoint {
                x: f32::NEG_INFINITY,
                y: f32::NEG_INFINITY,
            });
        }
        // Unproject through the depth pinhole, shift by the camera
        // baseline, then project through the color pinhole.
        let z = f32::from(depth_mm) / 1000.0;
        let camera = CameraSpacePoint {
            x: (point.x - CX_D) * z / FX_D - BASELINE_M,
            y: (point.y - CY_D) * z / FY_D,
            z,
        };
        Ok(Self::project_color(camera))
    }

    fn map_camera_point_to_color(&self, point: CameraSpacePoint) -> Result<ColorSpacePoint> {
        self.require_open()?;
        Ok(Self::project_color(point))
    }
}
