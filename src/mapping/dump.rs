//! Coordinate-mapping dump tables.
//!
//! Sweeps a grid of points through the sensor's coordinate mapper and
//! renders two side-by-side tab-separated tables per sweep: the left
//! table holds the mapped X coordinates, the right one the mapped Y
//! coordinates. Non-finite results (points the mapper cannot resolve)
//! render as empty cells.

use crate::sensor::backend::DepthSensor;
use crate::sensor::error::Result;
use crate::sensor::types::{CameraSpacePoint, DepthSpacePoint, FrameChannel};

/// Grid sweep over depth-frame pixel coordinates at a fixed depth.
#[derive(Debug, Clone, Copy)]
pub struct DepthGridSpec {
    /// Pixel stride between sampled grid points.
    pub step: u32,
    /// Depth assumed at every sampled pixel, millimeters.
    pub depth_mm: u16,
}

impl Default for DepthGridSpec {
    fn default() -> Self {
        Self {
            step: 32,
            depth_mm: 4000,
        }
    }
}

/// Grid sweep over 3D camera-space points, meters.
#[derive(Debug, Clone, Copy)]
pub struct CameraGridSpec {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
    pub step: f32,
}

impl Default for CameraGridSpec {
    fn default() -> Self {
        Self {
            x_min: -2.0,
            x_max: 2.0,
            y_min: -2.0,
            y_max: 2.0,
            z_min: 0.5,
            z_max: 4.0,
            step: 0.5,
        }
    }
}

/// One table cell: the coordinate followed by a tab, or a bare tab for
/// a non-finite coordinate.
fn cell(value: f32) -> String {
    if value.is_finite() {
        format!("{value}\t")
    } else {
        "\t".to_string()
    }
}

/// Number of samples in an inclusive f32 range walked by index, so
/// accumulation error never drops the last sample.
fn sample_count(min: f32, max: f32, step: f32) -> u32 {
    (((max - min) / step).round() as u32) + 1
}

/// Sweep the depth frame at a fixed depth and render the mapped
/// color-space coordinates as side-by-side X and Y tables.
pub fn depth_grid_tables(sensor: &dyn DepthSensor, spec: &DepthGridSpec) -> Result<String> {
    let geometry = sensor.geometry(FrameChannel::Depth)?;
    let step = spec.step.max(1);

    let mut out = String::new();
    let mut y = 0;
    while y < geometry.height {
        let mut xs = String::new();
        let mut ys = String::new();
        let mut x = 0;
        while x < geometry.width {
            let point = DepthSpacePoint {
                x: x as f32,
                y: y as f32,
            };
            let mapped = sensor.map_depth_point_to_color(point, spec.depth_mm)?;
            xs.push_str(&cell(mapped.x));
            ys.push_str(&cell(mapped.y));
            x += step;
        }
        out.push_str(&xs);
        out.push('\t');
        out.push_str(&ys);
        out.push('\n');
        y += step;
    }
    Ok(out)
}

/// Sweep a 3D camera-space grid and render the mapped color-space
/// coordinates, one X/Y table pair per depth plane, planes separated
/// by a blank line.
pub fn camera_grid_tables(sensor: &dyn DepthSensor, spec: &CameraGridSpec) -> Result<String> {
    let x_count = sample_count(spec.x_min, spec.x_max, spec.step);
    let y_count = sample_count(spec.y_min, spec.y_max, spec.step);
    let z_count = sample_count(spec.z_min, spec.z_max, spec.step);

    let mut out = String::new();
    for zi in 0..z_count {
        let z = spec.z_min + spec.step * zi as f32;
        for yi in 0..y_count {
            let y = spec.y_min + spec.step * yi as f32;
            let mut xs = String::new();
            let mut ys = String::new();
            for xi in 0..x_count {
                let x = spec.x_min + spec.step * xi as f32;
                let mapped = sensor.map_camera_point_to_color(CameraSpacePoint { x, y, z })?;
                xs.push_str(&cell(mapped.x));
                ys.push_str(&cell(mapped.y));
            }
            out.push_str(&xs);
            out.push('\t');
            out.push_str(&ys);
            out.push('\n');
        }
        if zi + 1 < z_count {
            out.push('\n');
        }
    }
    Ok(out)
}

/// Full dump written to the clipboard at shutdown: the depth-grid
/// sweep followed by the camera-grid sweep.
pub fn shutdown_dump(sensor: &dyn DepthSensor) -> Result<String> {
    let depth = depth_grid_tables(sensor, &DepthGridSpec::default())?;
    let camera = camera_grid_tables(sensor, &CameraGridSpec::default())?;
    Ok(format!("{depth}\n{camera}"))
}
