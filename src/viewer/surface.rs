//! Double-buffered frame surfaces shared between the delivery thread
//! and the IPC commands.
//!
//! Each surface holds the raw frame as copied from the sensor and the
//! derived display frame. `update()` is the single write path: it
//! copies the raw frame and recomputes the display frame in one step,
//! so the two can never disagree. A skipped cycle simply never calls
//! `update()`, leaving both buffers bit-for-bit unchanged.

use crate::sensor::error::{Result, SensorError};
use crate::sensor::types::{FrameChannel, FrameGeometry};

use super::convert;

/// BGRA color frame plus its binary-thresholded display frame.
pub struct ColorSurface {
    geometry: FrameGeometry,
    raw: Vec<u8>,
    display: Vec<u8>,
    sequence: u64,
}

impl ColorSurface {
    /// Surfaces start out all-white, matching what the viewer shows
    /// before the first frame arrives.
    pub fn new(geometry: FrameGeometry) -> Self {
        let len = geometry.byte_len(FrameChannel::Color);
        Self {
            geometry,
            raw: vec![255; len],
            display: vec![255; len],
            sequence: 0,
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Number of frames applied so far; 0 means no frame has arrived.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Apply a new raw BGRA frame and recompute the display frame.
    pub fn update(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() != self.raw.len() {
            return Err(SensorError::FrameCopy(format!(
                "color frame is {} bytes, surface holds {}",
                frame.len(),
                self.raw.len()
            )));
        }
        self.raw.copy_from_slice(frame);
        convert::threshold_binary(&self.raw, &mut self.display);
        self.sequence += 1;
        Ok(())
    }

    /// Latest raw BGRA frame.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Copy of the display frame, safe to hand to an encoder outside
    /// the surface lock.
    pub fn bitmap(&self) -> Vec<u8> {
        self.display.clone()
    }
}

/// Raw 16-bit depth frame plus its 8-bit grayscale display frame.
pub struct DepthSurface {
    geometry: FrameGeometry,
    raw: Vec<u16>,
    display: Vec<u8>,
    sequence: u64,
}

impl DepthSurface {
    pub fn new(geometry: FrameGeometry) -> Self {
        let pixels = geometry.pixel_count();
        Self {
            geometry,
            raw: vec![0; pixels],
            display: vec![0; pixels],
            sequence: 0,
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Apply a new raw depth frame and recompute the grayscale frame.
    pub fn update(&mut self, frame: &[u16]) -> Result<()> {
        if frame.len() != self.raw.len() {
            return Err(SensorError::FrameCopy(format!(
                "depth frame is {} samples, surface holds {}",
                frame.len(),
                self.raw.len()
            )));
        }
        self.raw.copy_from_slice(frame);
        convert::depth_to_gray(&self.raw, &mut self.display);
        self.sequence += 1;
        Ok(())
    }

    /// Latest raw depth samples, millimeters.
    pub fn raw(&self) -> &[u16] {
        &self.raw
    }

    /// Latest raw depth frame reinterpreted as bytes (native order).
    pub fn raw_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.raw)
    }

    pub fn bitmap(&self) -> Vec<u8> {
        self.display.clone()
    }
}
