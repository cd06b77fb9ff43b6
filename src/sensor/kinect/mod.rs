//! Kinect v2 sensor backend.
//!
//! Talks to the sensor through the Kinect Common Bridge v2 C runtime.
//! All KCBv2 FFI is behind `#[cfg(feature = "kinect")]` — mock-based
//! tests run without the real DLLs.

pub mod api;
pub mod backend;
#[cfg(feature = "kinect")]
pub mod ffi;
pub mod mock;
#[cfg(feature = "kinect")]
pub mod sdk;
pub mod types;
