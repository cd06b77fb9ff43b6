//! Depth sensor boundary.
//!
//! `backend` defines the hardware-agnostic `DepthSensor` trait;
//! `kinect` drives a real device through the Kinect Common Bridge v2
//! runtime, and `simulated` generates synthetic frames for
//! development without hardware.

pub mod backend;
pub mod error;
pub mod kinect;
pub mod simulated;
pub mod types;
