//! Viewer pipeline: raw sensor frames in, display frames out.

pub mod commands;
pub mod convert;
pub mod encode;
pub mod session;
pub mod surface;
