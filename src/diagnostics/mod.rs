//! Session diagnostics surfaced to the frontend on request.

pub mod stats;
