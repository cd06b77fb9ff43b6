//! Coordinate-mapping sweeps and their clipboard dump format.

pub mod dump;
