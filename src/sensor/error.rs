use thiserror::Error;

/// Sensor subsystem errors.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("no compatible depth sensor found: {0}")]
    DeviceUnavailable(String),

    #[error("sensor runtime call failed: {0}")]
    Runtime(String),

    #[error("frame copy failed: {0}")]
    FrameCopy(String),

    #[error("coordinate mapping failed: {0}")]
    Mapping(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, SensorError>;
