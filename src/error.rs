//! # Error Types
//!
//! Custom error types for Rover Link using `thiserror`.

use thiserror::Error;

/// Main error type for Rover Link
#[derive(Debug, Error)]
pub enum RoverLinkError {
    /// No gamepad was found among the input devices
    #[error("No gamepad found")]
    ControllerNotFound,

    /// Gamepad open or read errors
    #[error("Controller error: {0}")]
    Controller(String),

    /// Datagram link errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Rover Link
pub type Result<T> = std::result::Result<T, RoverLinkError>;
