//! Error types for the doppel console client

use thiserror::Error;

/// Result type alias for doppel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the doppel console client
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Microphone access refused by the platform
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),

    /// No usable audio device present
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Audio capture or encoding error
    #[error("audio error: {0}")]
    Audio(String),

    /// Audio playback or decoding error
    #[error("playback error: {0}")]
    Playback(String),

    /// Network failure talking to the backend
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend replied with a non-2xx status
    #[error("backend error {status}: {body}")]
    NonSuccess {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Backend reply did not match the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Input rejected before any request was issued
    #[error("validation error: {0}")]
    Validation(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
