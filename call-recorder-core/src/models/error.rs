use thiserror::Error;

/// Errors that can occur while detecting, capturing, or converting a call.
///
/// `Clone + PartialEq` so a failed session can carry its cause.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("device initialization failed: {0}")]
    DeviceInitFailed(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("invalid session transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("recorder has been destroyed")]
    Destroyed,

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CaptureError {
    /// Wrap an I/O error with a short description of the failed operation.
    pub fn storage(context: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            log::warn!("{}: storage permission denied", context);
        }
        Self::StorageError(format!("{}: {}", context, err))
    }
}
