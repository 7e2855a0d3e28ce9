use thiserror::Error;

/// Errors produced by the recording pipeline.
///
/// Only setup failures (`RecordingSession::new`, `start`) ever reach a caller.
/// Per-frame and teardown failures are logged and absorbed by the session.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Muxing error: {0}")]
    Muxing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RecorderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = RecorderError::InvalidFrame("too short".to_string());
        assert_eq!(err.to_string(), "Invalid frame: too short");

        let err = RecorderError::Encoding("boom".to_string());
        assert_eq!(err.to_string(), "Encoding error: boom");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: RecorderError = io.into();
        assert!(matches!(err, RecorderError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
