//! Error types for QMS.

use thiserror::Error;

/// Default result type of QMS.
pub type QmsResult<T> = Result<T, QmsError>;

/// Any failure surfaced by the data backend or object storage.
///
/// The core never inspects it; it is forwarded to the caller as-is.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct BackendError {
    /// Human readable description from the backend.
    pub message: String,

    /// Backend specific code, when one is available.
    pub code: Option<String>,
}

impl BackendError {
    /// Creates a backend error with only a message.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Attaches a backend code.
    pub fn with_code<S: Into<String>>(mut self, code: S) -> Self {
        self.code = Some(code.into());
        self
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for BackendError {
    fn from(err: rusqlite::Error) -> Self {
        let code = err.sqlite_error_code().map(|c| format!("{:?}", c));
        Self {
            message: err.to_string(),
            code,
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("invalid record: {}", err))
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string()).with_code(format!("{:?}", err.kind()))
    }
}

/// Possible errors in QMS.
#[derive(Error, Debug)]
pub enum QmsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),
}

impl QmsError {
    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_passes_message_through() {
        let err: QmsError = BackendError::new("violates foreign key").with_code("23503").into();

        match err {
            QmsError::Backend(inner) => {
                assert_eq!(inner.message, "violates foreign key");
                assert_eq!(inner.code.as_deref(), Some("23503"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_io_error_keeps_kind_as_code() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = BackendError::from(io);

        assert_eq!(err.code.as_deref(), Some("PermissionDenied"));
    }
}
