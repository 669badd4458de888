use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failure cases of a course upload or listing.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when required course metadata or the upload payload is missing.
    #[error("{0}")]
    Validation(String),

    /// Raised when the payload cannot be read as a spreadsheet.
    #[error("failed to decode spreadsheet: {0}")]
    Decode(String),

    /// Raised when the document store cannot be opened, read, or written.
    #[error("store error: {0}")]
    Store(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Coarse classification of a failure, mirroring the client/server split of
/// an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself was defective (4xx).
    Client,
    /// The request was fine but processing it failed (5xx).
    Server,
}

impl ToolError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ToolError::Validation(_) | ToolError::Decode(_) | ToolError::MissingInput(_) => {
                ErrorClass::Client
            }
            _ => ErrorClass::Server,
        }
    }

    /// Process exit status used by the command line front-end.
    pub fn exit_code(&self) -> i32 {
        match self.class() {
            ErrorClass::Client => 2,
            ErrorClass::Server => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_are_client_errors() {
        let error = ToolError::Decode("not a zip archive".into());
        assert_eq!(error.class(), ErrorClass::Client);
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn store_failures_are_server_errors() {
        let error = ToolError::Store("disk full".into());
        assert_eq!(error.class(), ErrorClass::Server);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let error = ToolError::Validation("Banner image is required.".into());
        assert_eq!(error.to_string(), "Banner image is required.");
    }
}
