//! Error types for Slides text extraction and presentation updates.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the Slides API or writing reports.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a local file (token, client secret, report).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A local JSON document could not be parsed or serialized.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The remote service answered with a non-success status.
    #[error("Slides API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a usable HTTP response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote service answered successfully but the payload was not what we asked for.
    #[error("Unexpected API response: {0}")]
    UnexpectedResponse(String),

    /// The stored credential or client secret file is unusable.
    #[error("Credential error: {0}")]
    Credentials(String),

    /// The interactive authorization or token exchange failed.
    #[error("Authorization error: {0}")]
    Authorization(String),
}

impl Error {
    /// Whether this error came from a remote API exchange.
    ///
    /// The command-line tool reports these and exits normally; every other
    /// kind is treated as fatal.
    pub fn is_remote_api(&self) -> bool {
        matches!(
            self,
            Error::Api { .. } | Error::Transport(_) | Error::UnexpectedResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_api_classification() {
        let api = Error::Api {
            status: 403,
            message: "The caller does not have permission".to_string(),
        };
        assert!(api.is_remote_api());
        assert!(Error::Transport("connection reset".into()).is_remote_api());
        assert!(Error::UnexpectedResponse("no replies".into()).is_remote_api());

        assert!(!Error::Credentials("missing token".into()).is_remote_api());
        assert!(!Error::Authorization("state mismatch".into()).is_remote_api());
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::from(io).is_remote_api());
    }

    #[test]
    fn test_api_error_message() {
        let err = Error::Api {
            status: 404,
            message: "Requested entity was not found.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Slides API error 404: Requested entity was not found."
        );
    }
}
