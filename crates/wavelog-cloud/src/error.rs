//! Error types for the cloud client

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the cloud API
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Missing OAuth credential: {0}")]
    MissingCredentials(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("URL cannot hold a path: {0}")]
    InvalidBase(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token request rejected: {status}")]
    TokenRejected { status: StatusCode },

    #[error("Status not OK for {resource}: {status}")]
    Status { resource: String, status: StatusCode },

    #[error("Failed to write {resource}: {source}")]
    Output {
        resource: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for cloud operations
pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_names_resource() {
        let err = CloudError::Status {
            resource: "device 12345".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(err.to_string(), "Status not OK for device 12345: 404 Not Found");
    }
}
