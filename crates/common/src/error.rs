//! Error types shared across Recast crates.

use std::path::PathBuf;

/// Top-level error type for Recast operations.
#[derive(Debug, thiserror::Error)]
pub enum RecastError {
    #[error("Network error fetching {url}: {message}")]
    Network {
        url: String,
        /// HTTP status when the server answered, `None` on transport failure.
        status: Option<u16>,
        message: String,
    },

    #[error("Missing field in descriptor: {field}")]
    MissingField { field: String },

    #[error("Malformed descriptor: {message}")]
    MalformedDescriptor { message: String },

    #[error("Invalid duration: {message}")]
    InvalidDuration { message: String },

    #[error("{tool} failed (status {status}): {stderr}")]
    ExternalTool {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid session URL {url}: {message}")]
    InvalidSessionUrl { url: String, message: String },

    #[error("Assembly cancelled")]
    Cancelled,

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using RecastError.
pub type RecastResult<T> = Result<T, RecastError>;

impl RecastError {
    pub fn network(url: impl Into<String>, status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            status,
            message: msg.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            message: msg.into(),
        }
    }

    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidDuration {
            message: msg.into(),
        }
    }

    pub fn external_tool(
        tool: impl Into<String>,
        status: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            status: status.into(),
            stderr: stderr.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_session_url(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidSessionUrl {
            url: url.into(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this is an HTTP 404 answer from the server.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Network { status: Some(404), .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_only_matches_404() {
        assert!(RecastError::network("http://h/x", Some(404), "Not Found").is_not_found());
        assert!(!RecastError::network("http://h/x", Some(500), "boom").is_not_found());
        assert!(!RecastError::network("http://h/x", None, "refused").is_not_found());
        assert!(!RecastError::Cancelled.is_not_found());
    }

    #[test]
    fn test_filesystem_error_names_path_and_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = RecastError::filesystem("/stage/abc/s1.png", io);
        assert_eq!(err.to_string(), "Filesystem error at /stage/abc/s1.png: gone");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_external_tool_message_includes_stderr() {
        let err = RecastError::external_tool("ffmpeg", "exit status: 1", "No such file");
        assert_eq!(
            err.to_string(),
            "ffmpeg failed (status exit status: 1): No such file"
        );
    }
}
