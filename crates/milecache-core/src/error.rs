use std::path::PathBuf;

use thiserror::Error;

/// Broad failure categories callers match on without caring about details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Io,
    Parse,
    Lookup,
    InvalidQuery,
    Selector,
}

#[derive(Error, Debug)]
pub enum MilesError {
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited by remote site: {0}")]
    RateLimited(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected response: {0}")]
    UnexpectedStatus(String),

    #[error("Cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse start date {text:?} on {path}")]
    Parse { path: String, text: String },

    #[error("No activity id in path {0:?}")]
    Lookup(String),

    #[error("Invalid month {month} for year {year}")]
    InvalidQuery { year: i32, month: u32 },

    #[error("Invalid user identifier {0:?}")]
    InvalidUser(String),

    #[error("Invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl MilesError {
    /// Truncate a response body to avoid logging an entire HTML page
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, url: &str, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            404 => MilesError::NotFound(url.to_string()),
            429 => MilesError::RateLimited(url.to_string()),
            500..=599 => MilesError::ServerError(format!("{} from {}: {}", status, url, truncated)),
            _ => MilesError::UnexpectedStatus(format!("{} from {}: {}", status, url, truncated)),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MilesError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MilesError::Network { .. }
            | MilesError::NotFound(_)
            | MilesError::RateLimited(_)
            | MilesError::ServerError(_)
            | MilesError::UnexpectedStatus(_) => ErrorKind::Network,
            MilesError::Io { .. } => ErrorKind::Io,
            MilesError::Parse { .. } => ErrorKind::Parse,
            MilesError::Lookup(_) => ErrorKind::Lookup,
            MilesError::InvalidQuery { .. } | MilesError::InvalidUser(_) => ErrorKind::InvalidQuery,
            MilesError::Selector { .. } => ErrorKind::Selector,
        }
    }
}

pub type Result<T> = std::result::Result<T, MilesError>;
