use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackendError>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid identifier '{id}': {reason}")]
    InvalidId { id: String, reason: &'static str },

    #[error("a post with slug '{0}' already exists")]
    SlugTaken(String),

    #[error("Appwrite returned {status} ({kind}): {message}")]
    Remote {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode Appwrite response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("could not load settings: {0}")]
    Settings(#[from] ::config::ConfigError),
}

impl BackendError {
    /// HTTP status of a remote failure, if the request reached Appwrite.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Remote { status, .. } => Some(*status),
            BackendError::SlugTaken(_) => Some(409),
            BackendError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Builds a `Remote` error from a non-success response body.
    ///
    /// Appwrite answers with `{"message", "code", "type"}`; anything else
    /// (proxies, HTML error pages) keeps the raw body as the message.
    pub(crate) fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<AppwriteErrorBody>(body) {
            Ok(parsed) => BackendError::Remote {
                status,
                kind: parsed.kind.unwrap_or_else(|| "unknown".to_string()),
                message: parsed.message,
            },
            Err(_) => BackendError::Remote {
                status,
                kind: "unknown".to_string(),
                message: body.trim().to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct AppwriteErrorBody {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}
