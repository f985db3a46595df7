//! Error types shared across Chatshot crates.

use std::path::PathBuf;

/// Top-level error type for Chatshot operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatshotError {
    /// An export was requested while another run is still active.
    #[error("An export is already running")]
    AlreadyRunning,

    /// An animated export was requested for a conversation with no messages.
    #[error("Conversation has no messages to export")]
    EmptyConversation,

    #[error("Asset loading timed out after {timeout_secs}s")]
    AssetLoadTimeout { timeout_secs: u64 },

    #[error("Asset load error: {message}")]
    AssetLoad { message: String },

    /// Capturing frame `frame` (1-based) failed.
    #[error("Rasterize error at frame {frame}: {message}")]
    Rasterize { frame: usize, message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Model error: {message}")]
    Model { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ChatshotError.
pub type ChatshotResult<T> = Result<T, ChatshotError>;

impl ChatshotError {
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad {
            message: msg.into(),
        }
    }

    pub fn rasterize(frame: usize, msg: impl Into<String>) -> Self {
        Self::Rasterize {
            frame,
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error is the benign "busy" rejection.
    ///
    /// Hosts treat it as an ignored click rather than a failure.
    pub fn is_already_running(&self) -> bool {
        matches!(self, Self::AlreadyRunning)
    }

    /// Frame index attached to a capture failure, if any.
    pub fn failed_frame(&self) -> Option<usize> {
        match self {
            Self::Rasterize { frame, .. } => Some(*frame),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rasterize_error_reports_frame() {
        let err = ChatshotError::rasterize(2, "surface lost");
        assert_eq!(err.failed_frame(), Some(2));
        assert_eq!(err.to_string(), "Rasterize error at frame 2: surface lost");
    }

    #[test]
    fn test_already_running_is_benign() {
        assert!(ChatshotError::AlreadyRunning.is_already_running());
        assert!(!ChatshotError::encode("boom").is_already_running());
        assert_eq!(ChatshotError::encode("boom").failed_frame(), None);
    }

    #[test]
    fn test_timeout_message_names_duration() {
        let err = ChatshotError::AssetLoadTimeout { timeout_secs: 10 };
        assert!(err.to_string().contains("10s"));
    }
}
