/// Unified error type for the assistant library
/// Covers the failure paths that can occur before a conversation turn is in
/// flight; once a turn is running, every failure degrades to a rendered Turn.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    /// Dataset errors: unreadable file, malformed rows, empty table
    #[error("Dataset error: {message}")]
    Dataset {
        message: String,
        path: Option<String>,
    },

    /// Upstream model errors: unreachable endpoint, missing credentials
    #[error("Upstream model error: {message}")]
    Upstream { message: String },

    /// IO errors from the filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssistantError {
    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
            path: None,
        }
    }

    pub fn dataset_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}
