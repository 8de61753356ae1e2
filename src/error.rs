use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures. Either one aborts the whole dashboard before any view is built.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("failed to parse surveillance CSV: {message}")]
    Parse { message: String },
}

impl DashboardError {
    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DashboardError::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        DashboardError::Parse {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
