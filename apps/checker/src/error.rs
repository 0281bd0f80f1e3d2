use std::io::Error as IoError;

use thiserror::Error;
use uuid::Uuid;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    InvalidTarget(#[from] uptime::CheckError),
    #[error("No target with uuid {0}")]
    TargetNotFound(Uuid),
    #[error("Failed to write report: {0}")]
    Report(#[from] serde_json::Error),
    #[error("{0:#}")]
    Io(#[from] IoError),
}
