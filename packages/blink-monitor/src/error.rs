use std::path::PathBuf;

use blink_engine::{ConfigError, LifecycleError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid frame: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to load engine config {path}: {message}")]
    ConfigFile { path: PathBuf, message: String },
    #[error("invalid engine config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("unknown backend: {0}")]
    UnknownBackend(String),
}
