use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchdogError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigValidationError),
    #[error("unable to connect to media server: {0}")]
    Connection(String),
    #[error("media server error: {0}")]
    Remote(String),
    #[error("no library sections or paths detected")]
    NoLibraryMappings,
    #[error("no valid paths to watch")]
    NoWatchablePaths,
    #[error("unknown library section: {0}")]
    UnknownSection(String),
    #[error("filesystem watch error: {0}")]
    Watch(String),
    #[error("credential cache error: {0}")]
    Cache(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = WatchdogError> = std::result::Result<T, E>;
