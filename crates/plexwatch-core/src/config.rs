use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "http://localhost:32400";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchConfig {
    pub mode: RunMode,
    pub dry_run: bool,
    pub interval: Option<Duration>,
    pub listeners: Vec<Listener>,
}

impl WatchConfig {
    pub fn scan_once(dry_run: bool) -> Self {
        Self {
            mode: RunMode::Scan,
            dry_run,
            interval: None,
            listeners: Vec::new(),
        }
    }

    pub fn daemon(interval: Duration, listeners: Vec<Listener>, dry_run: bool) -> Self {
        Self {
            mode: RunMode::Daemon,
            dry_run,
            interval: Some(interval),
            listeners,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.mode == RunMode::Daemon {
            match self.interval {
                Some(interval) if !interval.is_zero() => {}
                _ => return Err(ConfigValidationError::MissingInterval),
            }
            if self.listeners.is_empty() {
                return Err(ConfigValidationError::MissingListeners);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunMode {
    Scan,
    Daemon,
}

/// Filesystem event families the daemon reacts to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Listener {
    Move,
    Modify,
    Create,
    Delete,
}

impl Listener {
    pub const ALL: [Listener; 4] = [
        Listener::Move,
        Listener::Modify,
        Listener::Create,
        Listener::Delete,
    ];
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("an interval greater than zero is required in daemon mode")]
    MissingInterval,
    #[error("at least one listener is required in daemon mode")]
    MissingListeners,
    #[error("plex host and token are missing")]
    MissingCredentials,
    #[error("{0} does not exist or is not a folder")]
    InvalidPath(String),
}
