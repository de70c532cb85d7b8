use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::Listener;
use crate::queue::ScanRequest;
use crate::topology::LibraryTopology;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WatchEventKind {
    Created,
    Modified,
    Deleted,
    Moved,
}

impl WatchEventKind {
    pub fn listener(self) -> Listener {
        match self {
            WatchEventKind::Created => Listener::Create,
            WatchEventKind::Modified => Listener::Modify,
            WatchEventKind::Deleted => Listener::Delete,
            WatchEventKind::Moved => Listener::Move,
        }
    }
}

impl fmt::Display for WatchEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            WatchEventKind::Created => "created",
            WatchEventKind::Modified => "modified",
            WatchEventKind::Deleted => "deleted",
            WatchEventKind::Moved => "moved",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: PathBuf,
    pub dest_path: Option<PathBuf>,
    pub is_directory: bool,
    pub timestamp: SystemTime,
}

impl WatchEvent {
    pub fn new(kind: WatchEventKind, path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self {
            kind,
            path: path.into(),
            dest_path: None,
            is_directory,
            timestamp: SystemTime::now(),
        }
    }

    pub fn moved(from: impl Into<PathBuf>, to: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self {
            dest_path: Some(to.into()),
            ..Self::new(WatchEventKind::Moved, from, is_directory)
        }
    }

    /// The path the event leaves behind: the destination of a move, the
    /// source otherwise.
    pub fn effective_path(&self) -> &Path {
        match (self.kind, &self.dest_path) {
            (WatchEventKind::Moved, Some(dest)) => dest,
            _ => &self.path,
        }
    }
}

/// Turns filesystem events into scan requests for the folders they touch.
pub struct EventClassifier {
    topology: Arc<LibraryTopology>,
    start_time: SystemTime,
    listeners: Vec<Listener>,
}

impl EventClassifier {
    pub fn new(
        topology: Arc<LibraryTopology>,
        start_time: SystemTime,
        listeners: Vec<Listener>,
    ) -> Self {
        Self {
            topology,
            start_time,
            listeners,
        }
    }

    pub fn classify(&self, event: &WatchEvent) -> Vec<ScanRequest> {
        if !self.listeners.contains(&event.kind.listener()) {
            return Vec::new();
        }

        let path = event.effective_path();
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => {
                debug!("Path {} no longer exists; ignoring event.", path.display());
                return Vec::new();
            }
        };

        if let Ok(modified) = metadata.modified() {
            if modified < self.start_time {
                debug!(
                    "Ignoring event on {}, modified before start.",
                    path.display()
                );
                return Vec::new();
            }
        }

        let folder = if event.is_directory {
            path
        } else {
            path.parent().unwrap_or(path)
        };

        let matches = self.topology.find_sections(folder);
        if matches.is_empty() {
            error!(
                "Could not find a matching Plex section for '{}'",
                folder.display()
            );
            return Vec::new();
        }

        matches.into_iter().map(ScanRequest::from).collect()
    }
}
