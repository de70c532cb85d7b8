use std::path::{Component, Path};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{Result, WatchdogError};
use crate::remote::MediaServer;
use crate::topology::LibraryTopology;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The section is refreshing; nothing was sent.
    Busy,
    Dispatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Daemon,
    OneShot,
}

pub struct ScanDispatcher {
    server: Arc<dyn MediaServer>,
    topology: Arc<LibraryTopology>,
    dry_run: bool,
}

impl ScanDispatcher {
    pub fn new(
        server: Arc<dyn MediaServer>,
        topology: Arc<LibraryTopology>,
        dry_run: bool,
    ) -> Self {
        Self {
            server,
            topology,
            dry_run,
        }
    }

    pub async fn dispatch(
        &self,
        section_title: &str,
        subpath: &Path,
        mode: DispatchMode,
    ) -> Result<DispatchOutcome> {
        if self.server.is_refreshing(section_title).await? {
            match mode {
                DispatchMode::Daemon => warn!(
                    "Section '{}' is currently refreshing; re-scheduling scan.",
                    section_title
                ),
                DispatchMode::OneShot => warn!(
                    "Section '{}' is currently refreshing; skipping scan.",
                    section_title
                ),
            }
            return Ok(DispatchOutcome::Busy);
        }

        let scannable_path = self.scannable_path(section_title, subpath)?;
        info!(
            "Requesting Plex to scan path '{}' in section '{}'",
            scannable_path, section_title
        );

        if self.dry_run {
            info!("Skipping Plex scan (dry-run mode)");
        } else {
            self.server.scan_path(section_title, &scannable_path).await?;
        }
        Ok(DispatchOutcome::Dispatched)
    }

    /// Joins the section's first root with `subpath` using `/`.
    pub fn scannable_path(&self, section_title: &str, subpath: &Path) -> Result<String> {
        let root = self
            .topology
            .canonical_root(section_title)
            .ok_or_else(|| WatchdogError::UnknownSection(section_title.to_owned()))?;
        Ok(join_remote(root, subpath))
    }
}

fn join_remote(root: &Path, subpath: &Path) -> String {
    let root = root.to_string_lossy();
    let mut joined = root.trim_end_matches(is_separator).to_owned();
    if joined.is_empty() {
        joined.push_str(&root[..root.len().min(1)]);
    }
    for component in subpath.components() {
        if let Component::Normal(part) = component {
            if !joined.ends_with(is_separator) {
                joined.push('/');
            }
            joined.push_str(&part.to_string_lossy());
        }
    }
    joined
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}
