use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{error, info, warn};

use crate::classify::{EventClassifier, WatchEvent};
use crate::config::{ConfigValidationError, WatchConfig};
use crate::dispatch::{DispatchMode, ScanDispatcher};
use crate::error::{Result, WatchdogError};
use crate::matcher::PathMatch;
use crate::queue::ScanQueue;
use crate::remote::MediaServer;
use crate::scheduler::ScanScheduler;
use crate::topology::LibraryTopology;

/// Everything a daemon run or a manual scan shares, built once per
/// connection.
pub struct WatchdogContext {
    pub config: Arc<WatchConfig>,
    topology: Arc<LibraryTopology>,
    queue: Arc<ScanQueue>,
    dispatcher: Arc<ScanDispatcher>,
    classifier: EventClassifier,
}

impl WatchdogContext {
    pub async fn connect(
        server: Arc<dyn MediaServer>,
        config: WatchConfig,
        start_time: SystemTime,
    ) -> Result<Self> {
        config.validate()?;
        let listing = server.sections().await?;
        let topology = LibraryTopology::build(&listing);
        if topology.is_empty() {
            return Err(WatchdogError::NoLibraryMappings);
        }

        info!(
            "Found {} folder mappings across sections",
            topology.mapping_count()
        );
        for section in topology.sections() {
            for mapping in &section.mappings {
                info!(
                    "  {}: {} -> {}",
                    section.title,
                    mapping.leaf_folder_name,
                    mapping.root_path.display()
                );
            }
        }

        Ok(Self::new(server, topology, config, start_time))
    }

    pub fn new(
        server: Arc<dyn MediaServer>,
        topology: LibraryTopology,
        config: WatchConfig,
        start_time: SystemTime,
    ) -> Self {
        let topology = Arc::new(topology);
        let dispatcher = Arc::new(ScanDispatcher::new(server, topology.clone(), config.dry_run));
        let classifier =
            EventClassifier::new(topology.clone(), start_time, config.listeners.clone());
        Self {
            config: Arc::new(config),
            topology,
            queue: Arc::new(ScanQueue::new()),
            dispatcher,
            classifier,
        }
    }

    pub fn topology(&self) -> &Arc<LibraryTopology> {
        &self.topology
    }

    pub fn queue(&self) -> &Arc<ScanQueue> {
        &self.queue
    }

    pub fn find_sections(&self, path: &Path) -> Vec<PathMatch> {
        self.topology.find_sections(path)
    }

    pub fn library_paths(&self) -> BTreeSet<PathBuf> {
        self.topology.library_paths()
    }

    /// Keeps the requested paths that belong to a library section.
    pub fn watchable_paths<'a, I>(&self, paths: I) -> Result<Vec<PathBuf>>
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        let mut valid = Vec::new();
        for path in paths {
            if self.find_sections(path).is_empty() {
                warn!(
                    "{} does not correspond to any known Plex library folder, skipping...",
                    path.display()
                );
                continue;
            }
            valid.push(path.clone());
        }
        if valid.is_empty() {
            return Err(WatchdogError::NoWatchablePaths);
        }
        Ok(valid)
    }

    /// Classifies a watcher event and queues the resulting scans. Returns the
    /// number of newly queued requests.
    pub fn handle_event(&self, event: &WatchEvent) -> usize {
        let mut queued = 0;
        for request in self.classifier.classify(event) {
            let label = request.to_string();
            if self.queue.enqueue(request) {
                info!("Queueing scan (event: {}) => {}", event.kind, label);
                queued += 1;
            }
        }
        queued
    }

    /// One-shot scan of user supplied paths, bypassing the queue.
    pub async fn manual_scan<'a, I>(&self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        for path in paths {
            info!("Analyzing '{}' for manual scan.", path.display());
            let matches = self.find_sections(path);
            if matches.is_empty() {
                error!("Could not map '{}' to any known Plex section.", path.display());
                continue;
            }
            for found in matches {
                self.dispatcher
                    .dispatch(&found.section_title, &found.subpath, DispatchMode::OneShot)
                    .await?;
            }
        }
        Ok(())
    }

    pub fn scheduler(&self) -> Result<ScanScheduler> {
        let interval = self
            .config
            .interval
            .ok_or(ConfigValidationError::MissingInterval)?;
        ScanScheduler::new(self.queue.clone(), self.dispatcher.clone(), interval)
    }
}

impl std::fmt::Debug for WatchdogContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchdogContext")
            .field("config", &self.config)
            .field("topology", &self.topology)
            .field("queued", &self.queue.len())
            .finish()
    }
}
