use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info};

use plexwatch_core::prelude::*;

/// Keeps one recursive watcher per library folder alive. Dropping it stops
/// every watcher.
pub struct LibraryWatcher {
    watchers: Vec<RecommendedWatcher>,
}

impl LibraryWatcher {
    pub fn start(ctx: Arc<WatchdogContext>, paths: &[PathBuf]) -> Result<Self> {
        let mut watchers = Vec::with_capacity(paths.len());
        for path in paths {
            let handler_ctx = ctx.clone();
            let mut watcher = RecommendedWatcher::new(
                move |res: notify::Result<Event>| match res {
                    Ok(event) => {
                        if let Some(watch_event) = convert_event(&event) {
                            debug!("File watch event: {:?}", watch_event);
                            handler_ctx.handle_event(&watch_event);
                        }
                    }
                    Err(err) => error!("Watch error: {:?}", err),
                },
                Config::default(),
            )
            .map_err(|err| WatchdogError::Watch(format!("failed to create watcher: {err}")))?;

            info!("Scheduling watcher for {}", path.display());
            watcher
                .watch(path, RecursiveMode::Recursive)
                .map_err(|err| {
                    WatchdogError::Watch(format!("failed to watch {}: {err}", path.display()))
                })?;
            watchers.push(watcher);
        }
        Ok(Self { watchers })
    }

    pub fn watched_folders(&self) -> usize {
        self.watchers.len()
    }
}

impl Drop for LibraryWatcher {
    fn drop(&mut self) {
        if !self.watchers.is_empty() {
            info!("stopping {} filesystem watchers", self.watchers.len());
        }
    }
}

/// Maps a `notify` event onto the engine's event model. Access and
/// unclassified events yield `None`.
pub fn convert_event(event: &Event) -> Option<WatchEvent> {
    let path = event.paths.first()?.clone();
    let (kind, dest_path, is_directory) = match &event.kind {
        EventKind::Create(kind) => (
            WatchEventKind::Created,
            None,
            match kind {
                CreateKind::Folder => true,
                CreateKind::File => false,
                _ => path.is_dir(),
            },
        ),
        EventKind::Remove(kind) => (
            WatchEventKind::Deleted,
            None,
            matches!(kind, RemoveKind::Folder),
        ),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            (WatchEventKind::Deleted, None, false)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            let is_directory = path.is_dir();
            (WatchEventKind::Moved, Some(path.clone()), is_directory)
        }
        EventKind::Modify(ModifyKind::Name(_)) => match event.paths.get(1) {
            Some(dest) => (WatchEventKind::Moved, Some(dest.clone()), dest.is_dir()),
            None => (WatchEventKind::Modified, None, path.is_dir()),
        },
        EventKind::Modify(_) => (WatchEventKind::Modified, None, path.is_dir()),
        EventKind::Any | EventKind::Access(_) | EventKind::Other => return None,
    };

    Some(WatchEvent {
        kind,
        path,
        dest_path,
        is_directory,
        timestamp: SystemTime::now(),
    })
}
