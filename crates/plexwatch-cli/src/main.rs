use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use clap::{ArgGroup, Parser, ValueEnum};
use directories::ProjectDirs;
use plexwatch_cli::{LibraryWatcher, PlexClient, prompt};
use plexwatch_core::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "plexwatch", version)]
#[command(
    about = "Triggers Plex partial scans on NFS configurations, on which inotify is not supported",
    long_about = None
)]
#[command(group(ArgGroup::new("action").required(true).args(["scan", "daemon"])))]
struct Args {
    /// Manually trigger a partial scan of the given folder paths
    #[arg(short, long)]
    scan: bool,

    /// Watch the given folder paths and trigger partial scans on changes
    #[arg(short, long)]
    daemon: bool,

    /// Folder paths; every Plex library folder when omitted or empty
    #[arg(short, long, num_args = 0..)]
    paths: Vec<PathBuf>,

    /// Plex server host
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Plex server token
    #[arg(short, long)]
    token: Option<String>,

    /// Log the scans that would be requested without sending them
    #[arg(long)]
    dry_run: bool,

    /// Seconds between partial scans (daemon mode)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Filesystem events to react to (daemon mode)
    #[arg(short, long, value_enum, num_args = 1..)]
    listeners: Vec<ListenerArg>,

    /// Credential cache file
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ListenerArg {
    Move,
    Modify,
    Create,
    Delete,
}

impl From<ListenerArg> for Listener {
    fn from(value: ListenerArg) -> Self {
        match value {
            ListenerArg::Move => Listener::Move,
            ListenerArg::Modify => Listener::Modify,
            ListenerArg::Create => Listener::Create,
            ListenerArg::Delete => Listener::Delete,
        }
    }
}

impl Args {
    fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            mode: if self.daemon {
                RunMode::Daemon
            } else {
                RunMode::Scan
            },
            dry_run: self.dry_run,
            interval: self.interval.map(Duration::from_secs),
            listeners: self.listeners.iter().copied().map(Listener::from).collect(),
        }
    }

    fn provided_credentials(&self) -> Option<ServerCredentials> {
        self.token.clone().map(|token| ServerCredentials {
            host: self.host.clone(),
            token,
        })
    }

    fn checked_paths(&self) -> std::result::Result<Vec<PathBuf>, ConfigValidationError> {
        for path in &self.paths {
            if !path.is_dir() {
                return Err(ConfigValidationError::InvalidPath(path.display().to_string()));
            }
        }
        Ok(self.paths.clone())
    }
}

fn default_cache_path() -> anyhow::Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "plexwatch")
        .context("unable to determine a configuration directory")?;
    Ok(dirs.config_dir().join("credentials.json"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let start_time = SystemTime::now();
    let args = Args::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = args.watch_config();
    config.validate()?;
    let paths = args.checked_paths()?;

    let cache = CredentialCache::new(match &args.cache {
        Some(path) => path.clone(),
        None => default_cache_path()?,
    });
    let (credentials, save) = resolve_credentials(
        cache.load()?,
        args.provided_credentials(),
        &prompt::confirm_on_console,
    )?;

    let server = Arc::new(PlexClient::connect(&credentials).await?);
    let ctx = Arc::new(WatchdogContext::connect(server, config, start_time).await?);
    if save {
        cache.save(&credentials)?;
    }

    let paths = if paths.is_empty() {
        info!("No --paths specified. Monitoring all Plex library folders by default.");
        ctx.library_paths().into_iter().collect()
    } else {
        paths
    };

    if args.scan {
        ctx.manual_scan(&paths).await?;
        return Ok(());
    }

    let watch_paths = ctx.watchable_paths(&paths)?;
    info!("Registering watchers...");
    let watcher = LibraryWatcher::start(ctx.clone(), &watch_paths)?;
    info!("Watching {} library folders", watcher.watched_folders());

    let cancel = CancellationToken::new();
    let scheduler = Arc::new(ctx.scheduler()?);
    let mut handle = scheduler.spawn(cancel.clone());
    info!("Ready to operate...");

    let outcome = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            warn!("Detected a keyboard interrupt, stopping plexwatch...");
            cancel.cancel();
            (&mut handle).await
        }
        result = &mut handle => result,
    };

    drop(watcher);
    outcome??;
    Ok(())
}
