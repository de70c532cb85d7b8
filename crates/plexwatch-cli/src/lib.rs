pub mod plex;
pub mod prompt;
pub mod watcher;

pub use plex::PlexClient;
pub use watcher::LibraryWatcher;
