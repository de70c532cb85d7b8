pub use crate::classify::{EventClassifier, WatchEvent, WatchEventKind};
pub use crate::config::{ConfigValidationError, DEFAULT_HOST, Listener, RunMode, WatchConfig};
pub use crate::context::WatchdogContext;
pub use crate::credentials::{CredentialCache, ServerCredentials, resolve_credentials};
pub use crate::dispatch::{DispatchMode, DispatchOutcome, ScanDispatcher};
pub use crate::error::{Result, WatchdogError};
pub use crate::matcher::PathMatch;
pub use crate::queue::{ScanQueue, ScanRequest};
pub use crate::remote::{MediaServer, SectionListing};
pub use crate::scheduler::{ScanScheduler, TickReport};
pub use crate::topology::{FolderMapping, LibraryTopology};
