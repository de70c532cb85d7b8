pub mod classify;
pub mod config;
pub mod context;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod matcher;
pub mod prelude;
pub mod queue;
pub mod remote;
pub mod scheduler;
pub mod topology;

pub use config::*;
pub use context::*;
pub use error::*;
pub use remote::*;
