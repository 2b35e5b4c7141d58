//! # Telscrape
//!
//! Async telnet CLI automation for network devices.
//!
//! Telscrape logs in to a prompt-driven device CLI (Huawei and ZTE OLTs out
//! of the box), runs an ordered list of commands, pages through "more"
//! prompts, and always logs out again.
//!
//! ## Features
//!
//! - Async telnet transport via tokio, with minimal option negotiation
//! - Multi-vendor support through immutable platform profiles
//! - Efficient pattern buffer matching (tail search, ANSI stripping)
//! - Retry of transient connection failures, never of rejected logins
//! - Caller-supplied error markers that abort the command list
//! - Scoped logout that runs exactly once on every exit path
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use telscrape::{ConnectionConfig, run_commands};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), telscrape::Error> {
//!     let config = ConnectionConfig::new("10.0.0.1", "admin", "secret")
//!         .with_platform("HUAWEI");
//!
//!     let markers = vec!["% Unknown command".to_string()];
//!     let output = run_commands(&config, &["display version"], &markers).await?;
//!     println!("{}", output);
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod platform;
pub mod retry;
pub mod transport;

// Re-export main types for convenience
pub use config::{ConnectionConfig, SessionOptions};
pub use driver::{CommandResult, Executor, ExecutorBuilder, run_commands};
pub use error::{CleanupFault, CommandError, ConnectionError, Error, TransportError};
pub use platform::{PlatformProfile, PlatformRegistry};
pub use retry::RetryPolicy;
pub use transport::{Connector, TcpConnector};
