//! Session driver: connection, command execution and logout.
//!
//! The layers mirror the lifecycle of one invocation:
//!
//! - [`ConnectionManager`] opens the transport and logs in, under a
//!   [`RetryPolicy`](crate::RetryPolicy).
//! - [`CommandRunner`] runs one command, paging through "more" prompts and
//!   checking error markers.
//! - [`SessionScope`] wraps both in acquire / use / release, logging out
//!   exactly once on every exit path.
//! - [`Executor`] is the public entry point that runs a command list.

mod builder;
mod connection;
mod executor;
mod runner;
mod scope;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::ExecutorBuilder;
pub use connection::ConnectionManager;
pub use executor::{Executor, run_commands};
pub use runner::{CommandRequest, CommandResult, CommandRunner, normalize_output};
pub use scope::SessionScope;
pub use session::Session;
