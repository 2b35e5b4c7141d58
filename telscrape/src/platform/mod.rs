//! Platform profiles for multi-vendor support.
//!
//! A profile carries the prompts and markers that drive the telnet
//! conversation: login and password prompts, the shell prompt, the
//! pagination marker, the failed-login pattern and the logout exchange.

mod profile;
mod registry;
pub mod vendors;

pub use profile::{DEFAULT_FAILED_LOGIN, HOSTNAME_PROMPT, PlatformProfile};
pub use registry::{PlatformRegistry, RegistryBuilder};
