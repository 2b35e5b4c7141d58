//! Telnet connection configuration.

use std::time::Duration;

use crate::channel::DEFAULT_SEARCH_DEPTH;

/// Default telnet port.
pub const DEFAULT_PORT: u16 = 23;

/// Default connect timeout, matching the device login timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level connection configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// Telnet port (default: 23).
    pub port: u16,

    /// Connection timeout.
    pub timeout: Duration,

    /// Search depth for prompt matching.
    pub search_depth: usize,
}

impl TransportConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            search_depth: DEFAULT_SEARCH_DEPTH,
        }
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
