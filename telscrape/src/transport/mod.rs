//! Telnet transport layer.
//!
//! This module provides the low-level connection management: opening the
//! TCP stream, telnet option negotiation, and prompt-aware reads.

pub mod config;
pub mod negotiation;
mod telnet;

pub use config::{DEFAULT_PORT, TransportConfig};
pub use telnet::{Connector, ReadResult, TcpConnector, TelnetTransport, is_peer_gone};
