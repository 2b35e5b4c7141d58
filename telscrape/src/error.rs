//! Error types for telscrape.
//!
//! Failures are split by the stage that produced them: connection-stage
//! failures happen before a session exists, command-stage failures happen
//! while one is live. A failed logout is neither; see [`CleanupFault`].

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type returned by [`Executor::execute`](crate::Executor::execute).
///
/// The `Display` form is `"<Tag>: <message>"`.
#[derive(Error, Debug)]
pub enum Error {
    /// Connecting or logging in failed, after any retries.
    #[error("ConnectionError: {0}")]
    Connection(#[from] ConnectionError),

    /// A command failed on a live session.
    #[error("CommandError: {0}")]
    Command(#[from] CommandError),
}

impl Error {
    /// The error tag, `"ConnectionError"` or `"CommandError"`.
    pub fn tag(&self) -> &'static str {
        match self {
            Error::Connection(_) => "ConnectionError",
            Error::Command(_) => "CommandError",
        }
    }
}

/// Transport layer errors (TCP, telnet negotiation, prompt reads).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("connection to {host}:{port} failed: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// The peer does not speak telnet, or negotiation was malformed
    #[error("telnet handshake failed: {0}")]
    Handshake(String),

    /// Connection was closed by the peer
    #[error("connection closed by peer")]
    Disconnected,

    /// Operation timed out
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Connection-stage errors, classified for the retry policy.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Retrying cannot succeed: rejected credentials, locked account,
    /// protocol mismatch.
    #[error("Connection failed: {message}")]
    Fatal { message: String },

    /// Any other connect or login failure.
    #[error("Connection failed: {source}")]
    Transient {
        #[source]
        source: TransportError,
    },
}

impl ConnectionError {
    /// Whether this error was classified fatal at the point of failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConnectionError::Fatal { .. })
    }
}

impl From<TransportError> for ConnectionError {
    fn from(source: TransportError) -> Self {
        match source {
            TransportError::Handshake(_) => ConnectionError::Fatal {
                message: source.to_string(),
            },
            source => ConnectionError::Transient { source },
        }
    }
}

/// Command-stage errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Sending the command or reading its output failed
    #[error("Command execution failed: {command}: {source}")]
    ExecutionFailed {
        command: String,
        #[source]
        source: TransportError,
    },

    /// The output contained one of the caller's error markers
    #[error("Command failed: {command}, matched error pattern {marker:?} in output: {output}")]
    PatternMatched {
        command: String,
        marker: String,
        output: String,
    },
}

impl CommandError {
    /// The command text this error belongs to.
    pub fn command(&self) -> &str {
        match self {
            CommandError::ExecutionFailed { command, .. } => command,
            CommandError::PatternMatched { command, .. } => command,
        }
    }
}

/// A failure while logging out and closing a session.
///
/// Never converted into [`Error`]: once logout has failed the device-side
/// session state is unknown. When the work inside the scope succeeded, the
/// scope escalates this value with [`std::panic::panic_any`].
#[derive(Error, Debug)]
#[error("session cleanup failed during {step}: {source}")]
pub struct CleanupFault {
    /// The release step that failed.
    pub step: &'static str,
    #[source]
    pub source: TransportError,
}

/// Result type alias using telscrape's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_combines_tag_and_message() {
        let err: Error = ConnectionError::Fatal {
            message: "Username or password invalid".into(),
        }
        .into();
        assert_eq!(err.tag(), "ConnectionError");
        assert_eq!(
            err.to_string(),
            "ConnectionError: Connection failed: Username or password invalid"
        );

        let err: Error = CommandError::PatternMatched {
            command: "configure bad-syntax".into(),
            marker: "% Invalid".into(),
            output: "% Invalid command".into(),
        }
        .into();
        assert_eq!(err.tag(), "CommandError");
        assert!(err.to_string().starts_with("CommandError: Command failed: configure bad-syntax"));
    }

    #[test]
    fn test_handshake_transport_error_is_fatal() {
        let err = ConnectionError::from(TransportError::Handshake("peer sent an SSH banner".into()));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("handshake"));

        let err = ConnectionError::from(TransportError::Disconnected);
        assert!(!err.is_fatal());
    }
}
