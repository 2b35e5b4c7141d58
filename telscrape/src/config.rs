//! Caller-facing configuration.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::transport::DEFAULT_PORT;
use crate::transport::config::DEFAULT_TIMEOUT;

/// Where to connect and how to log in.
///
/// One value per invocation; it is never mutated by the library. The
/// password is kept in a [`SecretString`] so it stays out of `Debug` output
/// and logs.
///
/// Deserializes from JSON/TOML with `port` (23), `platform` (built-in
/// default) and `timeout_secs` (30) optional:
///
/// ```json
/// {"host": "10.0.0.1", "username": "admin", "password": "secret", "platform": "HUAWEI"}
/// ```
#[derive(Debug, Deserialize)]
pub struct ConnectionConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    pub username: String,

    #[serde(deserialize_with = "deserialize_secret")]
    pub password: SecretString,

    /// Telnet port (default: 23).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Platform key; `None` selects the registry default.
    #[serde(default)]
    pub platform: Option<String>,

    /// Connect and login timeout.
    #[serde(
        default = "default_timeout",
        rename = "timeout_secs",
        deserialize_with = "deserialize_secs"
    )]
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
            port: DEFAULT_PORT,
            platform: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the telnet port (default: 23).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the platform key (e.g., "HUAWEI", "ZTE").
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Timing knobs for a session.
///
/// The defaults are what Huawei and ZTE OLTs tolerate.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Upper bound for each read while a command runs.
    pub command_timeout: Duration,

    /// Pause before answering a pagination marker.
    pub pagination_delay: Duration,

    /// Keystroke that requests the next page.
    pub continuation_key: String,

    /// Pause between the logout command and its confirmation.
    pub logout_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
            pagination_delay: Duration::from_millis(50),
            continuation_key: " ".to_string(),
            logout_delay: Duration::from_millis(100),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn deserialize_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}
