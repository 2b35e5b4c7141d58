//! Connection establishment: transport, login negotiation and retries.

use std::sync::Arc;

use log::{debug, info, warn};
use secrecy::ExposeSecret;
use tokio::io::{AsyncRead, AsyncWrite};

use super::session::Session;
use crate::config::ConnectionConfig;
use crate::error::ConnectionError;
use crate::platform::{PlatformProfile, PlatformRegistry};
use crate::retry::{RetryPolicy, RetryState};
use crate::transport::{Connector, TelnetTransport, TransportConfig};

/// Opens authenticated sessions, retrying transient failures.
pub struct ConnectionManager<C> {
    connector: C,
    registry: Arc<PlatformRegistry>,
    retry: RetryPolicy,
    search_depth: usize,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(
        connector: C,
        registry: Arc<PlatformRegistry>,
        retry: RetryPolicy,
        search_depth: usize,
    ) -> Self {
        Self {
            connector,
            registry,
            retry,
            search_depth,
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Connect and log in, applying the retry policy.
    ///
    /// Returns the last error once the policy stops. No session exists
    /// until this succeeds; every failed attempt closes its own transport.
    pub async fn acquire(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Session<C::Stream>, ConnectionError> {
        let unknown = config
            .platform
            .as_deref()
            .filter(|name| !self.registry.contains(name));
        if let Some(name) = unknown {
            warn!(
                "unknown platform {:?}, using {}",
                name,
                self.registry.default_name()
            );
        }
        let profile = self.registry.lookup(config.platform.as_deref());

        let mut state = RetryState::new();
        loop {
            match self.attempt(config, &profile).await {
                Ok(session) => {
                    info!(
                        "logged in to {}:{} as {} ({})",
                        config.host, config.port, config.username, profile.name
                    );
                    return Ok(session);
                }
                Err(err) => match state.next(&self.retry, &err) {
                    Some(delay) => {
                        warn!(
                            "attempt {} to {}:{} failed: {}; retrying in {:?}",
                            state.attempt(),
                            config.host,
                            config.port,
                            err,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        warn!(
                            "giving up on {}:{} after {} attempt(s): {}",
                            config.host,
                            config.port,
                            state.attempt() + 1,
                            err
                        );
                        return Err(err);
                    }
                },
            }
        }
    }

    async fn attempt(
        &self,
        config: &ConnectionConfig,
        profile: &Arc<PlatformProfile>,
    ) -> Result<Session<C::Stream>, ConnectionError> {
        let transport_config = TransportConfig {
            host: config.host.clone(),
            port: config.port,
            timeout: config.timeout,
            search_depth: self.search_depth,
        };

        let stream = self.connector.connect(&transport_config).await?;
        let mut transport = TelnetTransport::with_search_depth(stream, self.search_depth);

        match login(&mut transport, config, profile).await {
            Ok(()) => Ok(Session::new(transport, Arc::clone(profile), &config.host)),
            Err(err) => {
                if let Err(e) = transport.close().await {
                    debug!("closing failed login attempt: {}", e);
                }
                Err(err)
            }
        }
    }
}

/// Answer the login and password prompts and wait for the shell.
async fn login<S>(
    transport: &mut TelnetTransport<S>,
    config: &ConnectionConfig,
    profile: &PlatformProfile,
) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let timeout = config.timeout;

    debug!("waiting for login prompt {:?}", profile.login_prompt.as_str());
    let read = transport
        .read_until(&[&profile.login_prompt, &profile.failed_login], timeout)
        .await?;
    if read.matched == 1 {
        return Err(rejected(profile, &read.data));
    }
    transport.send(&format!("{}\n", config.username)).await?;

    debug!("waiting for password prompt {:?}", profile.password_prompt.as_str());
    let read = transport
        .read_until(&[&profile.password_prompt, &profile.failed_login], timeout)
        .await?;
    if read.matched == 1 {
        return Err(rejected(profile, &read.data));
    }
    transport
        .send(&format!("{}\n", config.password.expose_secret()))
        .await?;

    debug!("waiting for shell prompt");
    let read = transport
        .read_until(
            &[
                &profile.failed_login,
                &profile.login_prompt,
                &profile.shell_prompt,
            ],
            timeout,
        )
        .await?;
    match read.matched {
        0 => Err(rejected(profile, &read.data)),
        1 => Err(ConnectionError::Fatal {
            message: "login rejected: device asked for the username again".to_string(),
        }),
        _ => Ok(()),
    }
}

fn rejected(profile: &PlatformProfile, data: &[u8]) -> ConnectionError {
    let reason = profile
        .failed_login
        .find(data)
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
        .unwrap_or_else(|| "unknown reason".to_string());
    ConnectionError::Fatal {
        message: format!("login rejected: {}", reason),
    }
}
