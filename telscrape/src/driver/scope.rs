//! Acquire / use / release lifecycle around a session.

use std::panic::{self, AssertUnwindSafe};

use futures_util::FutureExt;
use log::{debug, error, trace};
use tokio::io::{AsyncRead, AsyncWrite};

use super::connection::ConnectionManager;
use super::session::Session;
use crate::config::{ConnectionConfig, SessionOptions};
use crate::error::{CleanupFault, Result, TransportError};
use crate::transport::{Connector, TelnetTransport, is_peer_gone};

/// Runs a body against a freshly acquired session and always logs out.
///
/// Logout runs exactly once after the body, whether it returned `Ok`, an
/// error, or panicked. A failed logout on an otherwise successful run is a
/// [`CleanupFault`] and is raised with [`std::panic::panic_any`]: the device
/// session is in an unknown state and must not be reported as clean.
pub struct SessionScope<C> {
    manager: ConnectionManager<C>,
    options: SessionOptions,
}

impl<C: Connector> SessionScope<C> {
    pub fn new(manager: ConnectionManager<C>, options: SessionOptions) -> Self {
        Self { manager, options }
    }

    pub fn manager(&self) -> &ConnectionManager<C> {
        &self.manager
    }

    /// Acquire a session, run `body` on it, then release it.
    ///
    /// Acquisition failures are returned as-is; no release runs because no
    /// session exists.
    pub async fn with_session<T, F>(&self, config: &ConnectionConfig, body: F) -> Result<T>
    where
        F: AsyncFnOnce(&mut Session<C::Stream>) -> Result<T>,
    {
        let mut session = self.manager.acquire(config).await?;

        let outcome = AssertUnwindSafe(body(&mut session)).catch_unwind().await;
        let released = self.release(&mut session).await;

        match outcome {
            Ok(Ok(value)) => match released {
                Ok(()) => Ok(value),
                Err(fault) => {
                    error!("logout from {} failed: {}", session.host(), fault);
                    panic::panic_any(fault)
                }
            },
            Ok(Err(err)) => {
                if let Err(fault) = released {
                    error!(
                        "logout from {} failed after {}: {}",
                        session.host(),
                        err,
                        fault
                    );
                }
                Err(err)
            }
            Err(payload) => {
                if let Err(fault) = released {
                    error!("logout from {} failed after panic: {}", session.host(), fault);
                }
                panic::resume_unwind(payload)
            }
        }
    }

    /// Logout command, pause, confirmation, close.
    ///
    /// A peer that hangs up part way through has logged us out; the remaining
    /// writes are skipped and the transport is closed.
    async fn release<S>(&self, session: &mut Session<S>) -> std::result::Result<(), CleanupFault>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let Some(mut transport) = session.take_transport() else {
            return Ok(());
        };
        let profile = session.profile();
        debug!("logging out of {}", session.host());

        let logout = format!("{}\n", profile.logout_command);
        let confirm = format!("{}\n", profile.logout_confirm);

        let written = self.logout(&mut transport, &logout, &confirm).await;
        let closed = transport.close().await;

        match (written, closed) {
            (Err((step, source)), _) => Err(CleanupFault { step, source }),
            (Ok(()), Err(source)) => Err(CleanupFault {
                step: "close",
                source,
            }),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    async fn logout<S>(
        &self,
        transport: &mut TelnetTransport<S>,
        logout: &str,
        confirm: &str,
    ) -> std::result::Result<(), (&'static str, TransportError)>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        trace!("release: logout command");
        if let Err(e) = transport.send(logout).await {
            return peer_gone_or("logout", e);
        }

        trace!("release: waiting {:?}", self.options.logout_delay);
        tokio::time::sleep(self.options.logout_delay).await;

        trace!("release: confirm");
        if let Err(e) = transport.send(confirm).await {
            return peer_gone_or("confirm", e);
        }
        Ok(())
    }
}

fn peer_gone_or(
    step: &'static str,
    err: TransportError,
) -> std::result::Result<(), (&'static str, TransportError)> {
    match &err {
        TransportError::Io(io) if is_peer_gone(io) => {
            debug!("peer closed the connection during {}", step);
            Ok(())
        }
        TransportError::Disconnected => Ok(()),
        _ => Err((step, err)),
    }
}
