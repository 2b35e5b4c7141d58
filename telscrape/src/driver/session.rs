//! Live, authenticated device session.

use std::fmt;
use std::sync::Arc;

use log::warn;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::TransportError;
use crate::platform::PlatformProfile;
use crate::transport::TelnetTransport;

/// An authenticated telnet session bound to its platform profile.
///
/// Created by [`ConnectionManager::acquire`](super::ConnectionManager::acquire)
/// and owned by exactly one [`SessionScope`](super::SessionScope), which
/// consumes it on release. Commands borrow it mutably, so it cannot be used
/// by two operations at once.
pub struct Session<S> {
    transport: Option<TelnetTransport<S>>,
    profile: Arc<PlatformProfile>,
    host: String,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub(crate) fn new(
        transport: TelnetTransport<S>,
        profile: Arc<PlatformProfile>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            transport: Some(transport),
            profile,
            host: host.into(),
        }
    }

    /// The profile resolved for this session.
    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Borrow the profile and the transport together.
    pub(crate) fn parts(
        &mut self,
    ) -> Result<(&PlatformProfile, &mut TelnetTransport<S>), TransportError> {
        let transport = self
            .transport
            .as_mut()
            .ok_or(TransportError::Disconnected)?;
        Ok((&self.profile, transport))
    }

    /// Hand the transport to the release sequence.
    pub(crate) fn take_transport(&mut self) -> Option<TelnetTransport<S>> {
        self.transport.take()
    }
}

impl<S> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.host)
            .field("profile", &self.profile.name)
            .field("connected", &self.transport.is_some())
            .finish()
    }
}

impl<S> Drop for Session<S> {
    fn drop(&mut self) {
        if self.transport.is_some() {
            warn!("session to {} dropped without logout", self.host);
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;
    use crate::platform::vendors::huawei;

    #[tokio::test]
    async fn test_debug_shows_host_and_profile() {
        let mock = Builder::new().build();
        let mut session = Session::new(
            TelnetTransport::new(mock),
            Arc::new(huawei::profile()),
            "10.0.0.1",
        );
        let text = format!("{:?}", session);
        assert!(text.contains("10.0.0.1"));
        assert!(text.contains("HUAWEI"));
        assert!(text.contains("connected: true"));
        drop(session.take_transport());
    }
}
