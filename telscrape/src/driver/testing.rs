//! Scripted connector for driver unit tests.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_test::io::{Builder, Mock};

use crate::error::TransportError;
use crate::transport::{Connector, TransportConfig};

/// Hands out pre-scripted streams, one per connect call, in order.
///
/// A `None` entry (and an exhausted script) refuses the connection.
#[derive(Default)]
pub(crate) struct ScriptedConnector {
    script: Mutex<VecDeque<Option<Mock>>>,
    attempts: AtomicUsize,
}

impl ScriptedConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn stream(self, mock: Mock) -> Self {
        self.push(Some(mock))
    }

    pub(crate) fn refuse(self) -> Self {
        self.push(None)
    }

    fn push(self, entry: Option<Mock>) -> Self {
        self.script.lock().unwrap().push_back(entry);
        self
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for ScriptedConnector {
    type Stream = Mock;

    async fn connect(&self, config: &TransportConfig) -> Result<Mock, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front().flatten();
        next.ok_or_else(|| TransportError::ConnectionFailed {
            host: config.host.clone(),
            port: config.port,
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        })
    }
}

/// Successful Huawei login as user `admin` with password `secret`.
pub(crate) fn huawei_login(builder: &mut Builder) -> &mut Builder {
    builder
        .read(b"\r\n\r\nUser name:")
        .write(b"admin\n")
        .read(b"\r\nUser password:")
        .write(b"secret\n")
        .read(b"\r\n\r\n  Huawei Integrated Access Software (MA5600T).\r\n\r\nMA5608T>")
}
