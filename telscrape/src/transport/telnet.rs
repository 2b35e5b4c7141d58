//! Telnet transport over any async byte stream.

use std::future::Future;
use std::io;
use std::time::Duration;

use bytes::BytesMut;
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;

use super::config::TransportConfig;
use super::negotiation::{TelnetParser, escape};
use crate::channel::{DEFAULT_SEARCH_DEPTH, PatternBuffer, PromptMatcher};
use crate::error::TransportError;

const READ_CHUNK: usize = 4096;

/// Opens the byte stream a [`TelnetTransport`] runs over.
///
/// [`TcpConnector`] is the production implementation; tests and
/// jump-host setups can provide their own.
pub trait Connector: Send + Sync {
    /// The connected stream type.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Open a stream to `config.host:config.port` within `config.timeout`.
    fn connect(
        &self,
        config: &TransportConfig,
    ) -> impl Future<Output = Result<Self::Stream, TransportError>> + Send;
}

/// Plain TCP connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, config: &TransportConfig) -> Result<TcpStream, TransportError> {
        debug!("connecting to {}", config.socket_addr());

        let stream = tokio::time::timeout(
            config.timeout,
            TcpStream::connect((config.host.as_str(), config.port)),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|source| TransportError::ConnectionFailed {
            host: config.host.clone(),
            port: config.port,
            source,
        })?;

        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

/// Result of a read operation.
#[derive(Debug)]
pub struct ReadResult {
    /// Everything read since the previous match, escape codes removed.
    pub data: Vec<u8>,

    /// Index of the matcher that ended the read.
    pub matched: usize,
}

impl ReadResult {
    /// Get the data as a string (lossy UTF-8).
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

/// Telnet session transport.
///
/// Strips negotiation from the incoming stream, answers it, and buffers
/// text until one of the caller's prompt matchers fires. A single read call
/// is never assumed to carry a whole response.
pub struct TelnetTransport<S> {
    stream: S,
    parser: TelnetParser,
    buffer: PatternBuffer,
    read_buf: BytesMut,
}

impl<S> TelnetTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap a connected stream.
    pub fn new(stream: S) -> Self {
        Self::with_search_depth(stream, DEFAULT_SEARCH_DEPTH)
    }

    pub fn with_search_depth(stream: S, search_depth: usize) -> Self {
        Self {
            stream,
            parser: TelnetParser::new(),
            buffer: PatternBuffer::new(search_depth),
            read_buf: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    /// Write text to the device, escaping IAC bytes.
    pub async fn send(&mut self, data: &str) -> Result<(), TransportError> {
        self.stream.write_all(&escape(data.as_bytes())).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read until any matcher finds a match in the buffer tail.
    ///
    /// Matchers are checked in slice order, so earlier entries win when
    /// several match the same data. On success the buffer is drained into
    /// the result.
    pub async fn read_until(
        &mut self,
        matchers: &[&dyn PromptMatcher],
        timeout: Duration,
    ) -> Result<ReadResult, TransportError> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(matched) = matchers.iter().position(|m| self.buffer.tail_contains(*m)) {
                let data = self.buffer.take();
                trace!("read matched pattern #{} after {} bytes", matched, data.len());
                return Ok(ReadResult { data, matched });
            }

            self.read_chunk(deadline, timeout).await?;
        }
    }

    async fn read_chunk(&mut self, deadline: Instant, timeout: Duration) -> Result<(), TransportError> {
        self.read_buf.clear();
        self.read_buf.reserve(READ_CHUNK);

        let n = tokio::time::timeout_at(deadline, self.stream.read_buf(&mut self.read_buf))
            .await
            .map_err(|_| TransportError::Timeout(timeout))??;
        if n == 0 {
            return Err(TransportError::Disconnected);
        }

        let mut data = Vec::with_capacity(n);
        self.parser.feed(&self.read_buf, &mut data)?;

        let replies = self.parser.take_replies();
        if !replies.is_empty() {
            trace!("negotiation reply: {:?}", replies);
            self.stream.write_all(&replies).await?;
            self.stream.flush().await?;
        }

        self.buffer.extend(&data);
        trace!("read {} bytes, buffer: {} bytes", n, self.buffer.len());
        Ok(())
    }

    /// Close the connection.
    ///
    /// A peer that already hung up counts as closed.
    pub async fn close(mut self) -> Result<(), TransportError> {
        match self.stream.shutdown().await {
            Err(e) if !is_peer_gone(&e) => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Whether an I/O error means the peer has already closed the connection.
pub fn is_peer_gone(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof
    )
}
