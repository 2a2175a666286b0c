use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use nodemgr_transport::IpcStream;
use tracing::trace;

use crate::codec::{complete_frame, decode_frame, FrameConfig};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete messages from any `Read` stream.
///
/// Bytes past the end of the returned frame stay buffered for the next
/// call, so a peer that writes two replies at once loses nothing.
pub struct FrameReader<T> {
    inner: T,
    pending: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            pending: BytesMut::new(),
            config,
        }
    }

    /// Block until one whole frame is available and return its payload.
    ///
    /// EOF, whether between frames or inside one, is
    /// [`FrameError::ConnectionClosed`]. A socket read timeout surfaces as
    /// [`FrameError::Io`] with `WouldBlock` or `TimedOut`.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            if let Some(payload) = decode_frame(&mut self.pending, self.config.max_payload_size)? {
                return Ok(payload);
            }
            self.fill()?;
        }
    }

    /// Whether a complete frame is already buffered, so the next
    /// [`read_frame`](Self::read_frame) will not touch the stream.
    pub fn has_buffered_frame(&self) -> Result<bool> {
        Ok(complete_frame(&self.pending, self.config.max_payload_size)?.is_some())
    }

    /// Take one frame out of the buffer without touching the stream.
    pub fn buffered_frame(&mut self) -> Result<Option<Bytes>> {
        decode_frame(&mut self.pending, self.config.max_payload_size)
    }

    /// Perform exactly one read from the stream into the buffer and return
    /// how many bytes it added. Callers that bound their own waiting use this
    /// after a readiness check instead of [`read_frame`](Self::read_frame).
    pub fn read_available(&mut self) -> Result<usize> {
        self.fill()
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn fill(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let read = loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        };

        if read == 0 {
            if !self.pending.is_empty() {
                trace!(buffered = self.pending.len(), "stream closed mid-frame");
            }
            return Err(FrameError::ConnectionClosed);
        }
        self.pending.extend_from_slice(&chunk[..read]);
        Ok(read)
    }
}

impl FrameReader<IpcStream> {
    /// Wrap an `IpcStream`, applying the configured read timeout to the socket.
    pub fn with_config_ipc(inner: IpcStream, config: FrameConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
