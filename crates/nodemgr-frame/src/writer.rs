use std::io::{self, Write};

use nodemgr_transport::IpcStream;

use crate::codec::{FrameConfig, FrameHeader};
use crate::error::{FrameError, Result};

/// Writes one framed message per [`send`](Self::send).
pub struct FrameWriter<T> {
    inner: T,
    max_payload_size: usize,
    scratch: Vec<u8>,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            max_payload_size: config.max_payload_size,
            scratch: Vec::new(),
        }
    }

    /// Frame `payload` and write it out in full, then flush.
    ///
    /// Nothing is written when the payload exceeds the configured limit.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        let header = FrameHeader::for_payload(payload, self.max_payload_size)?;

        // Header and body in a single write.
        self.scratch.clear();
        self.scratch.reserve(header.frame_len());
        self.scratch.extend_from_slice(&header.to_bytes());
        self.scratch.extend_from_slice(payload);

        self.inner.write_all(&self.scratch).map_err(write_error)?;
        self.inner.flush().map_err(write_error)
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameWriter<IpcStream> {
    /// Wrap an `IpcStream`, applying the configured write timeout to the socket.
    pub fn with_config_ipc(inner: IpcStream, config: FrameConfig) -> Result<Self> {
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}

fn write_error(err: io::Error) -> FrameError {
    match err.kind() {
        io::ErrorKind::WriteZero => FrameError::ConnectionClosed,
        _ => FrameError::Io(err),
    }
}
