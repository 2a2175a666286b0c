use std::io::ErrorKind as IoErrorKind;
use std::time::{Duration, Instant};

use bytes::Bytes;
use nodemgr_frame::{FrameConfig, FrameError, FrameReader, FrameWriter};
use nodemgr_transport::{connect_timeout, Endpoint, IpcStream};

use super::{Channel, Reopen};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// A [`Channel`] over a connected stream using length-prefixed frames.
pub struct FramedChannel {
    reader: FrameReader<IpcStream>,
    writer: FrameWriter<IpcStream>,
    endpoint: Option<Endpoint>,
}

impl FramedChannel {
    /// Connect to `endpoint` and wrap the stream.
    pub fn open(endpoint: &Endpoint, config: &ClientConfig) -> Result<Self> {
        let stream = connect_timeout(endpoint, config.timeout)?;
        let mut channel = Self::from_stream(stream, config.frame_config())?;
        channel.endpoint = Some(endpoint.clone());
        Ok(channel)
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: IpcStream, config: FrameConfig) -> Result<Self> {
        let reader_stream = stream.try_clone()?;
        Ok(Self {
            reader: FrameReader::with_config_ipc(reader_stream, config.clone())?,
            writer: FrameWriter::with_config_ipc(stream, config)?,
            endpoint: None,
        })
    }

    /// Endpoint this channel was opened against, if any.
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Shut the connection down in both directions. Anything the service
    /// still sends is discarded.
    pub fn close(self) {
        if let Err(err) = self.reader.get_ref().shutdown() {
            tracing::debug!(error = %err, "shutdown of abandoned channel failed");
        }
    }
}

impl Channel for FramedChannel {
    fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.writer.send(payload).map_err(|err| self.stream_error(err))
    }

    fn await_readable(&mut self, timeout: Duration) -> Result<bool> {
        if self.reader.has_buffered_frame()? {
            return Ok(true);
        }
        Ok(self.reader.get_ref().wait_readable(timeout)?)
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<Bytes>> {
        let deadline = Instant::now() + timeout;
        loop {
            let buffered = self.reader.buffered_frame();
            if let Some(payload) = buffered.map_err(|err| self.stream_error(err))? {
                return Ok(Some(payload));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.reader.get_ref().wait_readable(remaining)? {
                return Ok(None);
            }
            let read = self.reader.read_available();
            read.map_err(|err| self.stream_error(err))?;
        }
    }
}

impl Reopen for FramedChannel {
    fn open(endpoint: &Endpoint, config: &ClientConfig) -> Result<Self> {
        FramedChannel::open(endpoint, config)
    }

    fn endpoint(&self) -> Option<&Endpoint> {
        FramedChannel::endpoint(self)
    }

    fn close(self) {
        FramedChannel::close(self)
    }
}

impl FramedChannel {
    fn stream_error(&self, err: FrameError) -> ClientError {
        match err {
            FrameError::ConnectionClosed => {
                ClientError::Disconnected("connection closed by service".to_string())
            }
            // A reply that started arriving and then stalled past the bound.
            FrameError::Io(io)
                if matches!(io.kind(), IoErrorKind::WouldBlock | IoErrorKind::TimedOut) =>
            {
                ClientError::Timeout(self.reader.config().read_timeout.unwrap_or_default())
            }
            other => ClientError::Frame(other),
        }
    }
}

impl std::fmt::Debug for FramedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedChannel")
            .field("stream", self.reader.get_ref())
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
