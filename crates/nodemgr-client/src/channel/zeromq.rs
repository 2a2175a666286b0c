use std::time::Duration;

use bytes::Bytes;
use nodemgr_transport::Endpoint;

use super::{Channel, Reopen};
use crate::config::ClientConfig;
use crate::error::Result;

/// A [`Channel`] over a ZeroMQ REQ socket.
///
/// This is the socket NodeManager services answer on. Each request is one
/// ZeroMQ message and each reply is one message back; the REQ state machine
/// refuses a second send until the reply has been received, which matches
/// the client's own one-call-at-a-time rule.
pub struct ZmqChannel {
    socket: zmq::Socket,
    endpoint: Endpoint,
    _context: zmq::Context,
}

impl ZmqChannel {
    /// Create a REQ socket and connect it to `endpoint`.
    ///
    /// ZeroMQ connects lazily, so an absent service is not an error here; it
    /// shows up as a timeout on the first call.
    pub fn open(endpoint: &Endpoint, config: &ClientConfig) -> Result<Self> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::REQ)?;
        socket.set_linger(0)?;
        socket.set_maxmsgsize(i64::try_from(config.max_payload_size).unwrap_or(i64::MAX))?;
        socket.set_sndtimeo(timeout_ms(config.timeout))?;
        socket.connect(&endpoint.to_string())?;
        Ok(Self {
            socket,
            endpoint: endpoint.clone(),
            _context: context,
        })
    }

    /// Endpoint this channel was opened against.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Close the socket, dropping any unsent request and any late reply.
    pub fn close(self) {
        tracing::trace!(endpoint = %self.endpoint, "closing zmq channel");
    }

    fn wait(&self, timeout: Duration) -> Result<bool> {
        Ok(self.socket.poll(zmq::POLLIN, i64::from(timeout_ms(timeout)))? > 0)
    }
}

impl Channel for ZmqChannel {
    fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.socket.send(payload, 0)?;
        Ok(())
    }

    fn await_readable(&mut self, timeout: Duration) -> Result<bool> {
        self.wait(timeout)
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<Bytes>> {
        if !self.wait(timeout)? {
            return Ok(None);
        }
        // A readable REQ socket holds a whole message.
        match self.socket.recv_bytes(zmq::DONTWAIT) {
            Ok(raw) => Ok(Some(Bytes::from(raw))),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl Reopen for ZmqChannel {
    fn open(endpoint: &Endpoint, config: &ClientConfig) -> Result<Self> {
        ZmqChannel::open(endpoint, config)
    }

    fn endpoint(&self) -> Option<&Endpoint> {
        Some(ZmqChannel::endpoint(self))
    }

    fn close(self) {
        ZmqChannel::close(self)
    }
}

impl std::fmt::Debug for ZmqChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZmqChannel")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Milliseconds for a ZeroMQ timeout, rounded up so a sub-millisecond
/// remainder still waits.
fn timeout_ms(timeout: Duration) -> i32 {
    let ms = timeout.as_nanos().div_ceil(1_000_000);
    i32::try_from(ms).unwrap_or(i32::MAX)
}
