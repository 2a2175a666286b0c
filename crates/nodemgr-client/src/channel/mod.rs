//! Channels a [`Client`](crate::Client) drives.
//!
//! [`ZmqChannel`] speaks ZeroMQ REQ/REP, which is what NodeManager services
//! listen on. [`FramedChannel`] carries the same envelopes over a plain
//! stream with length-prefixed frames, for local services and fakes.

use std::time::Duration;

use bytes::Bytes;
use nodemgr_transport::Endpoint;

use crate::config::ClientConfig;
use crate::error::Result;

mod framed;
mod zeromq;

pub use framed::FramedChannel;
pub use zeromq::ZmqChannel;

/// A connected duplex request/reply channel.
///
/// The client drives it strictly as `send`, `await_readable`, `receive`; it
/// never sends twice without a reply in between. Both waits are bounded by
/// whatever is left of the client's round-trip budget.
pub trait Channel {
    /// Transmit one complete request payload.
    fn send(&mut self, payload: &[u8]) -> Result<()>;

    /// Wait up to `timeout` for a reply to start arriving. `Ok(false)` means
    /// none did.
    fn await_readable(&mut self, timeout: Duration) -> Result<bool>;

    /// Take the next complete reply payload, waiting at most `timeout` for
    /// the rest of it. `Ok(None)` means the reply did not complete in time.
    fn receive(&mut self, timeout: Duration) -> Result<Option<Bytes>>;
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn send(&mut self, payload: &[u8]) -> Result<()> {
        (**self).send(payload)
    }

    fn await_readable(&mut self, timeout: Duration) -> Result<bool> {
        (**self).await_readable(timeout)
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<Bytes>> {
        (**self).receive(timeout)
    }
}

/// A channel that can be opened from an [`Endpoint`] and opened again after
/// a request leaves it poisoned.
pub trait Reopen: Channel + Sized {
    /// Connect a fresh channel.
    fn open(endpoint: &Endpoint, config: &ClientConfig) -> Result<Self>;

    /// Endpoint the channel was opened against, if any.
    fn endpoint(&self) -> Option<&Endpoint>;

    /// Tear the channel down. A reply still in flight is discarded.
    fn close(self);
}
