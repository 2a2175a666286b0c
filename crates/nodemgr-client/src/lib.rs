//! Synchronous request/reply client for NodeManager service endpoints.
//!
//! One [`Client`] owns one connected [`Channel`] and performs exactly one
//! bounded round trip per [`Client::call`]. There is no retry and no
//! multiplexing: a call occupies the channel until it resolves or times out,
//! and a timed-out client must be given a fresh channel before reuse.
//!
//! [`connect`] reaches a live service over ZeroMQ ([`ZmqChannel`]);
//! [`connect_framed`] uses length-prefixed frames over a plain stream.
//!
//! Service-specific operations (config, version, monitor, subscribers) are
//! free functions in [`ops`] that build an envelope and delegate to `call`.

pub mod channel;
pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod ops;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::{Channel, FramedChannel, Reopen, ZmqChannel};
pub use client::{CallState, Client};
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use connector::{connect, connect_channel, connect_framed, connect_with_config};
pub use error::{ClientError, ErrorKind, Result};
pub use service::{Capability, ParseServiceError, Service};

pub use nodemgr_envelope::{Action, Reply, ReplyError, ReplyPolicy, Request, RequestError};
pub use nodemgr_transport::Endpoint;
