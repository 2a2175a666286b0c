use std::time::{Duration, Instant};

use bytes::Bytes;
use nodemgr_envelope::{Reply, Request};
use tracing::{debug, warn};

use crate::channel::Channel;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::service::{Capability, Service};

/// Where a client's channel stands in the request/reply cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Ready for the next request.
    Idle,
    /// A request is on the wire and its reply has not been taken yet.
    AwaitingReply,
    /// A request never resolved (timeout or transport failure). The service
    /// may still answer it, so the channel must be replaced before reuse.
    Poisoned,
}

/// A synchronous client bound to one service over one channel.
pub struct Client<C> {
    channel: C,
    service: Service,
    config: ClientConfig,
    state: CallState,
}

impl<C: Channel> Client<C> {
    /// Create a client with default configuration.
    pub fn new(channel: C, service: Service) -> Self {
        Self::with_config(channel, service, ClientConfig::default())
    }

    /// Create a client with explicit configuration.
    pub fn with_config(channel: C, service: Service, config: ClientConfig) -> Self {
        Self {
            channel,
            service,
            config,
            state: CallState::Idle,
        }
    }

    /// Perform one bounded request/reply round trip.
    ///
    /// Serializes `request`, sends it, waits at most the configured timeout
    /// for a reply and decodes it. Never retries. After a timeout or
    /// transport failure the client is [`CallState::Poisoned`] and every
    /// further call fails with [`ClientError::ChannelPoisoned`] until
    /// [`reset_channel`](Self::reset_channel) is called.
    pub fn call(&mut self, request: &Request) -> Result<Reply> {
        if self.state == CallState::Poisoned {
            return Err(ClientError::ChannelPoisoned);
        }

        let payload = request.to_wire()?;
        let started = Instant::now();

        self.state = CallState::AwaitingReply;
        let raw = match self.exchange(&payload) {
            Ok(raw) => {
                self.state = CallState::Idle;
                raw
            }
            Err(err) => {
                if err.poisons_channel() {
                    self.state = CallState::Poisoned;
                    warn!(
                        service = %self.service,
                        command = request.command(),
                        action = %request.action(),
                        error = %err,
                        "request did not resolve; channel needs reconnecting"
                    );
                } else {
                    self.state = CallState::Idle;
                }
                return Err(err);
            }
        };

        let decoded = self.config.reply_policy.decode(&raw);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match &decoded {
            Ok(reply) => debug!(
                service = %self.service,
                command = request.command(),
                action = %request.action(),
                code = reply.code,
                dirty = reply.dirty,
                elapsed_ms,
                "request completed"
            ),
            Err(err) => debug!(
                service = %self.service,
                command = request.command(),
                action = %request.action(),
                error = %err,
                elapsed_ms,
                "request failed"
            ),
        }

        decoded.map_err(Into::into)
    }

    /// Send, then spend at most one timeout on both the wait for the reply
    /// and its reassembly.
    fn exchange(&mut self, payload: &[u8]) -> Result<Bytes> {
        let timeout = self.config.timeout;
        self.channel.send(payload)?;
        let deadline = Instant::now() + timeout;

        if !self.channel.await_readable(timeout)? {
            return Err(ClientError::Timeout(timeout));
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        self.channel
            .receive(remaining)?
            .ok_or(ClientError::Timeout(timeout))
    }

    /// Fail with `UnsupportedOperation` unless this client's service
    /// answers to `capability`.
    pub fn require(&self, capability: Capability, operation: &'static str) -> Result<()> {
        if self.service.supports(capability) {
            Ok(())
        } else {
            Err(ClientError::UnsupportedOperation {
                service: self.service,
                operation,
            })
        }
    }
}

impl<C> Client<C> {
    /// The service this client talks to.
    pub fn service(&self) -> Service {
        self.service
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Round-trip bound.
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Current call state.
    pub fn state(&self) -> CallState {
        self.state
    }

    /// Whether the channel must be replaced before the next call.
    pub fn is_poisoned(&self) -> bool {
        self.state == CallState::Poisoned
    }

    /// Borrow the channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Install a freshly connected channel and return the old one.
    pub fn reset_channel(&mut self, channel: C) -> C {
        self.state = CallState::Idle;
        std::mem::replace(&mut self.channel, channel)
    }

    /// Consume the client and return its channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

impl<C> std::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("service", &self.service)
            .field("timeout", &self.config.timeout)
            .field("state", &self.state)
            .finish()
    }
}
