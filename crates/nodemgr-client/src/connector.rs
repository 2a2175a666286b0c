use nodemgr_transport::Endpoint;
use tracing::{debug, info};

use crate::channel::{FramedChannel, Reopen, ZmqChannel};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::service::Service;

/// Connect to a service at its default local endpoint over ZeroMQ.
pub fn connect(service: Service) -> Result<Client<ZmqChannel>> {
    connect_with_config(&service.default_endpoint(), service, ClientConfig::default())
}

/// Connect over ZeroMQ with an explicit endpoint and configuration.
pub fn connect_with_config(
    endpoint: &Endpoint,
    service: Service,
    config: ClientConfig,
) -> Result<Client<ZmqChannel>> {
    connect_channel(endpoint, service, config)
}

/// Connect over a plain stream carrying length-prefixed frames.
pub fn connect_framed(
    endpoint: &Endpoint,
    service: Service,
    config: ClientConfig,
) -> Result<Client<FramedChannel>> {
    connect_channel(endpoint, service, config)
}

/// Open a channel of type `C` and bind a client to it.
pub fn connect_channel<C: Reopen>(
    endpoint: &Endpoint,
    service: Service,
    config: ClientConfig,
) -> Result<Client<C>> {
    let channel = C::open(endpoint, &config)?;
    debug!(
        %service,
        %endpoint,
        transport = endpoint.transport_name(),
        timeout_ms = config.timeout.as_millis() as u64,
        "client ready"
    );
    Ok(Client::with_config(channel, service, config))
}

impl<C: Reopen> Client<C> {
    /// Replace the channel with a fresh connection to the same endpoint.
    ///
    /// This is how a poisoned client recovers. A late reply to the abandoned
    /// request is dropped together with the old connection.
    pub fn reconnect(&mut self) -> Result<()> {
        let endpoint = self.channel().endpoint().cloned().ok_or_else(|| {
            ClientError::Disconnected("channel was not opened from an endpoint".to_string())
        })?;
        let fresh = C::open(&endpoint, self.config())?;
        info!(service = %self.service(), %endpoint, "reconnected");
        self.reset_channel(fresh).close();
        Ok(())
    }
}
