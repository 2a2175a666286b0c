use std::fmt::Display;

use nodemgr_envelope::{encode, Action, Reply, CONFIG};
use tracing::debug;

use crate::channel::Channel;
use crate::client::Client;
use crate::error::{ClientError, Result};
use crate::service::{Capability, Service};

/// Read a configuration parameter. Replies with `{"value": ...}`.
pub fn read_config<C: Channel>(client: &mut Client<C>, key: &str) -> Result<Reply> {
    client.require(Capability::Config, "config read")?;
    client.call(&encode(CONFIG, Action::Read, key, ""))
}

/// Set a configuration parameter. `value` is sent in its string form.
///
/// Check [`Reply::dirty`] to learn whether the service must be restarted
/// for the change to take effect.
pub fn update_config<C: Channel>(
    client: &mut Client<C>,
    key: &str,
    value: impl Display,
) -> Result<Reply> {
    client.require(Capability::Config, "config update")?;
    client.call(&encode(CONFIG, Action::Update, key, value))
}

/// Create a configuration parameter.
///
/// Services do not expose this yet; always fails without a round trip.
pub fn create_config<C: Channel>(
    client: &mut Client<C>,
    key: &str,
    _value: impl Display,
) -> Result<Reply> {
    debug!(key, "config create requested");
    Err(unsupported(client.service(), "config create"))
}

/// Delete a configuration parameter.
///
/// Services do not expose this yet; always fails without a round trip.
pub fn delete_config<C: Channel>(client: &mut Client<C>, key: &str) -> Result<Reply> {
    debug!(key, "config delete requested");
    Err(unsupported(client.service(), "config delete"))
}

/// Check whether `service` accepts the config `action` at all.
///
/// Needs no client, so callers can reject create and delete before opening
/// a connection. Fails with the same error [`create_config`] and
/// [`delete_config`] return.
pub fn check_config_action(service: Service, action: Action) -> Result<()> {
    match action {
        Action::Create => Err(unsupported(service, "config create")),
        Action::Delete => Err(unsupported(service, "config delete")),
        Action::Read | Action::Update | Action::Empty => Ok(()),
    }
}

fn unsupported(service: Service, operation: &'static str) -> ClientError {
    debug!(%service, operation, "not exposed by services");
    ClientError::UnsupportedOperation { service, operation }
}
