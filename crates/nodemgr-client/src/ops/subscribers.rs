use std::fmt;

use nodemgr_envelope::{encode, encode_fields, encode_match, Action, Reply, SUBSCRIBERS};

use crate::channel::Channel;
use crate::client::Client;
use crate::error::Result;
use crate::service::Capability;

/// A subscriber to register with the subscriber registry.
///
/// IMSI and MSISDN are kept in string form; leading zeros are significant.
/// Without a `ki` the service falls back to cache authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct NewSubscriber {
    pub name: String,
    pub imsi: String,
    pub msisdn: String,
    pub ki: Option<String>,
}

impl NewSubscriber {
    pub fn new(name: impl Into<String>, imsi: impl fmt::Display, msisdn: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            imsi: imsi.to_string(),
            msisdn: msisdn.to_string(),
            ki: None,
        }
    }

    /// Set the authentication key, enabling full authentication.
    pub fn with_ki(mut self, ki: impl fmt::Display) -> Self {
        self.ki = Some(ki.to_string());
        self
    }

    fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("name", self.name.as_str()),
            ("imsi", self.imsi.as_str()),
            ("msisdn", self.msisdn.as_str()),
            ("ki", self.ki.as_deref().unwrap_or("")),
        ]
    }
}

impl fmt::Debug for NewSubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ki = self
            .ki
            .as_ref()
            .map(|ki| format!("<redacted:{} bytes>", ki.len()));
        f.debug_struct("NewSubscriber")
            .field("name", &self.name)
            .field("imsi", &self.imsi)
            .field("msisdn", &self.msisdn)
            .field("ki", &ki)
            .finish()
    }
}

/// Selects exactly one subscriber record for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriberMatch {
    Imsi(String),
    Msisdn(String),
}

impl SubscriberMatch {
    pub fn imsi(imsi: impl fmt::Display) -> Self {
        Self::Imsi(imsi.to_string())
    }

    pub fn msisdn(msisdn: impl fmt::Display) -> Self {
        Self::Msisdn(msisdn.to_string())
    }

    /// Wire attribute name.
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::Imsi(_) => "imsi",
            Self::Msisdn(_) => "msisdn",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Imsi(value) | Self::Msisdn(value) => value,
        }
    }
}

impl fmt::Display for SubscriberMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute(), self.value())
    }
}

/// List all registered subscribers.
pub fn get_subscribers<C: Channel>(client: &mut Client<C>) -> Result<Reply> {
    client.require(Capability::Subscribers, "subscribers read")?;
    client.call(&encode(SUBSCRIBERS, Action::Read, "", ""))
}

/// Register a subscriber. A successful reply may be a bare 204.
pub fn create_subscriber<C: Channel>(
    client: &mut Client<C>,
    subscriber: &NewSubscriber,
) -> Result<Reply> {
    client.require(Capability::Subscribers, "subscribers create")?;
    client.call(&encode_fields(
        SUBSCRIBERS,
        Action::Create,
        subscriber.fields(),
    ))
}

/// Remove the subscriber selected by `selector`.
pub fn delete_subscriber<C: Channel>(
    client: &mut Client<C>,
    selector: &SubscriberMatch,
) -> Result<Reply> {
    client.require(Capability::Subscribers, "subscribers delete")?;
    client.call(&encode_match(
        SUBSCRIBERS,
        Action::Delete,
        selector.attribute(),
        selector.value(),
    ))
}
