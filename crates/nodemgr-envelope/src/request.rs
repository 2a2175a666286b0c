use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::command::Action;
use crate::error::EncodeError;

/// Field names whose values are credential material.
///
/// `ki` is a subscriber's authentication key; it is sent on the wire but
/// never shown in debug output.
const SECRET_FIELDS: &[&str] = &["ki"];

/// An immutable request envelope.
///
/// Built with [`encode`], [`encode_fields`] or [`encode_match`]; one fresh
/// envelope per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    command: String,
    action: Action,
    #[serde(flatten)]
    body: Body,
}

/// The call-shape specific part of a request. Exactly one shape per request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Body {
    /// Simple key/value operations (config read/update, version, monitor).
    KeyValue { key: String, value: String },
    /// Structured create operations.
    Fields { fields: BTreeMap<String, String> },
    /// Structured delete/lookup operations.
    Match {
        #[serde(rename = "match")]
        selector: Selector,
    },
}

/// Identifies a target record by exactly one discriminating attribute.
///
/// Serialized as a single-entry object, e.g. `{"imsi": "310150123456789"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    attribute: String,
    value: String,
}

impl Selector {
    /// Create a selector, stringifying `value`.
    pub fn new(attribute: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.to_string(),
        }
    }

    /// The discriminating attribute name.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The attribute value to match.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.attribute, &self.value)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, String>::deserialize(deserializer)?;
        if entries.len() != 1 {
            return Err(D::Error::invalid_length(
                entries.len(),
                &"exactly one match attribute",
            ));
        }
        let (attribute, value) = entries
            .into_iter()
            .next()
            .ok_or_else(|| D::Error::custom("empty match"))?;
        Ok(Self { attribute, value })
    }
}

/// Build a key/value request. `value` is stringified.
pub fn encode(
    command: impl Into<String>,
    action: Action,
    key: impl Into<String>,
    value: impl fmt::Display,
) -> Request {
    Request {
        command: command.into(),
        action,
        body: Body::KeyValue {
            key: key.into(),
            value: value.to_string(),
        },
    }
}

/// Build a structured-fields request. Every value is stringified.
pub fn encode_fields<I, K, V>(command: impl Into<String>, action: Action, fields: I) -> Request
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: fmt::Display,
{
    Request {
        command: command.into(),
        action,
        body: Body::Fields {
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.to_string()))
                .collect(),
        },
    }
}

/// Build a match request targeting one record by a single attribute.
pub fn encode_match(
    command: impl Into<String>,
    action: Action,
    attribute: impl Into<String>,
    value: impl fmt::Display,
) -> Request {
    Request {
        command: command.into(),
        action,
        body: Body::Match {
            selector: Selector::new(attribute, value),
        },
    }
}

impl Request {
    /// Target operation family.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Sub-operation.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Call-shape specific payload.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Serialize to the textual wire format.
    pub fn to_wire(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a request from the wire format (service-side and test use).
    pub fn from_wire(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyValue { key, value } => f
                .debug_struct("KeyValue")
                .field("key", key)
                .field("value", value)
                .finish(),
            Self::Fields { fields } => {
                let mut map = f.debug_map();
                for (name, value) in fields {
                    if SECRET_FIELDS.contains(&name.as_str()) && !value.is_empty() {
                        map.entry(name, &format_args!("<redacted:{} bytes>", value.len()));
                    } else {
                        map.entry(name, value);
                    }
                }
                map.finish()
            }
            Self::Match { selector } => f.debug_tuple("Match").field(selector).finish(),
        }
    }
}
