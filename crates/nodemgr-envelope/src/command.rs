//! Well-known command names and the closed set of actions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Read or update service configuration parameters.
pub const CONFIG: &str = "config";

/// Subscriber registry management (SIPAuthServe).
pub const SUBSCRIBERS: &str = "subscribers";

/// Query the service version.
pub const VERSION: &str = "version";

/// Channel loads, queue sizes and noise levels (OpenBTS).
pub const MONITOR: &str = "monitor";

/// Sub-operation of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Update,
    Create,
    Delete,
    /// The command has no sub-action; serialized as `""`.
    #[serde(rename = "")]
    Empty,
}

impl Action {
    /// Wire spelling of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Update => "update",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Empty => "",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
