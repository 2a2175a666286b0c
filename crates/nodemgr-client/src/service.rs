use std::fmt;
use std::str::FromStr;

use nodemgr_transport::Endpoint;

/// A command family a service answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Config,
    Version,
    Monitor,
    Subscribers,
}

/// A service exposing a management endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// The base station itself.
    OpenBts,
    /// SIP authorization server holding the subscriber registry.
    SipAuthServe,
    /// Store-and-forward SMS queue.
    SmQueue,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::OpenBts, Service::SipAuthServe, Service::SmQueue];

    /// Lowercase identifier used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenBts => "openbts",
            Self::SipAuthServe => "sipauthserve",
            Self::SmQueue => "smqueue",
        }
    }

    /// Default management port on the local host.
    pub fn default_port(self) -> u16 {
        match self {
            Self::OpenBts => 45060,
            Self::SmQueue => 45063,
            Self::SipAuthServe => 45064,
        }
    }

    /// Default management endpoint, e.g. `tcp://127.0.0.1:45060`.
    pub fn default_endpoint(self) -> Endpoint {
        Endpoint::tcp("127.0.0.1", self.default_port())
    }

    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::OpenBts => &[Capability::Config, Capability::Version, Capability::Monitor],
            Self::SipAuthServe => &[
                Capability::Config,
                Capability::Version,
                Capability::Subscribers,
            ],
            Self::SmQueue => &[Capability::Config, Capability::Version],
        }
    }

    pub fn supports(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenBts => "OpenBTS",
            Self::SipAuthServe => "SIPAuthServe",
            Self::SmQueue => "SMQueue",
        })
    }
}

/// The string does not name a known service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service '{0}' (expected openbts, sipauthserve or smqueue)")]
pub struct ParseServiceError(String);

impl FromStr for Service {
    type Err = ParseServiceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let wanted = input.trim();
        Self::ALL
            .into_iter()
            .find(|service| service.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseServiceError(input.to_string()))
    }
}
