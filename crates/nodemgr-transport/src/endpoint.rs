use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::TransportError;

const TCP_SCHEME: &str = "tcp://";
const IPC_SCHEME: &str = "ipc://";
const UNIX_SCHEME: &str = "unix://";

/// Address of a management endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// TCP `host:port` authority.
    Tcp(String),
    /// Unix domain socket path.
    Unix(PathBuf),
}

impl Endpoint {
    /// Build a TCP endpoint from a host and port.
    pub fn tcp(host: &str, port: u16) -> Self {
        if host.contains(':') && !host.starts_with('[') {
            Self::Tcp(format!("[{host}]:{port}"))
        } else {
            Self::Tcp(format!("{host}:{port}"))
        }
    }

    /// Build a Unix domain socket endpoint.
    pub fn unix(path: impl AsRef<Path>) -> Self {
        Self::Unix(path.as_ref().to_path_buf())
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match self {
            Self::Tcp(_) => "tcp",
            Self::Unix(_) => "unix-domain-socket",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(authority) => write!(f, "{TCP_SCHEME}{authority}"),
            Self::Unix(path) => write!(f, "{IPC_SCHEME}{}", path.display()),
        }
    }
}

impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.is_empty() {
            return Err(invalid(input, "endpoint must not be empty"));
        }

        if let Some(authority) = input.strip_prefix(TCP_SCHEME) {
            return parse_authority(input, authority);
        }

        let path = input
            .strip_prefix(IPC_SCHEME)
            .or_else(|| input.strip_prefix(UNIX_SCHEME))
            .unwrap_or(input);

        if path.is_empty() {
            return Err(invalid(input, "socket path must not be empty"));
        }
        if path.contains("://") {
            return Err(invalid(input, "unsupported endpoint scheme"));
        }

        Ok(Self::Unix(PathBuf::from(path)))
    }
}

fn parse_authority(input: &str, authority: &str) -> Result<Endpoint, TransportError> {
    let (host, port) = authority
        .rsplit_once(':')
        .ok_or_else(|| invalid(input, "expected host:port"))?;

    if host.is_empty() || host == "[]" {
        return Err(invalid(input, "host must not be empty"));
    }

    let port: u16 = port
        .parse()
        .map_err(|_| invalid(input, &format!("invalid port '{port}'")))?;

    Ok(Endpoint::Tcp(format!("{host}:{port}")))
}

fn invalid(endpoint: &str, reason: &str) -> TransportError {
    TransportError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    }
}
