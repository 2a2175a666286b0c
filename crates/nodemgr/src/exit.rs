use std::fmt;
use std::io;

use nodemgr_client::{ClientError, ErrorKind};
use nodemgr_frame::FrameError;
use nodemgr_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const PROTOCOL: i32 = 76;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
        TransportError::InvalidEndpoint { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(PROTOCOL, format!("{context}: {other}")),
    }
}

/// Map a client error to an exit code, keeping its message.
pub fn client_error(context: &str, err: ClientError) -> CliError {
    let code = match err.kind() {
        ErrorKind::UnknownKey | ErrorKind::InvalidValue | ErrorKind::ConflictingValue => {
            DATA_INVALID
        }
        ErrorKind::StorageFailure => FAILURE,
        ErrorKind::MalformedReply | ErrorKind::UnknownReplyCode | ErrorKind::ProtocolMismatch => {
            PROTOCOL
        }
        ErrorKind::Timeout => TIMEOUT,
        ErrorKind::UnsupportedOperation => USAGE,
        ErrorKind::ChannelPoisoned => FAILURE,
        ErrorKind::Encode => INTERNAL,
        ErrorKind::Transport => match err {
            ClientError::Transport(err) => return transport_error(context, err),
            ClientError::Frame(err) => return frame_error(context, err),
            _ => TRANSPORT_ERROR,
        },
    };
    CliError::new(code, format!("{context}: {err}"))
}
