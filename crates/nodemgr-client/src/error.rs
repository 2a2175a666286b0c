use std::time::Duration;

use nodemgr_envelope::{EncodeError, ReplyError, RequestError};

use crate::service::Service;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] nodemgr_transport::TransportError),

    /// ZeroMQ socket error.
    #[error("zmq error: {0}")]
    Zmq(#[from] zmq::Error),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] nodemgr_frame::FrameError),

    /// The reply was malformed, rejected, or carried an unknown code.
    #[error(transparent)]
    Reply(#[from] ReplyError),

    /// The request could not be serialized.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// No reply arrived within the configured bound.
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// A previous request never resolved; the channel must be replaced.
    #[error("channel has an unresolved request and must be reconnected")]
    ChannelPoisoned,

    /// The service closed the connection or cannot be reached again.
    #[error("service disconnected: {0}")]
    Disconnected(String),

    /// The operation is not exposed by this service; nothing was sent.
    #[error("{operation} is not supported by {service}")]
    UnsupportedOperation {
        service: Service,
        operation: &'static str,
    },
}

/// Flat classification of [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedReply,
    UnknownKey,
    InvalidValue,
    ConflictingValue,
    StorageFailure,
    ProtocolMismatch,
    UnknownReplyCode,
    Timeout,
    UnsupportedOperation,
    ChannelPoisoned,
    Encode,
    Transport,
}

impl ClientError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Reply(ReplyError::Malformed { .. }) => ErrorKind::MalformedReply,
            Self::Reply(ReplyError::UnknownCode(_)) => ErrorKind::UnknownReplyCode,
            Self::Reply(ReplyError::Request(err)) => match err {
                RequestError::UnknownKey => ErrorKind::UnknownKey,
                RequestError::InvalidValue => ErrorKind::InvalidValue,
                RequestError::ConflictingValue => ErrorKind::ConflictingValue,
                RequestError::StorageFailure => ErrorKind::StorageFailure,
                RequestError::ProtocolMismatch => ErrorKind::ProtocolMismatch,
            },
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::ChannelPoisoned => ErrorKind::ChannelPoisoned,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Transport(_) | Self::Zmq(_) | Self::Frame(_) | Self::Disconnected(_) => {
                ErrorKind::Transport
            }
        }
    }

    /// The service-side rejection, if this error is one.
    pub fn request_error(&self) -> Option<RequestError> {
        match self {
            Self::Reply(ReplyError::Request(err)) => Some(*err),
            _ => None,
        }
    }

    /// Whether the channel is left with an unresolved request.
    pub(crate) fn poisons_channel(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_)
                | Self::Transport(_)
                | Self::Zmq(_)
                | Self::Frame(_)
                | Self::Disconnected(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
