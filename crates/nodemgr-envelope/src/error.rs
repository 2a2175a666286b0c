/// A request the service understood but rejected.
///
/// Each variant corresponds to one reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RequestError {
    /// 404: the key (or record) does not exist.
    #[error("unknown key")]
    UnknownKey,

    /// 406: the value failed validation.
    #[error("invalid value")]
    InvalidValue,

    /// 409: the value conflicts with existing state.
    #[error("conflicting value")]
    ConflictingValue,

    /// 500: the service could not persist the change.
    #[error("storing new value failed")]
    StorageFailure,

    /// 501: the service does not know the action we sent.
    #[error("unknown action (client/service protocol mismatch)")]
    ProtocolMismatch,
}

impl RequestError {
    /// Classify a reply code, if it is one of the known rejection codes.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            404 => Some(Self::UnknownKey),
            406 => Some(Self::InvalidValue),
            409 => Some(Self::ConflictingValue),
            500 => Some(Self::StorageFailure),
            501 => Some(Self::ProtocolMismatch),
            _ => None,
        }
    }

    /// The reply code this rejection is signalled with.
    pub fn code(self) -> u16 {
        match self {
            Self::UnknownKey => 404,
            Self::InvalidValue => 406,
            Self::ConflictingValue => 409,
            Self::StorageFailure => 500,
            Self::ProtocolMismatch => 501,
        }
    }
}

/// Errors produced while decoding a reply envelope.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplyError {
    /// The reply is not a JSON object, lacks an integer `code`, or carries
    /// a `dirty` flag that cannot be read as a boolean.
    #[error("malformed reply: {reason}")]
    Malformed { reason: String },

    /// The service rejected the request.
    #[error("request rejected with code {code}: {0}", code = .0.code())]
    Request(#[from] RequestError),

    /// The reply code is neither a success nor a known rejection. Any JSON
    /// integer fits, including codes beyond the `i64` range.
    #[error("unknown reply code {0}")]
    UnknownCode(i128),
}

impl ReplyError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// A request could not be serialized to the wire format.
#[derive(Debug, thiserror::Error)]
#[error("failed to serialize request: {0}")]
pub struct EncodeError(#[from] serde_json::Error);
