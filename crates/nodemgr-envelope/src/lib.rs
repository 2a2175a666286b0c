//! Request/reply envelope codec for the NodeManager management protocol.
//!
//! Pure data transformation, no I/O:
//! - [`encode`], [`encode_fields`] and [`encode_match`] build an immutable
//!   [`Request`] in one of the three wire shapes (key/value, fields, match).
//! - [`decode`] turns raw reply bytes into a [`Reply`] or a classified
//!   [`ReplyError`].
//!
//! Which reply codes count as success is governed by [`ReplyPolicy`].

pub mod command;
pub mod error;
pub mod reply;
pub mod request;

pub use command::{Action, CONFIG, MONITOR, SUBSCRIBERS, VERSION};
pub use error::{EncodeError, ReplyError, RequestError};
pub use reply::{decode, Reply, ReplyPolicy, NOT_MODIFIED};
pub use request::{encode, encode_fields, encode_match, Body, Request, Selector};
