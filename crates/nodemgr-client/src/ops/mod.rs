//! Per-service convenience operations.
//!
//! Each function checks the client's service for the needed capability,
//! builds one envelope and delegates to [`Client::call`](crate::Client::call).
//! Operations the services do not expose fail with
//! [`ClientError::UnsupportedOperation`](crate::ClientError::UnsupportedOperation)
//! before anything is sent.

mod config;
mod status;
mod subscribers;

pub use config::{check_config_action, create_config, delete_config, read_config, update_config};
pub use status::{get_version, monitor};
pub use subscribers::{
    create_subscriber, delete_subscriber, get_subscribers, NewSubscriber, SubscriberMatch,
};
