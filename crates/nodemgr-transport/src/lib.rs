//! Endpoint addressing and blocking stream transport.
//!
//! Service endpoints are written the way operators already know them:
//! - `tcp://127.0.0.1:45060` for a TCP management port
//! - `ipc:///run/openbts/nm.sock` (or a bare path) for a Unix domain socket
//!
//! This is the lowest layer of nodemgr. Everything else builds on top of
//! the [`IpcStream`] type provided here.

pub mod endpoint;
pub mod error;
pub mod listener;
pub mod stream;

pub use endpoint::Endpoint;
pub use error::{Result, TransportError};
pub use listener::Listener;
pub use stream::{connect, connect_timeout, IpcStream};
