//! Client for the NodeManager management endpoints of OpenBTS-style services.
//!
//! Each service (OpenBTS, SIPAuthServe, SMQueue) exposes a request/reply
//! endpoint that accepts one JSON envelope and answers with one JSON reply.
//! This crate re-exports the layers that talk to it.
//!
//! # Crate Structure
//!
//! - [`transport`]: endpoint addressing, connect, listeners
//! - [`frame`]: length-prefixed framing over a byte stream, used by the
//!   framed channel; real services are reached over ZeroMQ
//! - [`envelope`]: request construction and reply decoding
//! - [`client`]: the synchronous call executor and per-service operations
//!
//! ```no_run
//! use nodemgr::client::{connect, ops, Service};
//!
//! let mut openbts = connect(Service::OpenBts)?;
//! let reply = ops::read_config(&mut openbts, "Control.NumSQLTries")?;
//! println!("{:?}", reply.data_field("value"));
//! # Ok::<(), nodemgr::client::ClientError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use nodemgr_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use nodemgr_frame::*;
}

/// Re-export envelope types.
pub mod envelope {
    pub use nodemgr_envelope::*;
}

/// Re-export client types.
pub mod client {
    pub use nodemgr_client::*;
}
