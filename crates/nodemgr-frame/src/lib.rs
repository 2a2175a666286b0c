//! Length-prefixed message framing.
//!
//! The management protocol is message oriented: one request envelope, one
//! reply envelope. On a byte stream each message is preceded by a
//! [`FrameHeader`]: the magic `"NM"` and a big-endian `u32` payload length.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, FrameConfig, FrameHeader, DEFAULT_MAX_PAYLOAD, HEADER_SIZE, MAGIC,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
