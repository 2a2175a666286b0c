use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: magic (2) + length (4) = 6 bytes.
pub const HEADER_SIZE: usize = 6;

/// Magic bytes: "NM" (0x4E 0x4D).
pub const MAGIC: [u8; 2] = *b"NM";

/// Default maximum payload size: 16 MiB.
///
/// Subscriber listings are the largest replies the protocol produces.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// The fixed-size prefix in front of every envelope.
///
/// ```text
/// +---------+----------------------+-----------------+
/// | "NM"    | payload length       | payload         |
/// | 2 bytes | u32, network order   | length bytes    |
/// +---------+----------------------+-----------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    payload_len: u32,
}

impl FrameHeader {
    /// Header for `payload`, refusing anything above `max` bytes.
    pub fn for_payload(payload: &[u8], max: usize) -> Result<Self> {
        let limit = max.min(u32::MAX as usize);
        if payload.len() > limit {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: limit,
            });
        }
        Ok(Self {
            payload_len: payload.len() as u32,
        })
    }

    /// Parse the header at the front of `src`. `Ok(None)` until six bytes
    /// are available. The length is checked against `max` before any
    /// payload is buffered.
    pub fn parse(src: &[u8], max: usize) -> Result<Option<Self>> {
        let Some(raw) = src.get(..HEADER_SIZE) else {
            return Ok(None);
        };
        if raw[..2] != MAGIC {
            return Err(FrameError::InvalidMagic);
        }

        let payload_len = u32::from_be_bytes([raw[2], raw[3], raw[4], raw[5]]);
        if payload_len as usize > max {
            return Err(FrameError::PayloadTooLarge {
                size: payload_len as usize,
                max,
            });
        }
        Ok(Some(Self { payload_len }))
    }

    pub fn payload_len(self) -> usize {
        self.payload_len as usize
    }

    /// Header plus payload.
    pub fn frame_len(self) -> usize {
        HEADER_SIZE + self.payload_len()
    }

    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let len = self.payload_len.to_be_bytes();
        [MAGIC[0], MAGIC[1], len[0], len[1], len[2], len[3]]
    }
}

/// Append one framed message to `dst`.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let header = FrameHeader::for_payload(payload, usize::MAX)?;
    dst.reserve(header.frame_len());
    dst.put_slice(&header.to_bytes());
    dst.put_slice(payload);
    Ok(())
}

/// Take one complete message off the front of `src`.
///
/// Returns `Ok(None)` and leaves `src` untouched while the frame is
/// incomplete.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    let Some(header) = complete_frame(src, max_payload)? else {
        return Ok(None);
    };
    src.advance(HEADER_SIZE);
    Ok(Some(src.split_to(header.payload_len()).freeze()))
}

/// The header of the first frame in `src`, if that frame is fully buffered.
pub(crate) fn complete_frame(src: &[u8], max_payload: usize) -> Result<Option<FrameHeader>> {
    Ok(FrameHeader::parse(src, max_payload)?.filter(|header| src.len() >= header.frame_len()))
}

/// Limits and socket timeouts for a framed stream.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Largest payload accepted in either direction. Default: 16 MiB.
    pub max_payload_size: usize,
    /// Socket read timeout; bounds a reply that stalls mid-frame.
    pub read_timeout: Option<Duration>,
    /// Socket write timeout.
    pub write_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
