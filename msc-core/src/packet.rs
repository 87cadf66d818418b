//! Encoded packets and the length header that frames them.
//!
//! Header-framed packets start with a little-endian 32-bit payload length
//! ([`PACKET_HEADER_SIZE`] bytes) followed by the payload itself.

use crate::error::{Error, Result};
use bitflags::bitflags;
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

/// Size of the length header in bytes.
pub const PACKET_HEADER_SIZE: usize = 4;

bitflags! {
    /// Flags for packet properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PacketFlags: u32 {
        /// This packet contains a keyframe.
        const KEYFRAME = 0x0001;
    }
}

/// An encoded frame.
#[derive(Clone, Default)]
pub struct Packet {
    /// The packet data.
    data: Vec<u8>,
    /// Presentation timestamp.
    pub pts: Option<i64>,
    /// Packet flags.
    pub flags: PacketFlags,
}

impl Packet {
    /// Create a new packet with owned data.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            pts: None,
            flags: PacketFlags::empty(),
        }
    }

    /// Get the packet data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the size of the packet data.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if this packet is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if this is a keyframe packet.
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(PacketFlags::KEYFRAME)
    }

    /// Set the keyframe flag.
    pub fn set_keyframe(&mut self, keyframe: bool) {
        self.flags.set(PacketFlags::KEYFRAME, keyframe);
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("size", &self.data.len())
            .field("pts", &self.pts)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Build a header-framed packet body: length header followed by `payload`.
pub fn frame_payload(payload: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(payload.len())
        .map_err(|_| Error::invalid_param("payload larger than 4 GiB"))?;

    let mut out = Vec::with_capacity(PACKET_HEADER_SIZE + payload.len());
    let mut header = [0u8; PACKET_HEADER_SIZE];
    LittleEndian::write_u32(&mut header, len);
    out.extend_from_slice(&header);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Split a header-framed packet, returning the payload the header announces.
///
/// Trailing bytes after the announced payload are ignored.
pub fn split_payload(data: &[u8]) -> Result<&[u8]> {
    if data.len() < PACKET_HEADER_SIZE {
        return Err(Error::BufferTooSmall {
            needed: PACKET_HEADER_SIZE,
            available: data.len(),
        });
    }
    let len = LittleEndian::read_u32(&data[..PACKET_HEADER_SIZE]) as usize;
    let body = &data[PACKET_HEADER_SIZE..];
    if len > body.len() {
        return Err(Error::BufferTooSmall {
            needed: PACKET_HEADER_SIZE + len,
            available: data.len(),
        });
    }
    Ok(&body[..len])
}
