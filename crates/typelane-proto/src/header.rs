//! Frame header with zero-copy parsing.
//!
//! The `FrameHeader` is a fixed 24-byte structure serialized as raw binary
//! (big endian). Routing context (lobby id, lane) lives in the header so the
//! server can fan out position updates without touching the CBOR payload.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::errors::{ProtocolError, Result};

/// Frame operation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    /// Client requests a lane in a lobby.
    JoinLobby = 0x0001,
    /// Server assigns lobby, lane, and sentence.
    LobbyJoined = 0x0002,
    /// Client reports absolute typing progress.
    UpdatePosition = 0x0010,
    /// Server broadcasts one lane's progress to a lobby.
    LanePosition = 0x0011,
    /// Error response.
    Error = 0x00FF,
}

impl Opcode {
    /// Raw wire value.
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Parse from wire value. `None` if unrecognized.
    #[must_use]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0001 => Some(Self::JoinLobby),
            0x0002 => Some(Self::LobbyJoined),
            0x0010 => Some(Self::UpdatePosition),
            0x0011 => Some(Self::LanePosition),
            0x00FF => Some(Self::Error),
            _ => None,
        }
    }
}

/// Fixed 24-byte frame header (big-endian network byte order).
///
/// Fields are stored as raw byte arrays to avoid alignment issues; the
/// `#[repr(C, packed)]` layout with zerocopy traits makes it safe to cast
/// the struct from untrusted network bytes (every 24-byte pattern is a
/// structurally valid bit pattern, validation happens in [`Self::from_bytes`]).
///
/// # Invariants
///
/// - `payload_size` MUST match the length of the payload that follows
///   (enforced by `Frame::new`, verified by `Frame::decode`).
/// - `lane` is `1..=4` for lane-scoped opcodes and `0` otherwise.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct FrameHeader {
    // Protocol identification (8 bytes: 0-7)
    magic: [u8; 4],             // 0x54594C4E ("TYLN" in ASCII)
    version: u8,                // 0x01
    lane: u8,                   // 1-based lane, 0 when not lane-scoped
    pub(crate) opcode: [u8; 2], // u16 operation code

    // Payload metadata (4 bytes: 8-11)
    pub(crate) payload_size: [u8; 4], // u32 payload length

    // Routing context (8 bytes: 12-19)
    lobby_id: [u8; 8], // u64 lobby identifier

    // Reserved for future use (4 bytes: 20-23)
    reserved: [u8; 4],
}

impl FrameHeader {
    /// Size of the serialized header (24 bytes).
    pub const SIZE: usize = 24;

    /// Magic number: "TYLN" in ASCII.
    pub const MAGIC: u32 = 0x5459_4C4E;

    /// Current protocol version.
    pub const VERSION: u8 = 0x01;

    /// Maximum payload size (64 KB). Race payloads are a sentence at most.
    pub const MAX_PAYLOAD_SIZE: u32 = 64 * 1024;

    /// Create a new header with the specified opcode.
    #[must_use]
    pub fn new(opcode: Opcode) -> Self {
        Self {
            magic: Self::MAGIC.to_be_bytes(),
            version: Self::VERSION,
            lane: 0,
            opcode: opcode.to_u16().to_be_bytes(),
            payload_size: [0; 4],
            lobby_id: [0; 8],
            reserved: [0; 4],
        }
    }

    /// Parse a header from network bytes (zero-copy, safe).
    ///
    /// Validates cheapest properties first: length, then magic, then
    /// version, then claimed payload size.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::FrameTooShort`] if the buffer holds fewer than 24 bytes
    /// - [`ProtocolError::InvalidMagic`] if the magic number is wrong
    /// - [`ProtocolError::UnsupportedVersion`] on a version mismatch
    /// - [`ProtocolError::PayloadTooLarge`] if the claimed size exceeds the limit
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        let header = Self::ref_from_prefix(bytes)
            .map_err(|_| ProtocolError::FrameTooShort {
                expected: Self::SIZE,
                actual: bytes.len(),
            })?
            .0;

        if u32::from_be_bytes(header.magic) != Self::MAGIC {
            return Err(ProtocolError::InvalidMagic);
        }

        if header.version != Self::VERSION {
            return Err(ProtocolError::UnsupportedVersion(header.version));
        }

        let payload_size = u32::from_be_bytes(header.payload_size);
        if payload_size > Self::MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload_size as usize,
                max: Self::MAX_PAYLOAD_SIZE as usize,
            });
        }

        Ok(header)
    }

    /// Serialize header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let bytes = IntoBytes::as_bytes(self);
        let mut arr = [0u8; Self::SIZE];
        arr.copy_from_slice(bytes);
        arr
    }

    /// Protocol magic number.
    #[must_use]
    pub fn magic(&self) -> u32 {
        u32::from_be_bytes(self.magic)
    }

    /// Protocol version byte.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Operation code as raw u16.
    #[must_use]
    pub fn opcode(&self) -> u16 {
        u16::from_be_bytes(self.opcode)
    }

    /// Operation code as enum. `None` if unrecognized.
    #[must_use]
    pub fn opcode_enum(&self) -> Option<Opcode> {
        Opcode::from_u16(self.opcode())
    }

    /// Raw 1-based lane value. `0` when the frame is not lane-scoped.
    #[must_use]
    pub fn lane(&self) -> u8 {
        self.lane
    }

    /// Lobby identifier for routing.
    #[must_use]
    pub fn lobby_id(&self) -> u64 {
        u64::from_be_bytes(self.lobby_id)
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn payload_size(&self) -> u32 {
        u32::from_be_bytes(self.payload_size)
    }

    /// Set the lane routing field.
    pub fn set_lane(&mut self, lane: u8) {
        self.lane = lane;
    }

    /// Set the lobby routing field.
    pub fn set_lobby_id(&mut self, lobby_id: u64) {
        self.lobby_id = lobby_id.to_be_bytes();
    }
}

impl std::fmt::Debug for FrameHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHeader")
            .field("opcode", &self.opcode())
            .field("lane", &self.lane())
            .field("lobby_id", &self.lobby_id())
            .field("payload_size", &self.payload_size())
            .finish()
    }
}

impl PartialEq for FrameHeader {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for FrameHeader {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_header_has_valid_magic_and_version() {
        let header = FrameHeader::new(Opcode::JoinLobby);
        assert_eq!(header.magic(), FrameHeader::MAGIC);
        assert_eq!(header.version(), FrameHeader::VERSION);
        assert_eq!(header.opcode_enum(), Some(Opcode::JoinLobby));
        assert_eq!(header.lane(), 0);
        assert_eq!(header.lobby_id(), 0);
    }

    #[test]
    fn round_trip_through_bytes() {
        let mut header = FrameHeader::new(Opcode::UpdatePosition);
        header.set_lane(3);
        header.set_lobby_id(0xDEAD_BEEF);

        let bytes = header.to_bytes();
        let parsed = FrameHeader::from_bytes(&bytes).unwrap();

        assert_eq!(parsed.opcode_enum(), Some(Opcode::UpdatePosition));
        assert_eq!(parsed.lane(), 3);
        assert_eq!(parsed.lobby_id(), 0xDEAD_BEEF);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = FrameHeader::new(Opcode::JoinLobby).to_bytes();
        bytes[0] = 0x00;
        assert_eq!(FrameHeader::from_bytes(&bytes), Err(ProtocolError::InvalidMagic));
    }

    #[test]
    fn rejects_bad_version() {
        let mut bytes = FrameHeader::new(Opcode::JoinLobby).to_bytes();
        bytes[4] = 0x7F;
        assert_eq!(
            FrameHeader::from_bytes(&bytes),
            Err(ProtocolError::UnsupportedVersion(0x7F))
        );
    }

    #[test]
    fn rejects_short_buffer() {
        let bytes = [0u8; FrameHeader::SIZE - 1];
        assert!(matches!(
            FrameHeader::from_bytes(&bytes),
            Err(ProtocolError::FrameTooShort { .. })
        ));
    }

    #[test]
    fn rejects_oversized_payload_claim() {
        let mut bytes = FrameHeader::new(Opcode::JoinLobby).to_bytes();
        bytes[8..12].copy_from_slice(&(FrameHeader::MAX_PAYLOAD_SIZE + 1).to_be_bytes());
        assert!(matches!(
            FrameHeader::from_bytes(&bytes),
            Err(ProtocolError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn unknown_opcode_is_none() {
        let mut bytes = FrameHeader::new(Opcode::JoinLobby).to_bytes();
        bytes[6..8].copy_from_slice(&0xABCDu16.to_be_bytes());
        let header = FrameHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.opcode_enum(), None);
        assert_eq!(header.opcode(), 0xABCD);
    }
}
