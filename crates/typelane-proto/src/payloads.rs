//! CBOR-encoded protocol messages.
//!
//! Frame headers are raw binary for routing speed, but payloads use CBOR for
//! type safety and forward compatibility. The payload variant is identified
//! by the frame header's opcode, so no variant tag is serialized: a peer
//! cannot send a mismatched opcode/payload pair that still decodes.
//!
//! # Invariants
//!
//! Each payload variant maps to exactly one opcode (enforced by match
//! exhaustiveness). Encoding then decoding with the same opcode must produce
//! an equivalent value.

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use crate::{
    Frame, FrameHeader, Opcode,
    errors::{ProtocolError, Result},
};

/// Lobby, lane, and sentence assignment sent in response to `JoinLobby`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyJoined {
    /// Lobby the client was placed in.
    pub lobby_id: u64,
    /// Assigned lane (1-based wire value).
    pub lane: u8,
    /// Target sentence shared by every lane in the lobby.
    pub sentence: String,
}

/// Absolute typing progress report from a client.
///
/// Lobby and lane ride in the frame header for routing; the payload carries
/// only the progress value. Progress is absolute (characters confirmed
/// correct), never a delta, so dropped or reordered reports are harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePosition {
    /// Characters confirmed correct so far.
    pub progress: u16,
}

/// One lane's progress, broadcast by the server to a whole lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanePosition {
    /// Lane the update applies to (1-based wire value).
    pub lane: u8,
    /// Characters confirmed correct.
    pub progress: u16,
}

/// Error payload for error frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error code identifying the type of error.
    pub code: u16,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorPayload {
    /// Frame was rejected by the server.
    pub const FRAME_REJECTED: u16 = 0x0001;
    /// Lobby does not exist or the session is not a member.
    pub const LOBBY_NOT_FOUND: u16 = 0x0002;
    /// Invalid payload format.
    pub const INVALID_PAYLOAD: u16 = 0x0003;

    /// Create a frame rejection error.
    pub fn frame_rejected(reason: impl Into<String>) -> Self {
        Self { code: Self::FRAME_REJECTED, message: reason.into() }
    }

    /// Create a lobby not found error.
    #[must_use]
    pub fn lobby_not_found(lobby_id: u64) -> Self {
        Self {
            code: Self::LOBBY_NOT_FOUND,
            message: format!("lobby not found: {lobby_id}"),
        }
    }

    /// Create an invalid payload error.
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self { code: Self::INVALID_PAYLOAD, message: msg.into() }
    }
}

/// All possible frame payloads.
///
/// The payload type is determined by the `Opcode` in the frame header, so
/// only the inner struct content is serialized (no variant tag in CBOR).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Request a lane in a lobby (zero-byte payload).
    JoinLobby,
    /// Server assignment of lobby, lane, and sentence.
    LobbyJoined(LobbyJoined),
    /// Client progress report.
    UpdatePosition(UpdatePosition),
    /// Server lane-progress broadcast.
    LanePosition(LanePosition),
    /// Error response.
    Error(ErrorPayload),
}

impl Payload {
    /// Opcode corresponding to this payload type.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::JoinLobby => Opcode::JoinLobby,
            Self::LobbyJoined(_) => Opcode::LobbyJoined,
            Self::UpdatePosition(_) => Opcode::UpdatePosition,
            Self::LanePosition(_) => Opcode::LanePosition,
            Self::Error(_) => Opcode::Error,
        }
    }

    /// Encode the payload into a buffer.
    ///
    /// Serializes only the inner struct, not the variant tag; the frame
    /// header's opcode already identifies the payload type.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::CborEncode`] if serialization fails.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        let mut writer = dst.writer();

        match self {
            Self::JoinLobby => Ok(()), // Zero-byte payload
            Self::LobbyJoined(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::UpdatePosition(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::LanePosition(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::Error(inner) => ciborium::ser::into_writer(inner, &mut writer),
        }
        .map_err(|e| ProtocolError::CborEncode(e.to_string()))
    }

    /// Decode a payload from bytes based on opcode.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::PayloadTooLarge`] if bytes exceed the size limit
    /// - [`ProtocolError::CborDecode`] if deserialization fails
    pub fn decode(opcode: Opcode, bytes: &[u8]) -> Result<Self> {
        if bytes.len() > FrameHeader::MAX_PAYLOAD_SIZE as usize {
            return Err(ProtocolError::PayloadTooLarge {
                size: bytes.len(),
                max: FrameHeader::MAX_PAYLOAD_SIZE as usize,
            });
        }

        let payload = match opcode {
            Opcode::JoinLobby => Self::JoinLobby,
            Opcode::LobbyJoined => Self::LobbyJoined(
                ciborium::de::from_reader(bytes)
                    .map_err(|e| ProtocolError::CborDecode(e.to_string()))?,
            ),
            Opcode::UpdatePosition => Self::UpdatePosition(
                ciborium::de::from_reader(bytes)
                    .map_err(|e| ProtocolError::CborDecode(e.to_string()))?,
            ),
            Opcode::LanePosition => Self::LanePosition(
                ciborium::de::from_reader(bytes)
                    .map_err(|e| ProtocolError::CborDecode(e.to_string()))?,
            ),
            Opcode::Error => Self::Error(
                ciborium::de::from_reader(bytes)
                    .map_err(|e| ProtocolError::CborDecode(e.to_string()))?,
            ),
        };

        Ok(payload)
    }

    /// Encode this payload into a complete frame.
    ///
    /// The header's opcode is overwritten to match the payload variant;
    /// routing fields (lobby, lane) are preserved from the given header.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::CborEncode`] if serialization fails.
    pub fn into_frame(self, mut header: FrameHeader) -> Result<Frame> {
        header.opcode = self.opcode().to_u16().to_be_bytes();

        let mut buf = Vec::new();
        self.encode(&mut buf)?;

        Ok(Frame::new(header, buf))
    }

    /// Decode the payload of a frame according to its header opcode.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::UnknownOpcode`] if the opcode is unrecognized
    /// - [`ProtocolError::CborDecode`] if deserialization fails
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let opcode = frame
            .header
            .opcode_enum()
            .ok_or_else(|| ProtocolError::UnknownOpcode(frame.header.opcode()))?;

        Self::decode(opcode, &frame.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(payload: Payload) -> Payload {
        let frame = payload.into_frame(FrameHeader::new(Opcode::JoinLobby)).unwrap();
        Payload::from_frame(&frame).unwrap()
    }

    #[test]
    fn join_lobby_is_zero_bytes() {
        let frame = Payload::JoinLobby.into_frame(FrameHeader::new(Opcode::JoinLobby)).unwrap();
        assert!(frame.payload.is_empty());
        assert_eq!(frame.header.opcode_enum(), Some(Opcode::JoinLobby));
    }

    #[test]
    fn lobby_joined_round_trip() {
        let payload = Payload::LobbyJoined(LobbyJoined {
            lobby_id: 7,
            lane: 2,
            sentence: "cat dog".into(),
        });
        assert_eq!(round_trip(payload.clone()), payload);
    }

    #[test]
    fn lane_position_round_trip() {
        let payload = Payload::LanePosition(LanePosition { lane: 4, progress: 17 });
        assert_eq!(round_trip(payload.clone()), payload);
    }

    #[test]
    fn into_frame_overwrites_opcode_and_keeps_routing() {
        let mut header = FrameHeader::new(Opcode::JoinLobby);
        header.set_lobby_id(3);
        header.set_lane(1);

        let frame =
            Payload::UpdatePosition(UpdatePosition { progress: 5 }).into_frame(header).unwrap();

        assert_eq!(frame.header.opcode_enum(), Some(Opcode::UpdatePosition));
        assert_eq!(frame.header.lobby_id(), 3);
        assert_eq!(frame.header.lane(), 1);
    }

    #[test]
    fn from_frame_rejects_unknown_opcode() {
        let mut frame = Payload::JoinLobby.into_frame(FrameHeader::new(Opcode::JoinLobby)).unwrap();
        frame.header.opcode = 0xABCDu16.to_be_bytes();

        assert!(matches!(
            Payload::from_frame(&frame),
            Err(ProtocolError::UnknownOpcode(0xABCD))
        ));
    }

    #[test]
    fn garbage_payload_is_a_decode_error() {
        let result = Payload::decode(Opcode::LanePosition, &[0xFF, 0x00, 0x13]);
        assert!(matches!(result, Err(ProtocolError::CborDecode(_))));
    }
}
