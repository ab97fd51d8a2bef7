//! Property-based tests for frame encoding/decoding.
//!
//! These verify that frame serialization holds for all valid inputs, not
//! just hand-picked examples: arbitrary headers and payloads must round-trip
//! byte-identically, and corrupted buffers must be rejected.

use bytes::Bytes;
use typelane_proto::{Frame, FrameHeader, Opcode, Payload, UpdatePosition};
use proptest::prelude::*;

/// Strategy for generating arbitrary opcodes.
fn arbitrary_opcode() -> impl Strategy<Value = Opcode> {
    prop_oneof![
        Just(Opcode::JoinLobby),
        Just(Opcode::LobbyJoined),
        Just(Opcode::UpdatePosition),
        Just(Opcode::LanePosition),
        Just(Opcode::Error),
    ]
}

/// Strategy for generating arbitrary frame headers.
fn arbitrary_header() -> impl Strategy<Value = FrameHeader> {
    (arbitrary_opcode(), any::<u64>(), 0u8..=4).prop_map(|(opcode, lobby_id, lane)| {
        let mut header = FrameHeader::new(opcode);
        header.set_lobby_id(lobby_id);
        header.set_lane(lane);
        header
    })
}

proptest! {
    #[test]
    fn frame_round_trips(header in arbitrary_header(), payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let frame = Frame::new(header, Bytes::from(payload));

        let mut buf = Vec::new();
        frame.encode(&mut buf).unwrap();
        let decoded = Frame::decode(&buf).unwrap();

        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn header_round_trips(header in arbitrary_header()) {
        let bytes = header.to_bytes();
        let parsed = *FrameHeader::from_bytes(&bytes).unwrap();

        prop_assert_eq!(parsed.opcode(), header.opcode());
        prop_assert_eq!(parsed.lobby_id(), header.lobby_id());
        prop_assert_eq!(parsed.lane(), header.lane());
    }

    #[test]
    fn truncated_frames_are_rejected(header in arbitrary_header(), payload in proptest::collection::vec(any::<u8>(), 1..256), cut in 1usize..24) {
        let frame = Frame::new(header, Bytes::from(payload));
        let mut buf = Vec::new();
        frame.encode(&mut buf).unwrap();
        buf.truncate(buf.len().saturating_sub(cut));

        prop_assert!(Frame::decode(&buf).is_err());
    }

    #[test]
    fn update_position_payload_round_trips(progress in any::<u16>()) {
        let payload = Payload::UpdatePosition(UpdatePosition { progress });
        let frame = payload.clone().into_frame(FrameHeader::new(Opcode::UpdatePosition)).unwrap();

        prop_assert_eq!(Payload::from_frame(&frame).unwrap(), payload);
    }

    #[test]
    fn corrupt_magic_never_parses(header in arbitrary_header(), byte in any::<u8>()) {
        let mut bytes = header.to_bytes();
        prop_assume!(byte != bytes[0]);
        bytes[0] = byte;

        prop_assert!(FrameHeader::from_bytes(&bytes).is_err());
    }
}
