//! Frame type combining header and payload.
//!
//! A `Frame` is the transport-layer packet: a 24-byte raw binary header
//! (big endian) followed by variable-length payload bytes, already encoded.
//! This is a pure data holder; for typed payload logic see
//! [`Payload::into_frame`](crate::Payload::into_frame) and
//! [`Payload::from_frame`](crate::Payload::from_frame).

use bytes::{BufMut, Bytes};

use crate::{
    FrameHeader,
    errors::{ProtocolError, Result},
};

/// Complete protocol frame.
///
/// Layout on the wire: `[FrameHeader: 24 bytes] + [payload: variable]`.
///
/// Holds raw payload bytes, not the `Payload` enum: the server routes
/// position updates by header alone without deserializing CBOR.
///
/// # Invariants
///
/// - `payload.len()` matches `header.payload_size()`. Enforced by
///   [`Frame::new`], verified by [`Frame::decode`].
/// - `payload.len()` never exceeds [`FrameHeader::MAX_PAYLOAD_SIZE`];
///   violations are rejected during encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame header (24 bytes).
    pub header: FrameHeader,
    /// Raw payload bytes (already CBOR-encoded).
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame, setting the header's payload size to match the
    /// actual payload length.
    #[must_use]
    pub fn new(mut header: FrameHeader, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();

        // Payload length always fits in u32: Bytes is bounded by isize::MAX
        // and the protocol limit is 64 KB.
        let payload_len = payload.len() as u32;
        header.payload_size = payload_len.to_be_bytes();

        debug_assert_eq!(header.payload_size(), payload_len);

        Self { header, payload }
    }

    /// Encode the frame into a buffer.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::PayloadTooLarge`] if the payload exceeds
    /// [`FrameHeader::MAX_PAYLOAD_SIZE`].
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        debug_assert_eq!(self.payload.len(), self.header.payload_size() as usize);

        if self.payload.len() > FrameHeader::MAX_PAYLOAD_SIZE as usize {
            return Err(ProtocolError::PayloadTooLarge {
                size: self.payload.len(),
                max: FrameHeader::MAX_PAYLOAD_SIZE as usize,
            });
        }

        dst.put_slice(&self.header.to_bytes());
        dst.put_slice(&self.payload);

        Ok(())
    }

    /// Decode a frame from wire format.
    ///
    /// Returns a frame with raw payload bytes; use
    /// [`Payload::from_frame`](crate::Payload::from_frame) to deserialize.
    ///
    /// # Errors
    ///
    /// Any header validation error, or
    /// [`ProtocolError::PayloadSizeMismatch`] if the buffer does not hold
    /// exactly the bytes the header claims.
    pub fn decode(src: &[u8]) -> Result<Self> {
        let header = *FrameHeader::from_bytes(src)?;

        let claimed = header.payload_size() as usize;
        let actual = src.len() - FrameHeader::SIZE;
        if claimed != actual {
            return Err(ProtocolError::PayloadSizeMismatch { claimed, actual });
        }

        let payload = Bytes::copy_from_slice(&src[FrameHeader::SIZE..]);
        Ok(Self { header, payload })
    }

    /// Total encoded size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        FrameHeader::SIZE + self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Opcode;

    #[test]
    fn new_sets_payload_size() {
        let frame = Frame::new(FrameHeader::new(Opcode::LanePosition), vec![1, 2, 3]);
        assert_eq!(frame.header.payload_size(), 3);
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut header = FrameHeader::new(Opcode::UpdatePosition);
        header.set_lobby_id(9);
        header.set_lane(2);
        let frame = Frame::new(header, vec![0xA0, 0xA1]);

        let mut buf = Vec::new();
        frame.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), frame.encoded_len());

        let decoded = Frame::decode(&buf).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        let frame = Frame::new(FrameHeader::new(Opcode::LanePosition), vec![1, 2, 3, 4]);
        let mut buf = Vec::new();
        frame.encode(&mut buf).unwrap();
        buf.truncate(buf.len() - 1);

        assert!(matches!(
            Frame::decode(&buf),
            Err(ProtocolError::PayloadSizeMismatch { claimed: 4, actual: 3 })
        ));
    }

    #[test]
    fn empty_payload_is_valid() {
        let frame = Frame::new(FrameHeader::new(Opcode::JoinLobby), Vec::new());
        let mut buf = Vec::new();
        frame.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), FrameHeader::SIZE);
        assert_eq!(Frame::decode(&buf).unwrap(), frame);
    }
}
