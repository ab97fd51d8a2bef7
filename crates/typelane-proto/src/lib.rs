//! Wire protocol for typelane
//!
//! Frames carry race coordination traffic between the typing client and the
//! lobby server. Each frame is a fixed 24-byte binary header followed by a
//! CBOR payload:
//!
//! - The header is raw big-endian binary so the server can route
//!   `UpdatePosition` frames to a lobby without deserializing the payload.
//! - Payloads use CBOR for type safety and forward compatibility; the
//!   variant is identified by the header opcode, not a serialized tag.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod frame;
mod header;
mod payloads;

pub use frame::Frame;
pub use header::{FrameHeader, Opcode};
pub use payloads::{ErrorPayload, LanePosition, LobbyJoined, Payload, UpdatePosition};

/// ALPN protocol identifier for QUIC connections.
pub const ALPN_PROTOCOL: &[u8] = b"typelane";
