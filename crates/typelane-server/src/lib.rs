//! typelane lobby server.
//!
//! Seats typing clients into four-lane lobbies and relays their progress.
//! The server never interprets race content beyond validation: a progress
//! report is routed to its lobby straight off the frame header (one map
//! lookup, no payload inspection needed for routing) and re-broadcast to
//! every member of that lobby, the sender included.
//!
//! # Components
//!
//! - [`LobbyManager`]: pure lane/lobby bookkeeping, no I/O
//! - [`Server`]: accept loop and per-connection frame handling
//! - [`QuinnTransport`]: QUIC endpoint via Quinn

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod lobby;
mod transport;

use std::collections::HashMap;
use std::sync::Arc;

use bytes::BytesMut;
pub use error::ServerError;
pub use lobby::{LobbyManager, Seat};
use tokio::sync::{Mutex, RwLock};
pub use transport::{QuinnConnection, QuinnTransport};
use typelane_core::{DEFAULT_WORD_COUNT, random_sentence};
use typelane_proto::{
    ErrorPayload, Frame, FrameHeader, LanePosition, LobbyJoined, Opcode, Payload,
};

/// Shared state for all connections.
struct SharedState {
    /// Lane and lobby bookkeeping.
    lobbies: Mutex<LobbyManager>,
    /// Map of session id to QUIC connection (for closing).
    connections: RwLock<HashMap<u64, QuinnConnection>>,
    /// Map of session id to its persistent outbound stream. All frames to a
    /// client go through this single stream, preserving ordering.
    outbound_streams: RwLock<HashMap<u64, Mutex<quinn::SendStream>>>,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (e.g. "0.0.0.0:4433").
    pub bind_address: String,
    /// Path to TLS certificate (PEM format).
    pub cert_path: Option<String>,
    /// Path to TLS private key (PEM format).
    pub key_path: Option<String>,
    /// Words per generated lobby sentence.
    pub word_count: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4433".to_string(),
            cert_path: None,
            key_path: None,
            word_count: DEFAULT_WORD_COUNT,
        }
    }
}

/// Production typelane server.
pub struct Server {
    transport: QuinnTransport,
    word_count: usize,
}

impl Server {
    /// Create and bind a new server.
    pub fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let transport =
            QuinnTransport::bind(&config.bind_address, config.cert_path, config.key_path)?;

        Ok(Self { transport, word_count: config.word_count })
    }

    /// Run the server, accepting connections and relaying frames.
    ///
    /// Runs until the endpoint is closed or an accept error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("server listening on {}", self.transport.local_addr()?);

        let shared = Arc::new(SharedState {
            lobbies: Mutex::new(LobbyManager::new()),
            connections: RwLock::new(HashMap::new()),
            outbound_streams: RwLock::new(HashMap::new()),
        });
        let word_count = self.word_count;

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let shared = Arc::clone(&shared);

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, shared, word_count).await {
                            tracing::debug!(error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept error");
                }
            }
        }
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        self.transport.local_addr()
    }
}

/// Handle a single QUIC connection for its whole lifetime.
async fn handle_connection(
    conn: QuinnConnection,
    shared: Arc<SharedState>,
    word_count: usize,
) -> Result<(), ServerError> {
    let session_id: u64 = rand::random();

    tracing::debug!(session_id, remote = %conn.remote_addr(), "new connection");

    let outbound_stream = conn
        .open_uni()
        .await
        .map_err(|e| ServerError::Internal(format!("failed to open outbound stream: {e}")))?;

    shared.connections.write().await.insert(session_id, conn.clone());
    shared.outbound_streams.write().await.insert(session_id, Mutex::new(outbound_stream));

    loop {
        match conn.accept_bi().await {
            Ok((send, recv)) => {
                let shared = Arc::clone(&shared);

                tokio::spawn(async move {
                    if let Err(e) =
                        handle_stream(session_id, send, recv, &shared, word_count).await
                    {
                        tracing::debug!(session_id, error = %e, "stream error");
                    }
                });
            }
            Err(e) => {
                tracing::debug!(session_id, error = %e, "connection closed");
                break;
            }
        }
    }

    shared.connections.write().await.remove(&session_id);
    shared.outbound_streams.write().await.remove(&session_id);

    // Free the lane; remaining racers see the lane reset to zero.
    let vacated = shared.lobbies.lock().await.leave(session_id);
    if let Some(seat) = vacated {
        tracing::debug!(session_id, lobby_id = seat.lobby_id, lane = %seat.lane, "left lobby");
        broadcast_lane_position(&shared, seat, 0).await;
    }

    Ok(())
}

/// Handle one client-initiated stream, reading frames until it ends.
async fn handle_stream(
    session_id: u64,
    send: quinn::SendStream,
    mut recv: quinn::RecvStream,
    shared: &Arc<SharedState>,
    word_count: usize,
) -> Result<(), ServerError> {
    drop(send); // replies go over the persistent outbound stream

    let mut buf = BytesMut::with_capacity(FrameHeader::SIZE);

    loop {
        buf.clear();
        buf.resize(FrameHeader::SIZE, 0);

        if recv.read_exact(&mut buf[..FrameHeader::SIZE]).await.is_err() {
            // Stream finished; the client sends one frame per stream.
            break;
        }

        let payload_size = match FrameHeader::from_bytes(&buf[..FrameHeader::SIZE]) {
            Ok(header) => header.payload_size() as usize,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "invalid frame header");
                break;
            }
        };

        if payload_size > 0 {
            buf.resize(FrameHeader::SIZE + payload_size, 0);
            if let Err(e) = recv.read_exact(&mut buf[FrameHeader::SIZE..]).await {
                tracing::debug!(session_id, error = %e, "payload read error");
                break;
            }
        }

        let frame = match Frame::decode(&buf) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "frame decode error");
                break;
            }
        };

        process_frame(session_id, frame, shared, word_count).await;
    }

    Ok(())
}

/// Process one frame from a client.
async fn process_frame(
    session_id: u64,
    frame: Frame,
    shared: &Arc<SharedState>,
    word_count: usize,
) {
    match frame.header.opcode_enum() {
        Some(Opcode::JoinLobby) => {
            let (seat, sentence) = shared
                .lobbies
                .lock()
                .await
                .join(session_id, || random_sentence(word_count));

            tracing::info!(session_id, lobby_id = seat.lobby_id, lane = %seat.lane, "joined");

            let assignment = Payload::LobbyJoined(LobbyJoined {
                lobby_id: seat.lobby_id,
                lane: seat.lane.wire(),
                sentence,
            });
            send_payload(shared, session_id, seat, assignment).await;

            // Announce the newcomer so existing racers render the lane.
            broadcast_lane_position(shared, seat, 0).await;
        }

        Some(Opcode::UpdatePosition) => {
            let seat = shared.lobbies.lock().await.seat_of(session_id);
            let Some(seat) = seat else {
                tracing::warn!(session_id, "progress report from unseated session");
                return;
            };

            // Routing trusts the seat map, not the header: a client cannot
            // move another lane by forging header fields.
            if frame.header.lobby_id() != seat.lobby_id
                || frame.header.lane() != seat.lane.wire()
            {
                tracing::warn!(
                    session_id,
                    claimed_lobby = frame.header.lobby_id(),
                    claimed_lane = frame.header.lane(),
                    "progress report with mismatched routing fields"
                );
                let error = Payload::Error(ErrorPayload::frame_rejected(
                    "routing fields do not match the session's seat",
                ));
                send_payload(shared, session_id, seat, error).await;
                return;
            }

            let progress = match Payload::from_frame(&frame) {
                Ok(Payload::UpdatePosition(update)) => update.progress,
                Ok(_) | Err(_) => {
                    tracing::warn!(session_id, "malformed progress payload");
                    let error = Payload::Error(ErrorPayload::invalid_payload(
                        "expected an UpdatePosition payload",
                    ));
                    send_payload(shared, session_id, seat, error).await;
                    return;
                }
            };

            broadcast_lane_position(shared, seat, progress).await;
        }

        Some(opcode) => {
            tracing::warn!(session_id, ?opcode, "unexpected opcode from client");
        }

        None => {
            tracing::warn!(session_id, opcode = frame.header.opcode(), "unknown opcode");
        }
    }
}

/// Broadcast one lane's progress to every member of its lobby, the
/// reporting session included.
async fn broadcast_lane_position(shared: &Arc<SharedState>, seat: Seat, progress: u16) {
    let members = shared.lobbies.lock().await.members(seat.lobby_id);

    let payload =
        Payload::LanePosition(LanePosition { lane: seat.lane.wire(), progress });
    let Some(buf) = encode_payload(seat, payload) else {
        return;
    };

    let streams = shared.outbound_streams.read().await;
    for member in members {
        if let Some(stream_mutex) = streams.get(&member) {
            let mut stream = stream_mutex.lock().await;
            if let Err(e) = stream.write_all(&buf).await {
                tracing::warn!(member, error = %e, "broadcast write failed");
            }
        }
    }
}

/// Send a payload to one session over its outbound stream.
async fn send_payload(shared: &Arc<SharedState>, session_id: u64, seat: Seat, payload: Payload) {
    let Some(buf) = encode_payload(seat, payload) else {
        return;
    };

    let streams = shared.outbound_streams.read().await;
    if let Some(stream_mutex) = streams.get(&session_id) {
        let mut stream = stream_mutex.lock().await;
        if let Err(e) = stream.write_all(&buf).await {
            tracing::warn!(session_id, error = %e, "send failed");
        }
    } else {
        tracing::warn!(session_id, "send to unknown session");
    }
}

/// Encode a payload into wire bytes with the seat's routing fields.
fn encode_payload(seat: Seat, payload: Payload) -> Option<Vec<u8>> {
    let mut header = FrameHeader::new(payload.opcode());
    header.set_lobby_id(seat.lobby_id);
    header.set_lane(seat.lane.wire());

    let frame = match payload.into_frame(header) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!(error = %e, "payload encode failed");
            return None;
        }
    };

    let mut buf = Vec::with_capacity(frame.encoded_len());
    if let Err(e) = frame.encode(&mut buf) {
        tracing::error!(error = %e, "frame encode failed");
        return None;
    }

    Some(buf)
}
