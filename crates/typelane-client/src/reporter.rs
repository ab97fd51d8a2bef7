//! Fire-and-forget progress reporting.
//!
//! The keystroke path must never wait on the network: each correct stroke
//! hands its report to [`Reporter::report`], which spawns a detached send
//! and returns immediately. Failures are logged and swallowed; reports
//! carry absolute progress, so losing one only delays the next lane update
//! by a stroke.

use tokio::sync::mpsc;
use typelane_core::Lane;
use typelane_proto::{Frame, FrameHeader, Opcode, Payload, UpdatePosition};

/// Dispatches progress reports to the server without blocking the caller.
#[derive(Debug, Clone)]
pub struct Reporter {
    to_server: mpsc::Sender<Frame>,
}

impl Reporter {
    /// Create a reporter sending on the connection's outbound channel.
    #[must_use]
    pub fn new(to_server: mpsc::Sender<Frame>) -> Self {
        Self { to_server }
    }

    /// Report absolute progress for `lane` in `lobby_id`.
    ///
    /// Returns before the frame is sent. Encode or channel failures are
    /// logged at warn level and otherwise ignored.
    pub fn report(&self, lobby_id: u64, lane: Lane, progress: u16) {
        let mut header = FrameHeader::new(Opcode::UpdatePosition);
        header.set_lobby_id(lobby_id);
        header.set_lane(lane.wire());

        let frame = match Payload::UpdatePosition(UpdatePosition { progress }).into_frame(header) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode progress report");
                return;
            }
        };

        let to_server = self.to_server.clone();
        tokio::spawn(async move {
            if let Err(e) = to_server.send(frame).await {
                tracing::warn!(error = %e, progress, "failed to send progress report");
            }
        });
    }
}
