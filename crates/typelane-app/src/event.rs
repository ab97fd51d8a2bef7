//! Application input events.
//!
//! [`AppEvent`] is the full set of inputs that drive the [`crate::App`]
//! state machine. Events originate from two sources: terminal input
//! (keystrokes, resize, tick) and the coordination service (lobby
//! assignment, lane progress, disconnect), translated from frames by the
//! runtime. Both sources are merged into one ordered stream; the reducer
//! consumes them one at a time.

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick. Carries no data and must cause no state change;
    /// exists so the runtime's select loop re-arms at a bounded interval.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Connection to the coordination service in progress.
    Connecting,

    /// Server assigned a lobby, lane, and sentence.
    LobbyJoined {
        /// Lobby identifier.
        lobby_id: u64,
        /// Assigned lane (1-based wire value).
        lane: u8,
        /// Shared target sentence.
        sentence: String,
    },

    /// A lane's progress changed (broadcast from the server, own lane
    /// included).
    LaneProgress {
        /// Lane the update applies to (1-based wire value).
        lane: u8,
        /// Characters confirmed correct.
        progress: u16,
    },

    /// Connection to the coordination service was lost.
    Disconnected {
        /// Human-readable reason.
        reason: String,
    },
}
