//! Application side-effects and intents.
//!
//! [`AppAction`] represents instructions produced by the [`crate::App`]
//! state machine for the runtime to execute. The reducer itself performs no
//! I/O; every network or terminal effect flows through one of these.

use typelane_core::Lane;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect to the coordination service and request a lane.
    Connect,

    /// Report this player's absolute progress to the service.
    ///
    /// Dispatched fire-and-forget; the keystroke path never waits on it.
    Report {
        /// Lobby the player is racing in.
        lobby_id: u64,
        /// The player's own lane.
        lane: Lane,
        /// Characters confirmed correct so far.
        progress: u16,
    },

    /// Tear down the current connection.
    Disconnect,
}
