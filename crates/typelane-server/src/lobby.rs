//! Lobby membership and lane assignment.
//!
//! [`LobbyManager`] is pure bookkeeping with no I/O: sessions join, get the
//! first free lane in the lowest-numbered open lobby (a fresh lobby is
//! created when every existing one is full), and leave. The connection
//! layer consults it to validate and route progress reports.

use std::collections::BTreeMap;

use typelane_core::{LANE_COUNT, Lane};

/// A session's place in a lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
    /// Lobby the session was placed in.
    pub lobby_id: u64,
    /// Lane assigned to the session.
    pub lane: Lane,
}

/// One lobby: up to [`LANE_COUNT`] sessions racing over a shared sentence.
#[derive(Debug)]
struct Lobby {
    /// Session occupying each lane, by lane index.
    lanes: [Option<u64>; LANE_COUNT],
    sentence: String,
}

impl Lobby {
    fn new(sentence: String) -> Self {
        Self { lanes: [None; LANE_COUNT], sentence }
    }

    fn first_free_lane(&self) -> Option<Lane> {
        self.lanes.iter().position(Option::is_none).and_then(Lane::from_index)
    }

    fn is_empty(&self) -> bool {
        self.lanes.iter().all(Option::is_none)
    }

    fn members(&self) -> impl Iterator<Item = u64> + '_ {
        self.lanes.iter().filter_map(|lane| *lane)
    }
}

/// Tracks lobbies and which session sits in which lane.
///
/// Ordered by lobby id so joins always fill the oldest open lobby first.
#[derive(Debug, Default)]
pub struct LobbyManager {
    lobbies: BTreeMap<u64, Lobby>,
    /// Reverse index: session id to its seat.
    seats: BTreeMap<u64, Seat>,
    next_lobby_id: u64,
}

impl LobbyManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat `session_id` in the first lobby with a free lane, creating a
    /// new lobby (racing over `sentence`) when all are full.
    ///
    /// Returns the seat and the lobby's sentence. Re-joining while already
    /// seated returns the existing seat.
    pub fn join(&mut self, session_id: u64, sentence: impl FnOnce() -> String) -> (Seat, String) {
        if let Some(seat) = self.seats.get(&session_id) {
            let lobby = &self.lobbies[&seat.lobby_id];
            return (*seat, lobby.sentence.clone());
        }

        let open = self
            .lobbies
            .iter()
            .find_map(|(id, lobby)| lobby.first_free_lane().map(|lane| (*id, lane)));

        let (lobby_id, lane) = match open {
            Some(found) => found,
            None => {
                let lobby_id = self.next_lobby_id;
                self.next_lobby_id += 1;
                self.lobbies.insert(lobby_id, Lobby::new(sentence()));
                // A fresh lobby always has lane 1 free.
                (lobby_id, Lane::first())
            }
        };

        let seat = Seat { lobby_id, lane };
        self.seats.insert(session_id, seat);
        if let Some(lobby) = self.lobbies.get_mut(&lobby_id) {
            lobby.lanes[lane.index()] = Some(session_id);
        }

        let sentence = self.lobbies[&lobby_id].sentence.clone();
        (seat, sentence)
    }

    /// Free the session's lane. Empty lobbies are removed.
    ///
    /// Returns the vacated seat, or `None` if the session was not seated.
    pub fn leave(&mut self, session_id: u64) -> Option<Seat> {
        let seat = self.seats.remove(&session_id)?;

        if let Some(lobby) = self.lobbies.get_mut(&seat.lobby_id) {
            lobby.lanes[seat.lane.index()] = None;
            if lobby.is_empty() {
                self.lobbies.remove(&seat.lobby_id);
            }
        }

        Some(seat)
    }

    /// The session's current seat, if any.
    #[must_use]
    pub fn seat_of(&self, session_id: u64) -> Option<Seat> {
        self.seats.get(&session_id).copied()
    }

    /// All sessions in a lobby, the asking session included.
    ///
    /// Broadcasts go to every member: the sender's own echo keeps its lane
    /// consistent even if a local update was lost.
    #[must_use]
    pub fn members(&self, lobby_id: u64) -> Vec<u64> {
        self.lobbies.get(&lobby_id).map(|lobby| lobby.members().collect()).unwrap_or_default()
    }

    /// Number of active lobbies.
    #[must_use]
    pub fn lobby_count(&self) -> usize {
        self.lobbies.len()
    }
}
