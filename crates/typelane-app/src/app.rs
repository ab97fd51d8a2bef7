//! Top-level application state machine.
//!
//! [`App`] routes every [`AppEvent`] to the active screen and tracks the
//! connection lifecycle. It is the single consumer of the runtime's merged
//! event stream: keystrokes and server frames arrive interleaved but one at
//! a time, so every transition runs to completion before the next event is
//! observed.

use typelane_core::{DEFAULT_WORD_COUNT, random_sentence};

use crate::{AppAction, AppEvent, KeyInput, Menu, MenuChoice, Race};

/// Which screen is active.
#[derive(Debug, Clone)]
pub enum Screen {
    /// Main menu.
    Menu(Menu),
    /// An active race (solo or lobby).
    Race(Race),
}

/// Connection lifecycle toward the coordination service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection, none wanted.
    Offline,
    /// Connect requested, lobby assignment pending.
    Connecting,
    /// Joined a lobby.
    Joined {
        /// Assigned lobby.
        lobby_id: u64,
    },
}

/// Application state: active screen, connection state, and status line.
#[derive(Debug)]
pub struct App {
    screen: Screen,
    connection: ConnectionState,
    /// One-line status shown under the active screen.
    status_message: Option<String>,
    /// Words per generated solo sentence.
    word_count: usize,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create an app on the main menu, offline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            screen: Screen::Menu(Menu::new()),
            connection: ConnectionState::Offline,
            status_message: None,
            word_count: DEFAULT_WORD_COUNT,
        }
    }

    /// Override the solo-sentence word count.
    #[must_use]
    pub fn with_word_count(mut self, word_count: usize) -> Self {
        self.word_count = word_count;
        self
    }

    /// Process one event and return the actions to execute.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            // The renderer sizes from the frame area, so a resize is just a
            // re-render.
            AppEvent::Resize(_, _) => vec![AppAction::Render],
            AppEvent::Connecting => {
                self.connection = ConnectionState::Connecting;
                self.status_message = Some("connecting...".to_string());
                vec![AppAction::Render]
            }
            AppEvent::LobbyJoined { lobby_id, lane, sentence } => {
                self.handle_lobby_joined(lobby_id, lane, sentence)
            }
            AppEvent::LaneProgress { lane, progress } => self.handle_lane_progress(lane, progress),
            AppEvent::Disconnected { reason } => self.handle_disconnected(&reason),
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        // Quit keys work on every screen.
        if matches!(key, KeyInput::CtrlC | KeyInput::CtrlQ) {
            return vec![AppAction::Quit];
        }

        // Back key returns to the menu from a race.
        if key == KeyInput::CtrlB {
            if matches!(self.screen, Screen::Race(_)) {
                return self.leave_race();
            }
            return vec![];
        }

        match &mut self.screen {
            Screen::Menu(menu) => match key {
                KeyInput::Char('q') => vec![AppAction::Quit],
                KeyInput::Up | KeyInput::Char('k') => {
                    menu.move_up();
                    vec![AppAction::Render]
                }
                KeyInput::Down | KeyInput::Char('j') => {
                    menu.move_down();
                    vec![AppAction::Render]
                }
                KeyInput::Enter | KeyInput::Char(' ') => {
                    let choice = menu.choice();
                    self.select_menu_choice(choice)
                }
                _ => vec![],
            },
            Screen::Race(race) => race.handle_key(key),
        }
    }

    fn select_menu_choice(&mut self, choice: MenuChoice) -> Vec<AppAction> {
        match choice {
            MenuChoice::RaceYourself => {
                self.status_message = None;
                self.screen = Screen::Race(Race::solo(random_sentence(self.word_count)));
                vec![AppAction::Render]
            }
            MenuChoice::RaceOthers => {
                self.connection = ConnectionState::Connecting;
                self.status_message = Some("connecting...".to_string());
                vec![AppAction::Connect, AppAction::Render]
            }
        }
    }

    fn leave_race(&mut self) -> Vec<AppAction> {
        let was_connected = self.connection != ConnectionState::Offline;
        self.connection = ConnectionState::Offline;
        self.status_message = None;
        self.screen = Screen::Menu(Menu::new());

        if was_connected {
            vec![AppAction::Disconnect, AppAction::Render]
        } else {
            vec![AppAction::Render]
        }
    }

    fn handle_lobby_joined(&mut self, lobby_id: u64, lane: u8, sentence: String) -> Vec<AppAction> {
        let Some(lane) = typelane_core::Lane::from_wire(lane) else {
            tracing::warn!(lane, "dropping lobby assignment with out-of-range lane");
            return vec![];
        };

        self.connection = ConnectionState::Joined { lobby_id };
        self.status_message = None;
        self.screen = Screen::Race(Race::lobby(lobby_id, lane, sentence));
        vec![AppAction::Render]
    }

    fn handle_lane_progress(&mut self, lane: u8, progress: u16) -> Vec<AppAction> {
        // Updates can race with leaving the lobby; stale ones are dropped.
        match &mut self.screen {
            Screen::Race(race) if self.connection != ConnectionState::Offline => {
                race.apply_lane_progress(lane, progress)
            }
            _ => {
                tracing::debug!(lane, progress, "ignoring lane update outside a lobby race");
                vec![]
            }
        }
    }

    fn handle_disconnected(&mut self, reason: &str) -> Vec<AppAction> {
        // Degrade to the menu instead of tearing down the process; the
        // player can re-join or race solo.
        tracing::warn!(reason, "disconnected from service");
        self.connection = ConnectionState::Offline;
        self.status_message = Some(format!("disconnected: {reason}"));
        self.screen = Screen::Menu(Menu::new());
        vec![AppAction::Render]
    }

    /// Active screen.
    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Connection lifecycle state.
    #[must_use]
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Status line, if any.
    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined_app(sentence: &str) -> App {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Key(KeyInput::Enter));
        let _ = app.handle(AppEvent::LobbyJoined {
            lobby_id: 9,
            lane: 2,
            sentence: sentence.to_string(),
        });
        app
    }

    #[test]
    fn ctrl_c_quits_on_any_screen() {
        let mut app = App::new();
        assert_eq!(app.handle(AppEvent::Key(KeyInput::CtrlC)), vec![AppAction::Quit]);

        let mut app = joined_app("cat");
        assert_eq!(app.handle(AppEvent::Key(KeyInput::CtrlQ)), vec![AppAction::Quit]);
    }

    #[test]
    fn tick_changes_nothing() {
        let mut app = joined_app("cat dog");
        let _ = app.handle(AppEvent::Key(KeyInput::Char('c')));

        let actions = app.handle(AppEvent::Tick);

        assert!(actions.is_empty());
        let Screen::Race(race) = app.screen() else {
            panic!("expected race screen");
        };
        assert_eq!(race.typed(), ['c']);
    }

    #[test]
    fn resize_triggers_a_render() {
        let mut app = App::new();
        assert_eq!(app.handle(AppEvent::Resize(80, 24)), vec![AppAction::Render]);
    }

    #[test]
    fn selecting_race_others_requests_a_connection() {
        let mut app = App::new();
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(actions, vec![AppAction::Connect, AppAction::Render]);
        assert_eq!(app.connection(), ConnectionState::Connecting);
        assert!(matches!(app.screen(), Screen::Menu(_)));
    }

    #[test]
    fn selecting_race_yourself_starts_a_solo_race() {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.connection(), ConnectionState::Offline);
        let Screen::Race(race) = app.screen() else {
            panic!("expected race screen");
        };
        assert!(matches!(race.mode(), crate::RaceMode::Solo));
        assert!(!race.sentence().is_empty());
    }

    #[test]
    fn lobby_assignment_starts_the_race() {
        let app = joined_app("cat dog");

        assert_eq!(app.connection(), ConnectionState::Joined { lobby_id: 9 });
        let Screen::Race(race) = app.screen() else {
            panic!("expected race screen");
        };
        assert_eq!(race.sentence(), "cat dog");
    }

    #[test]
    fn invalid_lane_in_lobby_assignment_is_dropped() {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Key(KeyInput::Enter));
        let actions = app.handle(AppEvent::LobbyJoined {
            lobby_id: 9,
            lane: 0,
            sentence: "cat".to_string(),
        });

        assert!(actions.is_empty());
        assert!(matches!(app.screen(), Screen::Menu(_)));
    }

    #[test]
    fn lane_progress_reaches_the_race() {
        let mut app = joined_app("cat dog");
        let actions = app.handle(AppEvent::LaneProgress { lane: 3, progress: 4 });

        assert_eq!(actions, vec![AppAction::Render]);
        let Screen::Race(race) = app.screen() else {
            panic!("expected race screen");
        };
        assert_eq!(race.lanes()[2], 4);
    }

    #[test]
    fn lane_progress_on_the_menu_is_ignored() {
        let mut app = App::new();
        assert!(app.handle(AppEvent::LaneProgress { lane: 1, progress: 3 }).is_empty());
    }

    #[test]
    fn ctrl_b_leaves_the_race_and_disconnects() {
        let mut app = joined_app("cat");
        let actions = app.handle(AppEvent::Key(KeyInput::CtrlB));

        assert_eq!(actions, vec![AppAction::Disconnect, AppAction::Render]);
        assert_eq!(app.connection(), ConnectionState::Offline);
        assert!(matches!(app.screen(), Screen::Menu(_)));
    }

    #[test]
    fn ctrl_b_in_a_solo_race_does_not_disconnect() {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        let _ = app.handle(AppEvent::Key(KeyInput::Enter));

        let actions = app.handle(AppEvent::Key(KeyInput::CtrlB));

        assert_eq!(actions, vec![AppAction::Render]);
        assert!(matches!(app.screen(), Screen::Menu(_)));
    }

    #[test]
    fn disconnect_degrades_to_the_menu() {
        let mut app = joined_app("cat");
        let actions = app.handle(AppEvent::Disconnected { reason: "stream closed".to_string() });

        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.connection(), ConnectionState::Offline);
        assert!(matches!(app.screen(), Screen::Menu(_)));
        assert_eq!(app.status_message(), Some("disconnected: stream closed"));
    }

    #[test]
    fn late_lane_update_after_disconnect_is_dropped() {
        let mut app = joined_app("cat");
        let _ = app.handle(AppEvent::Disconnected { reason: "gone".to_string() });

        assert!(app.handle(AppEvent::LaneProgress { lane: 2, progress: 2 }).is_empty());
    }
}
