//! Async runtime
//!
//! Event loop that drives terminal I/O and the connection. Local keystrokes
//! and server frames are merged into one ordered stream of [`AppEvent`]s
//! with `tokio::select!`, so the app state machine never sees concurrent
//! inputs. A 100ms tick re-arms the loop at a bounded interval; the tick
//! event itself changes no state.

use std::io::{self, stdout};
use std::time::Duration;

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use typelane_app::{App, AppAction, AppEvent, KeyInput};
use typelane_client::{
    Reporter,
    transport::{self, ConnectedClient, TransportError},
};
use typelane_proto::{Frame, FrameHeader, Opcode, Payload};

use crate::ui;

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Async runtime for the TUI.
///
/// Manages terminal setup/teardown, the main event loop, and the QUIC
/// connection lifecycle. Connections are made on demand when the player
/// picks a multiplayer race and dropped when they leave it.
pub struct Runtime {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    connection: Option<ConnectedClient>,
    reporter: Option<Reporter>,
    server_addr: String,
}

impl Runtime {
    /// Create a new runtime connecting to `server_addr` on demand.
    pub fn new(server_addr: String, word_count: usize) -> Result<Self, RuntimeError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let app = App::new().with_word_count(word_count);

        Ok(Self { terminal, app, connection: None, reporter: None, server_addr })
    }

    /// Run the main event loop until the player quits.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        self.render()?;

        let mut event_stream = EventStream::new();
        let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

        loop {
            let should_quit = if let Some(ref mut conn) = self.connection {
                tokio::select! {
                    // Terminal events
                    maybe_event = event_stream.next() => {
                        match maybe_event {
                            Some(Ok(event)) => self.handle_terminal_event(event).await?,
                            Some(Err(e)) => return Err(RuntimeError::Io(e)),
                            None => true,
                        }
                    }

                    // Frames from the server; a closed channel means the
                    // connection died and the session degrades to the menu.
                    maybe_frame = conn.from_server.recv() => {
                        match maybe_frame {
                            Some(frame) => self.handle_frame(frame).await?,
                            None => {
                                self.drop_connection();
                                let actions = self.app.handle(AppEvent::Disconnected {
                                    reason: "connection lost".to_string(),
                                });
                                self.process_actions(actions).await?
                            }
                        }
                    }

                    // Periodic tick
                    _ = tick_interval.tick() => {
                        let actions = self.app.handle(AppEvent::Tick);
                        self.process_actions(actions).await?
                    }
                }
            } else {
                tokio::select! {
                    maybe_event = event_stream.next() => {
                        match maybe_event {
                            Some(Ok(event)) => self.handle_terminal_event(event).await?,
                            Some(Err(e)) => return Err(RuntimeError::Io(e)),
                            None => true,
                        }
                    }

                    _ = tick_interval.tick() => {
                        let actions = self.app.handle(AppEvent::Tick);
                        self.process_actions(actions).await?
                    }
                }
            };

            if should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle a terminal event and return whether to quit.
    async fn handle_terminal_event(&mut self, event: Event) -> Result<bool, RuntimeError> {
        let app_event = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match convert_key(key) {
                Some(input) => AppEvent::Key(input),
                None => return Ok(false),
            },
            Event::Resize(cols, rows) => AppEvent::Resize(cols, rows),
            _ => return Ok(false),
        };

        let actions = self.app.handle(app_event);
        self.process_actions(actions).await
    }

    /// Translate a server frame into an app event and process it.
    async fn handle_frame(&mut self, frame: Frame) -> Result<bool, RuntimeError> {
        let event = match Payload::from_frame(&frame) {
            Ok(Payload::LobbyJoined(joined)) => AppEvent::LobbyJoined {
                lobby_id: joined.lobby_id,
                lane: joined.lane,
                sentence: joined.sentence,
            },
            Ok(Payload::LanePosition(position)) => {
                AppEvent::LaneProgress { lane: position.lane, progress: position.progress }
            }
            Ok(Payload::Error(error)) => {
                tracing::warn!(code = error.code, message = %error.message, "server error");
                return Ok(false);
            }
            Ok(other) => {
                tracing::warn!(opcode = ?other.opcode(), "unexpected frame from server");
                return Ok(false);
            }
            Err(e) => {
                tracing::warn!(error = %e, "undecodable frame from server");
                return Ok(false);
            }
        };

        let actions = self.app.handle(event);
        self.process_actions(actions).await
    }

    /// Execute actions returned by the app. Returns true if should quit.
    async fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, RuntimeError> {
        for action in actions {
            match action {
                AppAction::Render => self.render()?,
                AppAction::Quit => return Ok(true),
                AppAction::Connect => self.connect().await?,
                AppAction::Report { lobby_id, lane, progress } => {
                    if let Some(reporter) = &self.reporter {
                        reporter.report(lobby_id, lane, progress);
                    } else {
                        tracing::warn!("progress report without a connection");
                    }
                }
                AppAction::Disconnect => self.drop_connection(),
            }
        }
        Ok(false)
    }

    /// Connect to the server and request a lane.
    ///
    /// A failed connection is not fatal: the app gets a `Disconnected`
    /// event and the player lands back on the menu.
    async fn connect(&mut self) -> Result<(), RuntimeError> {
        match transport::connect(&self.server_addr).await {
            Ok(client) => {
                let frame = join_lobby_frame();
                if let Err(e) = client.to_server.send(frame).await {
                    tracing::warn!(error = %e, "failed to send lobby request");
                }

                self.reporter = Some(Reporter::new(client.to_server.clone()));
                self.connection = Some(client);
            }
            Err(e) => {
                tracing::warn!(error = %e, server = %self.server_addr, "connect failed");
                let actions =
                    self.app.handle(AppEvent::Disconnected { reason: e.to_string() });
                // Connect is never among these actions, so no recursion.
                let _ = self.process_actions_sync(actions)?;
            }
        }

        Ok(())
    }

    /// Process render/quit actions without touching the network.
    fn process_actions_sync(&mut self, actions: Vec<AppAction>) -> Result<bool, RuntimeError> {
        for action in actions {
            match action {
                AppAction::Render => self.render()?,
                AppAction::Quit => return Ok(true),
                other => {
                    tracing::warn!(action = ?other, "unexpected action in sync context");
                }
            }
        }
        Ok(false)
    }

    fn drop_connection(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.stop();
        }
        self.reporter = None;
    }

    /// Render the UI.
    fn render(&mut self) -> Result<(), RuntimeError> {
        self.terminal.draw(|frame| {
            ui::render(frame, &self.app);
        })?;
        Ok(())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.drop_connection();

        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

/// Build the zero-payload lobby request frame.
fn join_lobby_frame() -> Frame {
    Frame::new(FrameHeader::new(Opcode::JoinLobby), Vec::new())
}

/// Convert a crossterm key event to terminal-agnostic input.
fn convert_key(key: KeyEvent) -> Option<KeyInput> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(KeyInput::CtrlC),
            KeyCode::Char('q') => Some(KeyInput::CtrlQ),
            KeyCode::Char('b') => Some(KeyInput::CtrlB),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Up => Some(KeyInput::Up),
        KeyCode::Down => Some(KeyInput::Down),
        _ => None,
    }
}
