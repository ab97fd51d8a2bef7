//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! drawing widgets, which keeps them testable against a test backend.

mod lanes;
mod menu;
mod sentence;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};
use typelane_app::{App, Screen};
use typelane_core::LANE_COUNT;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const STATUS_HEIGHT: u16 = 1;
    // One row per lane plus the block border.
    const LANES_HEIGHT: u16 = LANE_COUNT as u16 + 2;
    const SENTENCE_MIN_HEIGHT: u16 = 3;

    match app.screen() {
        Screen::Menu(_) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(SENTENCE_MIN_HEIGHT), Constraint::Length(STATUS_HEIGHT)])
                .split(frame.area());

            let [menu_area, status_area] = chunks.as_ref() else {
                return;
            };

            menu::render(frame, app, *menu_area);
            status::render(frame, app, *status_area);
        }
        Screen::Race(race) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(LANES_HEIGHT),
                    Constraint::Min(SENTENCE_MIN_HEIGHT),
                    Constraint::Length(STATUS_HEIGHT),
                ])
                .split(frame.area());

            let [lanes_area, sentence_area, status_area] = chunks.as_ref() else {
                return;
            };

            lanes::render(frame, race, *lanes_area);
            sentence::render(frame, race, *sentence_area);
            status::render(frame, app, *status_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};
    use typelane_app::{AppEvent, KeyInput};

    use super::*;

    fn render_to_text(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn joined_app(sentence: &str) -> App {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Key(KeyInput::Enter));
        let _ = app.handle(AppEvent::LobbyJoined {
            lobby_id: 3,
            lane: 2,
            sentence: sentence.to_string(),
        });
        app
    }

    #[test]
    fn menu_shows_both_options() {
        let app = App::new();
        let text = render_to_text(&app);

        assert!(text.contains("Race others"));
        assert!(text.contains("Race yourself"));
    }

    #[test]
    fn race_shows_sentence_and_lanes() {
        let app = joined_app("cat dog");
        let text = render_to_text(&app);

        assert!(text.contains("cat dog"));
        for lane in 1..=LANE_COUNT {
            assert!(text.contains(&format!("lane {lane}")), "lane {lane} missing");
        }
    }

    #[test]
    fn status_shows_the_lobby_seat() {
        let app = joined_app("cat dog");
        let text = render_to_text(&app);

        assert!(text.contains("lobby 3"));
        assert!(text.contains("lane 2"));
    }

    #[test]
    fn completed_race_is_marked_done() {
        let mut app = joined_app("ab");
        let _ = app.handle(AppEvent::Key(KeyInput::Char('a')));
        let _ = app.handle(AppEvent::Key(KeyInput::Char('b')));

        let text = render_to_text(&app);
        assert!(text.contains("done"));
    }

    #[test]
    fn disconnect_reason_appears_in_the_status_line() {
        let mut app = joined_app("cat");
        let _ = app.handle(AppEvent::Disconnected { reason: "stream closed".to_string() });

        let text = render_to_text(&app);
        assert!(text.contains("disconnected: stream closed"));
    }
}
