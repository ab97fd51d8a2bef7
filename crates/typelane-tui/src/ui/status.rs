//! Status bar
//!
//! Connection state, race statistics, and key hints on one line.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use typelane_app::{App, ConnectionState, Screen};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let connection = match app.connection() {
        ConnectionState::Offline => Span::styled("offline", Style::default().fg(Color::DarkGray)),
        ConnectionState::Connecting => {
            Span::styled("connecting...", Style::default().fg(Color::Yellow))
        }
        ConnectionState::Joined { lobby_id } => Span::styled(
            format!("lobby {lobby_id}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let race_info = match app.screen() {
        Screen::Race(race) => {
            let mut parts = Vec::new();

            if let typelane_app::RaceMode::Lobby { lane, .. } = race.mode() {
                parts.push(lane.to_string());
            }
            if let Some(elapsed) = race.elapsed() {
                parts.push(format!("{}s", elapsed.as_secs()));
            }
            if let Some(accuracy) = race.accuracy() {
                parts.push(format!("{accuracy:.0}%"));
            }
            if race.completed() {
                parts.push("done".to_string());
            }

            if parts.is_empty() { String::new() } else { format!(" | {}", parts.join(" | ")) }
        }
        Screen::Menu(_) => String::new(),
    };

    let message = app
        .status_message()
        .map_or_else(String::new, |message| format!(" | {message}"));

    let hints = match app.screen() {
        Screen::Menu(_) => "  j/k move | enter select | q quit",
        Screen::Race(_) => "  ctrl+b menu | ctrl+q quit",
    };

    let status_line = Line::from(vec![
        Span::raw(" "),
        connection,
        Span::styled(race_info, Style::default().fg(Color::White)),
        Span::styled(message, Style::default().fg(Color::Red)),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
