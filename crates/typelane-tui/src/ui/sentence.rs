//! Target sentence with typed-character feedback.
//!
//! Correct characters render green, wrong ones red (showing the expected
//! character, with `_` standing in for a missed space), and the untyped
//! remainder is dimmed.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use typelane_app::Race;

const WRONG_SPACE_MARKER: char = '_';

/// Render the sentence with per-character feedback.
pub fn render(frame: &mut Frame, race: &Race, area: Rect) {
    let target = race.target();
    let typed = race.typed();

    let mut spans = Vec::with_capacity(target.len());
    for (position, &expected) in target.iter().enumerate() {
        let span = match typed.get(position) {
            Some(&actual) if actual == expected => {
                Span::styled(expected.to_string(), Style::default().fg(Color::Green))
            }
            Some(_) => {
                // Show what should have been typed; a missed space would be
                // invisible in red, so mark it.
                let shown = if expected == ' ' { WRONG_SPACE_MARKER } else { expected };
                Span::styled(shown.to_string(), Style::default().fg(Color::Red))
            }
            None => Span::styled(expected.to_string(), Style::default().fg(Color::DarkGray)),
        };
        spans.push(span);
    }

    let block = Block::default().borders(Borders::ALL).title(" sentence ");
    let paragraph = Paragraph::new(Line::from(spans)).block(block).wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}
