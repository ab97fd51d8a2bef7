//! Lane progress board
//!
//! One bar per lane scaled to the sentence length. The player's own lane is
//! highlighted; remote lanes move as broadcasts arrive.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use typelane_app::{Race, RaceMode};
use typelane_core::Lane;

const FILLED: &str = "█";
const EMPTY: &str = "░";

/// Render the lane board.
pub fn render(frame: &mut Frame, race: &Race, area: Rect) {
    let own_lane = match race.mode() {
        RaceMode::Lobby { lane, .. } => Some(lane),
        RaceMode::Solo => None,
    };

    let target_len = race.target().len().max(1);
    // Label is "> lane N " / "  lane N ".
    let bar_width = usize::from(area.width.saturating_sub(2)).saturating_sub(10);

    let lines: Vec<Line> = Lane::all()
        .map(|lane| {
            let progress = usize::from(race.lanes()[lane.index()]);
            let filled = (progress * bar_width) / target_len;

            let (prefix, label_style) = if own_lane == Some(lane) {
                ("> ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default())
            };

            let bar_style = if progress >= target_len {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Cyan)
            };

            Line::from(vec![
                Span::raw(prefix),
                Span::styled(format!("{lane} "), label_style),
                Span::styled(FILLED.repeat(filled), bar_style),
                Span::styled(
                    EMPTY.repeat(bar_width.saturating_sub(filled)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" lanes ");
    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
