//! Main menu
//!
//! Displays the two race modes with a movable cursor.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use typelane_app::{App, MENU_OPTIONS, Screen};

const CURSOR_PREFIX: &str = "> ";
const PLAIN_PREFIX: &str = "  ";

/// Render the main menu.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let cursor = match app.screen() {
        Screen::Menu(menu) => menu.cursor(),
        Screen::Race(_) => return,
    };

    let items: Vec<ListItem> = MENU_OPTIONS
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let (prefix, style) = if index == cursor {
                (CURSOR_PREFIX, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                (PLAIN_PREFIX, Style::default())
            };

            ListItem::new(Line::from(vec![Span::raw(prefix), Span::styled(*option, style)]))
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" typelane ");
    let list = List::new(items).block(block);

    frame.render_widget(list, area);
}
