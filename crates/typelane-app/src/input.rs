//! Terminal-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) so the reducers stay testable without a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character, space included.
    Char(char),
    /// Enter/Return key (menu select).
    Enter,
    /// Backspace key (delete last typed character).
    Backspace,
    /// Up arrow key (menu cursor).
    Up,
    /// Down arrow key (menu cursor).
    Down,
    /// Ctrl+C (quit).
    CtrlC,
    /// Ctrl+Q (quit).
    CtrlQ,
    /// Ctrl+B (back to menu).
    CtrlB,
}
