//! Main menu state machine.
//!
//! Two options: join a multiplayer lobby or race alone. Pure cursor state;
//! key interpretation lives in [`crate::App`].

/// Menu option labels, in cursor order.
pub const MENU_OPTIONS: [&str; 2] = ["Race others", "Race yourself"];

/// A selected menu option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Multiplayer race against a lobby.
    RaceOthers,
    /// Solo race, no network.
    RaceYourself,
}

/// Main menu cursor state.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    cursor: usize,
}

impl Menu {
    /// Create a menu with the cursor on the first option.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor up, saturating at the first option.
    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor down, saturating at the last option.
    pub fn move_down(&mut self) {
        if self.cursor < MENU_OPTIONS.len() - 1 {
            self.cursor += 1;
        }
    }

    /// Option under the cursor.
    #[must_use]
    pub fn choice(&self) -> MenuChoice {
        if self.cursor == 0 { MenuChoice::RaceOthers } else { MenuChoice::RaceYourself }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_saturates_at_both_ends() {
        let mut menu = Menu::new();
        menu.move_up();
        assert_eq!(menu.cursor(), 0);

        menu.move_down();
        menu.move_down();
        assert_eq!(menu.cursor(), MENU_OPTIONS.len() - 1);
    }

    #[test]
    fn choice_follows_cursor() {
        let mut menu = Menu::new();
        assert_eq!(menu.choice(), MenuChoice::RaceOthers);

        menu.move_down();
        assert_eq!(menu.choice(), MenuChoice::RaceYourself);
    }
}
