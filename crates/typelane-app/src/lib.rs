//! Application layer for typelane
//!
//! Pure state machines for the typing race client, completely decoupled
//! from terminal and network I/O. The runtime feeds [`AppEvent`]s (local
//! keystrokes and remote lane updates, merged into one ordered stream) into
//! [`App::handle`] and executes the returned [`AppAction`]s.
//!
//! # Components
//!
//! - [`App`]: screen dispatcher (menu, race) and connection state
//! - [`Race`]: the race reducer — typing transitions and lane progress
//! - [`Menu`]: main menu navigation
//! - [`KeyInput`]: terminal-agnostic keyboard input

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod event;
mod input;
mod menu;
mod race;

pub use action::AppAction;
pub use app::{App, ConnectionState, Screen};
pub use event::AppEvent;
pub use input::KeyInput;
pub use menu::{MENU_OPTIONS, Menu, MenuChoice};
pub use race::{Race, RaceMode};
