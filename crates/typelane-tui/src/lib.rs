//! Terminal UI for typelane
//!
//! A thin shell over [`typelane_app`]'s pure state machines that provides
//! the terminal-specific I/O: crossterm keyboard events, ratatui rendering,
//! and the QUIC connection from [`typelane_client`]. The [`runtime`] merges
//! keystrokes, server frames, and a periodic tick into one ordered event
//! stream with `tokio::select!`; all race logic lives in the app crate.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod runtime;
pub mod ui;

pub use runtime::{Runtime, RuntimeError};
pub use typelane_app::{App, AppAction, AppEvent, KeyInput};
