//! Client-side networking for typelane
//!
//! Two pieces: the QUIC [`transport`] that bridges frames between channels
//! and the wire, and the [`reporter`] that dispatches fire-and-forget
//! progress reports off the keystroke path.

#![deny(missing_docs)]

pub mod reporter;
pub mod transport;

pub use reporter::Reporter;
pub use transport::{ConnectedClient, TransportError, connect};
