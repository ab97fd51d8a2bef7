//! Core domain types for typelane
//!
//! Shared primitives used by the client, server, and UI crates: the fixed
//! set of race [`Lane`]s and target-sentence selection. No I/O, no async.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod lane;
mod sentence;

pub use lane::{LANE_COUNT, Lane};
pub use sentence::{DEFAULT_WORD_COUNT, random_sentence, sentence_from_rng};
