//! Core traits and types for the NeuroChess engine
//!
//! This crate provides the capability interfaces the search and self-play
//! layers are written against:
//! - `Game`: the rules oracle (legal actions, successors, game status, encoding)
//! - `Side`, `GameStatus`, `DrawReason`: two-player outcome vocabulary
//! - `GameMetadata`: encoding sizes for fixed-width training data
//! - `game_utils`: perspective and byte-packing helpers

pub mod game_utils;
pub mod metadata;
pub mod typed;

// Re-export main types for convenience
pub use metadata::GameMetadata;
pub use typed::{Action, DrawReason, EngineError, Game, GameStatus, Side};
