//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic used by
//! the self-play actor and by tooling around the engine crates.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`NEUROCHESS_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! Command-line flags of the actor binary sit above all three.
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! NEUROCHESS_<SECTION>_<KEY>=value
//!
//! Examples:
//!     NEUROCHESS_COMMON_DATA_DIR=/data
//!     NEUROCHESS_MCTS_NUM_SIMULATIONS=400
//!     NEUROCHESS_MCTS_ROOT_NOISE=false
//!     NEUROCHESS_SELF_PLAY_NUM_WORKERS=8
//!     NEUROCHESS_REPLAY_DB_PATH=
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_PATH_ENV, CONFIG_SEARCH_PATHS,
};
pub use structs::*;

#[cfg(test)]
mod tests;
