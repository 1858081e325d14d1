//! Default configuration values loaded from config.defaults.toml.
//!
//! The file is embedded at compile time so every binary shares one source of
//! default values, whether or not a config.toml is present at runtime.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    self_play: SelfPlayDefaults,
    replay: ReplayDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_simulations: u32,
    c_puct: f64,
    default_q: f64,
    temperature: f64,
    temp_threshold: u32,
    late_temperature: f64,
    root_noise: bool,
    dirichlet_alpha: f64,
    dirichlet_weight: f64,
}

#[derive(Debug, Deserialize)]
struct SelfPlayDefaults {
    num_games: u64,
    num_workers: usize,
    max_plies: u32,
    move_retries: u32,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct ReplayDefaults {
    capacity: usize,
    batch_size: usize,
    db_path: String,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// MCTS
pub fn num_simulations() -> u32 {
    DEFAULTS.mcts.num_simulations
}
pub fn c_puct() -> f64 {
    DEFAULTS.mcts.c_puct
}
pub fn default_q() -> f64 {
    DEFAULTS.mcts.default_q
}
pub fn temperature() -> f64 {
    DEFAULTS.mcts.temperature
}
pub fn temp_threshold() -> u32 {
    DEFAULTS.mcts.temp_threshold
}
pub fn late_temperature() -> f64 {
    DEFAULTS.mcts.late_temperature
}
pub fn root_noise() -> bool {
    DEFAULTS.mcts.root_noise
}
pub fn dirichlet_alpha() -> f64 {
    DEFAULTS.mcts.dirichlet_alpha
}
pub fn dirichlet_weight() -> f64 {
    DEFAULTS.mcts.dirichlet_weight
}

// Self-play
pub fn num_games() -> u64 {
    DEFAULTS.self_play.num_games
}
pub fn num_workers() -> usize {
    DEFAULTS.self_play.num_workers
}
pub fn max_plies() -> u32 {
    DEFAULTS.self_play.max_plies
}
pub fn move_retries() -> u32 {
    DEFAULTS.self_play.move_retries
}
pub fn seed() -> u64 {
    DEFAULTS.self_play.seed
}

// Replay
pub fn replay_capacity() -> usize {
    DEFAULTS.replay.capacity
}
pub fn batch_size() -> usize {
    DEFAULTS.replay.batch_size
}
pub fn db_path() -> &'static str {
    &DEFAULTS.replay.db_path
}
