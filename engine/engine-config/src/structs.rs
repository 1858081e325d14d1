//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_num_sims() -> u32 {
    defaults::num_simulations()
}
fn d_c_puct() -> f64 {
    defaults::c_puct()
}
fn d_default_q() -> f64 {
    defaults::default_q()
}
fn d_temperature() -> f64 {
    defaults::temperature()
}
fn d_temp_threshold() -> u32 {
    defaults::temp_threshold()
}
fn d_late_temperature() -> f64 {
    defaults::late_temperature()
}
fn d_root_noise() -> bool {
    defaults::root_noise()
}
fn d_dirichlet_alpha() -> f64 {
    defaults::dirichlet_alpha()
}
fn d_dirichlet_weight() -> f64 {
    defaults::dirichlet_weight()
}
fn d_num_games() -> u64 {
    defaults::num_games()
}
fn d_num_workers() -> usize {
    defaults::num_workers()
}
fn d_max_plies() -> u32 {
    defaults::max_plies()
}
fn d_move_retries() -> u32 {
    defaults::move_retries()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_capacity() -> usize {
    defaults::replay_capacity()
}
fn d_batch_size() -> usize {
    defaults::batch_size()
}
fn d_db_path() -> String {
    defaults::db_path().into()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub self_play: SelfPlayConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// Search parameters used for every self-play move.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_c_puct")]
    pub c_puct: f64,
    #[serde(default = "d_default_q")]
    pub default_q: f64,
    #[serde(default = "d_temperature")]
    pub temperature: f64,
    /// Ply at which `late_temperature` takes over. 0 keeps `temperature` all game.
    #[serde(default = "d_temp_threshold")]
    pub temp_threshold: u32,
    #[serde(default = "d_late_temperature")]
    pub late_temperature: f64,
    #[serde(default = "d_root_noise")]
    pub root_noise: bool,
    #[serde(default = "d_dirichlet_alpha")]
    pub dirichlet_alpha: f64,
    #[serde(default = "d_dirichlet_weight")]
    pub dirichlet_weight: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::num_simulations(),
            c_puct: defaults::c_puct(),
            default_q: defaults::default_q(),
            temperature: defaults::temperature(),
            temp_threshold: defaults::temp_threshold(),
            late_temperature: defaults::late_temperature(),
            root_noise: defaults::root_noise(),
            dirichlet_alpha: defaults::dirichlet_alpha(),
            dirichlet_weight: defaults::dirichlet_weight(),
        }
    }
}

/// Self-play orchestration configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelfPlayConfig {
    /// Games to play; 0 = run until interrupted.
    #[serde(default = "d_num_games")]
    pub num_games: u64,
    #[serde(default = "d_num_workers")]
    pub num_workers: usize,
    #[serde(default = "d_max_plies")]
    pub max_plies: u32,
    #[serde(default = "d_move_retries")]
    pub move_retries: u32,
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            num_games: defaults::num_games(),
            num_workers: defaults::num_workers(),
            max_plies: defaults::max_plies(),
            move_retries: defaults::move_retries(),
            seed: defaults::seed(),
        }
    }
}

/// Training example store configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReplayConfig {
    #[serde(default = "d_capacity")]
    pub capacity: usize,
    #[serde(default = "d_batch_size")]
    pub batch_size: usize,
    /// SQLite export path. Empty disables the export.
    #[serde(default = "d_db_path")]
    pub db_path: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::replay_capacity(),
            batch_size: defaults::batch_size(),
            db_path: defaults::db_path().into(),
        }
    }
}
