//! Configuration for the actor binary
//!
//! Defaults come from the central config (config.toml plus
//! `NEUROCHESS_<SECTION>_<KEY>` overrides). CLI arguments take highest priority.

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig};
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;

use crate::evaluator::{EvaluatorKind, DEFAULT_MATERIAL_SCALE};
use crate::game::SelfPlaySettings;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}
fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}
fn default_num_simulations() -> u32 {
    CENTRAL_CONFIG.mcts.num_simulations
}
fn default_c_puct() -> f64 {
    CENTRAL_CONFIG.mcts.c_puct
}
fn default_default_q() -> f64 {
    CENTRAL_CONFIG.mcts.default_q
}
fn default_temperature() -> f64 {
    CENTRAL_CONFIG.mcts.temperature
}
fn default_temp_threshold() -> u32 {
    CENTRAL_CONFIG.mcts.temp_threshold
}
fn default_late_temperature() -> f64 {
    CENTRAL_CONFIG.mcts.late_temperature
}
fn default_root_noise() -> bool {
    CENTRAL_CONFIG.mcts.root_noise
}
fn default_dirichlet_alpha() -> f64 {
    CENTRAL_CONFIG.mcts.dirichlet_alpha
}
fn default_dirichlet_weight() -> f64 {
    CENTRAL_CONFIG.mcts.dirichlet_weight
}
fn default_num_games() -> u64 {
    CENTRAL_CONFIG.self_play.num_games
}
fn default_num_workers() -> usize {
    CENTRAL_CONFIG.self_play.num_workers
}
fn default_max_plies() -> u32 {
    CENTRAL_CONFIG.self_play.max_plies
}
fn default_move_retries() -> u32 {
    CENTRAL_CONFIG.self_play.move_retries
}
fn default_seed() -> u64 {
    CENTRAL_CONFIG.self_play.seed
}
fn default_replay_capacity() -> usize {
    CENTRAL_CONFIG.replay.capacity
}
fn default_batch_size() -> usize {
    CENTRAL_CONFIG.replay.batch_size
}
fn default_replay_db_path() -> String {
    CENTRAL_CONFIG.replay.db_path.clone()
}

#[derive(Parser, Debug, Clone)]
#[command(name = "actor")]
#[command(about = "NeuroChess actor - MCTS self-play game runner")]
#[command(
    long_about = "Actor that plays chess games against itself with Monte Carlo Tree Search
and collects (position, policy target, value target) training examples.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Data directory for the stats file
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Log progress every N games (0 to disable)
    #[arg(long, default_value_t = 10)]
    pub log_interval: u64,

    /// Evaluator used by the search
    #[arg(long, value_enum, default_value_t = EvaluatorKind::Material)]
    pub evaluator: EvaluatorKind,

    /// Pawns of material advantage per unit of tanh input (material evaluator)
    #[arg(long, default_value_t = DEFAULT_MATERIAL_SCALE)]
    pub material_scale: f32,

    /// Number of MCTS simulations per move
    #[arg(long, default_value_t = default_num_simulations())]
    pub num_simulations: u32,

    /// PUCT exploration constant
    #[arg(long, default_value_t = default_c_puct())]
    pub c_puct: f64,

    /// Q assumed for unvisited children
    #[arg(long, default_value_t = default_default_q())]
    pub default_q: f64,

    /// Move-selection temperature for the opening plies
    #[arg(long, default_value_t = default_temperature())]
    pub temperature: f64,

    /// Ply from which late_temperature is used (0 to disable)
    #[arg(long, default_value_t = default_temp_threshold())]
    pub temp_threshold: u32,

    /// Move-selection temperature after temp_threshold
    #[arg(long, default_value_t = default_late_temperature())]
    pub late_temperature: f64,

    /// Mix Dirichlet noise into the root priors
    #[arg(long, default_value_t = default_root_noise(), action = clap::ArgAction::Set)]
    pub root_noise: bool,

    /// Dirichlet concentration for root noise
    #[arg(long, default_value_t = default_dirichlet_alpha())]
    pub dirichlet_alpha: f64,

    /// Weight of the noise in the root priors
    #[arg(long, default_value_t = default_dirichlet_weight())]
    pub dirichlet_weight: f64,

    /// Games to play (0 for unlimited)
    #[arg(long, default_value_t = default_num_games())]
    pub num_games: u64,

    /// Concurrent self-play workers
    #[arg(long, default_value_t = default_num_workers())]
    pub num_workers: usize,

    /// Ply limit per game; reaching it scores the game as a draw
    #[arg(long, default_value_t = default_max_plies())]
    pub max_plies: u32,

    /// Extra attempts per move after an evaluator failure
    #[arg(long, default_value_t = default_move_retries())]
    pub move_retries: u32,

    /// Base seed; game i searches with seed + i
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Training examples retained in memory
    #[arg(long, default_value_t = default_replay_capacity())]
    pub replay_capacity: usize,

    /// Batch size reported for training consumption
    #[arg(long, default_value_t = default_batch_size())]
    pub batch_size: usize,

    /// Path to SQLite export database (empty to disable)
    #[arg(long, default_value_t = default_replay_db_path())]
    pub replay_db_path: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.is_empty() {
            return Err(anyhow!("data_dir cannot be empty"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        if self.num_simulations == 0 {
            return Err(anyhow!("num_simulations must be greater than 0"));
        }

        if !(self.c_puct.is_finite() && self.c_puct >= 0.0) {
            return Err(anyhow!("c_puct must be a non-negative number"));
        }

        if !(self.default_q.is_finite() && (-1.0..=1.0).contains(&self.default_q)) {
            return Err(anyhow!("default_q must be within [-1, 1]"));
        }

        for (name, value) in [
            ("temperature", self.temperature),
            ("late_temperature", self.late_temperature),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(anyhow!("{} must be a non-negative number", name));
            }
        }

        if self.root_noise {
            if !(self.dirichlet_alpha.is_finite() && self.dirichlet_alpha > 0.0) {
                return Err(anyhow!("dirichlet_alpha must be greater than 0"));
            }
            if !(0.0..=1.0).contains(&self.dirichlet_weight) {
                return Err(anyhow!("dirichlet_weight must be within [0, 1]"));
            }
        }

        if !(self.material_scale.is_finite() && self.material_scale > 0.0) {
            return Err(anyhow!("material_scale must be greater than 0"));
        }

        if self.num_workers == 0 {
            return Err(anyhow!("num_workers must be greater than 0"));
        }

        if self.max_plies == 0 {
            return Err(anyhow!("max_plies must be greater than 0"));
        }

        if self.replay_capacity == 0 {
            return Err(anyhow!("replay_capacity must be greater than 0"));
        }

        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than 0"));
        }

        Ok(())
    }

    /// Search configuration for self-play moves.
    pub fn mcts_config(&self) -> MctsConfig {
        let config = MctsConfig::for_training()
            .with_simulations(self.num_simulations)
            .with_c_puct(self.c_puct as f32)
            .with_default_q(self.default_q as f32)
            .with_temperature(self.temperature as f32);

        if self.root_noise {
            config.with_root_noise(self.dirichlet_alpha as f32, self.dirichlet_weight as f32)
        } else {
            config.without_root_noise()
        }
    }

    pub fn self_play_settings(&self) -> SelfPlaySettings {
        SelfPlaySettings {
            mcts: self.mcts_config(),
            temp_threshold: self.temp_threshold,
            late_temperature: self.late_temperature as f32,
            max_plies: self.max_plies,
            move_retries: self.move_retries,
        }
    }

    /// Whether the run stops after a fixed number of games.
    pub fn is_bounded(&self) -> bool {
        self.num_games > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            data_dir: "../data".into(),
            log_level: "info".into(),
            log_interval: 10,
            evaluator: EvaluatorKind::Material,
            material_scale: 10.0,
            num_simulations: 100,
            c_puct: 1.0,
            default_q: 0.0,
            temperature: 1.0,
            temp_threshold: 30,
            late_temperature: 0.0,
            root_noise: true,
            dirichlet_alpha: 0.3,
            dirichlet_weight: 0.25,
            num_games: 10,
            num_workers: 2,
            max_plies: 400,
            move_retries: 3,
            seed: 42,
            replay_capacity: 1000,
            batch_size: 32,
            replay_db_path: "../data/replay.db".into(),
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "nope".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn validate_rejects_zero_simulations() {
        let mut cfg = base_config();
        cfg.num_simulations = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("num_simulations"));
    }

    #[test]
    fn validate_rejects_negative_temperature() {
        let mut cfg = base_config();
        cfg.late_temperature = -0.5;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("late_temperature"));
    }

    #[test]
    fn validate_rejects_bad_noise_only_when_enabled() {
        let mut cfg = base_config();
        cfg.dirichlet_weight = 1.5;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("dirichlet_weight"));

        cfg.root_noise = false;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_sizes() {
        for field in ["num_workers", "max_plies", "replay_capacity", "batch_size"] {
            let mut cfg = base_config();
            match field {
                "num_workers" => cfg.num_workers = 0,
                "max_plies" => cfg.max_plies = 0,
                "replay_capacity" => cfg.replay_capacity = 0,
                _ => cfg.batch_size = 0,
            }
            let err = cfg.validate().unwrap_err();
            assert!(err.to_string().contains(field), "{}", err);
        }
    }

    #[test]
    fn validate_accepts_unlimited_games() {
        let mut cfg = base_config();
        cfg.num_games = 0;
        assert!(cfg.validate().is_ok());
        assert!(!cfg.is_bounded());
    }

    #[test]
    fn mcts_config_carries_cli_values() {
        let mut cfg = base_config();
        cfg.num_simulations = 64;
        cfg.c_puct = 2.0;
        let mcts = cfg.mcts_config();
        assert_eq!(mcts.num_simulations, 64);
        assert!((mcts.c_puct - 2.0).abs() < 1e-6);
        assert!(mcts.root_noise);
        assert!((mcts.dirichlet_epsilon - 0.25).abs() < 1e-6);

        cfg.root_noise = false;
        assert!(!cfg.mcts_config().root_noise);
    }

    #[test]
    fn self_play_settings_carry_schedule() {
        let settings = base_config().self_play_settings();
        assert_eq!(settings.temp_threshold, 30);
        assert_eq!(settings.max_plies, 400);
        assert_eq!(settings.move_retries, 3);
        assert_eq!(settings.temperature_at(0), 1.0);
        assert_eq!(settings.temperature_at(30), 0.0);
    }

    #[test]
    fn cli_overrides_defaults() {
        let cfg = Config::try_parse_from([
            "actor",
            "--num-simulations",
            "12",
            "--root-noise",
            "false",
            "--evaluator",
            "uniform",
        ])
        .unwrap();
        assert_eq!(cfg.num_simulations, 12);
        assert!(!cfg.root_noise);
        assert_eq!(cfg.evaluator, EvaluatorKind::Uniform);
    }
}
