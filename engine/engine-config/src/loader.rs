//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "NEUROCHESS_CONFIG";

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from a crate directory)
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by NEUROCHESS_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_PATH_ENV, path.display());
            return load_from_path(&path);
        }
        warn!(
            "{}={} not found, searching defaults",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// An unreadable or malformed file falls back to the built-in defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, f64, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(s) = std::env::var($key) {
            match s.parse() {
                Ok(v) => $config.$section.$field = v,
                Err(_) => warn!("Ignoring {}={:?}: not a valid value", $key, s),
            }
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: NEUROCHESS_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "NEUROCHESS_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "NEUROCHESS_COMMON_LOG_LEVEL");

    // MCTS
    env_override!(
        config,
        mcts.num_simulations,
        "NEUROCHESS_MCTS_NUM_SIMULATIONS",
        parse
    );
    env_override!(config, mcts.c_puct, "NEUROCHESS_MCTS_C_PUCT", parse);
    env_override!(config, mcts.default_q, "NEUROCHESS_MCTS_DEFAULT_Q", parse);
    env_override!(
        config,
        mcts.temperature,
        "NEUROCHESS_MCTS_TEMPERATURE",
        parse
    );
    env_override!(
        config,
        mcts.temp_threshold,
        "NEUROCHESS_MCTS_TEMP_THRESHOLD",
        parse
    );
    env_override!(
        config,
        mcts.late_temperature,
        "NEUROCHESS_MCTS_LATE_TEMPERATURE",
        parse
    );
    env_override!(config, mcts.root_noise, "NEUROCHESS_MCTS_ROOT_NOISE", parse);
    env_override!(
        config,
        mcts.dirichlet_alpha,
        "NEUROCHESS_MCTS_DIRICHLET_ALPHA",
        parse
    );
    env_override!(
        config,
        mcts.dirichlet_weight,
        "NEUROCHESS_MCTS_DIRICHLET_WEIGHT",
        parse
    );

    // Self-play
    env_override!(
        config,
        self_play.num_games,
        "NEUROCHESS_SELF_PLAY_NUM_GAMES",
        parse
    );
    env_override!(
        config,
        self_play.num_workers,
        "NEUROCHESS_SELF_PLAY_NUM_WORKERS",
        parse
    );
    env_override!(
        config,
        self_play.max_plies,
        "NEUROCHESS_SELF_PLAY_MAX_PLIES",
        parse
    );
    env_override!(
        config,
        self_play.move_retries,
        "NEUROCHESS_SELF_PLAY_MOVE_RETRIES",
        parse
    );
    env_override!(config, self_play.seed, "NEUROCHESS_SELF_PLAY_SEED", parse);

    // Replay
    env_override!(
        config,
        replay.capacity,
        "NEUROCHESS_REPLAY_CAPACITY",
        parse
    );
    env_override!(
        config,
        replay.batch_size,
        "NEUROCHESS_REPLAY_BATCH_SIZE",
        parse
    );
    env_override!(config, replay.db_path, "NEUROCHESS_REPLAY_DB_PATH");

    config
}
