//! Tests for the configuration module.

use super::*;
use std::io::Write;

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.data_dir, "./data");
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.self_play.num_games, 100);
    assert_eq!(config.self_play.num_workers, 4);
    assert_eq!(config.replay.capacity, 100_000);
}

#[test]
fn test_mcts_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.mcts.num_simulations, 100);
    assert!((config.mcts.c_puct - 1.0).abs() < f64::EPSILON);
    assert!(config.mcts.default_q.abs() < f64::EPSILON);
    assert!((config.mcts.temperature - 1.0).abs() < f64::EPSILON);
    assert_eq!(config.mcts.temp_threshold, 30);
    assert!(config.mcts.late_temperature.abs() < f64::EPSILON);
    assert!(config.mcts.root_noise);
    assert!((config.mcts.dirichlet_alpha - 0.3).abs() < f64::EPSILON);
    assert!((config.mcts.dirichlet_weight - 0.25).abs() < f64::EPSILON);
}

#[test]
fn test_self_play_and_replay_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.self_play.max_plies, 400);
    assert_eq!(config.self_play.move_retries, 3);
    assert_eq!(config.self_play.seed, 42);
    assert_eq!(config.replay.batch_size, 32);
    assert_eq!(config.replay.db_path, "./data/replay.db");
}

#[test]
fn test_env_overrides() {
    std::env::set_var("NEUROCHESS_MCTS_NUM_SIMULATIONS", "7");
    std::env::set_var("NEUROCHESS_MCTS_ROOT_NOISE", "false");
    std::env::set_var("NEUROCHESS_REPLAY_DB_PATH", "");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.mcts.num_simulations, 7);
    assert!(!config.mcts.root_noise);
    assert_eq!(config.replay.db_path, "");

    std::env::remove_var("NEUROCHESS_MCTS_NUM_SIMULATIONS");
    std::env::remove_var("NEUROCHESS_MCTS_ROOT_NOISE");
    std::env::remove_var("NEUROCHESS_REPLAY_DB_PATH");
}

#[test]
fn test_invalid_env_override_is_ignored() {
    std::env::set_var("NEUROCHESS_SELF_PLAY_MAX_PLIES", "lots");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.self_play.max_plies, 400);

    std::env::remove_var("NEUROCHESS_SELF_PLAY_MAX_PLIES");
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
data_dir = "/custom/data"

[mcts]
num_simulations = 800
temp_threshold = 0

[self_play]
num_workers = 16
seed = 7

[replay]
capacity = 500
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.data_dir, "/custom/data");
    assert_eq!(config.mcts.num_simulations, 800);
    assert_eq!(config.mcts.temp_threshold, 0);
    assert_eq!(config.self_play.num_workers, 16);
    assert_eq!(config.self_play.seed, 7);
    assert_eq!(config.replay.capacity, 500);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[mcts]
c_puct = 2.5
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert!((config.mcts.c_puct - 2.5).abs() < f64::EPSILON);
    assert_eq!(config.mcts.num_simulations, 100); // Default
    assert_eq!(config.common.log_level, "info"); // Default
    assert_eq!(config.replay.batch_size, 32); // Default
}

#[test]
fn test_load_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[self_play]\nmax_plies = 120").unwrap();

    let config = load_from_path(file.path());
    assert_eq!(config.self_play.max_plies, 120);
    assert_eq!(config.self_play.num_workers, 4);
}

#[test]
fn test_malformed_file_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[mcts\nnum_simulations = ").unwrap();

    let config = load_from_path(file.path());
    assert_eq!(config.replay.capacity, 100_000);
}

#[test]
fn test_config_clone() {
    let config = CentralConfig::default();
    let cloned = config.clone();
    assert_eq!(config.common.data_dir, cloned.common.data_dir);
    assert_eq!(config.self_play.seed, cloned.self_play.seed);
}
