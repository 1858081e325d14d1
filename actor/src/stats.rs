//! Actor statistics tracking and persistence.
//!
//! Counters are atomics so every self-play worker can update them without a
//! lock. A JSON snapshot is written to `<data_dir>/actor_stats.json` for
//! external monitoring.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, warn};

use crate::game::{GameRecord, GameResult, Termination};

/// Aggregated actor statistics, designed for lock-free updates.
#[derive(Debug)]
pub struct ActorStats {
    games_completed: AtomicU64,
    total_plies: AtomicU64,
    white_wins: AtomicU64,
    black_wins: AtomicU64,
    draws: AtomicU64,
    /// Draws forced by the ply limit (also counted in `draws`)
    move_limit_games: AtomicU64,
    /// Games abandoned after a search or store failure
    abandoned_games: AtomicU64,
    /// Finished games the export sink failed to write (still kept in the store)
    export_failures: AtomicU64,
    examples_stored: AtomicU64,
    examples_evicted: AtomicU64,
    /// MCTS stats: total searches performed
    mcts_searches: AtomicU64,
    /// MCTS stats: total evaluator time (microseconds)
    mcts_inference_us: AtomicU64,
    start_time: Instant,
    stats_path: String,
    /// Serialises writers of the stats file
    write_lock: Mutex<()>,
}

/// Serializable stats for JSON output.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActorStatsSnapshot {
    pub games_completed: u64,
    pub total_plies: u64,
    pub white_wins: u64,
    pub black_wins: u64,
    pub draws: u64,
    pub move_limit_games: u64,
    pub abandoned_games: u64,
    pub export_failures: u64,
    pub examples_stored: u64,
    pub examples_evicted: u64,
    pub avg_game_length: f64,
    pub games_per_second: f64,
    pub runtime_seconds: f64,
    pub mcts_avg_inference_us: f64,
    pub timestamp: u64,
}

impl ActorStats {
    /// Create new stats tracker writing into `data_dir`.
    pub fn new(data_dir: &str) -> Self {
        let stats_path = format!("{}/actor_stats.json", data_dir);

        // Ensure data directory exists
        if let Err(e) = fs::create_dir_all(data_dir) {
            warn!("Failed to create data directory: {}", e);
        }

        Self {
            games_completed: AtomicU64::new(0),
            total_plies: AtomicU64::new(0),
            white_wins: AtomicU64::new(0),
            black_wins: AtomicU64::new(0),
            draws: AtomicU64::new(0),
            move_limit_games: AtomicU64::new(0),
            abandoned_games: AtomicU64::new(0),
            export_failures: AtomicU64::new(0),
            examples_stored: AtomicU64::new(0),
            examples_evicted: AtomicU64::new(0),
            mcts_searches: AtomicU64::new(0),
            mcts_inference_us: AtomicU64::new(0),
            start_time: Instant::now(),
            stats_path,
            write_lock: Mutex::new(()),
        }
    }

    /// Record a finished game and its search stats.
    pub fn record_game(&self, record: &GameRecord) {
        self.games_completed.fetch_add(1, Ordering::Relaxed);
        self.total_plies
            .fetch_add(record.plies as u64, Ordering::Relaxed);

        let outcome = match record.result {
            GameResult::WhiteWins => &self.white_wins,
            GameResult::BlackWins => &self.black_wins,
            GameResult::Draw => &self.draws,
        };
        outcome.fetch_add(1, Ordering::Relaxed);
        if record.termination == Termination::MoveLimitReached {
            self.move_limit_games.fetch_add(1, Ordering::Relaxed);
        }

        self.record_mcts_stats(record.stats.search_count, record.stats.inference_time_us);
    }

    /// Record a game that was abandoned before it finished.
    pub fn record_abandoned(&self) {
        self.abandoned_games.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished game the export sink failed to write.
    pub fn record_export_failure(&self) {
        self.export_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record examples handed to the store and how many old ones it evicted.
    pub fn record_examples(&self, stored: usize, evicted: usize) {
        self.examples_stored
            .fetch_add(stored as u64, Ordering::Relaxed);
        self.examples_evicted
            .fetch_add(evicted as u64, Ordering::Relaxed);
    }

    /// Record MCTS performance for a game.
    pub fn record_mcts_stats(&self, searches: u32, inference_us: u64) {
        self.mcts_searches
            .fetch_add(searches as u64, Ordering::Relaxed);
        self.mcts_inference_us
            .fetch_add(inference_us, Ordering::Relaxed);
    }

    /// Finished plus abandoned games.
    pub fn games_attempted(&self) -> u64 {
        self.games_completed.load(Ordering::Relaxed) + self.abandoned_games.load(Ordering::Relaxed)
    }

    /// Get a snapshot of current stats.
    pub fn snapshot(&self) -> ActorStatsSnapshot {
        let games = self.games_completed.load(Ordering::Relaxed);
        let total_plies = self.total_plies.load(Ordering::Relaxed);
        let runtime = self.start_time.elapsed().as_secs_f64();
        let searches = self.mcts_searches.load(Ordering::Relaxed);
        let inference_us = self.mcts_inference_us.load(Ordering::Relaxed);

        let avg_game_length = if games > 0 {
            total_plies as f64 / games as f64
        } else {
            0.0
        };

        let games_per_second = if runtime > 0.0 {
            games as f64 / runtime
        } else {
            0.0
        };

        let mcts_avg_inference_us = if searches > 0 {
            inference_us as f64 / searches as f64
        } else {
            0.0
        };

        ActorStatsSnapshot {
            games_completed: games,
            total_plies,
            white_wins: self.white_wins.load(Ordering::Relaxed),
            black_wins: self.black_wins.load(Ordering::Relaxed),
            draws: self.draws.load(Ordering::Relaxed),
            move_limit_games: self.move_limit_games.load(Ordering::Relaxed),
            abandoned_games: self.abandoned_games.load(Ordering::Relaxed),
            export_failures: self.export_failures.load(Ordering::Relaxed),
            examples_stored: self.examples_stored.load(Ordering::Relaxed),
            examples_evicted: self.examples_evicted.load(Ordering::Relaxed),
            avg_game_length,
            games_per_second,
            runtime_seconds: runtime,
            mcts_avg_inference_us,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write stats to JSON file (atomic write-then-rename).
    pub fn write_stats(&self) {
        let snapshot = self.snapshot();

        let json = match serde_json::to_string_pretty(&snapshot) {
            Ok(j) => j,
            Err(e) => {
                warn!("Failed to serialize actor stats: {}", e);
                return;
            }
        };

        let Ok(_guard) = self.write_lock.lock() else {
            warn!("Stats write lock poisoned, skipping write");
            return;
        };

        // Write to temp file then rename (atomic on most filesystems)
        let temp_path = format!("{}.tmp", self.stats_path);
        match fs::File::create(&temp_path) {
            Ok(mut file) => {
                if let Err(e) = file.write_all(json.as_bytes()) {
                    warn!("Failed to write actor stats: {}", e);
                    return;
                }
            }
            Err(e) => {
                warn!("Failed to create temp stats file: {}", e);
                return;
            }
        }

        if let Err(e) = fs::rename(&temp_path, &self.stats_path) {
            warn!("Failed to rename stats file: {}", e);
            let _ = fs::remove_file(&temp_path);
            return;
        }

        debug!("Wrote actor stats to {}", self.stats_path);
    }

    pub fn stats_path(&self) -> &str {
        &self.stats_path
    }
}
