//! Self-play runner: a pool of blocking workers playing independent games
//!
//! Each worker claims the next game index from a shared counter, plays the
//! game with its own RNG (seeded from `seed + index`) and its own search
//! trees, then hands the finished game to the shared store and sink. Nothing
//! but the evaluator, the store, the sink and the counters is shared.

use anyhow::{anyhow, Context, Result};
use engine_core::Game;
use games_chess::Chess;
use indicatif::{ProgressBar, ProgressStyle};
use mcts::Evaluator;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::game::{GameRecord, SelfPlayError, SelfPlayGame, SelfPlaySettings};
use crate::replay::{finalize_examples, TrainingExampleStore};
use crate::stats::{ActorStats, ActorStatsSnapshot};
use crate::storage::{create_sink, ExampleSink};

/// Get the current resident set size (RSS) in MB from /proc/self/status.
/// Returns None if unable to read (e.g., on non-Linux systems).
fn get_rss_mb() -> Option<f64> {
    let contents = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = contents.lines().find(|line| line.starts_with("VmRSS:"))?;
    // Format: "VmRSS:    12345 kB"
    let kb: f64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb / 1024.0)
}

/// State shared by every worker.
struct Shared {
    config: Config,
    settings: SelfPlaySettings,
    chess: Chess,
    evaluator: Arc<dyn Evaluator>,
    store: Arc<TrainingExampleStore>,
    sink: Option<Box<dyn ExampleSink>>,
    stats: ActorStats,
    next_game: AtomicU64,
    shutdown: Arc<AtomicBool>,
    progress: Option<ProgressBar>,
}

pub struct SelfPlayRunner {
    shared: Arc<Shared>,
}

impl SelfPlayRunner {
    /// Build a runner from validated configuration.
    pub fn new(config: Config, evaluator: Arc<dyn Evaluator>) -> Result<Self> {
        let chess = Chess::new();
        let metadata = chess.metadata();
        info!(
            "Loaded game config for {}: {} actions, {} obs size",
            metadata.env_id, metadata.num_actions, metadata.obs_size
        );

        let store = TrainingExampleStore::new(
            config.replay_capacity,
            metadata.obs_size,
            metadata.num_actions,
        )
        .context("Failed to create training example store")?;

        let sink = create_sink(&config.replay_db_path)
            .with_context(|| format!("Failed to open {}", config.replay_db_path))?;
        match &sink {
            Some(sink) => {
                // Makes the export self-describing for the trainer
                sink.store_metadata(&metadata)?;
                info!("Exporting games to {}", config.replay_db_path);
            }
            None => info!("SQLite export disabled"),
        }

        let settings = config.self_play_settings();
        info!(
            "MCTS config: {} simulations, c_puct={}, root_noise={}, temp_threshold={} (0=disabled)",
            settings.mcts.num_simulations,
            settings.mcts.c_puct,
            settings.mcts.root_noise,
            settings.temp_threshold
        );

        let progress = if config.is_bounded() && std::io::IsTerminal::is_terminal(&std::io::stderr())
        {
            let pb = ProgressBar::new(config.num_games);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        Ok(Self {
            shared: Arc::new(Shared {
                stats: ActorStats::new(&config.data_dir),
                config,
                settings,
                chess,
                evaluator,
                store: Arc::new(store),
                sink,
                next_game: AtomicU64::new(0),
                shutdown: Arc::new(AtomicBool::new(false)),
                progress,
            }),
        })
    }

    /// Flag that stops the workers between simulations and plies.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shared.shutdown)
    }

    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Relaxed);
        info!("Shutdown signal set");
    }

    /// The store finished games are appended to.
    pub fn store(&self) -> Arc<TrainingExampleStore> {
        Arc::clone(&self.shared.store)
    }

    /// Play games until the configured count is reached or shutdown is requested.
    pub async fn run(&self) -> Result<ActorStatsSnapshot> {
        let initial_rss = get_rss_mb().unwrap_or(0.0);
        let num_workers = self.shared.config.num_workers;
        info!(
            num_games = self.shared.config.num_games,
            num_workers,
            initial_rss_mb = format!("{:.1}", initial_rss),
            "Self-play starting"
        );

        let workers: Vec<_> = (0..num_workers)
            .map(|worker_id| {
                let shared = Arc::clone(&self.shared);
                tokio::task::spawn_blocking(move || shared.worker_loop(worker_id))
            })
            .collect();

        for worker in workers {
            worker
                .await
                .map_err(|e| anyhow!("Self-play worker panicked: {}", e))?;
        }

        if let Some(pb) = &self.shared.progress {
            pb.finish_with_message("done");
        }
        self.shared.stats.write_stats();

        let final_rss = get_rss_mb().unwrap_or(0.0);
        info!(
            "Self-play stopped (final RSS: {:.1} MB, growth: {:.1} MB)",
            final_rss,
            final_rss - initial_rss
        );
        Ok(self.shared.stats.snapshot())
    }
}

impl Shared {
    fn worker_loop(&self, worker_id: usize) {
        debug!(worker_id, "Worker started");

        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            let index = self.next_game.fetch_add(1, Ordering::Relaxed);
            if self.config.is_bounded() && index >= self.config.num_games {
                break;
            }

            let start = Instant::now();
            let seed = self.config.seed.wrapping_add(index);
            let mut game = SelfPlayGame::new(&self.chess, &*self.evaluator, &self.settings, seed);

            match game.play(&self.shutdown) {
                Ok(record) => {
                    let elapsed = start.elapsed().as_secs_f64();
                    if let Err(e) = self.finish_game(index, record, elapsed) {
                        error!(game = index, "Failed to store game: {:#}", e);
                        self.stats.record_abandoned();
                    }
                }
                Err(SelfPlayError::Cancelled) => {
                    debug!(worker_id, game = index, "Game cancelled");
                    break;
                }
                Err(e) => {
                    error!(game = index, "Game abandoned: {}", e);
                    self.stats.record_abandoned();
                }
            }
        }

        debug!(worker_id, "Worker stopped");
    }

    fn finish_game(&self, index: u64, mut record: GameRecord, elapsed: f64) -> Result<()> {
        let game_id = format!("game-{}-{}", self.config.seed, index);
        record.examples = finalize_examples(std::mem::take(&mut record.examples), record.result);

        debug!(
            game = index,
            plies = record.plies,
            result = %record.result,
            termination = %record.termination,
            duration = elapsed,
            "Game completed"
        );

        // The export is optional; a failed write must not cost the store the game
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.store_game(&game_id, &record) {
                self.stats.record_export_failure();
                error!(game = index, "Failed to export game {}: {:#}", game_id, e);
            }
        }

        let stored = record.examples.len();
        let evicted = self.store.append_game(std::mem::take(&mut record.examples))?;
        self.stats.record_examples(stored, evicted);
        self.stats.record_game(&record);
        self.stats.write_stats();
        let retained = self.store.len()?;

        if let Some(pb) = &self.progress {
            pb.inc(1);
        }

        let done = self.stats.games_attempted();
        if self.config.log_interval > 0 && done % self.config.log_interval == 0 {
            let rss_info = get_rss_mb()
                .map(|mb| format!(", RSS: {:.1} MB", mb))
                .unwrap_or_default();
            let log = || {
                info!(
                    "Completed {} games (last: {} plies, {}, {:.2}s{}), {} examples retained",
                    done,
                    record.plies,
                    record.result,
                    elapsed,
                    rss_info,
                    retained
                );
                record.stats.log_summary(index);
            };
            // Suspend progress bar while logging to avoid visual glitches
            match &self.progress {
                Some(pb) => pb.suspend(log),
                None => log(),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{EvaluatorKind, MaterialEvaluator};
    use clap::Parser;
    use games_chess::{NUM_ACTIONS, OBS_SIZE};
    use mcts::UniformEvaluator;
    use tempfile::tempdir;

    fn test_config(dir: &tempfile::TempDir, num_games: u64) -> Config {
        let mut config = Config::parse_from(["actor"]);
        config.data_dir = dir.path().to_str().unwrap().into();
        config.replay_db_path = dir.path().join("replay.db").to_str().unwrap().into();
        config.evaluator = EvaluatorKind::Uniform;
        config.num_games = num_games;
        config.num_workers = 2;
        config.num_simulations = 4; // Fewer for tests
        config.max_plies = 6;
        config.replay_capacity = 1000;
        config.log_interval = 1;
        config
    }

    #[tokio::test]
    async fn test_runner_plays_requested_games() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir, 3);
        let runner = SelfPlayRunner::new(config, Arc::new(UniformEvaluator::new())).unwrap();

        let snapshot = runner.run().await.unwrap();
        assert_eq!(snapshot.games_completed, 3);
        assert_eq!(snapshot.abandoned_games, 0);
        assert!(snapshot.total_plies > 0 && snapshot.total_plies <= 18);

        // Every ply produced exactly one finalized example
        let store = runner.store();
        assert_eq!(store.len().unwrap() as u64, snapshot.total_plies);
        assert_eq!(snapshot.examples_stored, snapshot.total_plies);
        let examples = store.snapshot().unwrap();
        assert!(examples.iter().all(|e| e.is_finalized()));
        assert!(examples.iter().all(|e| e.position.len() == OBS_SIZE));
        assert!(examples.iter().all(|e| e.policy.len() == NUM_ACTIONS));

        let sink = runner.shared.sink.as_ref().unwrap();
        assert_eq!(sink.count().unwrap() as u64, snapshot.total_plies);
        assert!(std::path::Path::new(runner.shared.stats.stats_path()).exists());
    }

    /// Export that fails every game write.
    struct BrokenSink;

    impl ExampleSink for BrokenSink {
        fn store_metadata(&self, _metadata: &engine_core::GameMetadata) -> Result<()> {
            Ok(())
        }
        fn store_game(&self, game_id: &str, _record: &GameRecord) -> Result<()> {
            Err(anyhow!("disk full while writing {}", game_id))
        }
        fn count(&self) -> Result<usize> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_export_failure_keeps_game_in_store() {
        let dir = tempdir().unwrap();
        let mut config = test_config(&dir, 3);
        config.replay_db_path = String::new();
        let mut runner = SelfPlayRunner::new(config, Arc::new(UniformEvaluator::new())).unwrap();
        Arc::get_mut(&mut runner.shared).unwrap().sink = Some(Box::new(BrokenSink));

        let snapshot = runner.run().await.unwrap();
        assert_eq!(snapshot.games_completed, 3);
        assert_eq!(snapshot.abandoned_games, 0);
        assert_eq!(snapshot.export_failures, 3);
        assert_eq!(runner.shared.stats.games_attempted(), 3);
        assert_eq!(runner.store().len().unwrap() as u64, snapshot.total_plies);
        assert_eq!(snapshot.examples_stored, snapshot.total_plies);
    }

    #[tokio::test]
    async fn test_store_capacity_bounds_retained_examples() {
        let dir = tempdir().unwrap();
        let mut config = test_config(&dir, 4);
        config.replay_capacity = 5;
        config.replay_db_path = String::new();
        let runner = SelfPlayRunner::new(config, Arc::new(MaterialEvaluator::default())).unwrap();

        let snapshot = runner.run().await.unwrap();
        assert!(runner.shared.sink.is_none());
        assert_eq!(runner.store().len().unwrap() as u64, snapshot.total_plies.min(5));
        assert_eq!(
            snapshot.examples_evicted,
            snapshot.total_plies.saturating_sub(5)
        );
    }

    #[tokio::test]
    async fn test_shutdown_before_run_plays_nothing() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir, 0); // Unlimited
        let runner = SelfPlayRunner::new(config, Arc::new(UniformEvaluator::new())).unwrap();

        runner.shutdown();
        let snapshot = runner.run().await.unwrap();
        assert_eq!(snapshot.games_completed, 0);
        assert!(runner.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_unlimited_run_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir, 0);
        let runner = SelfPlayRunner::new(config, Arc::new(UniformEvaluator::new())).unwrap();
        let handle = runner.shutdown_handle();

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            handle.store(true, Ordering::Relaxed);
        });

        let snapshot = runner.run().await.unwrap();
        stopper.await.unwrap();
        assert_eq!(snapshot.abandoned_games, 0);
        assert_eq!(runner.store().len().unwrap() as u64, snapshot.total_plies);
    }
}
