//! Actor - Self-play game runner for NeuroChess
//!
//! A process that:
//! 1. Plays chess games against itself, one MCTS search per ply
//! 2. Labels every recorded position with the final game result
//! 3. Keeps the most recent examples in a bounded in-memory store
//! 4. Exports finished games to `./data/replay.db` (SQLite)

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use actor::{Config, SelfPlayRunner};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    let games_description = if config.is_bounded() {
        config.num_games.to_string()
    } else {
        "unlimited".to_string()
    };
    info!(
        num_games = config.num_games,
        "Actor will play {} games with the {:?} evaluator", games_description, config.evaluator
    );

    let evaluator = config.evaluator.build(config.material_scale);
    let batch_size = config.batch_size;
    let runner = SelfPlayRunner::new(config, evaluator)?;

    // Setup graceful shutdown
    let shutdown = runner.shutdown_handle();
    let shutdown_handle = tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, stopping self-play...");
                shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
            }
            Err(e) => warn!("Failed to listen for ctrl+c: {}", e),
        }
    });

    let run_result = runner.run().await;
    shutdown_handle.abort();

    match run_result {
        Ok(snapshot) => {
            info!(
                games = snapshot.games_completed,
                white_wins = snapshot.white_wins,
                black_wins = snapshot.black_wins,
                draws = snapshot.draws,
                abandoned = snapshot.abandoned_games,
                "Actor completed successfully"
            );
            match runner.store().batches(batch_size) {
                Ok(batches) => info!(
                    examples = batches.iter().map(|b| b.len()).sum::<usize>(),
                    batches = batches.len(),
                    batch_size,
                    "Training examples ready"
                ),
                Err(e) => warn!("No training examples available: {}", e),
            }
            Ok(())
        }
        Err(e) => {
            error!("Actor failed: {}", e);
            Err(e)
        }
    }
}
