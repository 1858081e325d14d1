//! SQLite backend for exported self-play games.
//!
//! Examples are stored with their position and policy as little-endian f32
//! blobs, next to a `game_metadata` table that makes the file
//! self-describing for the trainer.

use anyhow::{anyhow, bail, Result};
use engine_core::game_utils::encode_f32_slices;
use engine_core::{GameMetadata, Side};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use super::ExampleSink;
use crate::game::GameRecord;

/// SQLite-based example sink.
///
/// Uses a Mutex for thread-safety since rusqlite Connection is not Sync.
pub struct SqliteExampleSink {
    conn: Mutex<Connection>,
}

impl SqliteExampleSink {
    /// Open (or create) the database, initializing the schema if needed.
    pub fn new(db_path: &str) -> Result<Self> {
        // Create parent directories if they don't exist
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS games (
                game_id TEXT PRIMARY KEY,
                result TEXT NOT NULL,
                termination TEXT NOT NULL,
                plies INTEGER NOT NULL,
                moves TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS examples (
                id TEXT PRIMARY KEY,
                game_id TEXT NOT NULL,
                ply INTEGER NOT NULL,
                side_to_move TEXT NOT NULL,
                position BLOB NOT NULL,
                policy BLOB NOT NULL,
                value REAL NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        // Create index for per-game queries
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_examples_game ON examples(game_id)",
            [],
        )?;

        // Create game_metadata table to make database self-describing
        conn.execute(
            "CREATE TABLE IF NOT EXISTS game_metadata (
                env_id TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                board_width INTEGER NOT NULL,
                board_height INTEGER NOT NULL,
                num_actions INTEGER NOT NULL,
                num_planes INTEGER NOT NULL,
                obs_size INTEGER NOT NULL,
                player_count INTEGER NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))
    }
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::White => "white",
        Side::Black => "black",
    }
}

impl ExampleSink for SqliteExampleSink {
    fn store_metadata(&self, metadata: &GameMetadata) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO game_metadata
             (env_id, display_name, board_width, board_height, num_actions,
              num_planes, obs_size, player_count, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, CURRENT_TIMESTAMP)",
            params![
                metadata.env_id,
                metadata.display_name,
                metadata.board_width,
                metadata.board_height,
                metadata.num_actions,
                metadata.num_planes,
                metadata.obs_size,
                metadata.player_count,
            ],
        )?;
        Ok(())
    }

    fn store_game(&self, game_id: &str, record: &GameRecord) -> Result<()> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;

        tx.execute(
            "INSERT OR REPLACE INTO games
             (game_id, result, termination, plies, moves, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                game_id,
                record.result.to_string(),
                record.termination.to_string(),
                record.plies,
                record.moves.join(" "),
                timestamp,
            ],
        )?;

        // Prepare the INSERT statement once and reuse it for the whole game
        let mut stmt = tx.prepare_cached(
            "INSERT OR REPLACE INTO examples
             (id, game_id, ply, side_to_move, position, policy, value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;

        let mut position = Vec::new();
        let mut policy = Vec::new();
        for example in &record.examples {
            let Some(value) = example.value else {
                bail!(
                    "example at ply {} of game {} has no value target",
                    example.ply,
                    game_id
                );
            };

            position.clear();
            encode_f32_slices(&mut position, [example.position.as_slice()]);
            policy.clear();
            encode_f32_slices(&mut policy, [example.policy.as_slice()]);

            stmt.execute(params![
                format!("{}-ply-{}", game_id, example.ply),
                game_id,
                example.ply,
                side_name(example.side_to_move),
                position,
                policy,
                value,
            ])?;
        }

        // Drop stmt before commit to release borrow on tx
        drop(stmt);
        tx.commit()?;
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM examples", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameResult, GameStats, Termination};
    use crate::replay::{finalize_examples, TrainingExample};
    use engine_core::game_utils::decode_f32_slice;
    use tempfile::tempdir;

    fn record(plies: u32, finalized: bool) -> GameRecord {
        let examples: Vec<_> = (0..plies)
            .map(|ply| {
                let side = if ply % 2 == 0 { Side::White } else { Side::Black };
                TrainingExample::pending(vec![ply as f32, 0.5], vec![0.25; 4], side, ply)
            })
            .collect();
        let examples = if finalized {
            finalize_examples(examples, GameResult::BlackWins)
        } else {
            examples
        };
        GameRecord {
            moves: (0..plies).map(|i| format!("m{}", i)).collect(),
            examples,
            result: GameResult::BlackWins,
            termination: Termination::Checkmate,
            plies,
            stats: GameStats::default(),
        }
    }

    #[test]
    fn test_create_sink() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested/dir/test.db");
        let sink = SqliteExampleSink::new(db_path.to_str().unwrap());
        assert!(sink.is_ok());
        assert!(db_path.exists());
    }

    #[test]
    fn test_store_game_and_count() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let sink = SqliteExampleSink::new(db_path.to_str().unwrap()).unwrap();

        sink.store_game("g0", &record(4, true)).unwrap();
        assert_eq!(sink.count().unwrap(), 4);

        sink.store_game("g1", &record(3, true)).unwrap();
        assert_eq!(sink.count().unwrap(), 7);

        // Re-storing a game replaces its rows
        sink.store_game("g0", &record(4, true)).unwrap();
        assert_eq!(sink.count().unwrap(), 7);
    }

    #[test]
    fn test_blobs_and_values_round_trip() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let sink = SqliteExampleSink::new(db_path.to_str().unwrap()).unwrap();
        sink.store_game("g0", &record(2, true)).unwrap();

        let conn = sink.lock().unwrap();
        let (position, policy, value, side): (Vec<u8>, Vec<u8>, f32, String) = conn
            .query_row(
                "SELECT position, policy, value, side_to_move FROM examples WHERE id = 'g0-ply-1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(decode_f32_slice(&position), vec![1.0, 0.5]);
        assert_eq!(decode_f32_slice(&policy), vec![0.25; 4]);
        assert_eq!(value, 1.0); // Black to move, Black won
        assert_eq!(side, "black");

        let (result, moves): (String, String) = conn
            .query_row(
                "SELECT result, moves FROM games WHERE game_id = 'g0'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(result, "0-1");
        assert_eq!(moves, "m0 m1");
    }

    #[test]
    fn test_unfinalized_game_is_rolled_back() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let sink = SqliteExampleSink::new(db_path.to_str().unwrap()).unwrap();

        assert!(sink.store_game("g0", &record(3, false)).is_err());
        assert_eq!(sink.count().unwrap(), 0);
    }

    #[test]
    fn test_store_metadata() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let sink = SqliteExampleSink::new(db_path.to_str().unwrap()).unwrap();

        let metadata = GameMetadata::new("chess", "Chess")
            .with_board(8, 8)
            .with_actions(4864)
            .with_planes(18);
        sink.store_metadata(&metadata).unwrap();
        sink.store_metadata(&metadata).unwrap();

        let conn = sink.lock().unwrap();
        let (rows, num_actions, obs_size): (i64, i64, i64) = conn
            .query_row(
                "SELECT COUNT(*), MAX(num_actions), MAX(obs_size) FROM game_metadata",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(num_actions, 4864);
        assert_eq!(obs_size, 1152);
    }

    #[test]
    fn test_empty_path_disables_sink() {
        assert!(crate::storage::create_sink("").unwrap().is_none());
    }
}
