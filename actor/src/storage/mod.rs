//! Persistent export of finished self-play games.
//!
//! The in-memory [`TrainingExampleStore`](crate::replay::TrainingExampleStore)
//! is what training reads from; a sink additionally writes every finished
//! game to disk so the data outlives the process.
//!
//! # Usage
//!
//! ```rust,ignore
//! use actor::storage::create_sink;
//!
//! if let Some(sink) = create_sink("./data/replay.db")? {
//!     sink.store_metadata(&chess.metadata())?;
//!     sink.store_game("game-0", &record)?;
//! }
//! ```

mod sqlite;

pub use sqlite::SqliteExampleSink;

use anyhow::Result;
use engine_core::GameMetadata;

use crate::game::GameRecord;

/// Destination for finished games and their finalized examples.
///
/// Implementations must be thread-safe: every self-play worker writes
/// through the same sink.
pub trait ExampleSink: Send + Sync {
    /// Store or update the encoding metadata (upsert)
    fn store_metadata(&self, metadata: &GameMetadata) -> Result<()>;

    /// Store one finished game and all of its examples atomically
    fn store_game(&self, game_id: &str, record: &GameRecord) -> Result<()>;

    /// Total number of stored examples
    fn count(&self) -> Result<usize>;
}

/// Open the configured sink. An empty path disables the export.
pub fn create_sink(db_path: &str) -> Result<Option<Box<dyn ExampleSink>>> {
    if db_path.is_empty() {
        return Ok(None);
    }
    Ok(Some(Box::new(SqliteExampleSink::new(db_path)?)))
}
