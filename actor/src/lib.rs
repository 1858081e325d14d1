//! NeuroChess self-play.
//!
//! Plays games of chess against itself with [`mcts`], turning every search
//! into a training example: the encoded position, the visit-count policy
//! target and, once the game is over, the result from the mover's side.
//!
//! - [`game`]: one game from the initial position to a result
//! - [`replay`]: value back-fill and the bounded example store
//! - [`actor`]: worker pool playing many games concurrently
//! - [`storage`]: SQLite export of finished games
//! - [`evaluator`]: model-free evaluators for running without a network

pub mod actor;
pub mod config;
pub mod evaluator;
pub mod game;
pub mod replay;
pub mod stats;
pub mod storage;

pub use actor::SelfPlayRunner;
pub use config::Config;
pub use evaluator::{EvaluatorKind, MaterialEvaluator};
pub use game::{GameRecord, GameResult, SelfPlayError, SelfPlayGame, SelfPlaySettings, Termination};
pub use replay::{finalize_examples, Batch, StoreError, TrainingExample, TrainingExampleStore};
