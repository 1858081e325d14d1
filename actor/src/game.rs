//! Self-play orchestration for a single game.
//!
//! A [`SelfPlayGame`] runs one MCTS search per ply, records a pending
//! training example for every decision and advances the position until the
//! rules oracle reports a result or the ply limit is hit.
//!
//! ```text
//! InProgress ──► Checkmate
//!            ├─► Stalemate
//!            ├─► DrawByRule(reason)
//!            └─► MoveLimitReached (scored as a draw)
//! ```

use engine_core::{DrawReason, Game, GameStatus, Side};
use mcts::{Evaluator, MctsConfig, MctsSearch, SearchError, SearchResult, SearchStats};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::replay::TrainingExample;

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    pub fn winner(self) -> Option<Side> {
        match self {
            GameResult::WhiteWins => Some(Side::White),
            GameResult::BlackWins => Some(Side::Black),
            GameResult::Draw => None,
        }
    }

    /// +1 / -1 / 0 from `side`'s perspective.
    pub fn value_for(self, side: Side) -> f32 {
        engine_core::game_utils::outcome_value(self.winner(), side)
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::WhiteWins => f.write_str("1-0"),
            GameResult::BlackWins => f.write_str("0-1"),
            GameResult::Draw => f.write_str("1/2-1/2"),
        }
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Checkmate,
    Stalemate,
    DrawByRule(DrawReason),
    MoveLimitReached,
}

impl Termination {
    /// Map a game-over status to its termination and result.
    ///
    /// Returns `None` while the game is still in progress.
    pub fn from_status(status: GameStatus) -> Option<(Termination, GameResult)> {
        match status {
            GameStatus::Ongoing => None,
            GameStatus::Win(Side::White) => Some((Termination::Checkmate, GameResult::WhiteWins)),
            GameStatus::Win(Side::Black) => Some((Termination::Checkmate, GameResult::BlackWins)),
            GameStatus::Draw(DrawReason::Stalemate) => {
                Some((Termination::Stalemate, GameResult::Draw))
            }
            GameStatus::Draw(reason) => Some((Termination::DrawByRule(reason), GameResult::Draw)),
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Checkmate => f.write_str("checkmate"),
            Termination::Stalemate => f.write_str("stalemate"),
            Termination::DrawByRule(reason) => write!(f, "draw by {}", reason),
            Termination::MoveLimitReached => f.write_str("move limit reached"),
        }
    }
}

/// Errors that abandon a self-play game.
#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Search at ply {ply} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        ply: u32,
        attempts: u32,
        #[source]
        source: SearchError,
    },

    #[error("Self-play cancelled")]
    Cancelled,
}

/// Aggregated MCTS stats for one game.
#[derive(Debug, Clone, Default)]
pub struct GameStats {
    /// Number of MCTS searches performed, retries included
    pub search_count: u32,
    /// Total wall-clock time across all searches (microseconds)
    pub total_time_us: u64,
    /// Total time spent in tree selection (microseconds)
    pub selection_time_us: u64,
    /// Total time spent in the evaluator (microseconds)
    pub inference_time_us: u64,
    /// Total time spent expanding nodes (microseconds)
    pub expansion_time_us: u64,
    /// Total time spent in backpropagation (microseconds)
    pub backprop_time_us: u64,
    /// Total number of evaluator calls
    pub total_evals: u32,
    /// Total rules-oracle apply calls during search
    pub game_steps: u32,
    /// Total terminal nodes hit
    pub terminal_hits: u32,
    /// Expansions that fell back to uniform priors
    pub degenerate_priors: u32,
    /// Searches that were retried after an evaluator failure
    pub retries: u32,
}

impl GameStats {
    /// Add stats from a single MCTS search.
    pub fn add(&mut self, stats: &SearchStats) {
        self.search_count += 1;
        self.total_time_us += stats.total_time_us;
        self.selection_time_us += stats.selection_time_us;
        self.inference_time_us += stats.inference_time_us;
        self.expansion_time_us += stats.expansion_time_us;
        self.backprop_time_us += stats.backprop_time_us;
        self.total_evals += stats.total_evals;
        self.game_steps += stats.game_steps;
        self.terminal_hits += stats.terminal_hits;
        self.degenerate_priors += stats.degenerate_priors;
    }

    /// Log a summary of the game's search stats.
    pub fn log_summary(&self, game_index: u64) {
        if self.search_count == 0 || self.total_time_us == 0 {
            return;
        }

        let total = self.total_time_us as f64;
        let pct = |part: u64| format!("{:.1}%", part as f64 / total * 100.0);

        info!(
            game = game_index,
            searches = self.search_count,
            total_ms = format!("{:.1}", total / 1000.0),
            inference_pct = pct(self.inference_time_us),
            expansion_pct = pct(self.expansion_time_us),
            selection_pct = pct(self.selection_time_us),
            backprop_pct = pct(self.backprop_time_us),
            evals = self.total_evals,
            game_steps = self.game_steps,
            terminal_hits = self.terminal_hits,
            degenerate_priors = self.degenerate_priors,
            retries = self.retries,
            "MCTS game stats"
        );
    }
}

/// A finished self-play game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Moves played, in the oracle's notation (UCI for chess)
    pub moves: Vec<String>,
    /// One example per ply, value targets still unset
    pub examples: Vec<TrainingExample>,
    pub result: GameResult,
    pub termination: Termination,
    pub plies: u32,
    pub stats: GameStats,
}

/// Settings shared by every game a runner plays.
#[derive(Debug, Clone)]
pub struct SelfPlaySettings {
    /// Search configuration; its temperature is the opening temperature
    pub mcts: MctsConfig,
    /// Ply from which `late_temperature` is used. 0 disables the schedule.
    pub temp_threshold: u32,
    pub late_temperature: f32,
    pub max_plies: u32,
    /// Extra attempts per move after an evaluator failure
    pub move_retries: u32,
}

impl Default for SelfPlaySettings {
    fn default() -> Self {
        Self {
            mcts: MctsConfig::for_training(),
            temp_threshold: 30,
            late_temperature: 0.0,
            max_plies: 400,
            move_retries: 3,
        }
    }
}

impl SelfPlaySettings {
    /// Move-selection temperature at `ply`.
    pub fn temperature_at(&self, ply: u32) -> f32 {
        if self.temp_threshold > 0 && ply >= self.temp_threshold {
            self.late_temperature
        } else {
            self.mcts.temperature
        }
    }
}

/// Drives one complete game of self-play.
pub struct SelfPlayGame<'a, G: Game, E: Evaluator + ?Sized> {
    game: &'a G,
    evaluator: &'a E,
    settings: &'a SelfPlaySettings,
    rng: ChaCha20Rng,
    obs: Vec<f32>,
}

impl<'a, G: Game, E: Evaluator + ?Sized> SelfPlayGame<'a, G, E> {
    /// Create a game whose searches draw from an RNG seeded with `seed`.
    pub fn new(game: &'a G, evaluator: &'a E, settings: &'a SelfPlaySettings, seed: u64) -> Self {
        Self {
            game,
            evaluator,
            settings,
            rng: ChaCha20Rng::seed_from_u64(seed),
            obs: Vec::with_capacity(game.observation_size()),
        }
    }

    /// Play from the initial position until the game ends.
    ///
    /// `cancel` is checked before every ply and between simulations.
    pub fn play(&mut self, cancel: &AtomicBool) -> Result<GameRecord, SelfPlayError> {
        let mut position = self.game.initial_position();
        let mut moves = Vec::new();
        let mut examples = Vec::new();
        let mut stats = GameStats::default();
        let mut ply = 0u32;

        let (termination, result) = loop {
            if let Some(ended) = Termination::from_status(self.game.status(&position)) {
                break ended;
            }
            if ply >= self.settings.max_plies {
                break (Termination::MoveLimitReached, GameResult::Draw);
            }
            if cancel.load(Ordering::Relaxed) {
                return Err(SelfPlayError::Cancelled);
            }

            let search = self.search_with_retries(&position, ply, cancel, &mut stats)?;

            self.obs.clear();
            self.game.encode_position(&position, &mut self.obs);
            examples.push(TrainingExample::pending(
                self.obs.clone(),
                search.policy,
                self.game.side_to_move(&position),
                ply,
            ));

            let notation = self.game.action_to_string(&position, search.action);
            trace!(ply, mv = %notation, value = search.value, "Self-play move");
            position = self
                .game
                .apply_action(&position, search.action)
                .map_err(SearchError::from)?;
            moves.push(notation);
            ply += 1;
        };

        debug!(plies = ply, %result, %termination, "Self-play game finished");

        Ok(GameRecord {
            moves,
            examples,
            result,
            termination,
            plies: ply,
            stats,
        })
    }

    /// Search `position`, re-running the whole decision on evaluator failure.
    fn search_with_retries(
        &mut self,
        position: &G::Position,
        ply: u32,
        cancel: &AtomicBool,
        stats: &mut GameStats,
    ) -> Result<SearchResult, SelfPlayError> {
        let config = self
            .settings
            .mcts
            .clone()
            .with_temperature(self.settings.temperature_at(ply));
        let attempts = self.settings.move_retries + 1;

        let mut attempt = 1;
        loop {
            let outcome = MctsSearch::new(self.game, self.evaluator, config.clone(), position.clone())
                .and_then(|mut search| search.run_with_cancel(&mut self.rng, cancel));

            match outcome {
                Ok(result) => {
                    stats.add(&result.stats);
                    return Ok(result);
                }
                Err(SearchError::Cancelled) => return Err(SelfPlayError::Cancelled),
                Err(source @ SearchError::EvaluatorUnavailable(_)) => {
                    stats.search_count += 1;
                    if attempt >= attempts {
                        return Err(SelfPlayError::RetriesExhausted {
                            ply,
                            attempts,
                            source,
                        });
                    }
                    warn!(ply, attempt, error = %source, "Evaluator failed, retrying move");
                    stats.retries += 1;
                    attempt += 1;
                }
                Err(other) => return Err(other.into()),
            }
        }
    }
}
