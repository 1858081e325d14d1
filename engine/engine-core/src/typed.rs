//! Typed Game trait: the rules oracle consumed by search and self-play.
//!
//! The engine never inspects a position directly. Everything it needs (legal
//! actions, successor positions, game-over detection, the numeric encoding
//! fed to the evaluator) is asked of a [`Game`] implementation, so any rules
//! library can sit behind it without touching the search.

use crate::metadata::GameMetadata;
use std::fmt;

/// Index into the fixed, position-independent action space of a game.
pub type Action = u16;

/// One of the two players of a zero-sum, alternating-move game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// The other player.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "white"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// Why a game ended without a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    Stalemate,
    FiftyMoveRule,
    ThreefoldRepetition,
    InsufficientMaterial,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DrawReason::Stalemate => "stalemate",
            DrawReason::FiftyMoveRule => "fifty-move rule",
            DrawReason::ThreefoldRepetition => "threefold repetition",
            DrawReason::InsufficientMaterial => "insufficient material",
        };
        f.write_str(name)
    }
}

/// Game status as reported by the rules oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Win(Side),
    Draw(DrawReason),
}

impl GameStatus {
    /// Whether the game has ended.
    #[inline]
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }

    /// Outcome value from `side`'s perspective: +1 win, -1 loss, 0 draw or ongoing.
    #[inline]
    pub fn value_for(self, side: Side) -> f32 {
        match self {
            GameStatus::Win(winner) => crate::game_utils::outcome_value(Some(winner), side),
            GameStatus::Ongoing | GameStatus::Draw(_) => 0.0,
        }
    }
}

/// Errors reported by a rules oracle or move encoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Action {action} is not legal in this position")]
    IllegalAction { action: Action },

    #[error("Action {action} is outside the action space of size {size}")]
    ActionOutOfRange { action: Action, size: usize },

    #[error("Move {0} cannot be expressed in the action space")]
    UnencodableMove(String),

    #[error("Game is already over")]
    GameOver,

    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}

/// Rules oracle for a two-player, alternating-move game.
///
/// Implementations must be pure: the same position always yields the same
/// legal actions, successor and status. Positions are value types; the oracle
/// never mutates a position it was handed.
///
/// # Example
///
/// ```rust,ignore
/// use engine_core::{Game, GameStatus};
///
/// fn play_first_legal<G: Game>(game: &G) -> G::Position {
///     let mut pos = game.initial_position();
///     while game.status(&pos) == GameStatus::Ongoing {
///         let action = game.legal_actions(&pos)[0];
///         pos = game.apply_action(&pos, action).unwrap();
///     }
///     pos
/// }
/// ```
pub trait Game: Send + Sync {
    /// Game state, cloned into search nodes and advanced via [`Game::apply_action`].
    type Position: Clone + Send + Sync;

    /// Display and encoding metadata (action space size, observation size).
    fn metadata(&self) -> GameMetadata;

    /// Size of the fixed action space. Policy vectors have exactly this length.
    fn action_space_size(&self) -> usize;

    /// Size of the encoded position produced by [`Game::encode_position`].
    fn observation_size(&self) -> usize;

    /// Standard starting position.
    fn initial_position(&self) -> Self::Position;

    /// Player to move at `pos`.
    fn side_to_move(&self, pos: &Self::Position) -> Side;

    /// Legal actions at `pos`, sorted ascending without duplicates.
    /// Empty when the game is over.
    fn legal_actions(&self, pos: &Self::Position) -> Vec<Action>;

    /// Successor position after playing `action`.
    fn apply_action(&self, pos: &Self::Position, action: Action) -> Result<Self::Position, EngineError>;

    /// Whether the game is over and how.
    fn status(&self, pos: &Self::Position) -> GameStatus;

    /// Append the numeric evaluator input for `pos` to `out`.
    fn encode_position(&self, pos: &Self::Position, out: &mut Vec<f32>);

    /// Human-readable notation of `action` at `pos`, used for game records.
    fn action_to_string(&self, pos: &Self::Position, action: Action) -> String {
        let _ = pos;
        action.to_string()
    }
}
