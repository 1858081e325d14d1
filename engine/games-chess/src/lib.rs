//! Chess for the NeuroChess engine
//!
//! Implements the [`Game`] rules oracle on top of the `chess` crate:
//! - [`ChessPosition`]: board plus fifty-move clock and repetition history
//! - [`MoveEncoder`]: chess moves <-> the 4864-slot action space
//! - [`encode_planes`]: 18x8x8 evaluator input in the mover's frame
//!
//! # Usage
//!
//! ```rust
//! use engine_core::{Game, GameStatus};
//! use games_chess::Chess;
//!
//! let chess = Chess::new();
//! let pos = chess.initial_position();
//! assert_eq!(chess.legal_actions(&pos).len(), 20);
//! assert_eq!(chess.status(&pos), GameStatus::Ongoing);
//! ```

pub mod encoder;
pub mod planes;
pub mod position;

pub use encoder::{MoveEncoder, NUM_ACTIONS};
pub use planes::{encode_planes, material_balance, NUM_PLANES, OBS_SIZE};
pub use position::{color_of, side_of, ChessPosition};

use engine_core::{Action, EngineError, Game, GameMetadata, GameStatus, Side};

/// Chess rules oracle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chess {
    encoder: MoveEncoder,
}

impl Chess {
    pub fn new() -> Self {
        Self {
            encoder: MoveEncoder::new(),
        }
    }

    pub fn encoder(&self) -> &MoveEncoder {
        &self.encoder
    }
}

impl Game for Chess {
    type Position = ChessPosition;

    fn metadata(&self) -> GameMetadata {
        GameMetadata::new("chess", "Chess")
            .with_board(8, 8)
            .with_actions(NUM_ACTIONS)
            .with_planes(NUM_PLANES)
            .with_players(vec!["White".to_string(), "Black".to_string()])
            .with_description("Standard chess with fifty-move and threefold repetition draws")
    }

    fn action_space_size(&self) -> usize {
        NUM_ACTIONS
    }

    fn observation_size(&self) -> usize {
        OBS_SIZE
    }

    fn initial_position(&self) -> ChessPosition {
        ChessPosition::default()
    }

    fn side_to_move(&self, pos: &ChessPosition) -> Side {
        pos.side_to_move()
    }

    fn legal_actions(&self, pos: &ChessPosition) -> Vec<Action> {
        if pos.status().is_over() {
            return Vec::new();
        }
        self.encoder
            .legal_moves(pos)
            .into_iter()
            .map(|(action, _)| action)
            .collect()
    }

    fn apply_action(&self, pos: &ChessPosition, action: Action) -> Result<ChessPosition, EngineError> {
        if pos.status().is_over() {
            return Err(EngineError::GameOver);
        }
        let mv = self.encoder.decode(action, pos)?;
        Ok(pos.play(mv))
    }

    fn status(&self, pos: &ChessPosition) -> GameStatus {
        pos.status()
    }

    fn encode_position(&self, pos: &ChessPosition, out: &mut Vec<f32>) {
        encode_planes(pos, out);
    }

    /// UCI notation, e.g. `e2e4` or `e7e8q`.
    fn action_to_string(&self, pos: &ChessPosition, action: Action) -> String {
        match self.encoder.decode(action, pos) {
            Ok(mv) => mv.to_string(),
            Err(_) => format!("#{action}"),
        }
    }
}
