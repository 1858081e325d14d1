//! Move encoding: chess moves <-> fixed action indices.
//!
//! Action layout (76 planes x 64 source squares, `action = plane * 64 + from`):
//!
//! | planes   | move type                                                        |
//! |----------|------------------------------------------------------------------|
//! | 0..56    | sliding: direction (N, NE, E, SE, S, SW, W, NW) * 7 + distance-1 |
//! | 56..64   | knight jumps, clockwise from NNE                                 |
//! | 64..76   | promotions: piece (Q, R, B, N) * 3 + file delta (-1, 0, +1)      |
//!
//! Squares are taken in the mover's frame: when Black is to move every rank is
//! mirrored (`r -> 7 - r`) before encoding and after decoding. The same action
//! index therefore means "the same move from the mover's side" for both colours,
//! and a pawn push is always a north move.

use chess::{ChessMove, File, MoveGen, Piece, Rank, Square};
use engine_core::{Action, EngineError, Side};

use crate::position::ChessPosition;

const SLIDING_DISTANCES: usize = 7;
const SLIDING_PLANES: usize = 8 * SLIDING_DISTANCES;
const KNIGHT_PLANES: usize = 8;
const PROMOTION_PLANES: usize = 4 * 3;

/// Number of move planes.
pub const NUM_MOVE_PLANES: usize = SLIDING_PLANES + KNIGHT_PLANES + PROMOTION_PLANES;

/// Size of the chess action space.
pub const NUM_ACTIONS: usize = NUM_MOVE_PLANES * 64;

// (rank delta, file delta), clockwise starting from N
const DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

// clockwise starting from NNE
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

const PROMOTION_PIECES: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

/// Move shape in the mover's frame, independent of the source square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveKind {
    Sliding { direction: usize, distance: usize },
    Knight { jump: usize },
    Promotion { piece: usize, file_delta: i8 },
}

impl MoveKind {
    fn classify(from: Square, to: Square, promotion: Option<Piece>) -> Option<Self> {
        let dr = to.get_rank().to_index() as i8 - from.get_rank().to_index() as i8;
        let df = to.get_file().to_index() as i8 - from.get_file().to_index() as i8;

        if let Some(piece) = promotion {
            let piece = PROMOTION_PIECES.iter().position(|&p| p == piece)?;
            if dr != 1 || df.abs() > 1 {
                return None;
            }
            return Some(MoveKind::Promotion {
                piece,
                file_delta: df,
            });
        }

        if let Some(jump) = KNIGHT_JUMPS.iter().position(|&j| j == (dr, df)) {
            return Some(MoveKind::Knight { jump });
        }

        let distance = dr.abs().max(df.abs());
        if distance == 0 || (dr != 0 && df != 0 && dr.abs() != df.abs()) {
            return None;
        }
        let direction = DIRECTIONS
            .iter()
            .position(|&d| d == (dr.signum(), df.signum()))?;
        Some(MoveKind::Sliding {
            direction,
            distance: distance as usize,
        })
    }

    fn plane(self) -> usize {
        match self {
            MoveKind::Sliding {
                direction,
                distance,
            } => direction * SLIDING_DISTANCES + (distance - 1),
            MoveKind::Knight { jump } => SLIDING_PLANES + jump,
            MoveKind::Promotion { piece, file_delta } => {
                SLIDING_PLANES + KNIGHT_PLANES + piece * 3 + (file_delta + 1) as usize
            }
        }
    }

    fn from_plane(plane: usize) -> Self {
        if plane < SLIDING_PLANES {
            MoveKind::Sliding {
                direction: plane / SLIDING_DISTANCES,
                distance: plane % SLIDING_DISTANCES + 1,
            }
        } else if plane < SLIDING_PLANES + KNIGHT_PLANES {
            MoveKind::Knight {
                jump: plane - SLIDING_PLANES,
            }
        } else {
            let rest = plane - SLIDING_PLANES - KNIGHT_PLANES;
            MoveKind::Promotion {
                piece: rest / 3,
                file_delta: (rest % 3) as i8 - 1,
            }
        }
    }

    /// Destination square and promotion piece, or `None` when the move leaves the board.
    fn target(self, from: Square) -> Option<(Square, Option<Piece>)> {
        let rank = from.get_rank().to_index() as i8;
        let file = from.get_file().to_index() as i8;
        match self {
            MoveKind::Sliding {
                direction,
                distance,
            } => {
                let (dr, df) = DIRECTIONS[direction];
                let d = distance as i8;
                square_at(rank + dr * d, file + df * d).map(|sq| (sq, None))
            }
            MoveKind::Knight { jump } => {
                let (dr, df) = KNIGHT_JUMPS[jump];
                square_at(rank + dr, file + df).map(|sq| (sq, None))
            }
            MoveKind::Promotion { piece, file_delta } => square_at(rank + 1, file + file_delta)
                .map(|sq| (sq, Some(PROMOTION_PIECES[piece]))),
        }
    }
}

fn square_at(rank: i8, file: i8) -> Option<Square> {
    if (0..8).contains(&rank) && (0..8).contains(&file) {
        Some(Square::make_square(
            Rank::from_index(rank as usize),
            File::from_index(file as usize),
        ))
    } else {
        None
    }
}

/// Mirror a square into (or out of) the mover's frame.
pub fn square_pov(side: Side, sq: Square) -> Square {
    match side {
        Side::White => sq,
        Side::Black => Square::make_square(
            Rank::from_index(7 - sq.get_rank().to_index()),
            sq.get_file(),
        ),
    }
}

/// Bidirectional mapping between chess moves and action indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveEncoder;

impl MoveEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a move played by `side`.
    ///
    /// Total on every move the rules can produce. Geometrically impossible
    /// moves (e.g. a3-b7) fail with `UnencodableMove`.
    pub fn encode(&self, mv: ChessMove, side: Side) -> Result<Action, EngineError> {
        let from = square_pov(side, mv.get_source());
        let to = square_pov(side, mv.get_dest());
        let kind = MoveKind::classify(from, to, mv.get_promotion())
            .ok_or_else(|| EngineError::UnencodableMove(mv.to_string()))?;
        Ok((kind.plane() * 64 + from.to_index()) as Action)
    }

    /// Decode `action` into the move it denotes at `pos`.
    ///
    /// Fails with `IllegalAction` unless the move is legal in `pos`.
    pub fn decode(&self, action: Action, pos: &ChessPosition) -> Result<ChessMove, EngineError> {
        let index = action as usize;
        if index >= NUM_ACTIONS {
            return Err(EngineError::ActionOutOfRange {
                action,
                size: NUM_ACTIONS,
            });
        }

        let side = pos.side_to_move();
        let from = Square::make_square(
            Rank::from_index((index % 64) / 8),
            File::from_index(index % 8),
        );
        let (to, promotion) = MoveKind::from_plane(index / 64)
            .target(from)
            .ok_or(EngineError::IllegalAction { action })?;

        let mv = ChessMove::new(square_pov(side, from), square_pov(side, to), promotion);
        if MoveGen::new_legal(pos.board()).any(|legal| legal == mv) {
            Ok(mv)
        } else {
            Err(EngineError::IllegalAction { action })
        }
    }

    /// All legal moves at `pos` with their actions, sorted by action.
    pub fn legal_moves(&self, pos: &ChessPosition) -> Vec<(Action, ChessMove)> {
        let side = pos.side_to_move();
        let mut moves: Vec<(Action, ChessMove)> = MoveGen::new_legal(pos.board())
            .filter_map(|mv| self.encode(mv, side).ok().map(|a| (a, mv)))
            .collect();
        moves.sort_unstable_by_key(|&(a, _)| a);
        moves
    }
}
