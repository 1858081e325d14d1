//! Chess position with the bookkeeping the board type does not carry.
//!
//! `chess::Board` knows piece placement, side to move, castling and en
//! passant rights. Draws by rule additionally need the fifty-move clock and
//! the positions seen since the last irreversible move, which live here.

use chess::{BitBoard, Board, BoardStatus, ChessMove, Color, Piece, EMPTY};
use engine_core::{DrawReason, EngineError, GameStatus, Side};
use std::str::FromStr;

/// Halfmove clock value at which the fifty-move rule ends the game.
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// Light squares (b1, d1, ... a2, c2, ...), used for bishop colour checks.
const LIGHT_SQUARES: BitBoard = BitBoard(0x55AA_55AA_55AA_55AA);

/// A chess position: board plus move counters and repetition history.
#[derive(Debug, Clone, PartialEq)]
pub struct ChessPosition {
    board: Board,
    /// Plies played since the standard starting position
    ply: u32,
    /// Plies since the last capture or pawn move
    halfmove_clock: u32,
    /// Zobrist hashes since the last irreversible move, current position last
    history: Vec<u64>,
}

impl Default for ChessPosition {
    fn default() -> Self {
        Self::from_board(Board::default())
    }
}

impl ChessPosition {
    /// Wrap a board with fresh counters.
    pub fn from_board(board: Board) -> Self {
        let ply = if board.side_to_move() == Color::White { 0 } else { 1 };
        Self {
            history: vec![board.get_hash()],
            board,
            ply,
            halfmove_clock: 0,
        }
    }

    /// Parse a FEN string, including the optional halfmove and fullmove fields.
    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let board = Board::from_str(fen)
            .map_err(|e| EngineError::InvalidPosition(format!("{fen}: {e}")))?;

        let fields: Vec<&str> = fen.split_whitespace().collect();
        let halfmove_clock = match fields.get(4) {
            Some(v) => v
                .parse()
                .map_err(|_| EngineError::InvalidPosition(format!("bad halfmove clock '{v}'")))?,
            None => 0,
        };
        let fullmove: u32 = match fields.get(5) {
            Some(v) => v
                .parse()
                .map_err(|_| EngineError::InvalidPosition(format!("bad fullmove number '{v}'")))?,
            None => 1,
        };

        let black_to_move = u32::from(board.side_to_move() == Color::Black);
        Ok(Self {
            history: vec![board.get_hash()],
            board,
            ply: fullmove.max(1).saturating_sub(1) * 2 + black_to_move,
            halfmove_clock,
        })
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// Full-move number as written in FEN (starts at 1, increments after Black moves).
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.ply / 2 + 1
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn side_to_move(&self) -> Side {
        side_of(self.board.side_to_move())
    }

    /// Play a move that is already known to be legal.
    pub(crate) fn play(&self, mv: ChessMove) -> ChessPosition {
        let irreversible = self.board.piece_on(mv.get_source()) == Some(Piece::Pawn)
            || self.board.piece_on(mv.get_dest()).is_some();

        let board = self.board.make_move_new(mv);
        let hash = board.get_hash();

        let (halfmove_clock, history) = if irreversible {
            (0, vec![hash])
        } else {
            let mut history = self.history.clone();
            history.push(hash);
            (self.halfmove_clock + 1, history)
        };

        ChessPosition {
            board,
            ply: self.ply + 1,
            halfmove_clock,
            history,
        }
    }

    /// Number of times the current position has occurred since the last irreversible move.
    pub fn repetitions(&self) -> usize {
        let current = self.board.get_hash();
        self.history.iter().filter(|&&h| h == current).count()
    }

    /// Game status, checking mate and stalemate before draws by rule.
    pub fn status(&self) -> GameStatus {
        match self.board.status() {
            BoardStatus::Checkmate => {
                return GameStatus::Win(side_of(self.board.side_to_move()).opposite())
            }
            BoardStatus::Stalemate => return GameStatus::Draw(DrawReason::Stalemate),
            BoardStatus::Ongoing => {}
        }

        if self.halfmove_clock >= FIFTY_MOVE_PLIES {
            return GameStatus::Draw(DrawReason::FiftyMoveRule);
        }
        if self.repetitions() >= 3 {
            return GameStatus::Draw(DrawReason::ThreefoldRepetition);
        }
        if self.has_insufficient_material() {
            return GameStatus::Draw(DrawReason::InsufficientMaterial);
        }
        GameStatus::Ongoing
    }

    /// Neither side can possibly deliver mate: bare kings, a single minor
    /// piece, or only bishops that all stand on one square colour.
    pub fn has_insufficient_material(&self) -> bool {
        let board = &self.board;
        let heavy = *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
        if heavy != EMPTY {
            return false;
        }

        let knights = *board.pieces(Piece::Knight);
        let bishops = *board.pieces(Piece::Bishop);
        let minors = (knights | bishops).popcnt();
        if minors <= 1 {
            return true;
        }

        if knights != EMPTY {
            return false;
        }
        let light = (bishops & LIGHT_SQUARES).popcnt();
        light == 0 || light == bishops.popcnt()
    }
}

/// Map the board crate's colour onto the engine's side.
#[inline]
pub fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

#[inline]
pub fn color_of(side: Side) -> Color {
    match side {
        Side::White => Color::White,
        Side::Black => Color::Black,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::Square;

    #[test]
    fn test_default_is_start_position() {
        let pos = ChessPosition::default();
        assert_eq!(pos.side_to_move(), Side::White);
        assert_eq!(pos.ply(), 0);
        assert_eq!(pos.fullmove_number(), 1);
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.status(), GameStatus::Ongoing);
    }

    #[test]
    fn test_from_fen_counters() {
        let pos = ChessPosition::from_fen("8/8/8/4k3/8/8/4PK2/8 b - - 12 40").unwrap();
        assert_eq!(pos.side_to_move(), Side::Black);
        assert_eq!(pos.halfmove_clock(), 12);
        assert_eq!(pos.fullmove_number(), 40);
        assert_eq!(pos.ply(), 79);
    }

    #[test]
    fn test_from_fen_rejects_garbage() {
        assert!(ChessPosition::from_fen("not a fen").is_err());
    }

    #[test]
    fn test_halfmove_clock_resets_on_pawn_move() {
        let pos = ChessPosition::default();
        let knight = ChessMove::new(Square::G1, Square::F3, None);
        let pos = pos.play(knight);
        assert_eq!(pos.halfmove_clock(), 1);

        let pawn = ChessMove::new(Square::E7, Square::E5, None);
        let pos = pos.play(pawn);
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.ply(), 2);
    }

    #[test]
    fn test_checkmate_status() {
        // Fool's mate: white is mated
        let pos =
            ChessPosition::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert_eq!(pos.status(), GameStatus::Win(Side::Black));
    }

    #[test]
    fn test_stalemate_status() {
        let pos = ChessPosition::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(pos.status(), GameStatus::Draw(DrawReason::Stalemate));
    }

    #[test]
    fn test_fifty_move_rule() {
        let pos = ChessPosition::from_fen("8/8/8/4k3/8/8/4PK2/8 w - - 100 80").unwrap();
        assert_eq!(pos.status(), GameStatus::Draw(DrawReason::FiftyMoveRule));
    }

    #[test]
    fn test_threefold_repetition() {
        let mut pos = ChessPosition::default();
        let shuffle = [
            (Square::G1, Square::F3),
            (Square::G8, Square::F6),
            (Square::F3, Square::G1),
            (Square::F6, Square::G8),
        ];

        for _ in 0..2 {
            for (from, to) in shuffle {
                assert_eq!(pos.status(), GameStatus::Ongoing);
                pos = pos.play(ChessMove::new(from, to, None));
            }
        }

        assert_eq!(pos.repetitions(), 3);
        assert_eq!(
            pos.status(),
            GameStatus::Draw(DrawReason::ThreefoldRepetition)
        );
    }

    #[test]
    fn test_insufficient_material() {
        let bare_kings = ChessPosition::from_fen("8/8/8/4k3/8/8/5K2/8 w - - 0 1").unwrap();
        assert!(bare_kings.has_insufficient_material());

        let king_knight = ChessPosition::from_fen("8/8/8/4k3/8/8/5K2/6N1 w - - 0 1").unwrap();
        assert!(king_knight.has_insufficient_material());

        // Bishops on c1 (dark) and f8 (dark)
        let same_colour = ChessPosition::from_fen("5b2/8/8/4k3/8/8/5K2/2B5 w - - 0 1").unwrap();
        assert!(same_colour.has_insufficient_material());

        // Bishops on c1 (dark) and c8 (light)
        let opposite = ChessPosition::from_fen("2b5/8/8/4k3/8/8/5K2/2B5 w - - 0 1").unwrap();
        assert!(!opposite.has_insufficient_material());

        let with_pawn = ChessPosition::from_fen("8/8/8/4k3/8/8/4PK2/8 w - - 0 1").unwrap();
        assert!(!with_pawn.has_insufficient_material());
        assert_eq!(with_pawn.status(), GameStatus::Ongoing);
    }
}
