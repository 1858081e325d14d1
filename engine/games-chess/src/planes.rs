//! Board-plane encoding of a position, in the mover's frame.
//!
//! 18 planes of 8x8, plane-major, square index `rank * 8 + file` after the
//! same rank mirror the move encoder applies for Black:
//!
//! - 0..6: mover's pawns, knights, bishops, rooks, queens, king
//! - 6..12: opponent's pieces, same order
//! - 12..14: mover's kingside / queenside castling right (constant plane)
//! - 14..16: opponent's kingside / queenside castling right
//! - 16: 1.0 when White is to move
//! - 17: full-move number / 100, capped at 1.0

use chess::{BitBoard, ALL_PIECES};
use engine_core::Side;

use crate::encoder::square_pov;
use crate::position::{color_of, ChessPosition};

/// Number of 8x8 input planes.
pub const NUM_PLANES: usize = 18;

/// Length of an encoded position.
pub const OBS_SIZE: usize = NUM_PLANES * 64;

const CASTLING_PLANE: usize = 12;
const COLOUR_PLANE: usize = 16;
const MOVE_COUNT_PLANE: usize = 17;

/// Full-move number that saturates the move-count plane.
const MOVE_COUNT_SCALE: f32 = 100.0;

/// Append the plane encoding of `pos` to `out`.
pub fn encode_planes(pos: &ChessPosition, out: &mut Vec<f32>) {
    let start = out.len();
    out.resize(start + OBS_SIZE, 0.0);
    let planes = &mut out[start..];

    let board = pos.board();
    let side = pos.side_to_move();
    let colours = [color_of(side), color_of(side.opposite())];

    for (c, &colour) in colours.iter().enumerate() {
        for (p, &piece) in ALL_PIECES.iter().enumerate() {
            let plane = c * 6 + p;
            let bits: BitBoard = *board.color_combined(colour) & *board.pieces(piece);
            for sq in bits {
                planes[plane * 64 + square_pov(side, sq).to_index()] = 1.0;
            }
        }

        let rights = board.castle_rights(colour);
        let flags = [rights.has_kingside(), rights.has_queenside()];
        for (i, &flag) in flags.iter().enumerate() {
            if flag {
                fill_plane(planes, CASTLING_PLANE + c * 2 + i, 1.0);
            }
        }
    }

    if side == Side::White {
        fill_plane(planes, COLOUR_PLANE, 1.0);
    }

    let move_count = (pos.fullmove_number() as f32 / MOVE_COUNT_SCALE).min(1.0);
    fill_plane(planes, MOVE_COUNT_PLANE, move_count);
}

fn fill_plane(planes: &mut [f32], plane: usize, value: f32) {
    planes[plane * 64..(plane + 1) * 64].fill(value);
}

/// Conventional piece values in pawns, indexed like [`ALL_PIECES`].
pub const PIECE_VALUES: [f32; 6] = [1.0, 3.0, 3.0, 5.0, 9.0, 0.0];

/// Material balance in pawns from the mover's side, read back off encoded planes.
pub fn material_balance(planes: &[f32]) -> f32 {
    let mut balance = 0.0;
    for (p, &value) in PIECE_VALUES.iter().enumerate() {
        let own: f32 = planes[p * 64..(p + 1) * 64].iter().sum();
        let theirs: f32 = planes[(6 + p) * 64..(7 + p) * 64].iter().sum();
        balance += value * (own - theirs);
    }
    balance
}
