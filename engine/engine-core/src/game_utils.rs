//! Shared utilities for two-player game implementations
//!
//! Perspective helpers used by the search (terminal values) and by self-play
//! (outcome back-fill), plus the little-endian f32 packing used when
//! persisting encoded positions and policy vectors.

use crate::typed::Side;

/// Outcome value from `perspective`'s point of view.
///
/// # Arguments
/// * `winner` - The winning side, or `None` for a draw
/// * `perspective` - The side the value is reported for
///
/// # Returns
/// * `1.0` if `perspective` won
/// * `-1.0` if `perspective` lost
/// * `0.0` for draws
///
/// # Example
/// ```
/// use engine_core::game_utils::outcome_value;
/// use engine_core::Side;
///
/// assert_eq!(outcome_value(Some(Side::White), Side::White), 1.0);
/// assert_eq!(outcome_value(Some(Side::White), Side::Black), -1.0);
/// assert_eq!(outcome_value(None, Side::Black), 0.0);
/// ```
#[inline]
pub fn outcome_value(winner: Option<Side>, perspective: Side) -> f32 {
    match winner {
        Some(side) if side == perspective => 1.0,
        Some(_) => -1.0,
        None => 0.0,
    }
}

/// Encode multiple f32 slices to bytes in little-endian format.
///
/// # Example
/// ```
/// use engine_core::game_utils::encode_f32_slices;
///
/// let planes = [1.0f32, 0.0, 0.0];
/// let policy = [0.5f32, 0.5];
///
/// let mut buf = Vec::new();
/// encode_f32_slices(&mut buf, [&planes[..], &policy[..]]);
///
/// // 5 floats * 4 bytes = 20 bytes
/// assert_eq!(buf.len(), 20);
/// ```
pub fn encode_f32_slices<'a>(out: &mut Vec<u8>, slices: impl IntoIterator<Item = &'a [f32]>) {
    for slice in slices {
        for &value in slice {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

/// Decode little-endian f32 bytes produced by [`encode_f32_slices`].
///
/// Trailing bytes that do not form a whole f32 are ignored.
pub fn decode_f32_slice(buf: &[u8]) -> Vec<f32> {
    buf.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_value_white_wins() {
        assert_eq!(outcome_value(Some(Side::White), Side::White), 1.0);
        assert_eq!(outcome_value(Some(Side::White), Side::Black), -1.0);
    }

    #[test]
    fn test_outcome_value_black_wins() {
        assert_eq!(outcome_value(Some(Side::Black), Side::Black), 1.0);
        assert_eq!(outcome_value(Some(Side::Black), Side::White), -1.0);
    }

    #[test]
    fn test_outcome_value_draw() {
        assert_eq!(outcome_value(None, Side::White), 0.0);
        assert_eq!(outcome_value(None, Side::Black), 0.0);
    }

    #[test]
    fn test_encode_f32_slices() {
        let board = [1.0f32, 0.0];
        let legal = [1.0f32];
        let player = [0.0f32, 1.0];

        let mut buf = Vec::new();
        encode_f32_slices(&mut buf, [&board[..], &legal[..], &player[..]]);

        // 5 floats * 4 bytes = 20 bytes
        assert_eq!(buf.len(), 20);

        let first = f32::from_le_bytes(buf[0..4].try_into().unwrap());
        assert_eq!(first, 1.0);

        let last = f32::from_le_bytes(buf[16..20].try_into().unwrap());
        assert_eq!(last, 1.0);
    }

    #[test]
    fn test_encode_f32_slices_empty() {
        let mut buf = Vec::new();
        encode_f32_slices(&mut buf, std::iter::empty::<&[f32]>());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_f32_slice() {
        let values = [0.25f32, -1.0, 3.5];
        let mut buf = Vec::new();
        encode_f32_slices(&mut buf, [&values[..]]);

        assert_eq!(decode_f32_slice(&buf), values.to_vec());

        // Partial trailing chunk is dropped
        buf.push(7);
        assert_eq!(decode_f32_slice(&buf).len(), 3);
    }
}
