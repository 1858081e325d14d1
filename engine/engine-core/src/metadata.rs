//! Game metadata for configuration and self-describing training data
//!
//! Actors and trainers use this to size policy and observation buffers
//! without hardcoding per-game constants.

use serde::{Deserialize, Serialize};

/// Metadata about a game's encodings.
///
/// This struct contains all the information needed to:
/// - Size fixed-width numeric vectors (obs_size, num_actions)
/// - Interpret the encoded position (plane count and board geometry)
/// - Label stored training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetadata {
    /// Environment identifier (e.g., "chess")
    pub env_id: String,

    /// Human-readable display name
    pub display_name: String,

    /// Board width in cells
    pub board_width: usize,

    /// Board height in cells
    pub board_height: usize,

    /// Number of possible actions (policy vector length)
    pub num_actions: usize,

    /// Number of feature planes in the encoded position
    pub num_planes: usize,

    /// Size of the encoded position (number of f32 values)
    pub obs_size: usize,

    /// Number of players (typically 2)
    pub player_count: usize,

    /// Display names for each player
    pub player_names: Vec<String>,

    /// Brief description of the encodings
    pub description: String,
}

impl GameMetadata {
    /// Create a new GameMetadata with required fields
    pub fn new(env_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            env_id: env_id.into(),
            display_name: display_name.into(),
            board_width: 0,
            board_height: 0,
            num_actions: 0,
            num_planes: 0,
            obs_size: 0,
            player_count: 2,
            player_names: vec!["Player 1".to_string(), "Player 2".to_string()],
            description: String::new(),
        }
    }

    /// Builder method for board dimensions
    pub fn with_board(mut self, width: usize, height: usize) -> Self {
        self.board_width = width;
        self.board_height = height;
        self
    }

    /// Builder method for action count
    pub fn with_actions(mut self, num_actions: usize) -> Self {
        self.num_actions = num_actions;
        self
    }

    /// Builder method for plane-encoded observations.
    /// The observation size is derived from the plane count and board size.
    pub fn with_planes(mut self, num_planes: usize) -> Self {
        self.num_planes = num_planes;
        self.obs_size = num_planes * self.board_size();
        self
    }

    /// Builder method for player names
    pub fn with_players(mut self, names: Vec<String>) -> Self {
        self.player_count = names.len();
        self.player_names = names;
        self
    }

    /// Builder method for description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Get the total number of board cells
    pub fn board_size(&self) -> usize {
        self.board_width * self.board_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let meta = GameMetadata::new("chess", "Chess")
            .with_board(8, 8)
            .with_actions(4864)
            .with_planes(18)
            .with_players(vec!["White".to_string(), "Black".to_string()])
            .with_description("Canonical-frame planes");

        assert_eq!(meta.env_id, "chess");
        assert_eq!(meta.display_name, "Chess");
        assert_eq!(meta.board_width, 8);
        assert_eq!(meta.board_height, 8);
        assert_eq!(meta.num_actions, 4864);
        assert_eq!(meta.num_planes, 18);
        assert_eq!(meta.obs_size, 18 * 64);
        assert_eq!(meta.player_count, 2);
        assert_eq!(meta.player_names, vec!["White", "Black"]);
        assert_eq!(meta.description, "Canonical-frame planes");
    }

    #[test]
    fn test_board_size() {
        let meta = GameMetadata::new("test", "Test").with_board(7, 6);
        assert_eq!(meta.board_size(), 42);
    }

    #[test]
    fn test_planes_before_board_gives_zero_obs() {
        // obs_size is derived at the time with_planes is called
        let meta = GameMetadata::new("test", "Test").with_planes(4);
        assert_eq!(meta.obs_size, 0);
    }

    #[test]
    fn test_serialization() {
        let meta = GameMetadata::new("chess", "Chess")
            .with_board(8, 8)
            .with_actions(4864);

        let json = serde_json::to_string(&meta).unwrap();
        let parsed: GameMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(meta, parsed);
    }
}
