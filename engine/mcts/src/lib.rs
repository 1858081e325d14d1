//! Monte Carlo Tree Search (MCTS) implementation for AlphaZero-style game playing.
//!
//! This crate provides a game-agnostic MCTS implementation that works with any
//! game implementing the `engine-core` [`Game`](engine_core::Game) trait.
//!
//! # Overview
//!
//! MCTS is a search algorithm that builds a search tree by running simulations.
//! Each simulation consists of four phases:
//!
//! 1. **Selection**: Traverse the tree using PUCT to balance exploration and
//!    exploitation
//! 2. **Expansion**: When reaching a leaf, expand it by adding children for
//!    each legal action, with priors from the evaluator's masked policy
//! 3. **Evaluation**: Use the evaluator's value, or the real outcome when the
//!    position is game-over
//! 4. **Backpropagation**: Update visit counts and value sums along the path,
//!    flipping the sign at every ply
//!
//! # Usage
//!
//! ```rust
//! use engine_core::Game;
//! use games_chess::Chess;
//! use mcts::{run_mcts, MctsConfig, UniformEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let chess = Chess::new();
//! let evaluator = UniformEvaluator::new();
//! let config = MctsConfig::for_testing().with_simulations(32);
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let result = run_mcts(&chess, &evaluator, config, chess.initial_position(), &mut rng).unwrap();
//!
//! assert!(chess.legal_actions(&chess.initial_position()).contains(&result.action));
//! let total: f32 = result.policy.iter().sum();
//! assert!((total - 1.0).abs() < 1e-4);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_simulations`: Number of simulations per search (default: 100)
//! - `c_puct`: Exploration constant for PUCT (default: 1.0)
//! - `default_q`: Q assumed for unvisited children (default: 0.0)
//! - `root_noise`, `dirichlet_alpha`, `dirichlet_epsilon`: root-only exploration noise
//! - `temperature`: Temperature for action selection (1.0 = proportional, 0.0 = greedy)
//!
//! # Evaluators
//!
//! The search requires an [`Evaluator`] to estimate policy and value:
//!
//! - [`UniformEvaluator`]: Returns uniform policy and a neutral value (for testing)
//! - Custom evaluators wrap whatever model produces (policy, value) for an encoded position

pub mod config;
pub mod evaluator;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::MctsConfig;
pub use evaluator::{EvalResult, Evaluator, EvaluatorError, UniformEvaluator};
pub use node::{MctsNode, NodeId};
pub use search::{masked_priors, run_mcts, MctsSearch, SearchError, SearchResult, SearchStats};
pub use tree::{MctsTree, TreeStats};
