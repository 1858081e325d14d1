//! MCTS search implementation.
//!
//! Implements the core MCTS algorithm:
//! 1. Selection: Traverse tree using PUCT to find a leaf
//! 2. Expansion: Add children to the leaf using the masked policy prior
//! 3. Evaluation: Get value estimate from evaluator (or the real outcome at a terminal)
//! 4. Backpropagation: Update statistics along the path

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use engine_core::{Action, EngineError, Game};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{trace, warn};

use crate::config::MctsConfig;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::node::NodeId;
use crate::tree::MctsTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Evaluator unavailable: {0}")]
    EvaluatorUnavailable(#[from] EvaluatorError),

    #[error("Rules oracle integrity violation: {0}")]
    OracleIntegrityViolation(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Invalid search config: {0}")]
    InvalidConfig(String),

    #[error("Search cancelled")]
    Cancelled,
}

/// Counters and timings for one search call.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Total wall-clock time (microseconds)
    pub total_time_us: u64,
    /// Time spent in tree selection, including lazy child materialisation (microseconds)
    pub selection_time_us: u64,
    /// Time spent inside the evaluator (microseconds)
    pub inference_time_us: u64,
    /// Time spent expanding nodes, excluding inference (microseconds)
    pub expansion_time_us: u64,
    /// Time spent in backpropagation (microseconds)
    pub backprop_time_us: u64,
    /// Evaluator calls
    pub total_evals: u32,
    /// Rules-oracle apply_action calls
    pub game_steps: u32,
    /// Simulations that ended on a game-over position
    pub terminal_hits: u32,
    /// Expansions whose legal prior mass was zero or non-finite
    pub degenerate_priors: u32,
    /// Nodes allocated in the tree
    pub nodes: usize,
    /// Deepest materialised node
    pub max_depth: u32,
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Chosen action
    pub action: Action,

    /// Policy target: root child visit counts normalised over the full action space
    pub policy: Vec<f32>,

    /// Mean value at root, from the side to move
    pub value: f32,

    /// Number of simulations performed (excluding the root expansion)
    pub simulations: u32,

    pub stats: SearchStats,
}

/// MCTS search state. One instance per move decision; the tree is dropped with it.
pub struct MctsSearch<'a, G: Game, E: Evaluator + ?Sized> {
    tree: MctsTree<G::Position>,
    game: &'a G,
    evaluator: &'a E,
    config: MctsConfig,
    num_actions: usize,
    stats: SearchStats,
    /// Reused encoding buffer
    obs: Vec<f32>,
}

impl<'a, G: Game, E: Evaluator + ?Sized> MctsSearch<'a, G, E> {
    /// Create a new MCTS search from the given position.
    ///
    /// Fails with `InvalidConfig` for a zero simulation budget or an unusable
    /// temperature, and with `GameOver` if the position is already decided.
    pub fn new(
        game: &'a G,
        evaluator: &'a E,
        config: MctsConfig,
        position: G::Position,
    ) -> Result<Self, SearchError> {
        if config.num_simulations == 0 {
            return Err(SearchError::InvalidConfig(
                "num_simulations must be at least 1".to_string(),
            ));
        }
        if !(config.temperature.is_finite() && config.temperature >= 0.0) {
            return Err(SearchError::InvalidConfig(format!(
                "temperature must be finite and >= 0, got {}",
                config.temperature
            )));
        }
        if game.status(&position).is_over() {
            return Err(SearchError::Engine(EngineError::GameOver));
        }

        Ok(Self {
            tree: MctsTree::new(position),
            num_actions: game.action_space_size(),
            game,
            evaluator,
            config,
            stats: SearchStats::default(),
            obs: Vec::with_capacity(game.observation_size()),
        })
    }

    /// Run the MCTS search for the configured number of simulations.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<SearchResult, SearchError> {
        self.run_with_cancel(rng, &AtomicBool::new(false))
    }

    /// Run the search, checking `cancel` before every simulation.
    ///
    /// A cancelled search returns `Cancelled`, never a partial result.
    pub fn run_with_cancel(
        &mut self,
        rng: &mut ChaCha20Rng,
        cancel: &AtomicBool,
    ) -> Result<SearchResult, SearchError> {
        let start = Instant::now();
        let root_id = self.tree.root();

        // The root expansion is the root's first visit and is not part of the budget
        if !self.tree.get(root_id).expanded {
            let value = self.expand_node(root_id)?;
            self.tree.backpropagate(&[root_id], value);
        }

        if self.config.root_noise && self.config.dirichlet_alpha > 0.0 {
            self.add_dirichlet_noise(rng);
        }

        for _ in 0..self.config.num_simulations {
            if cancel.load(Ordering::Relaxed) {
                return Err(SearchError::Cancelled);
            }
            self.simulate()?;
        }

        let action = self.choose_action(rng)?;
        let policy = self.tree.root_policy(self.num_actions);
        let root = self.tree.get(root_id);

        let tree_stats = self.tree.stats();
        self.stats.nodes = tree_stats.total_nodes;
        self.stats.max_depth = tree_stats.max_depth;
        self.stats.total_time_us = start.elapsed().as_micros() as u64;

        Ok(SearchResult {
            action,
            policy,
            value: root.mean_value(),
            simulations: self.config.num_simulations,
            stats: self.stats.clone(),
        })
    }

    /// Run a single simulation (select -> expand/evaluate -> backpropagate).
    fn simulate(&mut self) -> Result<(), SearchError> {
        let select_start = Instant::now();
        let path = self.select()?;
        self.stats.selection_time_us += select_start.elapsed().as_micros() as u64;

        let leaf_id = path[path.len() - 1];
        let leaf = self.tree.get(leaf_id);

        // Ground truth overrides the evaluator at game-over positions
        let value = if leaf.is_terminal {
            self.stats.terminal_hits += 1;
            leaf.terminal_value
        } else {
            self.expand_node(leaf_id)?
        };

        let backprop_start = Instant::now();
        self.tree.backpropagate(&path, value);
        self.stats.backprop_time_us += backprop_start.elapsed().as_micros() as u64;

        trace!(
            leaf = leaf_id.0,
            depth = path.len() - 1,
            value = value,
            "MCTS simulation complete"
        );

        Ok(())
    }

    /// Descend from the root by PUCT until an unexpanded or terminal node.
    /// Returns the path, root first.
    fn select(&mut self) -> Result<Vec<NodeId>, SearchError> {
        let mut path = vec![self.tree.root()];
        let mut current = self.tree.root();

        loop {
            let node = self.tree.get(current);
            if node.is_leaf() {
                break;
            }

            let child_id = self
                .tree
                .select_child(current, self.config.c_puct, self.config.default_q)
                .ok_or_else(|| {
                    SearchError::OracleIntegrityViolation(
                        "expanded non-terminal node has no children".to_string(),
                    )
                })?;

            self.materialize(current, child_id)?;
            path.push(child_id);
            current = child_id;
        }

        Ok(path)
    }

    /// Compute a child's position and terminal status on first visit.
    fn materialize(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), SearchError> {
        if self.tree.get(child_id).position.is_some() {
            return Ok(());
        }

        let action = self.tree.get(child_id).action;
        let parent_position = self.tree.get(parent_id).position.as_ref().ok_or_else(|| {
            SearchError::OracleIntegrityViolation("selected through an unmaterialised node".to_string())
        })?;

        let position = self
            .game
            .apply_action(parent_position, action)
            .map_err(|e| {
                SearchError::OracleIntegrityViolation(format!(
                    "action {action} was listed legal but could not be applied: {e}"
                ))
            })?;
        self.stats.game_steps += 1;

        let status = self.game.status(&position);
        let mover = self.game.side_to_move(&position);

        let child = self.tree.get_mut(child_id);
        if status.is_over() {
            child.is_terminal = true;
            child.terminal_value = status.value_for(mover);
        }
        child.position = Some(position);
        Ok(())
    }

    /// Expand a node: one evaluator call, one child per legal action.
    /// Returns the evaluator's value estimate for backpropagation.
    fn expand_node(&mut self, node_id: NodeId) -> Result<f32, SearchError> {
        let expand_start = Instant::now();
        let position = self.tree.get(node_id).position.as_ref().ok_or_else(|| {
            SearchError::OracleIntegrityViolation("expanding an unmaterialised node".to_string())
        })?;

        let legal = self.game.legal_actions(position);
        if legal.is_empty() {
            return Err(SearchError::OracleIntegrityViolation(
                "no legal actions at a position reported as ongoing".to_string(),
            ));
        }

        self.obs.clear();
        self.game.encode_position(position, &mut self.obs);

        let inference_start = Instant::now();
        let eval = self.evaluator.evaluate(&self.obs, self.num_actions)?;
        let inference_us = inference_start.elapsed().as_micros() as u64;
        self.stats.inference_time_us += inference_us;
        self.stats.total_evals += 1;

        eval.validate(self.num_actions)?;

        let (priors, degenerate) = masked_priors(&eval.policy, &legal);
        if degenerate {
            self.stats.degenerate_priors += 1;
            warn!(
                legal = legal.len(),
                "Evaluator put no usable mass on legal actions, using uniform priors"
            );
        }

        for (&action, prior) in legal.iter().zip(priors) {
            self.tree.add_child(node_id, action, prior);
        }
        self.tree.get_mut(node_id).expanded = true;

        let total_us = expand_start.elapsed().as_micros() as u64;
        self.stats.expansion_time_us += total_us.saturating_sub(inference_us);

        Ok(eval.value.clamp(-1.0, 1.0))
    }

    /// Add Dirichlet noise to root node priors for exploration.
    fn add_dirichlet_noise(&mut self, rng: &mut ChaCha20Rng) {
        let root_id = self.tree.root();
        let children: Vec<NodeId> = self
            .tree
            .get(root_id)
            .children
            .iter()
            .map(|(_, id)| *id)
            .collect();

        if children.is_empty() {
            return;
        }

        let noise = dirichlet_noise(children.len(), self.config.dirichlet_alpha, rng);

        // Mix noise with existing priors
        let eps = self.config.dirichlet_epsilon;
        for (child_id, n) in children.into_iter().zip(noise) {
            let child = self.tree.get_mut(child_id);
            child.prior = (1.0 - eps) * child.prior + eps * n;
        }
    }

    /// Pick the move to play from root visit counts.
    ///
    /// Temperature 0 takes the most visited action (lowest action on ties);
    /// otherwise actions are sampled proportionally to N^(1/T).
    fn choose_action(&self, rng: &mut ChaCha20Rng) -> Result<Action, SearchError> {
        let greedy = || {
            self.tree.best_action().map(|(a, _)| a).ok_or_else(|| {
                SearchError::OracleIntegrityViolation("root has no children".to_string())
            })
        };

        let temperature = self.config.temperature;
        if temperature < 1e-6 {
            return greedy();
        }

        let visits = self.tree.root_visits();
        let weights: Vec<f64> = visits
            .iter()
            .map(|&(_, n)| (n as f64).powf(1.0 / temperature as f64))
            .collect();
        match sample_weighted(&weights, rng) {
            Some(i) => Ok(visits[i].0),
            // Powered counts overflowed or underflowed
            None => greedy(),
        }
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree<G::Position> {
        &self.tree
    }
}

/// Mask a raw policy to the legal actions and renormalise.
///
/// Negative and non-finite entries count as zero. When the remaining legal
/// mass is zero or non-finite the priors are uniform over the legal actions
/// and the second element is `true`.
pub fn masked_priors(policy: &[f32], legal: &[Action]) -> (Vec<f32>, bool) {
    let mut priors: Vec<f32> = legal
        .iter()
        .map(|&a| {
            let p = policy.get(a as usize).copied().unwrap_or(0.0);
            if p.is_finite() && p > 0.0 {
                p
            } else {
                0.0
            }
        })
        .collect();

    let total: f32 = priors.iter().sum();
    if total > 0.0 && total.is_finite() {
        for p in &mut priors {
            *p /= total;
        }
        (priors, false)
    } else {
        let uniform = 1.0 / legal.len().max(1) as f32;
        priors.iter_mut().for_each(|p| *p = uniform);
        (priors, true)
    }
}

/// Sample an index proportionally to non-negative weights.
/// Returns None if the weights do not form a usable distribution.
fn sample_weighted(weights: &[f64], rng: &mut ChaCha20Rng) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }

    let r: f64 = rng.gen::<f64>() * total;
    let mut cumsum = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumsum += w;
        if r < cumsum {
            return Some(i);
        }
    }

    // Fallback to last non-zero weight (handles floating point issues)
    weights.iter().rposition(|&w| w > 0.0)
}

/// Generate Dirichlet-distributed noise using Gamma variates.
fn dirichlet_noise(n: usize, alpha: f32, rng: &mut ChaCha20Rng) -> Vec<f32> {
    use rand_distr::{Distribution, Gamma};

    let gamma = match Gamma::new(alpha as f64, 1.0) {
        Ok(gamma) => gamma,
        // Non-positive alpha: no noise
        Err(_) => return vec![1.0 / n as f32; n],
    };
    let mut samples: Vec<f32> = (0..n).map(|_| gamma.sample(rng) as f32).collect();

    // Normalize
    let sum: f32 = samples.iter().sum();
    if sum > 0.0 {
        for s in &mut samples {
            *s /= sum;
        }
    } else {
        samples.fill(1.0 / n as f32);
    }

    samples
}

/// Convenience function to run a single MCTS search.
pub fn run_mcts<G: Game, E: Evaluator + ?Sized>(
    game: &G,
    evaluator: &E,
    config: MctsConfig,
    position: G::Position,
    rng: &mut ChaCha20Rng,
) -> Result<SearchResult, SearchError> {
    let mut search = MctsSearch::new(game, evaluator, config, position)?;
    search.run(rng)
}
