//! Model-free evaluators for running self-play without a trained network.

use games_chess::{material_balance, OBS_SIZE};
use mcts::{EvalResult, Evaluator, EvaluatorError, UniformEvaluator};
use std::sync::Arc;

/// Pawns of material advantage that map to a value of tanh(1) ~ 0.76.
pub const DEFAULT_MATERIAL_SCALE: f32 = 10.0;

/// Uniform policy with a material-count value estimate.
///
/// Reads piece counts back off the board planes, so the value is always from
/// the side to move. Good enough to make self-play convert winning material
/// into mates instead of wandering until the ply limit.
#[derive(Debug, Clone)]
pub struct MaterialEvaluator {
    scale: f32,
}

impl MaterialEvaluator {
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }
}

impl Default for MaterialEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_MATERIAL_SCALE)
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, obs: &[f32], num_actions: usize) -> Result<EvalResult, EvaluatorError> {
        if obs.len() != OBS_SIZE {
            return Err(EvaluatorError::EvaluationFailed(format!(
                "expected {} board-plane values, got {}",
                OBS_SIZE,
                obs.len()
            )));
        }
        if num_actions == 0 {
            return Err(EvaluatorError::EvaluationFailed(
                "empty action space".to_string(),
            ));
        }

        let value = (material_balance(obs) / self.scale).tanh();
        Ok(EvalResult {
            policy: vec![1.0 / num_actions as f32; num_actions],
            value,
        })
    }
}

/// Which built-in evaluator the actor plays with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EvaluatorKind {
    /// Uniform policy, material-count value
    Material,
    /// Uniform policy, value always 0
    Uniform,
}

impl EvaluatorKind {
    pub fn build(self, material_scale: f32) -> Arc<dyn Evaluator> {
        match self {
            EvaluatorKind::Material => Arc::new(MaterialEvaluator::new(material_scale)),
            EvaluatorKind::Uniform => Arc::new(UniformEvaluator::new()),
        }
    }
}
