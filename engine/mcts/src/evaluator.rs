//! Evaluator trait for position evaluation.
//!
//! The evaluator provides a raw policy over the full action space and a value
//! estimate for an encoded position. In AlphaZero, this is a neural network.
//! The search masks the policy to legal actions itself, so evaluators never
//! need to know the rules.

use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Policy has {actual} entries, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Evaluator returned a non-finite value")]
    NonFiniteOutput,
}

/// Result of evaluating a position.
#[derive(Debug, Clone)]
pub struct EvalResult {
    /// Raw policy: one non-negative weight per action in the action space.
    /// Need not be normalised and may put mass on illegal actions.
    pub policy: Vec<f32>,

    /// Value estimate for the side to move.
    /// Range: -1.0 (certain loss) to +1.0 (certain win).
    pub value: f32,
}

impl EvalResult {
    /// Check the output shape and value against the action space.
    pub fn validate(&self, num_actions: usize) -> Result<(), EvaluatorError> {
        if self.policy.len() != num_actions {
            return Err(EvaluatorError::ShapeMismatch {
                expected: num_actions,
                actual: self.policy.len(),
            });
        }
        if !self.value.is_finite() {
            return Err(EvaluatorError::NonFiniteOutput);
        }
        Ok(())
    }
}

/// Trait for position evaluators.
///
/// Implementations must behave as pure functions of their input; the search
/// may call them any number of times in any order. Shared across self-play
/// workers, hence `Send + Sync`.
pub trait Evaluator: Send + Sync {
    /// Evaluate a single encoded position.
    ///
    /// # Arguments
    /// * `obs` - Encoded position (evaluator input format)
    /// * `num_actions` - Size of the action space
    ///
    /// # Returns
    /// Raw policy over all actions and a value estimate
    fn evaluate(&self, obs: &[f32], num_actions: usize) -> Result<EvalResult, EvaluatorError>;
}

impl<E: Evaluator + ?Sized> Evaluator for std::sync::Arc<E> {
    fn evaluate(&self, obs: &[f32], num_actions: usize) -> Result<EvalResult, EvaluatorError> {
        (**self).evaluate(obs, num_actions)
    }
}

/// Uniform evaluator: equal weight on every action, value always 0.0.
/// Useful for testing MCTS and running self-play without a model.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, _obs: &[f32], num_actions: usize) -> Result<EvalResult, EvaluatorError> {
        if num_actions == 0 {
            return Ok(EvalResult {
                policy: Vec::new(),
                value: 0.0,
            });
        }

        Ok(EvalResult {
            policy: vec![1.0 / num_actions as f32; num_actions],
            value: 0.0,
        })
    }
}
