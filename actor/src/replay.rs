//! In-memory training example store.
//!
//! Self-play workers append whole finished games; training code reads
//! fixed-width batches of (encoded position, policy target, value target).
//! The store keeps at most `capacity` examples and evicts the oldest first.

use engine_core::Side;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use crate::game::GameResult;

/// Errors reported by the training example store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Training example store is empty")]
    Empty,

    #[error("Batch size must be greater than 0")]
    InvalidBatchSize,

    #[error("Store capacity must be greater than 0")]
    InvalidCapacity,

    #[error("Example at ply {ply} has no value target")]
    Unfinalized { ply: u32 },

    #[error("Example at ply {ply} has {field} of length {actual}, expected {expected}")]
    ShapeMismatch {
        ply: u32,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Store lock poisoned")]
    Poisoned,
}

/// One recorded search decision.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    /// Encoded position the search ran from
    pub position: Vec<f32>,
    /// Visit-count distribution over the full action space
    pub policy: Vec<f32>,
    /// Side to move at `position`
    pub side_to_move: Side,
    /// Ply of the game at which the position occurred
    pub ply: u32,
    /// Outcome from `side_to_move`'s perspective; `None` until the game ends
    pub value: Option<f32>,
}

impl TrainingExample {
    /// An example whose value target is not known yet.
    pub fn pending(position: Vec<f32>, policy: Vec<f32>, side_to_move: Side, ply: u32) -> Self {
        Self {
            position,
            policy,
            side_to_move,
            ply,
            value: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.value.is_some()
    }
}

/// Back-fill value targets once the game result is known.
///
/// Each example gets +1 if its side to move won, -1 if it lost and 0 for a
/// draw. Examples that already carry a value are overwritten.
pub fn finalize_examples(
    mut examples: Vec<TrainingExample>,
    result: GameResult,
) -> Vec<TrainingExample> {
    for example in &mut examples {
        example.value = Some(result.value_for(example.side_to_move));
    }
    examples
}

/// Row-major training batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    /// `len * obs_size` encoded positions
    pub positions: Vec<f32>,
    /// `len * num_actions` policy targets
    pub policies: Vec<f32>,
    /// `len` value targets
    pub values: Vec<f32>,
}

impl Batch {
    fn from_examples<'a>(examples: impl ExactSizeIterator<Item = &'a TrainingExample>) -> Self {
        let mut batch = Batch {
            values: Vec::with_capacity(examples.len()),
            ..Batch::default()
        };
        for example in examples {
            batch.positions.extend_from_slice(&example.position);
            batch.policies.extend_from_slice(&example.policy);
            // append_game only admits finalized examples
            batch.values.push(example.value.unwrap_or(0.0));
        }
        batch
    }

    /// Number of examples in the batch.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Bounded FIFO of finalized training examples, shared by all workers.
#[derive(Debug)]
pub struct TrainingExampleStore {
    capacity: usize,
    obs_size: usize,
    num_actions: usize,
    examples: Mutex<VecDeque<TrainingExample>>,
}

impl TrainingExampleStore {
    /// Create a store for examples of the given encoding widths.
    pub fn new(capacity: usize, obs_size: usize, num_actions: usize) -> Result<Self, StoreError> {
        if capacity == 0 {
            return Err(StoreError::InvalidCapacity);
        }
        Ok(Self {
            capacity,
            obs_size,
            num_actions,
            examples: Mutex::new(VecDeque::with_capacity(capacity.min(1 << 16))),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<TrainingExample>>, StoreError> {
        self.examples.lock().map_err(|_| StoreError::Poisoned)
    }

    fn check(&self, example: &TrainingExample) -> Result<(), StoreError> {
        if !example.is_finalized() {
            return Err(StoreError::Unfinalized { ply: example.ply });
        }
        if example.position.len() != self.obs_size {
            return Err(StoreError::ShapeMismatch {
                ply: example.ply,
                field: "position",
                expected: self.obs_size,
                actual: example.position.len(),
            });
        }
        if example.policy.len() != self.num_actions {
            return Err(StoreError::ShapeMismatch {
                ply: example.ply,
                field: "policy",
                expected: self.num_actions,
                actual: example.policy.len(),
            });
        }
        Ok(())
    }

    /// Append every example of one finished game, in order.
    ///
    /// The game is checked as a whole before anything is stored, so a
    /// rejected game leaves the store untouched. Returns how many old
    /// examples were evicted to make room.
    pub fn append_game(&self, examples: Vec<TrainingExample>) -> Result<usize, StoreError> {
        for example in &examples {
            self.check(example)?;
        }

        let mut stored = self.lock()?;
        stored.extend(examples);
        let evicted = stored.len().saturating_sub(self.capacity);
        stored.drain(..evicted);
        Ok(evicted)
    }

    /// Number of retained examples.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    /// All retained examples, oldest first.
    pub fn snapshot(&self) -> Result<Vec<TrainingExample>, StoreError> {
        let stored = self.lock()?;
        if stored.is_empty() {
            return Err(StoreError::Empty);
        }
        Ok(stored.iter().cloned().collect())
    }

    /// Consecutive batches in insertion order; the last one may be short.
    pub fn batches(&self, batch_size: usize) -> Result<Vec<Batch>, StoreError> {
        if batch_size == 0 {
            return Err(StoreError::InvalidBatchSize);
        }
        let stored = self.lock()?;
        if stored.is_empty() {
            return Err(StoreError::Empty);
        }

        let mut batches = Vec::with_capacity(stored.len().div_ceil(batch_size));
        let mut start = 0;
        while start < stored.len() {
            let end = (start + batch_size).min(stored.len());
            batches.push(Batch::from_examples(stored.range(start..end)));
            start = end;
        }
        Ok(batches)
    }

    /// Uniformly sampled batch (with replacement) of exactly `batch_size` examples.
    pub fn sample_batch<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<Batch, StoreError> {
        if batch_size == 0 {
            return Err(StoreError::InvalidBatchSize);
        }
        let stored = self.lock()?;
        if stored.is_empty() {
            return Err(StoreError::Empty);
        }

        let picks: Vec<&TrainingExample> = (0..batch_size)
            .map(|_| &stored[rng.gen_range(0..stored.len())])
            .collect();
        Ok(Batch::from_examples(picks.into_iter()))
    }
}
