//! MCTS configuration parameters.

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of simulations to run per search, after the root expansion.
    pub num_simulations: u32,

    /// Exploration constant for the PUCT formula (c_puct in AlphaZero).
    /// Higher values encourage exploration, lower values favor exploitation.
    pub c_puct: f32,

    /// Q used for a child that has never been visited, from the parent's side.
    /// 0.0 treats unknown moves as neutral.
    pub default_q: f32,

    /// Whether to mix Dirichlet noise into the root priors.
    /// Only the root is ever perturbed.
    pub root_noise: bool,

    /// Dirichlet noise concentration for the root.
    /// Chess has ~30 legal moves, AlphaZero uses 0.3.
    pub dirichlet_alpha: f32,

    /// Fraction of each root prior that comes from noise.
    /// AlphaZero uses 0.25, meaning 75% prior + 25% noise.
    pub dirichlet_epsilon: f32,

    /// Temperature for action selection after search.
    /// 1.0 = sample proportional to visit counts
    /// 0.0 = always pick most-visited (argmax)
    pub temperature: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 100,
            c_puct: 1.0,
            default_q: 0.0,
            root_noise: true,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.25,
            temperature: 1.0,
        }
    }
}

impl MctsConfig {
    /// Create config for self-play training (with exploration noise).
    pub fn for_training() -> Self {
        Self::default()
    }

    /// Create config for evaluation/strength play (no noise, greedy selection).
    pub fn for_evaluation() -> Self {
        Self {
            num_simulations: 800,
            root_noise: false,
            temperature: 0.0, // Greedy
            ..Self::default()
        }
    }

    /// Create a fast deterministic config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 50,
            c_puct: 1.25,
            root_noise: false,
            temperature: 0.0,
            ..Self::default()
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set c_puct exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set temperature.
    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    /// Builder pattern: set Q for unvisited children.
    pub fn with_default_q(mut self, q: f32) -> Self {
        self.default_q = q;
        self
    }

    /// Builder pattern: enable root noise with the given parameters.
    pub fn with_root_noise(mut self, alpha: f32, epsilon: f32) -> Self {
        self.root_noise = true;
        self.dirichlet_alpha = alpha;
        self.dirichlet_epsilon = epsilon;
        self
    }

    /// Builder pattern: disable root noise.
    pub fn without_root_noise(mut self) -> Self {
        self.root_noise = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.num_simulations, 100);
        assert!((config.c_puct - 1.0).abs() < 1e-6);
        assert!(config.root_noise);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_simulations(200)
            .with_temperature(0.5)
            .with_default_q(-0.2)
            .without_root_noise();

        assert_eq!(config.num_simulations, 200);
        assert!((config.temperature - 0.5).abs() < 1e-6);
        assert!((config.default_q + 0.2).abs() < 1e-6);
        assert!(!config.root_noise);

        let noisy = config.with_root_noise(0.15, 0.4);
        assert!(noisy.root_noise);
        assert!((noisy.dirichlet_alpha - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_evaluation_config() {
        let config = MctsConfig::for_evaluation();
        assert!(!config.root_noise);
        assert!((config.temperature).abs() < 1e-6);
    }
}
