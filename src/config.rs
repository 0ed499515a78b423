//! Per-call solver configuration.
//!
//! A [`SolverConfig`] is the record the host passes alongside a puzzle state.
//! Every field is optional; each solver falls back to its own defaults for the
//! parameters it reads and ignores the rest.

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Search cutoff for budgeted solvers (MCTS, knight's tour backtracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    /// Stop after this many iterations (MCTS) or search nodes (backtracking).
    Iterations(u64),
    /// Stop once this many milliseconds of wall-clock time have elapsed.
    Millis(u64),
}

/// Configuration for a single solver invocation.
///
/// # Examples
///
/// ```
/// use puzzle_engine::config::{Budget, SolverConfig};
///
/// let config = SolverConfig::new()
///     .with_seed(42)
///     .with_budget(Budget::Iterations(500))
///     .with_depth_limit(3);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.depth_limit_or(4), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Random seed for reproducible stochastic solvers
    pub seed: Option<u64>,
    /// Iteration or time cutoff
    pub budget: Option<Budget>,
    /// Maximum search depth in plies (Minimax)
    pub depth_limit: Option<u32>,
    /// Population size (genetic algorithms)
    pub population_size: Option<usize>,
    /// Number of generations (genetic algorithms)
    pub generations: Option<usize>,
    /// Per-offspring mutation probability (genetic algorithms)
    pub mutation_rate: Option<f64>,
    /// Maximum number of solutions to return (Eight Queens backtracking)
    pub solution_limit: Option<usize>,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_depth_limit(mut self, depth: u32) -> Self {
        self.depth_limit = Some(depth);
        self
    }

    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = Some(size);
        self
    }

    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = Some(generations);
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = Some(rate);
        self
    }

    pub fn with_solution_limit(mut self, limit: usize) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    /// Checks that every field which is set lies in its valid range.
    ///
    /// Solvers call this before doing any work, so a bad record is reported as
    /// [`Error::InvalidConfiguration`] rather than discovered mid-search.
    pub fn validate(&self) -> Result<()> {
        match self.budget {
            Some(Budget::Iterations(0)) => {
                return Err(Error::config("iteration budget must be at least 1"))
            }
            Some(Budget::Millis(0)) => {
                return Err(Error::config("time budget must be at least 1 ms"))
            }
            _ => {}
        }
        if self.depth_limit == Some(0) {
            return Err(Error::config("depth limit must be at least 1"));
        }
        if let Some(size) = self.population_size {
            if size < 2 {
                return Err(Error::config(format!(
                    "population size must be at least 2, got {}",
                    size
                )));
            }
        }
        if self.generations == Some(0) {
            return Err(Error::config("generation budget must be at least 1"));
        }
        if let Some(rate) = self.mutation_rate {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(Error::config(format!(
                    "mutation rate must be within [0, 1], got {}",
                    rate
                )));
            }
        }
        if self.solution_limit == Some(0) {
            return Err(Error::config("solution limit must be at least 1"));
        }
        Ok(())
    }

    /// Builds the random number generator for one solver call.
    ///
    /// A configured seed gives a reproducible `SmallRng`; otherwise the
    /// generator is seeded from the operating system.
    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }

    pub fn budget_or(&self, default: Budget) -> Budget {
        self.budget.unwrap_or(default)
    }

    pub fn depth_limit_or(&self, default: u32) -> u32 {
        self.depth_limit.unwrap_or(default)
    }

    pub fn population_size_or(&self, default: usize) -> usize {
        self.population_size.unwrap_or(default)
    }

    pub fn generations_or(&self, default: usize) -> usize {
        self.generations.unwrap_or(default)
    }

    pub fn mutation_rate_or(&self, default: f64) -> f64 {
        self.mutation_rate.unwrap_or(default)
    }
}

/// Tracks consumption of a [`Budget`] inside one solver call.
#[derive(Debug, Clone)]
pub struct Deadline {
    budget: Budget,
    started: Instant,
    spent: u64,
}

impl Deadline {
    pub fn start(budget: Budget) -> Self {
        Deadline {
            budget,
            started: Instant::now(),
            spent: 0,
        }
    }

    /// Records one unit of work and reports whether the budget allows it.
    pub fn tick(&mut self) -> bool {
        self.spent += 1;
        match self.budget {
            Budget::Iterations(limit) => self.spent <= limit,
            // Checking the clock on every node is wasteful; sample it.
            Budget::Millis(ms) => {
                self.spent % 256 != 0 || self.started.elapsed() < Duration::from_millis(ms)
            }
        }
    }

    /// Number of units consumed so far.
    pub fn spent(&self) -> u64 {
        self.spent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let bad = [
            SolverConfig::new().with_budget(Budget::Iterations(0)),
            SolverConfig::new().with_budget(Budget::Millis(0)),
            SolverConfig::new().with_depth_limit(0),
            SolverConfig::new().with_population_size(1),
            SolverConfig::new().with_generations(0),
            SolverConfig::new().with_mutation_rate(1.5),
            SolverConfig::new().with_mutation_rate(f64::NAN),
            SolverConfig::new().with_solution_limit(0),
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfiguration { .. })),
                "expected rejection for {:?}",
                config
            );
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = SolverConfig::new().with_seed(7);
        let a: Vec<u32> = (0..5).map(|_| config.rng().gen()).collect();
        let mut rng1 = config.rng();
        let mut rng2 = config.rng();
        let b: Vec<u32> = (0..5).map(|_| rng1.gen()).collect();
        let c: Vec<u32> = (0..5).map(|_| rng2.gen()).collect();
        assert_eq!(b, c);
        // A fresh generator per call always yields the same first value.
        assert!(a.iter().all(|v| *v == a[0]));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{"seed": 3, "budget": {"millis": 250}, "generations": 20}"#;
        let config: SolverConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.budget, Some(Budget::Millis(250)));
        assert_eq!(config.generations_or(100), 20);
        assert_eq!(config.population_size_or(50), 50);
    }

    #[test]
    fn test_deadline_iterations() {
        let mut deadline = Deadline::start(Budget::Iterations(3));
        assert!(deadline.tick());
        assert!(deadline.tick());
        assert!(deadline.tick());
        assert!(!deadline.tick());
        assert_eq!(deadline.spent(), 4);
    }
}
