//! Wall-clock timing around solver calls, and the record handed to storage.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::Result;
use crate::strategy::{Puzzle, Strategy};

/// A solver result paired with the wall-clock time it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    pub output: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Timed<U> {
        Timed {
            output: f(self.output),
            elapsed: self.elapsed,
        }
    }
}

/// Runs `f` and measures how long it took.
///
/// # Examples
/// ```
/// use puzzle_engine::timing::timed;
///
/// let result = timed(|| (1..=10).sum::<u32>());
/// assert_eq!(result.output, 55);
/// ```
pub fn timed<T>(f: impl FnOnce() -> T) -> Timed<T> {
    let started = Instant::now();
    let output = f();
    Timed {
        output,
        elapsed: started.elapsed(),
    }
}

/// Invokes `strategy` on `state` and times it, whether it succeeds or fails.
pub fn run_timed<S: Strategy>(
    strategy: &S,
    state: &S::State,
    config: &SolverConfig,
) -> Timed<Result<S::Output>> {
    let result = timed(|| strategy.solve(state, config));
    log::debug!(
        "{} finished in {:.6}s (ok: {})",
        strategy.record_name(),
        result.elapsed.as_secs_f64(),
        result.output.is_ok()
    );
    result
}

/// What the host forwards to its persistence layer after a solver call.
///
/// The engine only builds this value; storing it is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub puzzle: Puzzle,
    /// Algorithm name in `<puzzle>_<algorithm>` form, e.g. `tsp_nearest_neighbor`
    pub algorithm: String,
    pub elapsed_secs: f64,
    /// Text rendering of the produced move, solution or failure
    pub artifact: String,
}

impl PerformanceRecord {
    pub fn new<S: Strategy>(strategy: &S, elapsed: Duration, artifact: impl Into<String>) -> Self {
        PerformanceRecord {
            puzzle: strategy.puzzle(),
            algorithm: strategy.record_name(),
            elapsed_secs: elapsed.as_secs_f64(),
            artifact: artifact.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hanoi::{HanoiAlgorithm, HanoiProblem, Peg};

    #[test]
    fn test_timed_returns_output() {
        let result = timed(|| "done");
        assert_eq!(result.output, "done");
        assert_eq!(result.map(str::len).output, 4);
    }

    #[test]
    fn test_run_timed_is_repeatable() {
        let problem = HanoiProblem::new(4, Peg::A, Peg::C);
        let config = SolverConfig::default();
        let first = run_timed(&HanoiAlgorithm::Recursive, &problem, &config);
        let second = run_timed(&HanoiAlgorithm::Recursive, &problem, &config);
        assert_eq!(first.output.unwrap(), second.output.unwrap());
    }

    #[test]
    fn test_run_timed_keeps_errors() {
        let problem = HanoiProblem::new(0, Peg::A, Peg::C);
        let result = run_timed(&HanoiAlgorithm::Iterative, &problem, &SolverConfig::default());
        assert!(result.output.is_err());
    }

    #[test]
    fn test_performance_record_serializes() {
        let record = PerformanceRecord::new(
            &HanoiAlgorithm::Recursive,
            Duration::from_millis(1500),
            "A->C",
        );
        assert_eq!(record.algorithm, "tower_of_hanoi_recursive");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"puzzle\":\"tower_of_hanoi\""));
        assert!(json.contains("\"elapsed_secs\":1.5"));
    }
}
