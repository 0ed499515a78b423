//! Traveling Salesman: complete city graphs and three tour builders.

mod dynamic;
mod genetic;
mod graph;
mod nearest;

pub use dynamic::{dynamic_programming, MAX_DP_CITIES};
pub use genetic::{
    genetic_algorithm, GeneticParams, CROSSOVER_RATE, DEFAULT_GENERATIONS, DEFAULT_MUTATION_RATE,
    DEFAULT_POPULATION, TOURNAMENT_SIZE,
};
pub use graph::{check_route, city_name, CityGraph, RouteVerdict, Tour, LENGTH_TOLERANCE, RANDOM_DISTANCE_RANGE};
pub use nearest::nearest_neighbor;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::Result;
use crate::strategy::{Puzzle, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TspAlgorithm {
    /// Greedy closest-unvisited-city tour
    NearestNeighbor,
    /// Exact subset dynamic programming (at most 16 cities)
    DynamicProgramming,
    /// Genetic algorithm with order crossover
    Genetic,
}

impl Strategy for TspAlgorithm {
    type State = CityGraph;
    type Output = Tour;

    fn puzzle(&self) -> Puzzle {
        Puzzle::TravelingSalesman
    }

    fn name(&self) -> &'static str {
        match self {
            TspAlgorithm::NearestNeighbor => "nearest_neighbor",
            TspAlgorithm::DynamicProgramming => "dynamic_programming",
            TspAlgorithm::Genetic => "genetic_algorithm",
        }
    }

    fn solve(&self, graph: &CityGraph, config: &SolverConfig) -> Result<Tour> {
        config.validate()?;
        match self {
            TspAlgorithm::NearestNeighbor => Ok(nearest_neighbor(graph)),
            TspAlgorithm::DynamicProgramming => dynamic_programming(graph),
            TspAlgorithm::Genetic => {
                let params = GeneticParams {
                    population_size: config.population_size_or(DEFAULT_POPULATION),
                    generations: config.generations_or(DEFAULT_GENERATIONS),
                    mutation_rate: config.mutation_rate_or(DEFAULT_MUTATION_RATE),
                    ..GeneticParams::default()
                };
                Ok(genetic_algorithm(graph, &params, &mut config.rng()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_algorithms_produce_valid_routes() {
        let graph = CityGraph::random_with_seed(10, 2).unwrap();
        let config = SolverConfig::new().with_seed(2);
        for algorithm in TspAlgorithm::value_variants() {
            let tour = algorithm.solve(&graph, &config).unwrap();
            assert!(graph.validate_route(&tour.route).is_ok(), "{:?}", algorithm);
            assert!((tour.length - graph.route_length(&tour.route)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_config_reaches_genetic_solver() {
        let graph = CityGraph::random_with_seed(6, 0).unwrap();
        let bad = SolverConfig::new().with_population_size(1);
        assert!(TspAlgorithm::Genetic.solve(&graph, &bad).is_err());
        let config = SolverConfig::new().with_seed(1).with_generations(5);
        assert!(TspAlgorithm::Genetic.solve(&graph, &config).is_ok());
    }
}
