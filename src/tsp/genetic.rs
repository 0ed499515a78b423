use log::{debug, trace};
use rand::seq::index::sample;
use rand::seq::SliceRandom;
use rand::Rng;

use super::graph::{CityGraph, Tour};

pub const DEFAULT_POPULATION: usize = 50;
pub const DEFAULT_GENERATIONS: usize = 100;
pub const DEFAULT_MUTATION_RATE: f64 = 0.01;
pub const CROSSOVER_RATE: f64 = 0.7;
pub const TOURNAMENT_SIZE: usize = 3;

/// Tunables for [`genetic_algorithm`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneticParams {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub tournament_size: usize,
}

impl Default for GeneticParams {
    fn default() -> Self {
        GeneticParams {
            population_size: DEFAULT_POPULATION,
            generations: DEFAULT_GENERATIONS,
            mutation_rate: DEFAULT_MUTATION_RATE,
            crossover_rate: CROSSOVER_RATE,
            tournament_size: TOURNAMENT_SIZE,
        }
    }
}

/// Fitness of a route: the inverse of its closed length.
fn fitness(length: f64) -> f64 {
    1.0 / length.max(f64::EPSILON)
}

/// Evolves tours with tournament selection, order crossover, swap mutation
/// and single-individual elitism, returning the best tour ever seen.
///
/// Individuals are permutations of the non-home cities; the home city is
/// prepended when a route is scored. The result is valid but not necessarily
/// optimal.
pub fn genetic_algorithm<R: Rng>(graph: &CityGraph, params: &GeneticParams, rng: &mut R) -> Tour {
    let home = graph.home();
    let genes: Vec<usize> = (0..graph.len()).filter(|&c| c != home).collect();
    let with_home = |individual: &[usize]| -> Vec<usize> {
        std::iter::once(home).chain(individual.iter().copied()).collect()
    };

    if genes.len() < 2 {
        return Tour::from_route(graph, with_home(&genes));
    }

    let size = params.population_size.max(2);
    let mut population: Vec<Vec<usize>> = (0..size)
        .map(|_| {
            let mut individual = genes.clone();
            individual.shuffle(rng);
            individual
        })
        .collect();

    let mut best = genes.clone();
    let mut best_length = graph.route_length(&with_home(&best));

    for generation in 0..params.generations {
        let lengths: Vec<f64> = population
            .iter()
            .map(|individual| graph.route_length(&with_home(individual)))
            .collect();

        let mut elite = 0;
        for (i, &length) in lengths.iter().enumerate() {
            if length < lengths[elite] {
                elite = i;
            }
        }
        if lengths[elite] < best_length {
            best_length = lengths[elite];
            best = population[elite].clone();
            trace!("generation {}: best length {:.2}", generation, best_length);
        }

        let mut next = Vec::with_capacity(size);
        next.push(population[elite].clone());
        while next.len() < size {
            let first = tournament(&lengths, params.tournament_size, rng);
            let second = tournament(&lengths, params.tournament_size, rng);
            let mut child = if rng.gen::<f64>() < params.crossover_rate {
                order_crossover(&population[first], &population[second], graph.len(), rng)
            } else {
                population[first].clone()
            };
            if rng.gen::<f64>() < params.mutation_rate {
                swap_mutation(&mut child, rng);
            }
            next.push(child);
        }
        population = next;
    }

    for individual in &population {
        let length = graph.route_length(&with_home(individual));
        if length < best_length {
            best_length = length;
            best = individual.clone();
        }
    }

    debug!(
        "genetic algorithm: {} generations of {}, best length {:.2}",
        params.generations, size, best_length
    );
    Tour::from_route(graph, with_home(&best))
}

/// Picks the fittest of `k` distinct random individuals.
fn tournament<R: Rng>(lengths: &[f64], k: usize, rng: &mut R) -> usize {
    let k = k.clamp(1, lengths.len());
    let mut winner = None;
    for candidate in sample(rng, lengths.len(), k).into_iter() {
        if winner.map_or(true, |w: usize| fitness(lengths[candidate]) > fitness(lengths[w])) {
            winner = Some(candidate);
        }
    }
    winner.unwrap_or(0)
}

/// Order crossover (OX): copies a random slice of `first` into the child and
/// fills the remaining positions with the missing cities in `second`'s order.
fn order_crossover<R: Rng>(first: &[usize], second: &[usize], cities: usize, rng: &mut R) -> Vec<usize> {
    let len = first.len();
    let mut a = rng.gen_range(0..len);
    let mut b = rng.gen_range(0..len);
    if a > b {
        std::mem::swap(&mut a, &mut b);
    }

    let mut child: Vec<Option<usize>> = vec![None; len];
    let mut taken = vec![false; cities];
    for i in a..=b {
        child[i] = Some(first[i]);
        taken[first[i]] = true;
    }
    let mut fill = second.iter().copied().filter(|&c| !taken[c]);
    for slot in child.iter_mut() {
        if slot.is_none() {
            *slot = fill.next();
        }
    }
    child.into_iter().flatten().collect()
}

fn swap_mutation<R: Rng>(individual: &mut [usize], rng: &mut R) {
    let i = rng.gen_range(0..individual.len());
    let j = rng.gen_range(0..individual.len());
    individual.swap(i, j);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsp::dynamic_programming;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_order_crossover_keeps_permutation() {
        let mut rng = SmallRng::seed_from_u64(4);
        let first = vec![1, 2, 3, 4, 5, 6, 7];
        let second = vec![7, 6, 5, 4, 3, 2, 1];
        for _ in 0..50 {
            let mut child = order_crossover(&first, &second, 8, &mut rng);
            child.sort_unstable();
            assert_eq!(child, first);
        }
    }

    #[test]
    fn test_tournament_prefers_shorter() {
        let mut rng = SmallRng::seed_from_u64(0);
        let lengths = [10.0, 1.0, 30.0];
        assert_eq!(tournament(&lengths, 3, &mut rng), 1);
    }

    #[test]
    fn test_returns_valid_route_no_shorter_than_optimum() {
        let graph = CityGraph::random_with_seed(9, 21).unwrap().with_home(2).unwrap();
        let mut rng = SmallRng::seed_from_u64(21);
        let tour = genetic_algorithm(&graph, &GeneticParams::default(), &mut rng);
        assert!(graph.validate_route(&tour.route).is_ok());
        let optimum = dynamic_programming(&graph).unwrap();
        assert!(optimum.length <= tour.length + 1e-9);
    }

    #[test]
    fn test_seeded_runs_match() {
        let graph = CityGraph::random_with_seed(8, 5).unwrap();
        let params = GeneticParams {
            generations: 20,
            ..GeneticParams::default()
        };
        let a = genetic_algorithm(&graph, &params, &mut SmallRng::seed_from_u64(8));
        let b = genetic_algorithm(&graph, &params, &mut SmallRng::seed_from_u64(8));
        assert_eq!(a, b);
    }

    #[test]
    fn test_tiny_graphs() {
        let mut rng = SmallRng::seed_from_u64(0);
        let two = CityGraph::from_coordinates(&[(0.0, 0.0), (1.0, 0.0)]).unwrap();
        let tour = genetic_algorithm(&two, &GeneticParams::default(), &mut rng);
        assert_eq!(tour.route, vec![0, 1]);
    }
}
