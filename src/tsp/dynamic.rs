use log::debug;

use super::graph::{CityGraph, Tour};
use crate::error::{Error, Result};

/// Largest graph the exact solver accepts. The tables take O(N·2ᴺ) memory.
pub const MAX_DP_CITIES: usize = 16;

/// Exact shortest tour by dynamic programming over subsets (Held-Karp).
///
/// `cost[mask][last]` is the cheapest path that starts at home, visits
/// exactly the cities in `mask` and ends at `last`. The optimal route is
/// rebuilt by following the recorded predecessors back from the best final
/// city. O(N²·2ᴺ) time.
///
/// # Errors
/// [`Error::InvalidConfiguration`] if the graph has more than
/// [`MAX_DP_CITIES`] cities.
pub fn dynamic_programming(graph: &CityGraph) -> Result<Tour> {
    let n = graph.len();
    if n > MAX_DP_CITIES {
        return Err(Error::config(format!(
            "dynamic programming supports at most {} cities, got {}",
            MAX_DP_CITIES, n
        )));
    }
    let home = graph.home();
    if n == 1 {
        return Ok(Tour::from_route(graph, vec![home]));
    }

    let subsets = 1usize << n;
    let full = subsets - 1;
    let at = |mask: usize, last: usize| mask * n + last;
    let mut cost = vec![f64::INFINITY; subsets * n];
    let mut parent = vec![usize::MAX; subsets * n];
    cost[at(1 << home, home)] = 0.0;

    for mask in 1..subsets {
        if mask & (1 << home) == 0 {
            continue;
        }
        for last in 0..n {
            if mask & (1 << last) == 0 {
                continue;
            }
            let current = cost[at(mask, last)];
            if !current.is_finite() {
                continue;
            }
            for next in 0..n {
                if mask & (1 << next) != 0 {
                    continue;
                }
                let next_mask = mask | (1 << next);
                let candidate = current + graph.distance(last, next);
                if candidate < cost[at(next_mask, next)] {
                    cost[at(next_mask, next)] = candidate;
                    parent[at(next_mask, next)] = last;
                }
            }
        }
    }

    let mut best: Option<(usize, f64)> = None;
    for last in 0..n {
        if last == home {
            continue;
        }
        let total = cost[at(full, last)] + graph.distance(last, home);
        if best.map_or(true, |(_, length)| total < length) {
            best = Some((last, total));
        }
    }
    let (mut last, length) = best.ok_or_else(|| Error::NoSolutionFound {
        detail: "no closing edge back to the home city".to_string(),
    })?;

    let mut route = Vec::with_capacity(n);
    let mut mask = full;
    while last != home {
        route.push(last);
        let previous = parent[at(mask, last)];
        mask ^= 1 << last;
        last = previous;
    }
    route.push(home);
    route.reverse();

    debug!("dynamic programming: {} cities, optimal length {:.2}", n, length);
    Ok(Tour::from_route(graph, route))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tsp::nearest_neighbor;

    /// Shortest tour by trying every permutation of the non-home cities.
    fn brute_force(graph: &CityGraph) -> f64 {
        fn permute(graph: &CityGraph, route: &mut Vec<usize>, rest: &mut Vec<usize>, best: &mut f64) {
            if rest.is_empty() {
                *best = best.min(graph.route_length(route));
                return;
            }
            for i in 0..rest.len() {
                let city = rest.remove(i);
                route.push(city);
                permute(graph, route, rest, best);
                route.pop();
                rest.insert(i, city);
            }
        }
        let mut route = vec![graph.home()];
        let mut rest: Vec<usize> = (0..graph.len()).filter(|&c| c != graph.home()).collect();
        let mut best = f64::INFINITY;
        permute(graph, &mut route, &mut rest, &mut best);
        best
    }

    #[test]
    fn test_matches_brute_force() {
        for seed in 0..5 {
            let graph = CityGraph::random_with_seed(7, seed).unwrap().with_home(seed as usize).unwrap();
            let tour = dynamic_programming(&graph).unwrap();
            assert!(graph.validate_route(&tour.route).is_ok());
            assert!((tour.length - brute_force(&graph)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_never_worse_than_nearest_neighbor() {
        for seed in 0..10 {
            let graph = CityGraph::random_with_seed(10, seed).unwrap();
            let exact = dynamic_programming(&graph).unwrap();
            let greedy = nearest_neighbor(&graph);
            assert!(exact.length <= greedy.length + 1e-9);
        }
    }

    #[test]
    fn test_small_graphs() {
        let one = CityGraph::from_coordinates(&[(0.0, 0.0)]).unwrap();
        assert_eq!(dynamic_programming(&one).unwrap().route, vec![0]);
        let two = CityGraph::from_coordinates(&[(0.0, 0.0), (0.0, 2.0)]).unwrap();
        let tour = dynamic_programming(&two).unwrap();
        assert_eq!(tour.route, vec![0, 1]);
        assert!((tour.length - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_large_graphs() {
        let graph = CityGraph::random_with_seed(MAX_DP_CITIES + 1, 0).unwrap();
        assert!(matches!(
            dynamic_programming(&graph),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
