use super::graph::{CityGraph, Tour};

/// Greedy nearest-neighbour tour.
///
/// Starting from the home city, repeatedly moves to the closest unvisited
/// city (lowest index on ties) and finally returns home. Runs in O(N²) and is
/// not optimal in general.
pub fn nearest_neighbor(graph: &CityGraph) -> Tour {
    let n = graph.len();
    let mut visited = vec![false; n];
    let mut route = Vec::with_capacity(n);
    let mut current = graph.home();
    visited[current] = true;
    route.push(current);

    for _ in 1..n {
        let mut nearest: Option<(usize, f64)> = None;
        for city in 0..n {
            if visited[city] {
                continue;
            }
            let d = graph.distance(current, city);
            if nearest.map_or(true, |(_, best)| d < best) {
                nearest = Some((city, d));
            }
        }
        match nearest {
            Some((city, _)) => {
                visited[city] = true;
                route.push(city);
                current = city;
            }
            None => break,
        }
    }

    Tour::from_route(graph, route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follows_closest_city() {
        // A line of cities: 0 at x=0, then x=3, x=1, x=2
        let graph = CityGraph::from_coordinates(&[(0.0, 0.0), (3.0, 0.0), (1.0, 0.0), (2.0, 0.0)])
            .unwrap();
        let tour = nearest_neighbor(&graph);
        assert_eq!(tour.route, vec![0, 2, 3, 1]);
        assert!((tour.length - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_starts_at_home() {
        let graph = CityGraph::random_with_seed(8, 11).unwrap().with_home(5).unwrap();
        let tour = nearest_neighbor(&graph);
        assert_eq!(tour.route[0], 5);
        assert!(graph.validate_route(&tour.route).is_ok());
    }

    #[test]
    fn test_single_city() {
        let graph = CityGraph::from_coordinates(&[(1.0, 1.0)]).unwrap();
        let tour = nearest_neighbor(&graph);
        assert_eq!(tour.route, vec![0]);
        assert_eq!(tour.length, 0.0);
    }
}
