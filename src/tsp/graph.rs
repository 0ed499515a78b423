//! City graphs, routes, and route checking for the Traveling Salesman puzzle.

use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shortest and longest distance produced by [`CityGraph::random_with_seed`].
pub const RANDOM_DISTANCE_RANGE: (u32, u32) = (50, 100);

/// Two route lengths closer than this are considered equal.
pub const LENGTH_TOLERANCE: f64 = 0.01;

/// Name given to the city at `index`: `A`..`Z`, then `C26`, `C27`, ...
pub fn city_name(index: usize) -> String {
    if index < 26 {
        ((b'A' + index as u8) as char).to_string()
    } else {
        format!("C{}", index)
    }
}

/// A complete, symmetric graph of cities with a designated home city.
///
/// Distances are stored as a dense `N × N` matrix. Every route over the graph
/// starts at `home` and implicitly returns to it. Deserialized graphs go
/// through the same checks as [`CityGraph::from_matrix`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphRecord")]
pub struct CityGraph {
    names: Vec<String>,
    distances: Vec<Vec<f64>>,
    home: usize,
}

/// Wire form of a [`CityGraph`], validated on the way in.
#[derive(Deserialize)]
struct GraphRecord {
    names: Vec<String>,
    distances: Vec<Vec<f64>>,
    home: usize,
}

impl TryFrom<GraphRecord> for CityGraph {
    type Error = Error;

    fn try_from(record: GraphRecord) -> Result<Self> {
        let mut graph = CityGraph::from_matrix(record.distances)?;
        if record.names.len() != graph.len() {
            return Err(Error::board(format!(
                "{} names for {} cities",
                record.names.len(),
                graph.len()
            )));
        }
        for (i, name) in record.names.iter().enumerate() {
            if record.names[..i].contains(name) {
                return Err(Error::board(format!("city name {} is used twice", name)));
            }
        }
        graph.names = record.names;
        graph.with_home(record.home)
    }
}

impl CityGraph {
    /// Builds a graph whose distances are the Euclidean distances between the
    /// given points. City `i` is named [`city_name(i)`](city_name) and city 0
    /// is home.
    ///
    /// # Examples
    /// ```
    /// use puzzle_engine::tsp::CityGraph;
    ///
    /// let graph = CityGraph::from_coordinates(&[(0.0, 0.0), (3.0, 4.0)]).unwrap();
    /// assert_eq!(graph.distance(0, 1), 5.0);
    /// assert_eq!(graph.name(1), "B");
    /// ```
    pub fn from_coordinates(points: &[(f64, f64)]) -> Result<Self> {
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(Error::board("city coordinates must be finite"));
        }
        let distances = points
            .iter()
            .map(|(x1, y1)| {
                points
                    .iter()
                    .map(|(x2, y2)| ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt())
                    .collect()
            })
            .collect();
        Self::from_matrix(distances)
    }

    /// Builds a graph from a precomputed distance matrix.
    ///
    /// # Errors
    /// [`Error::InvalidBoard`] if the matrix is empty or not square, has a
    /// non-zero diagonal, is not symmetric, or holds a negative or non-finite
    /// entry.
    pub fn from_matrix(distances: Vec<Vec<f64>>) -> Result<Self> {
        let n = distances.len();
        if n == 0 {
            return Err(Error::board("a city graph needs at least one city"));
        }
        if let Some((i, row)) = distances.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(Error::board(format!(
                "distance row {} has {} entries, expected {}",
                i,
                row.len(),
                n
            )));
        }
        for (i, row) in distances.iter().enumerate() {
            for (j, &d) in row.iter().enumerate() {
                if !d.is_finite() || d < 0.0 {
                    return Err(Error::board(format!("distance ({}, {}) is {}", i, j, d)));
                }
                if i == j && d != 0.0 {
                    return Err(Error::board(format!("city {} has non-zero self distance", i)));
                }
                if (d - distances[j][i]).abs() > 1e-9 {
                    return Err(Error::board(format!(
                        "distance ({}, {}) differs from ({}, {})",
                        i, j, j, i
                    )));
                }
            }
        }
        Ok(CityGraph {
            names: (0..n).map(city_name).collect(),
            distances,
            home: 0,
        })
    }

    /// Generates `n` cities with symmetric integer distances drawn uniformly
    /// from [`RANDOM_DISTANCE_RANGE`], reproducibly for a given `seed`.
    pub fn random_with_seed(n: usize, seed: u64) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let (low, high) = RANDOM_DISTANCE_RANGE;
        let mut distances = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = rng.gen_range(low..=high) as f64;
                distances[i][j] = d;
                distances[j][i] = d;
            }
        }
        Self::from_matrix(distances)
    }

    /// Returns the same graph with a different home city.
    pub fn with_home(mut self, home: usize) -> Result<Self> {
        if home >= self.len() {
            return Err(Error::config(format!(
                "home city {} is out of range for {} cities",
                home,
                self.len()
            )));
        }
        self.home = home;
        Ok(self)
    }

    /// Builds the sub-problem made of the home city plus `cities`.
    ///
    /// The home city becomes index 0 of the new graph and the selected cities
    /// follow in the given order; names are kept. Listing the home city again
    /// is allowed and ignored.
    pub fn select(&self, cities: &[usize]) -> Result<CityGraph> {
        let mut chosen = vec![self.home];
        for &city in cities {
            if city >= self.len() {
                return Err(Error::config(format!("city {} does not exist", city)));
            }
            if city == self.home {
                continue;
            }
            if chosen.contains(&city) {
                return Err(Error::config(format!(
                    "city {} selected twice",
                    self.names[city]
                )));
            }
            chosen.push(city);
        }
        Ok(CityGraph {
            names: chosen.iter().map(|&c| self.names[c].clone()).collect(),
            distances: chosen
                .iter()
                .map(|&a| chosen.iter().map(|&b| self.distances[a][b]).collect())
                .collect(),
            home: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: construction rejects empty graphs.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn home(&self) -> usize {
        self.home
    }

    pub fn name(&self, city: usize) -> &str {
        &self.names[city]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Maps city names such as `["A", "C", "B"]` to their indices.
    ///
    /// # Errors
    /// [`Error::Parse`] for a name that is not in the graph.
    pub fn route_from_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref().trim();
                self.index_of(name)
                    .ok_or_else(|| Error::parse(name, "no city by that name"))
            })
            .collect()
    }

    pub fn distance(&self, a: usize, b: usize) -> f64 {
        self.distances[a][b]
    }

    /// Length of the closed route, including the leg back to the first city.
    pub fn route_length(&self, route: &[usize]) -> f64 {
        if route.len() < 2 {
            return 0.0;
        }
        let legs: f64 = route.windows(2).map(|w| self.distance(w[0], w[1])).sum();
        legs + self.distance(route[route.len() - 1], route[0])
    }

    /// Checks that `route` starts at home and visits every city exactly once.
    pub fn validate_route(&self, route: &[usize]) -> Result<()> {
        if route.len() != self.len() {
            return Err(Error::illegal(format!(
                "route visits {} cities, expected {}",
                route.len(),
                self.len()
            )));
        }
        if route[0] != self.home {
            return Err(Error::illegal(format!(
                "route must start at home city {}",
                self.names[self.home]
            )));
        }
        let mut seen = vec![false; self.len()];
        for &city in route {
            if city >= self.len() {
                return Err(Error::illegal(format!("city {} does not exist", city)));
            }
            if seen[city] {
                return Err(Error::illegal(format!(
                    "city {} appears more than once",
                    self.names[city]
                )));
            }
            seen[city] = true;
        }
        Ok(())
    }
}

/// A closed route over every city of a graph, starting at home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub route: Vec<usize>,
    pub length: f64,
}

impl Tour {
    pub(crate) fn from_route(graph: &CityGraph, route: Vec<usize>) -> Self {
        let length = graph.route_length(&route);
        Tour { route, length }
    }

    /// Renders the route with city names, e.g. `A -> C -> B -> A`.
    pub fn describe(&self, graph: &CityGraph) -> String {
        let mut parts: Vec<&str> = self.route.iter().map(|&c| graph.name(c)).collect();
        if let Some(&first) = self.route.first() {
            parts.push(graph.name(first));
        }
        parts.join(" -> ")
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} (length {:.2})", self.route, self.length)
    }
}

/// Outcome of comparing a submitted route with a reference tour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RouteVerdict {
    Optimal,
    Suboptimal { submitted: f64, best: f64 },
}

/// Validates `route` and compares its length with `reference`.
///
/// A route within [`LENGTH_TOLERANCE`] of the reference (or shorter) is
/// reported as optimal.
pub fn check_route(graph: &CityGraph, route: &[usize], reference: &Tour) -> Result<RouteVerdict> {
    graph.validate_route(route)?;
    let submitted = graph.route_length(route);
    if submitted - reference.length < LENGTH_TOLERANCE {
        Ok(RouteVerdict::Optimal)
    } else {
        Ok(RouteVerdict::Suboptimal {
            submitted,
            best: reference.length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> CityGraph {
        CityGraph::from_coordinates(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_route_length_is_closed() {
        let graph = square();
        assert!((graph.route_length(&[0, 1, 2, 3]) - 4.0).abs() < 1e-9);
        let crossing = 2.0 + 2.0 * 2f64.sqrt();
        assert!((graph.route_length(&[0, 2, 1, 3]) - crossing).abs() < 1e-9);
    }

    #[test]
    fn test_from_matrix_rejects_malformed() {
        assert!(CityGraph::from_matrix(vec![]).is_err());
        assert!(CityGraph::from_matrix(vec![vec![0.0, 1.0]]).is_err());
        assert!(CityGraph::from_matrix(vec![vec![0.0, 1.0], vec![2.0, 0.0]]).is_err());
        assert!(CityGraph::from_matrix(vec![vec![1.0]]).is_err());
        assert!(CityGraph::from_matrix(vec![vec![0.0, -1.0], vec![-1.0, 0.0]]).is_err());
    }

    #[test]
    fn test_random_graph_is_reproducible_and_in_range() {
        let a = CityGraph::random_with_seed(10, 3).unwrap();
        let b = CityGraph::random_with_seed(10, 3).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name(9), "J");
        for i in 0..10 {
            for j in 0..10 {
                let d = a.distance(i, j);
                if i == j {
                    assert_eq!(d, 0.0);
                } else {
                    assert!((50.0..=100.0).contains(&d));
                }
            }
        }
    }

    #[test]
    fn test_select_builds_subproblem() {
        let graph = CityGraph::random_with_seed(6, 1).unwrap().with_home(4).unwrap();
        let sub = graph.select(&[1, 4, 3]).unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.home(), 0);
        assert_eq!(sub.name(0), "E");
        assert_eq!(sub.name(2), "D");
        assert_eq!(sub.distance(1, 2), graph.distance(1, 3));
        assert!(graph.select(&[1, 1]).is_err());
        assert!(graph.select(&[9]).is_err());
    }

    #[test]
    fn test_validate_route() {
        let graph = square();
        assert!(graph.validate_route(&[0, 1, 2, 3]).is_ok());
        assert!(graph.validate_route(&[0, 1, 2]).is_err());
        assert!(graph.validate_route(&[1, 0, 2, 3]).is_err());
        assert!(graph.validate_route(&[0, 1, 1, 3]).is_err());
    }

    #[test]
    fn test_check_route_verdicts() {
        let graph = square();
        let reference = Tour::from_route(&graph, vec![0, 1, 2, 3]);
        assert_eq!(
            check_route(&graph, &[0, 3, 2, 1], &reference).unwrap(),
            RouteVerdict::Optimal
        );
        match check_route(&graph, &[0, 2, 1, 3], &reference).unwrap() {
            RouteVerdict::Suboptimal { submitted, best } => {
                assert!(submitted > best);
                assert!((best - 4.0).abs() < 1e-9);
            }
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn test_route_from_names_follows_selection() {
        let graph = CityGraph::random_with_seed(6, 1).unwrap().select(&[3, 5]).unwrap();
        assert_eq!(graph.index_of("D"), Some(1));
        assert_eq!(graph.index_of("B"), None);
        assert_eq!(graph.route_from_names(&["A", " F", "D "]).unwrap(), vec![0, 2, 1]);
        assert!(matches!(
            graph.route_from_names(&["A", "B"]),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates_graph() {
        let graph = square().with_home(2).unwrap();
        let json = serde_json::to_string(&graph).unwrap();
        let back: CityGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, graph);

        let bad_home = r#"{"names":["A","B"],"distances":[[0.0,1.0],[1.0,0.0]],"home":2}"#;
        assert!(serde_json::from_str::<CityGraph>(bad_home).is_err());
        let asymmetric = r#"{"names":["A","B"],"distances":[[0.0,1.0],[2.0,0.0]],"home":0}"#;
        assert!(serde_json::from_str::<CityGraph>(asymmetric).is_err());
        let short_row = r#"{"names":["A","B"],"distances":[[0.0,1.0],[1.0]],"home":0}"#;
        assert!(serde_json::from_str::<CityGraph>(short_row).is_err());
        let names = r#"{"names":["A","A"],"distances":[[0.0,1.0],[1.0,0.0]],"home":0}"#;
        assert!(serde_json::from_str::<CityGraph>(names).is_err());
        let empty = r#"{"names":[],"distances":[],"home":0}"#;
        assert!(serde_json::from_str::<CityGraph>(empty).is_err());
    }

    #[test]
    fn test_describe_tour() {
        let graph = square();
        let tour = Tour::from_route(&graph, vec![0, 1, 2, 3]);
        assert_eq!(tour.describe(&graph), "A -> B -> C -> D -> A");
    }
}
