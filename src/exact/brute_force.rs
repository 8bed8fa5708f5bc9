//! Exhaustive depth-first search over every ordering of the non-start nodes.

use super::{trivial_tour, ExactSolver};
use crate::bitset::{bit_index, full_mask, set_bits, MAX_WIDTH};
use crate::distance::DistanceMatrix;
use crate::error::{Result, TspError};
use crate::solution::Solution;

/// Brute-force solver.
///
/// Explores all `(N-1)!` orderings, so it is only practical for a dozen
/// nodes or so. Larger inputs are refused with
/// [`TspError::ResourceExhaustion`] once `max_nodes` is exceeded.
#[derive(Debug, Clone)]
pub struct BruteForceSolver {
    pub max_nodes: usize,
}

impl BruteForceSolver {
    pub fn new() -> Self {
        BruteForceSolver { max_nodes: 13 }
    }

    pub fn with_max_nodes(max_nodes: usize) -> Self {
        BruteForceSolver {
            max_nodes: max_nodes.min(MAX_WIDTH),
        }
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(TspError::EmptyInput);
        }
        let limit = self.max_nodes.min(MAX_WIDTH);
        if size > limit {
            return Err(TspError::resource_exhaustion(
                size,
                limit,
                "brute force node ceiling",
            ));
        }
        Ok(())
    }
}

impl Default for BruteForceSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared by the recursion: the current path by depth and the best
/// complete ordering seen so far.
struct Search<'a> {
    matrix: &'a DistanceMatrix,
    all_nodes: u64,
    path: Vec<usize>,
    best_path: Vec<usize>,
    best_cost: f64,
}

impl<'a> Search<'a> {
    fn new(matrix: &'a DistanceMatrix) -> Self {
        let size = matrix.size();
        Search {
            matrix,
            all_nodes: full_mask(size),
            path: vec![0; size],
            best_path: Vec::with_capacity(size),
            best_cost: f64::INFINITY,
        }
    }

    /// Minimum cost of closing a cycle from `node`, having paid `total` to
    /// reach it at position `depth` with `visited` already on the path.
    fn explore(&mut self, node: usize, total: f64, visited: u64, depth: usize) -> Result<f64> {
        self.path[depth] = node;

        let unvisited = self.all_nodes ^ visited;
        if unvisited == 0 {
            let cost = total + self.matrix.get(node, 0);
            if cost < self.best_cost || self.best_path.is_empty() {
                self.best_cost = cost;
                self.best_path.clear();
                self.best_path.extend_from_slice(&self.path);
            }
            return Ok(cost);
        }

        let mut best = f64::INFINITY;
        for bit in set_bits(unvisited) {
            let next = bit_index(bit)?;
            let cost = self.explore(next, total + self.matrix.get(node, next), visited | bit, depth + 1)?;
            if cost < best {
                best = cost;
            }
        }
        Ok(best)
    }
}

impl ExactSolver for BruteForceSolver {
    fn solve(&self, matrix: &DistanceMatrix) -> Result<Solution> {
        let start = std::time::Instant::now();
        let size = matrix.size();
        self.check_size(size)?;

        let mut solution = match trivial_tour(size) {
            Some(tour) => Solution::from_tour(matrix, tour, self.name()),
            None => {
                let mut search = Search::new(matrix);
                // Node 0 starts the path, so it is visited from the outset
                let cost = search.explore(0, 0.0, 1, 0)?;
                log::debug!("brute force over {} nodes found cost {:.4}", size, cost);
                super::ensure_finite(cost)?;

                let mut tour = search.best_path;
                tour.push(0);
                Solution {
                    tour,
                    cost,
                    algorithm: self.name().to_string(),
                    computation_time: 0.0,
                }
            }
        };

        solution.computation_time = start.elapsed().as_secs_f64();
        Ok(solution)
    }

    fn name(&self) -> &str {
        "BruteForce"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Point;

    fn matrix(points: &[(f64, f64)]) -> DistanceMatrix {
        let points: Vec<Point> = points.iter().map(|&p| p.into()).collect();
        DistanceMatrix::from_points(&points).unwrap()
    }

    #[test]
    fn test_square() {
        let m = matrix(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let sol = BruteForceSolver::new().solve(&m).unwrap();

        assert!((sol.cost - 40.0).abs() < 1e-9);
        assert_eq!(sol.tour, vec![0, 1, 2, 3, 0]);
        assert!(sol.validate(&m, 1e-9).is_ok());
    }

    #[test]
    fn test_collinear() {
        let m = matrix(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
        let sol = BruteForceSolver::new().solve(&m).unwrap();
        assert!((sol.cost - 6.0).abs() < 1e-9);
        assert!(sol.is_valid_cycle(4));
    }

    #[test]
    fn test_boundary_sizes() {
        let solver = BruteForceSolver::new();

        let one = solver.solve(&matrix(&[(4.0, 2.0)])).unwrap();
        assert_eq!(one.tour, vec![0, 0]);
        assert_eq!(one.cost, 0.0);

        let two = solver.solve(&matrix(&[(9.0, 6.0), (6.0, 2.0)])).unwrap();
        assert_eq!(two.tour, vec![0, 1, 0]);
        assert!((two.cost - 10.0).abs() < 1e-10);

        let three = solver.solve(&matrix(&[(0.0, 0.0), (3.0, 0.0), (0.0, 4.0)])).unwrap();
        assert!((three.cost - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_node_ceiling() {
        let points: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, (i * i) as f64)).collect();
        let err = BruteForceSolver::with_max_nodes(5).solve(&matrix(&points)).unwrap_err();
        assert!(matches!(err, TspError::ResourceExhaustion { nodes: 6, limit: 5, .. }));
    }

    #[test]
    fn test_huge_coordinates_give_a_full_tour() {
        let m = matrix(&[(0.0, 0.0), (1e200, 0.0), (0.0, 1e200)]);
        let sol = BruteForceSolver::new().solve(&m).unwrap();

        assert_eq!(sol.tour, vec![0, 1, 2, 0]);
        assert!(sol.cost.is_finite());
        assert!((sol.cost / 1e200 - (2.0 + 2f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let m = matrix(&[(1.0, 7.0), (3.0, 2.0), (8.0, 8.0), (5.0, 5.0), (0.0, 3.0), (6.0, 1.0)]);
        let solver = BruteForceSolver::new();
        let a = solver.solve(&m).unwrap();
        let b = solver.solve(&m).unwrap();
        assert_eq!(a.tour, b.tour);
        assert_eq!(a.cost, b.cost);
    }
}
