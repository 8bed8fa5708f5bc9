//! Held-Karp dynamic programming over subsets.
//!
//! `DP[S, j]` is the cheapest path that leaves node 0, visits exactly the
//! nodes of `S` (which always holds 0 and `j`) and stops at `j`. Subsets are
//! processed by increasing cardinality, so every entry a transition reads has
//! already been written.
//!
//! Time is `O(2^N * N^2)` and the table takes `O(2^N * N)` memory, which is
//! what [`HeldKarpConfig`] bounds.

use super::{ensure_finite, trivial_tour, ExactSolver};
use crate::bitset::{combinations, full_mask, is_member, set_bits, MAX_WIDTH};
use crate::distance::DistanceMatrix;
use crate::error::{Result, TspError};
use crate::solution::Solution;
use ordered_float::OrderedFloat;

/// Start and end of every tour
const START: usize = 0;
const START_BIT: u64 = 1;

#[derive(Debug, Clone)]
pub struct HeldKarpConfig {
    /// Largest accepted node count
    pub max_nodes: usize,
    /// Upper bound on the DP table allocation
    pub max_table_bytes: usize,
    /// Smallest accepted node count. The default of 1 accepts the degenerate
    /// one- and two-node cycles; 3 demands a proper cycle.
    pub min_nodes: usize,
}

impl Default for HeldKarpConfig {
    fn default() -> Self {
        HeldKarpConfig {
            max_nodes: 20,
            max_table_bytes: 1 << 30,
            min_nodes: 1,
        }
    }
}

/// Minimum path costs indexed by `(endpoint, subset mask)`.
///
/// Entries start at `+inf`; only masks holding both node 0 and the endpoint
/// are ever written.
#[derive(Debug, Clone)]
pub struct DpTable {
    size: usize,
    /// `data[mask * size + endpoint]`
    data: Vec<f64>,
}

impl DpTable {
    /// Bytes needed for a table over `size` nodes, `None` on overflow
    pub fn required_bytes(size: usize) -> Option<usize> {
        if size >= MAX_WIDTH {
            return None;
        }
        1usize
            .checked_shl(size as u32)?
            .checked_mul(size)?
            .checked_mul(std::mem::size_of::<f64>())
    }

    fn new(size: usize) -> Self {
        DpTable {
            size,
            data: vec![f64::INFINITY; size << size],
        }
    }

    #[inline]
    pub fn get(&self, endpoint: usize, mask: u64) -> f64 {
        self.data[mask as usize * self.size + endpoint]
    }

    #[inline]
    fn set(&mut self, endpoint: usize, mask: u64, cost: f64) {
        self.data[mask as usize * self.size + endpoint] = cost;
    }

    /// `DP[{0, i}, i] = D[0][i]`
    fn seed(&mut self, matrix: &DistanceMatrix) {
        for i in 1..self.size {
            self.set(i, START_BIT | 1 << i, matrix.get(START, i));
        }
    }

    /// Fill every subset of cardinality 3..=N that contains node 0
    fn fill(&mut self, matrix: &DistanceMatrix) {
        let n = self.size;

        for cardinality in 3..=n {
            let mut layer = 0usize;
            // Subsets of the non-start nodes, shifted past the start bit
            for others in combinations(cardinality - 1, n - 1) {
                let subset = others << 1 | START_BIT;
                for bit in set_bits(others << 1) {
                    let next = bit.trailing_zeros() as usize;
                    let state = subset ^ bit;

                    let best = set_bits(state & !START_BIT)
                        .map(|b| b.trailing_zeros() as usize)
                        .map(|endpoint| self.get(endpoint, state) + matrix.get(endpoint, next))
                        .min_by_key(|&cost| OrderedFloat(cost));

                    if let Some(cost) = best {
                        self.set(next, subset, cost);
                    }
                }
                layer += 1;
            }
            log::trace!("held-karp: {} subsets of size {}", layer, cardinality);
        }
    }

    /// `min_j DP[Full, j] + D[j][0]`
    fn min_cost(&self, matrix: &DistanceMatrix) -> f64 {
        let full = full_mask(self.size);
        (1..self.size)
            .map(|j| self.get(j, full) + matrix.get(j, START))
            .min_by_key(|&cost| OrderedFloat(cost))
            .unwrap_or(0.0)
    }

    /// Replay the transitions backward from the full set.
    ///
    /// At each step the endpoint minimising `DP[remaining, j] + D[j][last]`
    /// is the node visited before `last`; ties go to the lowest index.
    fn reconstruct(&self, matrix: &DistanceMatrix) -> Vec<usize> {
        let n = self.size;
        let mut tour = vec![START; n + 1];
        let mut state = full_mask(n);
        let mut last = START;

        for position in (1..n).rev() {
            let chosen = (1..n)
                .filter(|&j| is_member(j, state))
                .min_by_key(|&j| OrderedFloat(self.get(j, state) + matrix.get(j, last)));

            // The state always keeps `position` non-start nodes here
            let Some(node) = chosen else { break };
            tour[position] = node;
            state ^= 1 << node;
            last = node;
        }

        tour
    }
}

/// Held-Karp exact solver
#[derive(Debug, Clone, Default)]
pub struct HeldKarpSolver {
    pub config: HeldKarpConfig,
}

impl HeldKarpSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HeldKarpConfig) -> Self {
        HeldKarpSolver { config }
    }

    /// Fail fast before anything is allocated
    fn check_size(&self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(TspError::EmptyInput);
        }
        if size < self.config.min_nodes {
            return Err(TspError::InsufficientNodes {
                found: size,
                required: self.config.min_nodes,
            });
        }
        if size > self.config.max_nodes {
            return Err(TspError::resource_exhaustion(
                size,
                self.config.max_nodes,
                "held-karp node ceiling",
            ));
        }
        match DpTable::required_bytes(size) {
            Some(bytes) if bytes <= self.config.max_table_bytes => Ok(()),
            Some(bytes) => Err(TspError::resource_exhaustion(
                size,
                self.largest_fitting_size(),
                format!(
                    "table needs {} bytes, limit is {}",
                    bytes, self.config.max_table_bytes
                ),
            )),
            None => Err(TspError::resource_exhaustion(
                size,
                MAX_WIDTH - 1,
                "table size overflows the address space",
            )),
        }
    }

    /// Largest node count whose table fits in `max_table_bytes`
    fn largest_fitting_size(&self) -> usize {
        (1..MAX_WIDTH)
            .take_while(|&n| {
                DpTable::required_bytes(n).map_or(false, |b| b <= self.config.max_table_bytes)
            })
            .last()
            .unwrap_or(0)
    }

    /// Build and fill the table for `matrix`.
    ///
    /// Exposed so callers can inspect intermediate costs; [`ExactSolver::solve`]
    /// is the usual entry point.
    pub fn table(&self, matrix: &DistanceMatrix) -> Result<DpTable> {
        let size = matrix.size();
        self.check_size(size)?;

        let mut table = DpTable::new(size);
        table.seed(matrix);
        table.fill(matrix);
        Ok(table)
    }
}

impl ExactSolver for HeldKarpSolver {
    fn solve(&self, matrix: &DistanceMatrix) -> Result<Solution> {
        let start = std::time::Instant::now();
        let size = matrix.size();
        self.check_size(size)?;

        let mut solution = match trivial_tour(size) {
            Some(tour) => Solution::from_tour(matrix, tour, self.name()),
            None => {
                log::debug!(
                    "held-karp over {} nodes, table of {} entries",
                    size,
                    size << size
                );
                let table = self.table(matrix)?;
                let cost = table.min_cost(matrix);
                ensure_finite(cost)?;
                let tour = table.reconstruct(matrix);
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
        "HeldKarp"
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
        let sol = HeldKarpSolver::new().solve(&m).unwrap();

        assert!((sol.cost - 40.0).abs() < 1e-9);
        assert!(sol.validate(&m, 1e-9).is_ok());
        // Perimeter order in either direction
        assert!(sol.tour == vec![0, 1, 2, 3, 0] || sol.tour == vec![0, 3, 2, 1, 0]);
    }

    #[test]
    fn test_collinear() {
        let m = matrix(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
        let sol = HeldKarpSolver::new().solve(&m).unwrap();
        assert!((sol.cost - 6.0).abs() < 1e-9);
        assert!(sol.validate(&m, 1e-9).is_ok());
    }

    #[test]
    fn test_huge_coordinates() {
        let m = matrix(&[(0.0, 0.0), (1e200, 0.0), (0.0, 1e200)]);
        let sol = HeldKarpSolver::new().solve(&m).unwrap();

        assert!(sol.is_valid_cycle(3));
        assert!(sol.cost.is_finite());
        assert!((sol.cost / 1e200 - (2.0 + 2f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_base_cases_and_layers() {
        let m = matrix(&[(0.0, 0.0), (3.0, 0.0), (0.0, 4.0)]);
        let table = HeldKarpSolver::new().table(&m).unwrap();

        assert_eq!(table.get(1, 0b011), 3.0);
        assert_eq!(table.get(2, 0b101), 4.0);
        // 0 -> 2 -> 1 and 0 -> 1 -> 2
        assert!((table.get(1, 0b111) - 9.0).abs() < 1e-10);
        assert!((table.get(2, 0b111) - 8.0).abs() < 1e-10);
        // Never written: mask without the start node
        assert!(table.get(1, 0b110).is_infinite());
    }

    #[test]
    fn test_boundary_sizes() {
        let solver = HeldKarpSolver::new();

        let one = solver.solve(&matrix(&[(4.0, 2.0)])).unwrap();
        assert_eq!(one.tour, vec![0, 0]);
        assert_eq!(one.cost, 0.0);

        let two = solver.solve(&matrix(&[(9.0, 6.0), (6.0, 2.0)])).unwrap();
        assert_eq!(two.tour, vec![0, 1, 0]);
        assert!((two.cost - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_min_nodes() {
        let solver = HeldKarpSolver::with_config(HeldKarpConfig {
            min_nodes: 3,
            ..Default::default()
        });
        let err = solver.solve(&matrix(&[(9.0, 6.0), (6.0, 2.0)])).unwrap_err();
        assert!(matches!(err, TspError::InsufficientNodes { found: 2, required: 3 }));
    }

    #[test]
    fn test_resource_ceilings() {
        let points: Vec<(f64, f64)> = (0..8).map(|i| (i as f64, (i % 3) as f64)).collect();
        let m = matrix(&points);

        let by_nodes = HeldKarpSolver::with_config(HeldKarpConfig {
            max_nodes: 7,
            ..Default::default()
        });
        assert!(matches!(
            by_nodes.solve(&m),
            Err(TspError::ResourceExhaustion { nodes: 8, limit: 7, .. })
        ));

        let by_bytes = HeldKarpSolver::with_config(HeldKarpConfig {
            max_table_bytes: 1024,
            ..Default::default()
        });
        assert!(matches!(by_bytes.solve(&m), Err(TspError::ResourceExhaustion { .. })));
    }

    #[test]
    fn test_required_bytes() {
        assert_eq!(DpTable::required_bytes(3), Some(3 * 8 * 8));
        assert_eq!(DpTable::required_bytes(64), None);
    }
}
