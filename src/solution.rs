//! Solution representation for exact TSP solves.
//!
//! A solution is a closed tour (`[0, ..., 0]`) paired with its total cycle cost.

use crate::distance::DistanceMatrix;
use crate::error::{Result, TspError};
use serde::{Deserialize, Serialize};

/// Represents a solved TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of node indices, starting and ending at node 0
    pub tour: Vec<usize>,
    /// Total cycle cost, closing edge included
    pub cost: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
}

impl Solution {
    /// Create a solution from a closed tour, computing its cost
    pub fn from_tour(matrix: &DistanceMatrix, tour: Vec<usize>, algorithm: &str) -> Self {
        let cost = matrix.tour_length(&tour);
        Solution {
            tour,
            cost,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
        }
    }

    /// Number of nodes in the cycle
    pub fn num_nodes(&self) -> usize {
        self.tour.len().saturating_sub(1)
    }

    /// Check that the tour is a closed Hamiltonian cycle over `size` nodes:
    /// `size + 1` entries, 0 at both ends, every other node exactly once.
    pub fn is_valid_cycle(&self, size: usize) -> bool {
        if size == 0 || self.tour.len() != size + 1 {
            return false;
        }
        if self.tour[0] != 0 || self.tour[size] != 0 {
            return false;
        }

        let mut seen = vec![false; size];
        seen[0] = true;
        for &node in &self.tour[1..size] {
            if node >= size || seen[node] {
                return false;
            }
            seen[node] = true;
        }
        true
    }

    /// Validate the tour shape and that the stored cost matches the edges
    /// along the tour within a relative tolerance.
    pub fn validate(&self, matrix: &DistanceMatrix, tolerance: f64) -> Result<()> {
        if !self.is_valid_cycle(matrix.size()) {
            return Err(TspError::invalid_input(format!(
                "tour {:?} is not a closed cycle over {} nodes",
                self.tour,
                matrix.size()
            )));
        }

        let recomputed = matrix.tour_length(&self.tour);
        if !approx_eq(recomputed, self.cost, tolerance) {
            return Err(TspError::invalid_input(format!(
                "tour cost {} does not match its edges ({})",
                self.cost, recomputed
            )));
        }
        Ok(())
    }

    /// Consecutive edges `(from, to, distance)` along the tour
    pub fn edges<'a>(&'a self, matrix: &'a DistanceMatrix) -> impl Iterator<Item = (usize, usize, f64)> + 'a {
        self.tour
            .windows(2)
            .map(move |w| (w[0], w[1], matrix.get(w[0], w[1])))
    }

    /// Same cycle up to rotation and direction
    pub fn same_cycle(&self, other: &Solution) -> bool {
        let a = canonical_cycle(&self.tour);
        let b = canonical_cycle(&other.tour);
        a == b
    }
}

/// Interior of a closed tour, oriented so that its smaller end comes first
fn canonical_cycle(tour: &[usize]) -> Vec<usize> {
    if tour.len() < 3 {
        return Vec::new();
    }
    let mut inner = tour[1..tour.len() - 1].to_vec();
    if inner.first() > inner.last() {
        inner.reverse();
    }
    inner
}

/// Relative comparison with an absolute floor for costs near zero
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= tolerance * scale
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.4}", self.cost)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}
