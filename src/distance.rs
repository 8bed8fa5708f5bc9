//! Symmetric Euclidean distance matrix built once from the input points.

use crate::error::{Result, TspError};
use crate::instance::Point;

/// Square, symmetric, non-negative matrix of pairwise distances with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    /// Row-major `size * size` entries
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Build the matrix from 2-D points
    pub fn from_points(points: &[Point]) -> Result<Self> {
        if points.is_empty() {
            return Err(TspError::EmptyInput);
        }
        if let Some((i, p)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(TspError::invalid_input(format!(
                "point {} has a non-finite coordinate ({}, {})",
                i, p.x, p.y
            )));
        }

        Self::build(points.len(), |i, j| points[i].distance(&points[j]))
    }

    /// Build the matrix from coordinate rows of any (shared) dimensionality.
    ///
    /// Every row must have the same length as the first one.
    pub fn from_coordinates<C: AsRef<[f64]>>(coordinates: &[C]) -> Result<Self> {
        let first = coordinates.first().ok_or(TspError::EmptyInput)?;
        let dimension = first.as_ref().len();

        for (i, row) in coordinates.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != dimension {
                return Err(TspError::invalid_input(format!(
                    "point {} has {} coordinates, expected {}",
                    i,
                    row.len(),
                    dimension
                )));
            }
            if row.iter().any(|c| !c.is_finite()) {
                return Err(TspError::invalid_input(format!(
                    "point {} has a non-finite coordinate",
                    i
                )));
            }
        }

        Self::build(coordinates.len(), |i, j| {
            coordinates[i]
                .as_ref()
                .iter()
                .zip(coordinates[j].as_ref())
                .fold(0.0, |norm: f64, (a, b)| norm.hypot(a - b))
        })
    }

    /// Build the matrix from an undirected weighted edge list `(i, j, w)`.
    ///
    /// Pairs that never appear keep distance 0, as a missing edge does in an
    /// adjacency matrix.
    pub fn from_weighted_edges(size: usize, edges: &[(usize, usize, f64)]) -> Result<Self> {
        if size == 0 {
            return Err(TspError::EmptyInput);
        }

        let mut data = vec![0.0; size * size];
        for &(i, j, w) in edges {
            if i >= size || j >= size {
                return Err(TspError::invalid_input(format!(
                    "edge ({}, {}) is out of range for {} nodes",
                    i, j, size
                )));
            }
            if i == j {
                return Err(TspError::invalid_input(format!("self loop on node {}", i)));
            }
            if !w.is_finite() || w < 0.0 {
                return Err(TspError::invalid_input(format!(
                    "edge ({}, {}) has invalid weight {}",
                    i, j, w
                )));
            }
            data[i * size + j] = w;
            data[j * size + i] = w;
        }

        let matrix = DistanceMatrix { size, data };
        matrix.check_tour_bound()?;
        Ok(matrix)
    }

    /// Fill the upper triangle with `dist` and mirror it
    fn build(size: usize, dist: impl Fn(usize, usize) -> f64) -> Result<Self> {
        let mut data = vec![0.0; size * size];
        for i in 0..size {
            for j in i + 1..size {
                let d = dist(i, j);
                if !d.is_finite() {
                    return Err(TspError::invalid_input(format!(
                        "distance between points {} and {} overflows",
                        i, j
                    )));
                }
                data[i * size + j] = d;
                data[j * size + i] = d;
            }
        }

        let matrix = DistanceMatrix { size, data };
        matrix.check_tour_bound()?;
        Ok(matrix)
    }

    /// Every tour uses `size` edges, so `size * max_edge` bounds every tour cost
    fn check_tour_bound(&self) -> Result<()> {
        let longest = self.data.iter().cloned().fold(0.0, f64::max);
        if !(longest * self.size as f64).is_finite() {
            return Err(TspError::invalid_input(format!(
                "tour costs over {} nodes with edges up to {:e} overflow",
                self.size, longest
            )));
        }
        Ok(())
    }

    /// Number of nodes
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    /// Check symmetry within an absolute tolerance
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        (0..self.size).all(|i| {
            (i + 1..self.size).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tolerance)
        })
    }

    /// Length of a closed tour. The closing edge is added when the tour does
    /// not already end where it started.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }

        let mut length: f64 = tour.windows(2).map(|w| self.get(w[0], w[1])).sum();
        let (first, last) = (tour[0], tour[tour.len() - 1]);
        if first != last {
            length += self.get(last, first);
        }
        length
    }
}
