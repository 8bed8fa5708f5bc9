//! Module for parsing and representing TSP point sets.
//!
//! This module reads TSP-LIB style coordinate files (`index x y` lines) and
//! holds the ordered 2-D points a solver works on. Node identity is the
//! position in the point list; node 0 is the tour start.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::distance::DistanceMatrix;
use crate::error::{Result, TspError};

/// A city location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// A named, ordered set of points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Name of the instance
    pub name: String,
    /// Comment/description
    pub comment: String,
    /// Points in node order
    pub points: Vec<Point>,
}

impl Instance {
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Instance {
            name: name.into(),
            comment: String::new(),
            points,
        }
    }

    /// Parse an instance from a TSP-LIB style file.
    ///
    /// The instance is named after the `NAME:` header, or the file stem when
    /// the header is missing.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::parse(stem, BufReader::new(file))
    }

    /// Parse coordinates from a reader.
    ///
    /// Every line made of an integer index followed by two numbers is a node;
    /// tokens after the third are ignored. Any other line is skipped, apart
    /// from the `NAME:` and `COMMENT:` headers which are recorded. Points keep
    /// their order of appearance.
    pub fn parse<R: BufRead>(default_name: impl Into<String>, reader: R) -> Result<Self> {
        let mut name = default_name.into();
        let mut comment = String::new();
        let mut points = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if let Some(rest) = line.strip_prefix("NAME") {
                if let Some(value) = rest.trim_start().strip_prefix(':') {
                    name = value.trim().to_string();
                }
                continue;
            }
            if let Some(rest) = line.strip_prefix("COMMENT") {
                if let Some(value) = rest.trim_start().strip_prefix(':') {
                    comment = value.trim().to_string();
                }
                continue;
            }

            if let Some(point) = Self::parse_coordinate_line(line) {
                points.push(point);
            }
        }

        log::debug!("parsed {} points for instance {}", points.len(), name);

        Ok(Instance {
            name,
            comment,
            points,
        })
    }

    fn parse_coordinate_line(line: &str) -> Option<Point> {
        let mut parts = line.split_whitespace();
        parts.next()?.parse::<usize>().ok()?;
        let x: f64 = parts.next()?.parse().ok()?;
        let y: f64 = parts.next()?.parse().ok()?;
        let point = Point::new(x, y);
        point.is_finite().then_some(point)
    }

    /// Uniformly random points in `[0, extent)^2`, deterministic via seed
    pub fn random(size: usize, extent: f64, seed: u64) -> Self {
        use rand::prelude::*;
        use rand_chacha::ChaCha8Rng;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = (0..size)
            .map(|_| Point::new(rng.gen::<f64>() * extent, rng.gen::<f64>() * extent))
            .collect();

        Instance {
            name: format!("random-{}-s{}", size, seed),
            comment: format!("{} uniform points in [0, {})^2", size, extent),
            points,
        }
    }

    /// Number of nodes
    pub fn dimension(&self) -> usize {
        self.points.len()
    }

    pub fn distance_matrix(&self) -> Result<DistanceMatrix> {
        DistanceMatrix::from_points(&self.points)
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> Result<InstanceStatistics> {
        if self.points.is_empty() {
            return Err(TspError::EmptyInput);
        }

        let edges = weighted_edges(&self.points);
        let (min_distance, max_distance, avg_distance) = if edges.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let total: f64 = edges.iter().map(|e| e.2).sum();
            (
                edges.iter().map(|e| e.2).fold(f64::INFINITY, f64::min),
                edges.iter().map(|e| e.2).fold(0.0, f64::max),
                total / edges.len() as f64,
            )
        };

        let min_x = self.points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = self.points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = self.points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = self.points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Ok(InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension(),
            min_distance,
            avg_distance,
            max_distance,
            bounds: (min_x, max_x, min_y, max_y),
        })
    }
}

/// Undirected edge list `(i, j, distance)` for every pair `i < j`
pub fn weighted_edges(points: &[Point]) -> Vec<(usize, usize, f64)> {
    let n = points.len();
    let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            edges.push((i, j, points[i].distance(&points[j])));
        }
    }
    edges
}

/// Statistics about a point set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub min_distance: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
    /// (min_x, max_x, min_y, max_y)
    pub bounds: (f64, f64, f64, f64),
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Nodes: {}", self.dimension)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)?;
        let (min_x, max_x, min_y, max_y) = self.bounds;
        writeln!(f, "  Bounds: x [{:.2}, {:.2}], y [{:.2}, {:.2}]", min_x, max_x, min_y, max_y)
    }
}
