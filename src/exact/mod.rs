//! Exact solvers module.
//!
//! Both solvers take a [`DistanceMatrix`] and return the optimal closed tour
//! starting and ending at node 0.
//!
//! Boundary sizes are handled the same way by every solver:
//! - no nodes is an [`TspError::EmptyInput`] error,
//! - a single node is the zero-cost cycle `[0, 0]`,
//! - two nodes give the back-and-forth cycle `[0, 1, 0]` costing `2 * d(0, 1)`.

pub mod brute_force;
pub mod held_karp;

pub use brute_force::BruteForceSolver;
pub use held_karp::{DpTable, HeldKarpConfig, HeldKarpSolver};

use crate::distance::DistanceMatrix;
use crate::error::{Result, TspError};
use crate::instance::Point;
use crate::solution::Solution;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub trait ExactSolver {
    fn solve(&self, matrix: &DistanceMatrix) -> Result<Solution>;
    fn name(&self) -> &str;
}

/// Which exact algorithm to run
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Exhaustive search over every ordering
    #[value(alias = "brute_force")]
    BruteForce,
    /// Held-Karp subset dynamic programming
    #[value(alias = "held-karp")]
    Dynamic,
}

impl Method {
    pub fn solver(&self) -> Box<dyn ExactSolver + Send + Sync> {
        self.solver_with_max_nodes(None)
    }

    /// Solver with default settings, except for an optional node ceiling
    pub fn solver_with_max_nodes(&self, max_nodes: Option<usize>) -> Box<dyn ExactSolver + Send + Sync> {
        match self {
            Method::BruteForce => match max_nodes {
                Some(limit) => Box::new(BruteForceSolver::with_max_nodes(limit)),
                None => Box::new(BruteForceSolver::new()),
            },
            Method::Dynamic => {
                let mut config = HeldKarpConfig::default();
                if let Some(limit) = max_nodes {
                    config.max_nodes = limit;
                }
                Box::new(HeldKarpSolver::with_config(config))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::BruteForce => "brute_force",
            Method::Dynamic => "dynamic",
        }
    }
}

impl FromStr for Method {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brute_force" | "brute-force" | "bruteforce" => Ok(Method::BruteForce),
            "dynamic" | "held_karp" | "held-karp" | "dp" => Ok(Method::Dynamic),
            other => Err(TspError::invalid_input(format!("unknown method {}", other))),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Solve the points with the requested method using default solver settings
pub fn solve(method: Method, points: &[Point]) -> Result<Solution> {
    let matrix = DistanceMatrix::from_points(points)?;
    method.solver().solve(&matrix)
}

/// Tour for the sizes that have no choice to make (one or two nodes)
pub(crate) fn trivial_tour(size: usize) -> Option<Vec<usize>> {
    match size {
        1 => Some(vec![0, 0]),
        2 => Some(vec![0, 1, 0]),
        _ => None,
    }
}

/// Optimal costs must be real numbers; an infinite sum means the edge
/// weights were too large to add up.
pub(crate) fn ensure_finite(cost: f64) -> Result<()> {
    if cost.is_finite() {
        Ok(())
    } else {
        Err(TspError::invalid_input(format!("tour cost {} is not finite", cost)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_value(s: &str) -> Option<Method> {
        <Method as ValueEnum>::from_str(s, false).ok()
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("brute_force".parse::<Method>().unwrap(), Method::BruteForce);
        assert_eq!("dynamic".parse::<Method>().unwrap(), Method::Dynamic);
        assert_eq!("Held-Karp".parse::<Method>().unwrap(), Method::Dynamic);
        assert!("2opt".parse::<Method>().is_err());
        assert_eq!(Method::Dynamic.to_string(), "dynamic");
    }

    #[test]
    fn test_solver_ceiling_override() {
        let points: Vec<Point> = (0..5).map(|i| Point::new(i as f64, (i * i) as f64)).collect();
        let matrix = DistanceMatrix::from_points(&points).unwrap();

        for method in [Method::BruteForce, Method::Dynamic] {
            assert_eq!(method.solver().name(), method.solver_with_max_nodes(Some(4)).name());
            assert!(method.solver_with_max_nodes(None).solve(&matrix).is_ok());
            assert!(matches!(
                method.solver_with_max_nodes(Some(4)).solve(&matrix),
                Err(TspError::ResourceExhaustion { nodes: 5, limit: 4, .. })
            ));
        }
    }

    #[test]
    fn test_value_enum_names() {
        assert_eq!(cli_value("brute-force"), Some(Method::BruteForce));
        assert_eq!(cli_value("brute_force"), Some(Method::BruteForce));
        assert_eq!(cli_value("held-karp"), Some(Method::Dynamic));
        assert_eq!(cli_value("dynamic"), Some(Method::Dynamic));
    }

    #[test]
    fn test_solve_facade() {
        let points = vec![Point::new(9.0, 6.0), Point::new(6.0, 2.0)];
        for method in [Method::BruteForce, Method::Dynamic] {
            let sol = solve(method, &points).unwrap();
            assert_eq!(sol.tour, vec![0, 1, 0]);
            assert!((sol.cost - 10.0).abs() < 1e-10);
        }

        assert!(matches!(solve(Method::Dynamic, &[]), Err(TspError::EmptyInput)));
    }

    #[test]
    fn test_trivial_tour() {
        assert_eq!(trivial_tour(1), Some(vec![0, 0]));
        assert_eq!(trivial_tour(2), Some(vec![0, 1, 0]));
        assert_eq!(trivial_tour(3), None);
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite(3.5).is_ok());
        assert!(matches!(ensure_finite(f64::INFINITY), Err(TspError::InvalidInput(_))));
        assert!(ensure_finite(f64::NAN).is_err());
    }
}
