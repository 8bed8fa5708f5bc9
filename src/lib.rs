//! Exact TSP Solver Library
//!
//! Computes the minimum-cost Hamiltonian cycle over a set of 2-D points.
//!
//! # Features
//!
//! - Exhaustive brute-force search (practical up to a dozen nodes)
//! - Held-Karp bit-mask dynamic programming (practical up to ~20 nodes)
//! - TSP-LIB style coordinate loading
//! - Benchmarking and SVG visualization tools
//!
//! # Example
//!
//! ```no_run
//! use tsp_exact_solver::exact::{ExactSolver, HeldKarpSolver};
//! use tsp_exact_solver::instance::Instance;
//!
//! // Load instance
//! let instance = Instance::from_file("instance.tsp").unwrap();
//! let matrix = instance.distance_matrix().unwrap();
//!
//! let solution = HeldKarpSolver::new().solve(&matrix).unwrap();
//!
//! println!("Lowest cost: {:.2}", solution.cost);
//! println!("Optimal tour: {:?}", solution.tour);
//! ```

pub mod error;
pub mod bitset;
pub mod instance;
pub mod distance;
pub mod solution;
pub mod exact;
pub mod benchmark;
pub mod visualization;

pub use distance::DistanceMatrix;
pub use error::{Result, TspError};
pub use exact::{solve, Method};
pub use instance::{Instance, Point};
pub use solution::Solution;
