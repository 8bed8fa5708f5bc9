//! Benchmarking and experimentation module.
//!
//! Runs both exact solvers over sets of instances, checks that they agree on
//! the optimal cost, and aggregates timing statistics.

use crate::distance::DistanceMatrix;
use crate::error::Result;
use crate::exact::{BruteForceSolver, ExactSolver, HeldKarpConfig, HeldKarpSolver};
use crate::instance::Instance;
use crate::solution::{approx_eq, Solution};

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Instance dimension
    pub dimension: usize,
    /// Run index
    pub run: usize,
    /// Optimal cost, when the solve succeeded
    pub cost: Option<f64>,
    /// Computation time in seconds
    pub time: f64,
    /// Whether the cost matches the other solver (when both ran)
    pub agrees: Option<bool>,
    /// Error message when the solve was refused
    pub error: Option<String>,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    /// Algorithm name
    pub algorithm: String,
    /// Number of runs attempted
    pub num_runs: usize,
    /// Number of runs that produced a tour
    pub num_solved: usize,
    /// Average time
    pub avg_time: f64,
    /// Standard deviation of time
    pub std_time: f64,
    /// Slowest run
    pub max_time: f64,
    /// Total time
    pub total_time: f64,
    /// Largest instance solved
    pub max_dimension: usize,
}

/// Outcome of solving one instance with both solvers
#[derive(Debug)]
pub struct Comparison {
    pub brute_force: Result<Solution>,
    pub held_karp: Result<Solution>,
}

impl Comparison {
    /// `Some(true)` when both solvers produced the same optimal cost
    pub fn agree(&self, tolerance: f64) -> Option<bool> {
        match (&self.brute_force, &self.held_karp) {
            (Ok(a), Ok(b)) => Some(approx_eq(a.cost, b.cost, tolerance)),
            _ => None,
        }
    }
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of repeated runs per instance
    pub num_runs: usize,
    /// Solve independent instances in parallel
    pub parallel: bool,
    /// Relative tolerance when comparing costs
    pub tolerance: f64,
    /// Largest instance handed to the brute-force solver
    pub brute_force_limit: usize,
    /// Held-Karp limits
    pub held_karp: HeldKarpConfig,
    /// Directory receiving the CSV exports and the text report
    pub output_dir: PathBuf,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 3,
            parallel: true,
            tolerance: 1e-9,
            brute_force_limit: 10,
            held_karp: HeldKarpConfig::default(),
            output_dir: PathBuf::from("results"),
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    /// Solve an instance with both solvers
    pub fn compare(&self, instance: &Instance) -> Result<Comparison> {
        let matrix = instance.distance_matrix()?;
        Ok(self.compare_matrix(&matrix))
    }

    fn compare_matrix(&self, matrix: &DistanceMatrix) -> Comparison {
        let brute = BruteForceSolver::with_max_nodes(self.config.brute_force_limit);
        let held_karp = HeldKarpSolver::with_config(self.config.held_karp.clone());
        Comparison {
            brute_force: brute.solve(matrix),
            held_karp: held_karp.solve(matrix),
        }
    }

    /// Run every configured repetition on one instance
    pub fn run_instance(&self, instance: &Instance) -> Vec<AlgorithmResult> {
        log::info!("Running benchmark on instance: {} (n={})", instance.name, instance.dimension());

        let matrix = match instance.distance_matrix() {
            Ok(m) => m,
            Err(e) => {
                log::error!("Skipping {}: {}", instance.name, e);
                return Vec::new();
            }
        };

        let mut results = Vec::with_capacity(2 * self.config.num_runs);
        for run in 0..self.config.num_runs {
            let comparison = self.compare_matrix(&matrix);
            let agrees = comparison.agree(self.config.tolerance);
            if agrees == Some(false) {
                log::warn!(
                    "solvers disagree on {}: {:?} vs {:?}",
                    instance.name,
                    comparison.brute_force.as_ref().map(|s| s.cost).ok(),
                    comparison.held_karp.as_ref().map(|s| s.cost).ok()
                );
            }

            for (name, outcome) in [
                ("BruteForce", &comparison.brute_force),
                ("HeldKarp", &comparison.held_karp),
            ] {
                results.push(Self::to_result(instance, run, name, outcome, agrees));
            }
        }
        results
    }

    fn to_result(
        instance: &Instance,
        run: usize,
        algorithm: &str,
        outcome: &Result<Solution>,
        agrees: Option<bool>,
    ) -> AlgorithmResult {
        let (cost, time, error) = match outcome {
            Ok(sol) => (Some(sol.cost), sol.computation_time, None),
            Err(e) => (None, 0.0, Some(e.to_string())),
        };
        AlgorithmResult {
            algorithm: algorithm.to_string(),
            instance: instance.name.clone(),
            dimension: instance.dimension(),
            run,
            cost,
            time,
            agrees,
            error,
        }
    }

    /// Run benchmark on multiple instances
    pub fn run_on_instances(&mut self, instances: &[Instance]) {
        self.run_on_instances_with(instances, |_| {});
    }

    /// Run benchmark on multiple instances, calling `on_done` as each
    /// instance finishes (from a worker thread when running in parallel)
    pub fn run_on_instances_with<F>(&mut self, instances: &[Instance], on_done: F)
    where
        F: Fn(&Instance) + Sync,
    {
        let this: &Benchmark = self;
        let run = |instance: &Instance| {
            let results = this.run_instance(instance);
            on_done(instance);
            results
        };

        let batches: Vec<Vec<AlgorithmResult>> = if this.config.parallel {
            // Each solve stays single threaded; only whole instances are spread out
            instances.par_iter().map(run).collect()
        } else {
            instances.iter().map(run).collect()
        };

        for batch in batches {
            self.results.extend(batch);
        }
    }

    /// Number of instance runs where the two solvers disagreed
    pub fn disagreements(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.algorithm == "HeldKarp" && r.agrees == Some(false))
            .count()
    }

    /// Compute statistics for each algorithm
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut stats_map: HashMap<String, Vec<&AlgorithmResult>> = HashMap::new();

        for result in &self.results {
            stats_map.entry(result.algorithm.clone())
                .or_insert_with(Vec::new)
                .push(result);
        }

        let mut statistics = Vec::new();

        for (algo, results) in stats_map {
            let solved: Vec<_> = results.iter().filter(|r| r.cost.is_some()).collect();
            if solved.is_empty() {
                continue;
            }

            let times: Vec<f64> = solved.iter().map(|r| r.time).collect();
            let (avg_time, std_time) = mean_and_std(&times);

            statistics.push(AlgorithmStatistics {
                algorithm: algo,
                num_runs: results.len(),
                num_solved: solved.len(),
                avg_time,
                std_time,
                max_time: times.iter().cloned().fold(0.0, f64::max),
                total_time: times.iter().sum(),
                max_dimension: solved.iter().map(|r| r.dimension).max().unwrap_or(0),
            });
        }

        statistics.sort_by_key(|s| OrderedFloat(s.avg_time));

        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("       Exact TSP Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!("Generated: {}\n\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));

        report.push_str("Algorithm Performance Summary:\n");
        report.push_str("-".repeat(80).as_str());
        report.push('\n');
        report.push_str(&format!("{:<15} {:>10} {:>12} {:>12} {:>12} {:>10}\n",
            "Algorithm", "Solved", "Avg Time", "Std Time", "Max Time", "Max N"));
        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!("{:<15} {:>10} {:>12.6} {:>12.6} {:>12.6} {:>10}\n",
                stat.algorithm,
                format!("{}/{}", stat.num_solved, stat.num_runs),
                stat.avg_time,
                stat.std_time,
                stat.max_time,
                stat.max_dimension));
        }

        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        report.push_str(&format!("\nDisagreements between solvers: {}\n", self.disagreements()));

        report.push_str("\nOptimal cost per instance:\n");
        let mut best: Vec<(&str, usize, f64)> = Vec::new();
        for result in self.results.iter().filter(|r| r.algorithm == "HeldKarp" && r.run == 0) {
            if let Some(cost) = result.cost {
                best.push((result.instance.as_str(), result.dimension, cost));
            }
        }
        best.sort_by_key(|&(name, n, _)| (n, name));
        for (name, n, cost) in best {
            report.push_str(&format!("  {} (n={}): {:.4}\n", name, n, cost));
        }

        report
    }

    /// Write `results.csv`, `statistics.csv` and `report.txt` into the
    /// configured output directory. Returns the report text.
    pub fn save_outputs(&self) -> Result<String> {
        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir)?;

        self.export_to_csv(dir.join("results.csv"))?;
        self.export_statistics_csv(dir.join("statistics.csv"))?;

        let report = self.generate_report();
        std::fs::write(dir.join("report.txt"), &report)?;
        log::info!("benchmark outputs written to {:?}", dir);

        Ok(report)
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }
}

/// Mean and sample standard deviation (0 for fewer than two values)
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    use statrs::statistics::Statistics;

    let mean = values.mean();
    let std = if values.len() > 1 { values.std_dev() } else { 0.0 };
    (mean, std)
}

/// Helper function to load instances from a directory
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> Vec<Instance> {
    let mut instances = Vec::new();

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "tsp").unwrap_or(false) {
                match Instance::from_file(&path) {
                    Ok(instance) => instances.push(instance),
                    Err(e) => log::warn!("Cannot load {:?}: {}", path, e),
                }
            }
        }
    }

    // Sort by dimension
    instances.sort_by_key(|i| i.dimension());

    instances
}

/// `count` random instances per size in `min_size..=max_size`
pub fn random_instances(count: usize, min_size: usize, max_size: usize, seed: u64) -> Vec<Instance> {
    (min_size..=max_size)
        .flat_map(|size| (0..count as u64).map(move |k| Instance::random(size, 1000.0, seed + k)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> BenchmarkConfig {
        BenchmarkConfig {
            num_runs: 2,
            parallel: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 3);
        assert_eq!(config.brute_force_limit, 10);
    }

    #[test]
    fn test_run_on_random_instances() {
        let instances = random_instances(2, 3, 6, 11);
        assert_eq!(instances.len(), 8);

        let mut benchmark = Benchmark::new(small_config());
        benchmark.run_on_instances(&instances);

        assert_eq!(benchmark.results().len(), 8 * 2 * 2);
        assert_eq!(benchmark.disagreements(), 0);
        assert!(benchmark.results().iter().all(|r| r.agrees == Some(true)));

        let stats = benchmark.compute_statistics();
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.num_solved == 16));

        let report = benchmark.generate_report();
        assert!(report.contains("Disagreements between solvers: 0"));
    }

    #[test]
    fn test_brute_force_limit_is_recorded() {
        let config = BenchmarkConfig {
            num_runs: 1,
            parallel: false,
            brute_force_limit: 4,
            ..Default::default()
        };
        let benchmark = Benchmark::new(config);
        let results = benchmark.run_instance(&Instance::random(6, 100.0, 3));

        let brute = results.iter().find(|r| r.algorithm == "BruteForce").unwrap();
        assert!(brute.cost.is_none());
        assert!(brute.error.is_some());
        assert_eq!(brute.agrees, None);

        let dp = results.iter().find(|r| r.algorithm == "HeldKarp").unwrap();
        assert!(dp.cost.is_some());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let instances = random_instances(1, 4, 7, 5);

        let mut sequential = Benchmark::new(small_config());
        sequential.run_on_instances(&instances);

        let mut parallel = Benchmark::new(BenchmarkConfig { parallel: true, ..small_config() });
        parallel.run_on_instances(&instances);

        let costs = |b: &Benchmark| b.results().iter().map(|r| r.cost).collect::<Vec<_>>();
        assert_eq!(costs(&sequential), costs(&parallel));
    }

    #[test]
    fn test_progress_callback_sees_every_instance() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let instances = random_instances(2, 4, 6, 8);
        let done = AtomicUsize::new(0);

        for parallel in [false, true] {
            done.store(0, Ordering::SeqCst);
            let mut benchmark = Benchmark::new(BenchmarkConfig { parallel, ..small_config() });
            benchmark.run_on_instances_with(&instances, |_| {
                done.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(done.load(Ordering::SeqCst), instances.len());
            assert_eq!(benchmark.results().len(), instances.len() * 2 * 2);
        }
    }

    #[test]
    fn test_save_outputs_writes_into_output_dir() {
        let dir = std::env::temp_dir().join(format!("tsp-exact-bench-{}", std::process::id()));
        let config = BenchmarkConfig {
            output_dir: dir.clone(),
            ..small_config()
        };
        let mut benchmark = Benchmark::new(config);
        benchmark.run_on_instances(&random_instances(1, 3, 5, 2));

        let report = benchmark.save_outputs().unwrap();
        assert_eq!(benchmark.output_dir(), dir.as_path());
        assert!(dir.join("results.csv").exists());
        assert!(dir.join("statistics.csv").exists());
        assert_eq!(std::fs::read_to_string(dir.join("report.txt")).unwrap(), report);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
