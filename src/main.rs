//! Exact TSP Solver - Command Line Interface
//!
//! Solves small Euclidean TSP instances exactly by brute force or Held-Karp.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tsp_exact_solver::benchmark::{load_instances_from_dir, random_instances, Benchmark, BenchmarkConfig};
use tsp_exact_solver::exact::{BruteForceSolver, HeldKarpConfig};
use tsp_exact_solver::instance::Instance;
use tsp_exact_solver::visualization::Visualizer;
use tsp_exact_solver::{Method, Result, TspError};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "tsp-exact-solver")]
#[command(version = "1.0")]
#[command(about = "Exact Traveling Salesman solver: brute force and Held-Karp dynamic programming")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance and print the lowest cost and optimal tour
    Solve {
        /// Algorithm to use
        #[arg(value_enum)]
        method: Method,

        /// Coordinate file (lines of `index x y`)
        filename: PathBuf,

        /// Write an SVG drawing of the tour
        #[arg(short, long)]
        plot: Option<PathBuf>,

        /// Output solution to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the node ceiling of the chosen solver
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Solve an instance with both algorithms and check they agree
    Compare {
        /// Path to the instance file
        instance: PathBuf,

        /// Relative tolerance on the optimal cost
        #[arg(long, default_value = "1e-9")]
        tolerance: f64,
    },

    /// Run benchmarks on a directory of instances or on random instances
    Benchmark {
        /// Directory containing .tsp files
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Number of random instances per size (used when no directory is given)
        #[arg(long, default_value = "3")]
        random: usize,

        /// Smallest random instance
        #[arg(long, default_value = "4")]
        min_size: usize,

        /// Largest random instance
        #[arg(long, default_value = "12")]
        max_size: usize,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Number of runs per instance
        #[arg(short, long, default_value = "3")]
        runs: usize,

        /// Largest instance given to brute force
        #[arg(long, default_value = "10")]
        brute_force_limit: usize,

        /// Solve instances one after another
        #[arg(long)]
        sequential: bool,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        instance: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve { method, filename, plot, output, max_nodes, verbose } => {
            solve_instance(method, &filename, plot, output, max_nodes, verbose)
        }

        Commands::Compare { instance, tolerance } => compare_solvers(&instance, tolerance),

        Commands::Benchmark { dir, random, min_size, max_size, seed, output, runs, brute_force_limit, sequential } => {
            let instances = match dir {
                Some(dir) => load_instances_from_dir(dir),
                None => random_instances(random, min_size, max_size, seed),
            };
            let config = BenchmarkConfig {
                num_runs: runs,
                parallel: !sequential,
                brute_force_limit,
                output_dir: output,
                ..Default::default()
            };
            run_benchmark(&instances, config)
        }

        Commands::Analyze { instance } => analyze_instance(&instance),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn solve_instance(
    method: Method,
    path: &Path,
    plot: Option<PathBuf>,
    output: Option<PathBuf>,
    max_nodes: Option<usize>,
    verbose: bool,
) -> Result<()> {
    let instance = Instance::from_file(path)?;
    let matrix = instance.distance_matrix()?;

    if verbose {
        println!("{}", instance.statistics()?);
    }

    let solver = method.solver_with_max_nodes(max_nodes);

    log::info!("solving {} (n={}) with {}", instance.name, matrix.size(), solver.name());
    let solution = solver.solve(&matrix)?;

    println!("Lowest cost: {}", solution.cost);
    println!("Optimal tour: {:?}", solution.tour);

    if verbose {
        println!("Time: {:.4}s", solution.computation_time);
    }

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&solution)
            .map_err(|e| TspError::invalid_input(format!("cannot serialize solution: {}", e)))?;
        std::fs::write(&out_path, json)?;
        println!("Solution saved to {:?}", out_path);
    }

    if let Some(svg_path) = plot {
        let viz = Visualizer::new();
        let svg = viz.generate_svg(&instance, &solution);
        viz.save_svg(&svg, &svg_path)?;
        println!("Plot saved to {:?}", svg_path);
    }

    Ok(())
}

fn compare_solvers(path: &Path, tolerance: f64) -> Result<()> {
    let instance = Instance::from_file(path)?;
    let config = BenchmarkConfig {
        tolerance,
        brute_force_limit: BruteForceSolver::new().max_nodes,
        ..Default::default()
    };
    let comparison = Benchmark::new(config).compare(&instance)?;

    println!("Comparing solvers on {} (n={})...\n", instance.name, instance.dimension());

    for (name, outcome) in [("BruteForce", &comparison.brute_force), ("HeldKarp", &comparison.held_karp)] {
        match outcome {
            Ok(sol) => println!(
                "{:<12} cost={:.6} time={:.4}s tour={:?}",
                name, sol.cost, sol.computation_time, sol.tour
            ),
            Err(e) => println!("{:<12} {}", name, e),
        }
    }

    match comparison.agree(tolerance) {
        Some(true) => println!("\nBoth solvers agree on the optimal cost."),
        Some(false) => println!("\nSolvers DISAGREE on the optimal cost!"),
        None => println!("\nAt least one solver did not run; nothing to compare."),
    }

    Ok(())
}

fn run_benchmark(instances: &[Instance], config: BenchmarkConfig) -> Result<()> {
    println!("Found {} instances", instances.len());

    if instances.is_empty() {
        eprintln!("No instances found!");
        return Ok(());
    }

    let mut benchmark = Benchmark::new(config);

    let pb = ProgressBar::new(instances.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );

    benchmark.run_on_instances_with(instances, |instance| {
        pb.set_message(instance.name.clone());
        pb.inc(1);
    });
    pb.finish_with_message("done");

    let report = benchmark.save_outputs()?;
    println!("\n{}", report);
    println!("Results, statistics and report saved to {:?}", benchmark.output_dir());

    Ok(())
}

fn analyze_instance(path: &Path) -> Result<()> {
    let instance = Instance::from_file(path)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics()?);

    let n = instance.dimension();
    let orderings = (1..n.max(1) as u128).try_fold(1u128, |acc, k| acc.checked_mul(k));
    let table_bytes = tsp_exact_solver::exact::DpTable::required_bytes(n);

    println!("Search space:");
    match orderings {
        Some(count) => println!("  Brute force orderings: {}", count),
        None => println!("  Brute force orderings: more than 2^128"),
    }
    match table_bytes {
        Some(bytes) => println!("  Held-Karp table: {:.2} MiB", bytes as f64 / (1024.0 * 1024.0)),
        None => println!("  Held-Karp table: too large to address"),
    }

    let brute_limit = BruteForceSolver::new().max_nodes;
    let dp_limit = HeldKarpConfig::default().max_nodes;
    println!("\nRecommended method:");
    if n <= brute_limit.min(10) {
        println!("  brute-force or dynamic (n={})", n);
    } else if n <= dp_limit {
        println!("  dynamic (n={})", n);
    } else {
        println!("  none: n={} exceeds the exact solver ceilings", n);
    }

    Ok(())
}
