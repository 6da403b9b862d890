// Strategy comparison tool
//
// Generates seeded random worlds and runs BFS, DFS, Greedy and A* on each one
// under the head-only model, then reports mean expansions and mean path length
// per strategy together with two informedness checks:
//   - A* expanding more nodes than BFS on the same instance
//   - Greedy returning a shorter path than A*
//
// Usage:
//   cargo run --release --bin compare_strategies -- [--instances N] [--width W] [--height H]
//                                                   [--max-body L] [--seed S] [--config PATH]

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::env;
use std::process;
use std::time::Instant;

use snake_pathfinder::config::Config;
use snake_pathfinder::error::{PlannerError, Result};
use snake_pathfinder::scenario::random_world;
use snake_pathfinder::search::{Planner, SearchResult, StateModel, StrategyKind};

const COMPARED: [StrategyKind; 4] = [
    StrategyKind::Bfs,
    StrategyKind::Dfs,
    StrategyKind::Greedy,
    StrategyKind::AStar,
];

struct Options {
    instances: usize,
    width: i32,
    height: i32,
    max_body: usize,
    seed: u64,
}

/// Results of every compared strategy on one generated world
struct InstanceReport {
    results: [SearchResult; 4],
}

impl InstanceReport {
    fn result(&self, kind: StrategyKind) -> &SearchResult {
        let index = COMPARED.iter().position(|k| *k == kind).unwrap_or(0);
        &self.results[index]
    }
}

#[derive(Default)]
struct StrategySummary {
    runs: usize,
    found: usize,
    total_expanded: usize,
    total_length: usize,
}

impl StrategySummary {
    fn mean_expanded(&self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            self.total_expanded as f64 / self.runs as f64
        }
    }

    fn mean_length(&self) -> f64 {
        if self.found == 0 {
            0.0
        } else {
            self.total_length as f64 / self.found as f64
        }
    }
}

fn print_usage() {
    eprintln!("Strategy Comparison Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  compare_strategies [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --instances <N>    Number of random worlds (default: 200)");
    eprintln!("  --width <W>        Grid width (default: [grid] in config)");
    eprintln!("  --height <H>       Grid height (default: [grid] in config)");
    eprintln!("  --max-body <L>     Maximum body length (default: 8)");
    eprintln!("  --seed <S>         Base RNG seed (default: 42)");
    eprintln!("  --config <path>    Path to Planner.toml (default: Planner.toml)");
    eprintln!("  --help             Show this help message");
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let flag = &args[i];
    let raw = args
        .get(i + 1)
        .ok_or_else(|| PlannerError::InvalidArgument(format!("{} requires an argument", flag)))?;
    raw.parse::<T>()
        .map_err(|e| PlannerError::InvalidArgument(format!("{} '{}': {}", flag, raw, e)))
}

fn parse_options(args: &[String]) -> Result<(Options, Config)> {
    let mut config_path = "Planner.toml".to_string();
    if let Some(pos) = args.iter().position(|a| a == "--config") {
        config_path = parse_value(args, pos)?;
    }

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        warn!("Could not load config from '{}' ({}), using defaults", config_path, e);
        Config::default_hardcoded()
    });

    let mut options = Options {
        instances: 200,
        width: config.grid.width,
        height: config.grid.height,
        max_body: 8,
        seed: 42,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--instances" => options.instances = parse_value(args, i)?,
            "--width" => options.width = parse_value(args, i)?,
            "--height" => options.height = parse_value(args, i)?,
            "--max-body" => options.max_body = parse_value(args, i)?,
            "--seed" => options.seed = parse_value(args, i)?,
            "--config" => {}
            other => {
                return Err(PlannerError::InvalidArgument(format!(
                    "Unknown option '{}'",
                    other
                )))
            }
        }
        i += 2;
    }

    if !config.search.heuristic.guarantees_optimality() {
        warn!(
            "Heuristic '{}' is not guaranteed optimal; A* figures are for experimentation only",
            config.search.heuristic.as_str()
        );
    }

    if options.max_body == 0 {
        return Err(PlannerError::InvalidArgument(
            "--max-body must be at least 1".to_string(),
        ));
    }

    Ok((options, config))
}

fn run_instance(options: &Options, config: &Config, index: usize) -> Result<InstanceReport> {
    let mut rng = StdRng::seed_from_u64(options.seed.wrapping_add(index as u64));
    let world = random_world(&mut rng, options.width, options.height, options.max_body)?;

    let results = COMPARED.map(|kind| {
        Planner::new(kind, StateModel::Relaxed)
            .with_heuristic(config.search.heuristic)
            .with_max_expansions(config.search.max_expansions)
            .find_path(&world)
    });

    Ok(InstanceReport { results })
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(0);
    }

    let (options, config) = match parse_options(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    info!(
        "Comparing {} strategies on {} random {}x{} worlds (max body {}, seed {})",
        COMPARED.len(),
        options.instances,
        options.width,
        options.height,
        options.max_body,
        options.seed
    );

    let start_time = Instant::now();
    let reports: Vec<InstanceReport> = match (0..options.instances)
        .into_par_iter()
        .map(|index| run_instance(&options, &config, index))
        .collect::<Result<Vec<_>>>()
    {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let elapsed = start_time.elapsed();

    let mut summaries: Vec<StrategySummary> =
        COMPARED.iter().map(|_| StrategySummary::default()).collect();
    let mut astar_worse_than_bfs = 0;
    let mut greedy_shorter_than_astar = 0;

    for report in &reports {
        for (summary, result) in summaries.iter_mut().zip(report.results.iter()) {
            summary.runs += 1;
            summary.total_expanded += result.nodes_expanded;
            if result.found {
                summary.found += 1;
                summary.total_length += result.path.len();
            }
        }

        let bfs = report.result(StrategyKind::Bfs);
        let astar = report.result(StrategyKind::AStar);
        let greedy = report.result(StrategyKind::Greedy);

        if astar.nodes_expanded > bfs.nodes_expanded {
            astar_worse_than_bfs += 1;
        }
        if greedy.found && astar.found && greedy.path.len() < astar.path.len() {
            greedy_shorter_than_astar += 1;
        }
    }

    println!("\n=== STRATEGY COMPARISON ===");
    println!(
        "Instances: {} | Grid: {}x{} | Heuristic: {} | Time: {:.2?}",
        reports.len(),
        options.width,
        options.height,
        config.search.heuristic.as_str(),
        elapsed
    );
    println!();
    println!(
        "{:<10} {:>8} {:>16} {:>14}",
        "strategy", "found", "mean expanded", "mean length"
    );
    for (kind, summary) in COMPARED.iter().zip(summaries.iter()) {
        println!(
            "{:<10} {:>8} {:>16.2} {:>14.2}",
            kind.as_str(),
            summary.found,
            summary.mean_expanded(),
            summary.mean_length()
        );
    }
    println!();
    println!("A* expanded more than BFS:    {}", astar_worse_than_bfs);
    println!("Greedy shorter than A*:       {}", greedy_shorter_than_astar);

    if greedy_shorter_than_astar > 0 {
        warn!(
            "{} instances where Greedy beat A* on path length",
            greedy_shorter_than_astar
        );
    }
}
