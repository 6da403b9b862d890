// Standalone scenario runner for batch-checking the planner
//
// Usage:
//   cargo run --bin run_scenarios -- <scenario_file> [options]
//
// Options:
//   --names <n1,n2>        Run only the named scenarios (comma-separated)
//   --strict               Exit with status 1 on any mismatch or invalid path
//   --verbose              Show detailed output for each scenario
//   --config <path>        Path to Planner.toml (default: Planner.toml)

use std::env;
use std::process;

use snake_pathfinder::config::Config;
use snake_pathfinder::scenario::ScenarioRunner;

fn print_usage() {
    eprintln!("Snake Planner Scenario Runner");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  run_scenarios <scenario_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --names <N1,N2,...>     Run only the named scenarios (comma-separated)");
    eprintln!("  --strict                Exit with status 1 on any mismatch or invalid path");
    eprintln!("  --verbose               Show detailed output for each scenario");
    eprintln!("  --config <path>         Path to Planner.toml (default: Planner.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Run every scenario");
    eprintln!("  run_scenarios tests/fixtures/scenarios.jsonl");
    eprintln!();
    eprintln!("  # Run two scenarios with per-scenario logging");
    eprintln!("  run_scenarios tests/fixtures/scenarios.jsonl --names corridor_astar,corridor_trap_safe_astar --verbose");
}

fn parse_names(s: &str) -> Vec<String> {
    s.split(',')
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let scenario_file = &args[1];
    let mut config_path = "Planner.toml".to_string();
    let mut verbose = false;
    let mut strict = false;
    let mut names: Option<Vec<String>> = None;

    // Parse arguments
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--names" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --names requires an argument");
                    process::exit(1);
                }
                names = Some(parse_names(&args[i + 1]));
                i += 1;
            }
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires an argument");
                    process::exit(1);
                }
                config_path = args[i + 1].clone();
                i += 1;
            }
            "--strict" => {
                strict = true;
            }
            "--verbose" => {
                verbose = true;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    // Load configuration
    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Scenario file: {}", scenario_file);
    println!();

    let runner = ScenarioRunner::new(config, verbose);

    let mut scenarios = match runner.load_file(scenario_file) {
        Ok(scenarios) => scenarios,
        Err(e) => {
            eprintln!("Error loading scenario file: {}", e);
            process::exit(1);
        }
    };

    if let Some(names) = &names {
        scenarios.retain(|s| names.contains(&s.name));
        for name in names {
            if !scenarios.iter().any(|s| &s.name == name) {
                eprintln!("Warning: scenario '{}' not found", name);
            }
        }
    }

    if scenarios.is_empty() {
        eprintln!("Error: No scenarios to run");
        process::exit(1);
    }

    println!("Running {} scenario(s)...\n", scenarios.len());
    let results = runner.run_all(&scenarios);
    runner.print_report(&results);

    let stats = runner.generate_stats(&results);
    if strict && (stats.mismatches > 0 || stats.invalid_paths > 0 || results.len() < scenarios.len()) {
        process::exit(1);
    }
}
