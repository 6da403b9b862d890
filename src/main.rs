// Command-line planner: builds a world snapshot from arguments, runs one
// search and prints the result as JSON together with the move sequence.
//
// Usage:
//   snake-planner --width 10 --height 10 --body "2,2;2,3;2,4" --goal 0,0 [options]
//
// Options:
//   --strategy <bfs|dfs|greedy|astar|safe_astar>
//   --model <full|relaxed>
//   --heuristic <manhattan|euclidean|diagonal>
//   --max-expansions <N>
//   --config <path>        Path to Planner.toml (default: Planner.toml)
//   --trace <path>         Write one JSON line per expansion to <path>

use log::info;
use serde_json::json;
use std::env;
use std::process;
use std::time::Instant;

use snake_pathfinder::config::Config;
use snake_pathfinder::error::{PlannerError, Result};
use snake_pathfinder::exploration::TraceRecorder;
use snake_pathfinder::grid::{Cell, World};
use snake_pathfinder::profiler;
use snake_pathfinder::search::Planner;

fn print_usage() {
    eprintln!("Snake Planner");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  snake-planner --body <x,y;x,y;...> [--goal <x,y>] [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --width <W>             Grid width (default: [grid] in config)");
    eprintln!("  --height <H>            Grid height (default: [grid] in config)");
    eprintln!("  --body <x,y;...>        Snake body, head first");
    eprintln!("  --goal <x,y>            Goal cell; omit for a world without a goal");
    eprintln!("  --strategy <S>          bfs | dfs | greedy | astar | safe_astar");
    eprintln!("  --model <M>             full | relaxed");
    eprintln!("  --heuristic <H>         manhattan | euclidean | diagonal");
    eprintln!("  --max-expansions <N>    Expansion budget");
    eprintln!("  --config <path>         Path to Planner.toml (default: Planner.toml)");
    eprintln!("  --trace <path>          Write an exploration trace (JSONL)");
    eprintln!("  --help                  Show this help message");
}

fn parse_body(s: &str) -> Result<Vec<Cell>> {
    s.split(';')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.parse::<Cell>())
        .collect()
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| PlannerError::InvalidArgument(format!("{} '{}': {}", flag, value, e)))
}

fn run(args: &[String]) -> Result<()> {
    let mut config_path = "Planner.toml".to_string();
    if let Some(pos) = args.iter().position(|a| a == "--config") {
        config_path = args
            .get(pos + 1)
            .cloned()
            .ok_or_else(|| PlannerError::InvalidArgument("--config requires an argument".into()))?;
    }

    let mut config = Config::from_file(&config_path).unwrap_or_else(|e| {
        log::warn!("Could not load config from '{}' ({}), using defaults", config_path, e);
        Config::default_hardcoded()
    });

    let mut body: Option<Vec<Cell>> = None;
    let mut goal: Option<Cell> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = || {
            args.get(i + 1)
                .map(String::as_str)
                .ok_or_else(|| PlannerError::InvalidArgument(format!("{} requires an argument", flag)))
        };

        match flag {
            "--width" => config.grid.width = parse_number(flag, value()?)?,
            "--height" => config.grid.height = parse_number(flag, value()?)?,
            "--body" => body = Some(parse_body(value()?)?),
            "--goal" => goal = Some(value()?.parse()?),
            "--strategy" => config.search.strategy = value()?.parse()?,
            "--model" => config.search.model = value()?.parse()?,
            "--heuristic" => config.search.heuristic = value()?.parse()?,
            "--max-expansions" => config.search.max_expansions = parse_number(flag, value()?)?,
            "--trace" => {
                config.trace.enabled = true;
                config.trace.log_file_path = value()?.to_string();
            }
            "--config" => {}
            _ => {
                return Err(PlannerError::InvalidArgument(format!(
                    "Unknown option '{}'",
                    flag
                )))
            }
        }
        i += 2;
    }

    let body = body.ok_or_else(|| PlannerError::InvalidArgument("--body is required".into()))?;
    let world = World::new(config.grid.width, config.grid.height, body, goal)?;

    if config.profiling.enabled {
        profiler::enable();
    }

    let planner = Planner::from_config(&config.search);
    let mut trace = TraceRecorder::new(config.trace.enabled, &config.trace.log_file_path);

    info!(
        "Planning on {}x{} grid with {} ({} model)",
        config.grid.width,
        config.grid.height,
        planner.strategy().as_str(),
        planner.model().as_str()
    );

    let start_time = Instant::now();
    let result = if trace.is_enabled() {
        planner.find_path_with_exploration(&world, Some(&mut trace))
    } else {
        planner.find_path(&world)
    };
    let elapsed_ms = start_time.elapsed().as_millis() as u64;
    trace.flush();

    info!(
        "Search finished in {}ms: {:?} after {} expansions",
        elapsed_ms, result.outcome, result.nodes_expanded
    );

    let moves: Vec<&str> = result
        .moves(world.head())
        .iter()
        .map(|mv| mv.as_str())
        .collect();
    let output = json!({
        "strategy": planner.strategy(),
        "model": planner.model(),
        "heuristic": planner.options().heuristic,
        "result": result,
        "moves": moves,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if config.profiling.enabled && config.profiling.log_to_stderr {
        profiler::merge_thread_local();
        profiler::print_report(elapsed_ms);
    }

    Ok(())
}

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
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

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
