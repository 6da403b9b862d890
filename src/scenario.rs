// Scenario replay for batch-checking the planner on stored world snapshots
//
// This module provides functionality to:
// 1. Parse JSONL scenario files (one world snapshot per line)
// 2. Run the configured strategy on each snapshot
// 3. Validate every returned path by executing it under the full-body rules
// 4. Compare outcomes against recorded expectations and report

use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::error::{PlannerError, Result};
use crate::grid::{Cell, World};
use crate::heuristics::Heuristic;
use crate::search::{Planner, SearchResult, StateModel, StrategyKind};
use crate::survival;
use crate::transition::execute_plan;

/// Generates a random world: a self-avoiding body walk plus a free goal cell
///
/// The walk stops early if it boxes itself in, so the body may be shorter
/// than `max_body_len`. The goal is `None` only when no free cell remains.
pub fn random_world<R: Rng>(rng: &mut R, width: i32, height: i32, max_body_len: usize) -> Result<World> {
    if width <= 0 || height <= 0 {
        return Err(PlannerError::InvalidWorld(format!(
            "grid dimensions must be positive, got {}x{}",
            width, height
        )));
    }

    let bounds = crate::grid::Bounds::new(width, height);
    let mut body = vec![Cell::new(rng.random_range(0..width), rng.random_range(0..height))];

    while body.len() < max_body_len {
        let last = body[body.len() - 1];
        let options: Vec<Cell> = last
            .neighbors()
            .into_iter()
            .filter(|c| bounds.in_bounds(*c) && !body.contains(c))
            .collect();
        if options.is_empty() {
            break;
        }
        body.push(options[rng.random_range(0..options.len())]);
    }

    let free: Vec<Cell> = (0..width)
        .flat_map(|x| (0..height).map(move |y| Cell::new(x, y)))
        .filter(|c| !body.contains(c))
        .collect();
    let goal = if free.is_empty() {
        None
    } else {
        Some(free[rng.random_range(0..free.len())])
    };

    World::new(width, height, body, goal)
}

/// Expected outcome recorded alongside a scenario
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Expectation {
    pub found: bool,
    #[serde(default)]
    pub cost: Option<usize>,
}

/// Represents a single scenario line from a JSONL file
///
/// Strategy, model, heuristic and budget fall back to the configuration when absent.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Scenario {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub body: Vec<Cell>,
    pub goal: Option<Cell>,
    #[serde(default)]
    pub strategy: Option<StrategyKind>,
    #[serde(default)]
    pub model: Option<StateModel>,
    #[serde(default)]
    pub heuristic: Option<Heuristic>,
    #[serde(default)]
    pub max_expansions: Option<usize>,
    #[serde(default)]
    pub expected: Option<Expectation>,
}

impl Scenario {
    pub fn world(&self) -> Result<World> {
        World::new(self.width, self.height, self.body.clone(), self.goal)
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name: String,
    pub strategy: StrategyKind,
    pub model: StateModel,
    pub result: SearchResult,
    /// `None` when the scenario carries no expectation
    pub matches: Option<bool>,
    /// Found paths execute legally (and survivably for Safety-Checked A*)
    pub path_valid: bool,
    pub computation_time_us: u128,
}

/// Statistics for a complete scenario run
#[derive(Debug, Default, PartialEq)]
pub struct ScenarioStats {
    pub total: usize,
    pub checked: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub invalid_paths: usize,
    pub match_rate: f64,
}

/// Runs scenarios through the planner
pub struct ScenarioRunner {
    config: Config,
    verbose: bool,
}

impl ScenarioRunner {
    /// Creates a new runner with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ScenarioRunner { config, verbose }
    }

    /// Loads all scenarios from a JSONL file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Scenario>> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let mut scenarios = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            let scenario: Scenario = serde_json::from_str(&line).map_err(|e| {
                PlannerError::InvalidArgument(format!(
                    "Failed to parse JSON on line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            scenarios.push(scenario);
        }

        info!("Loaded {} scenarios", scenarios.len());
        Ok(scenarios)
    }

    /// Builds the planner for a scenario, layering its overrides on the configuration
    pub fn planner_for(&self, scenario: &Scenario) -> Planner {
        let search = &self.config.search;
        Planner::new(
            scenario.strategy.unwrap_or(search.strategy),
            scenario.model.unwrap_or(search.model),
        )
        .with_heuristic(scenario.heuristic.unwrap_or(search.heuristic))
        .with_max_expansions(scenario.max_expansions.unwrap_or(search.max_expansions))
    }

    /// Runs a single scenario and validates the result
    pub fn run_scenario(&self, scenario: &Scenario) -> Result<ScenarioResult> {
        let world = scenario.world()?;
        let planner = self.planner_for(scenario);

        let start_time = Instant::now();
        let result = planner.find_path(&world);
        let computation_time_us = start_time.elapsed().as_micros();

        let path_valid = Self::validate_path(&world, &planner, &result);

        let matches = scenario.expected.as_ref().map(|expected| {
            expected.found == result.found
                && expected.cost.map_or(true, |cost| cost == result.cost)
        });

        if self.verbose {
            match matches {
                Some(false) => warn!(
                    "{}: ✗ MISMATCH - {} {:?} (expanded {}, cost {}, {}µs)",
                    scenario.name,
                    planner.strategy().as_str(),
                    result.outcome,
                    result.nodes_expanded,
                    result.cost,
                    computation_time_us
                ),
                _ => info!(
                    "{}: ✓ {} {:?} (expanded {}, cost {}, {}µs)",
                    scenario.name,
                    planner.strategy().as_str(),
                    result.outcome,
                    result.nodes_expanded,
                    result.cost,
                    computation_time_us
                ),
            }
        }

        Ok(ScenarioResult {
            name: scenario.name.clone(),
            strategy: planner.strategy(),
            model: planner.model(),
            result,
            matches,
            path_valid,
            computation_time_us,
        })
    }

    /// Runs every scenario, skipping (with a warning) the ones that cannot be built
    pub fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for scenario in scenarios {
            match self.run_scenario(scenario) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to run scenario '{}': {}", scenario.name, e);
                }
            }
        }

        results
    }

    /// Generates statistics from scenario results
    pub fn generate_stats(&self, results: &[ScenarioResult]) -> ScenarioStats {
        let total = results.len();
        let checked = results.iter().filter(|r| r.matches.is_some()).count();
        let matches = results.iter().filter(|r| r.matches == Some(true)).count();
        let invalid_paths = results.iter().filter(|r| !r.path_valid).count();
        let match_rate = if checked > 0 {
            (matches as f64 / checked as f64) * 100.0
        } else {
            0.0
        };

        ScenarioStats {
            total,
            checked,
            matches,
            mismatches: checked - matches,
            invalid_paths,
            match_rate,
        }
    }

    /// Prints a detailed report of scenario results
    pub fn print_report(&self, results: &[ScenarioResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    SCENARIO REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Scenarios:      {}", stats.total);
        println!("Checked:        {}", stats.checked);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("Invalid Paths:  {}", stats.invalid_paths);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_expanded: f64 = results
                .iter()
                .map(|r| r.result.nodes_expanded as f64)
                .sum::<f64>()
                / results.len() as f64;
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_us as f64)
                .sum::<f64>()
                / results.len() as f64;

            println!("Average Expansions:         {:.1}", avg_expanded);
            println!("Average Computation Time:   {:.1}µs\n", avg_time);
        }

        let failures: Vec<_> = results
            .iter()
            .filter(|r| r.matches == Some(false) || !r.path_valid)
            .collect();
        if !failures.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED FAILURES");
            println!("═══════════════════════════════════════════════════════════");

            for r in failures {
                println!(
                    "{}: {}/{} {:?} (expanded: {}, cost: {}, path valid: {})",
                    r.name,
                    r.strategy.as_str(),
                    r.model.as_str(),
                    r.result.outcome,
                    r.result.nodes_expanded,
                    r.result.cost,
                    r.path_valid
                );
            }
            println!();
        }
    }

    /// A found path must execute legally; Safety-Checked A* paths must also leave
    /// the snake survivable. Unfound results are trivially valid.
    fn validate_path(world: &World, planner: &Planner, result: &SearchResult) -> bool {
        if !result.found {
            return result.path.is_empty();
        }

        if result.path.last().copied().or(Some(world.head())) != world.goal() {
            return false;
        }

        match execute_plan(world, &result.path) {
            Ok(body) => {
                planner.strategy() != StrategyKind::SafeAStar
                    || survival::is_survivable(&world.bounds(), &body)
            }
            Err(violation) => {
                warn!("Returned path is not executable: {}", violation);
                false
            }
        }
    }
}
