// Exploration instrumentation tests
//
// The observer is called exactly once per expansion, sees a growing picture of
// the search, and can halt it. The trace recorder writes one JSON line per call.

use snake_pathfinder::exploration::{from_fn, ExpansionEvent, ExplorationRecorder, TraceRecorder};
use snake_pathfinder::grid::{Cell, World};
use snake_pathfinder::search::{Planner, SearchOutcome, StateModel, StrategyKind};
use std::fs;
use std::ops::ControlFlow;

fn open_world() -> World {
    World::new(
        6,
        6,
        vec![Cell::new(3, 3), Cell::new(3, 4)],
        Some(Cell::new(0, 0)),
    )
    .unwrap()
}

#[test]
fn test_observer_is_optional_and_does_not_change_results() {
    let world = open_world();
    for strategy in StrategyKind::all() {
        for model in [StateModel::Full, StateModel::Relaxed] {
            let planner = Planner::new(strategy, model);
            let mut recorder = ExplorationRecorder::new();

            let plain = planner.find_path(&world);
            let observed = planner.find_path_with_exploration(&world, Some(&mut recorder));

            assert_eq!(plain, observed);
            assert_eq!(recorder.records().len(), observed.nodes_expanded);
        }
    }
}

#[test]
fn test_recorded_expansions_are_consistent() {
    let world = open_world();
    let mut recorder = ExplorationRecorder::new();
    let result = Planner::new(StrategyKind::Bfs, StateModel::Relaxed)
        .find_path_with_exploration(&world, Some(&mut recorder));
    assert!(result.found);

    let records = recorder.into_records();
    assert!(records[0].partial_path.is_empty());
    assert_eq!(records.last().map(|r| r.partial_path.clone()), Some(result.path));

    let mut previous_visited = 0;
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.nodes_expanded, i + 1);
        assert!(record.visited_heads >= previous_visited);
        previous_visited = record.visited_heads;
    }

    // BFS pops in non-decreasing depth
    for pair in records.windows(2) {
        assert!(pair[0].partial_path.len() <= pair[1].partial_path.len());
    }
}

#[test]
fn test_observer_halt_is_reported_for_every_strategy() {
    let world = open_world();
    for strategy in StrategyKind::all() {
        let mut calls = 0;
        let mut observer = from_fn(|event: &ExpansionEvent<'_>| {
            calls += 1;
            if event.nodes_expanded >= 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        let result = Planner::new(strategy, StateModel::Full)
            .find_path_with_exploration(&world, Some(&mut observer));
        drop(observer);

        assert!(!result.found);
        assert_eq!(result.outcome, SearchOutcome::Halted);
        assert_eq!(result.nodes_expanded, 2);
        assert_eq!(calls, 2);
    }
}

#[test]
fn test_halt_on_goal_expansion_wins_over_success() {
    let world = open_world();
    let goal = world.goal();
    let mut observer = from_fn(|event: &ExpansionEvent<'_>| {
        if event.head() == goal {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    let result = Planner::new(StrategyKind::AStar, StateModel::Relaxed)
        .find_path_with_exploration(&world, Some(&mut observer));
    assert!(!result.found);
    assert_eq!(result.outcome, SearchOutcome::Halted);
}

#[test]
fn test_trace_recorder_writes_one_line_per_expansion() {
    let path = std::env::temp_dir().join(format!(
        "snake_pathfinder_trace_{}.jsonl",
        std::process::id()
    ));
    let path_str = path.to_string_lossy().to_string();

    let world = open_world();
    let mut trace = TraceRecorder::new(true, &path_str);
    assert!(trace.is_enabled());

    let result = Planner::new(StrategyKind::AStar, StateModel::Full)
        .find_path_with_exploration(&world, Some(&mut trace));
    trace.flush();
    assert_eq!(trace.entries_written(), result.nodes_expanded);
    drop(trace);

    let contents = fs::read_to_string(&path).expect("trace file should exist");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), result.nodes_expanded);

    let last: serde_json::Value = serde_json::from_str(lines[lines.len() - 1]).unwrap();
    assert_eq!(last["expansion"], result.nodes_expanded);
    assert_eq!(last["depth"], result.path.len());
    assert!(last["timestamp"].is_string());

    let _ = fs::remove_file(&path);
}

#[test]
fn test_disabled_trace_recorder_is_a_no_op() {
    let world = open_world();
    let mut trace = TraceRecorder::disabled();
    let result = Planner::new(StrategyKind::Bfs, StateModel::Relaxed)
        .find_path_with_exploration(&world, Some(&mut trace));
    assert!(result.found);
    assert!(!trace.is_enabled());
    assert_eq!(trace.entries_written(), 0);
}
