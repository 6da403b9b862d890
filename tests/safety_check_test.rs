// Safety-checked A* tests
//
// A goal that can only be reached by sealing the snake into a dead end must be
// rejected, while plain A* happily returns it. Paths that Safety-Checked A*
// does return must leave the snake able to reach its own tail.

use rand::rngs::StdRng;
use rand::SeedableRng;
use snake_pathfinder::grid::{Cell, World};
use snake_pathfinder::scenario::random_world;
use snake_pathfinder::search::{Planner, SearchOutcome, StateModel, StrategyKind};
use snake_pathfinder::survival::is_survivable;
use snake_pathfinder::transition::execute_plan;

/// One-cell-wide corridor of length five with the goal at the closed end
fn corridor(body: &[i32]) -> World {
    World::new(
        1,
        5,
        body.iter().map(|&y| Cell::new(0, y)).collect(),
        Some(Cell::new(0, 0)),
    )
    .unwrap()
}

#[test]
fn test_plain_astar_walks_into_the_dead_end() {
    let world = corridor(&[2, 3]);
    for model in [StateModel::Full, StateModel::Relaxed] {
        let result = Planner::new(StrategyKind::AStar, model).find_path(&world);
        assert!(result.found);
        assert_eq!(result.path, vec![Cell::new(0, 1), Cell::new(0, 0)]);

        let body = execute_plan(&world, &result.path).unwrap();
        assert!(!is_survivable(&world.bounds(), &body));
    }
}

#[test]
fn test_safe_astar_rejects_the_dead_end() {
    let world = corridor(&[2, 3]);
    for model in [StateModel::Full, StateModel::Relaxed] {
        let result = Planner::new(StrategyKind::SafeAStar, model).find_path(&world);
        assert!(!result.found, "{:?}", model);
        assert!(result.path.is_empty());
        assert_eq!(result.outcome, SearchOutcome::UnsafeGoalOnly);
        assert!(result.unsafe_goals_rejected >= 1);
    }
}

#[test]
fn test_safe_astar_accepts_goal_when_tail_follows() {
    // A one-segment snake grows to two; its tail stays adjacent to the head
    let world = corridor(&[2]);
    for model in [StateModel::Full, StateModel::Relaxed] {
        let result = Planner::new(StrategyKind::SafeAStar, model).find_path(&world);
        assert!(result.found);
        assert_eq!(result.cost, 2);
        assert_eq!(result.unsafe_goals_rejected, 0);
    }
}

#[test]
fn test_safe_astar_matches_astar_on_open_board() {
    let world = World::new(
        7,
        7,
        vec![Cell::new(3, 3), Cell::new(3, 4), Cell::new(3, 5)],
        Some(Cell::new(0, 0)),
    )
    .unwrap();

    for model in [StateModel::Full, StateModel::Relaxed] {
        let astar = Planner::new(StrategyKind::AStar, model).find_path(&world);
        let safe = Planner::new(StrategyKind::SafeAStar, model).find_path(&world);
        assert!(safe.found);
        assert_eq!(safe.cost, astar.cost);

        let body = execute_plan(&world, &safe.path).unwrap();
        assert!(is_survivable(&world.bounds(), &body));
    }
}

#[test]
fn test_safe_results_are_always_survivable() {
    let mut rng = StdRng::seed_from_u64(77);

    for _ in 0..120 {
        let world = random_world(&mut rng, 6, 6, 9).unwrap();
        for model in [StateModel::Full, StateModel::Relaxed] {
            let astar = Planner::new(StrategyKind::AStar, model).find_path(&world);
            let safe = Planner::new(StrategyKind::SafeAStar, model).find_path(&world);

            if safe.found {
                let body = execute_plan(&world, &safe.path).unwrap();
                assert!(
                    is_survivable(&world.bounds(), &body),
                    "unsafe result {:?} on {:?}",
                    safe.path,
                    world
                );
                assert!(astar.found);
                assert!(safe.cost >= astar.cost);
            } else {
                assert!(matches!(
                    safe.outcome,
                    SearchOutcome::Exhausted | SearchOutcome::UnsafeGoalOnly
                ));
            }
        }
    }
}
