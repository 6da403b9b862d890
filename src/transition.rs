// State transition function
//
// Two state models share one capability:
// - `FullState` carries the whole body; the body moves and grows as the head
//   advances, so two states with the same head but different tails differ.
// - `RelaxedState` carries only the head; the starting body is a static
//   obstacle for the whole plan.
//
// Successors are enumerated lazily in UP, DOWN, LEFT, RIGHT order.

use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::grid::{Body, Cell, Move, World};

/// A node identity the search strategies can deduplicate and expand
pub trait SearchableState: Clone + Eq + Hash {
    /// Start state for the given world snapshot
    fn initial(world: &World) -> Self;

    fn head(&self) -> Cell;

    /// Legal successor states, one per legal move, in move enumeration order
    fn successors<'a>(&'a self, world: &'a World) -> impl Iterator<Item = Self> + 'a;

    /// Body occupied by the snake once `path` (which ends in this state) has
    /// been executed from the world's start body
    fn body_after(&self, world: &World, path: &[Cell]) -> Result<Body, PlanViolation>;
}

/// Body-aware state: the full ordered body plus the goal still to be eaten
///
/// Equality and hashing look at the body only. A consumed goal always comes
/// with a longer body, so the goal never separates two equal bodies.
#[derive(Debug, Clone)]
pub struct FullState {
    body: Body,
    goal: Option<Cell>,
}

impl FullState {
    pub fn new(body: Body, goal: Option<Cell>) -> Self {
        FullState { body, goal }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn goal(&self) -> Option<Cell> {
        self.goal
    }

    /// Moves the head onto `cell`; eating the goal grows the body and consumes the goal
    fn step(&self, cell: Cell, grows: bool) -> FullState {
        FullState {
            body: self.body.advance(cell, grows),
            goal: if grows { None } else { self.goal },
        }
    }
}

impl PartialEq for FullState {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

impl Eq for FullState {}

impl Hash for FullState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.body.hash(state);
    }
}

impl SearchableState for FullState {
    fn initial(world: &World) -> Self {
        FullState::new(world.body().clone(), world.goal())
    }

    fn head(&self) -> Cell {
        self.body.head()
    }

    fn successors<'a>(&'a self, world: &'a World) -> impl Iterator<Item = Self> + 'a {
        let bounds = world.bounds();
        let head = self.body.head();

        Move::ALL.into_iter().filter_map(move |mv| {
            let candidate = head.offset(mv);
            if !bounds.in_bounds(candidate) {
                return None;
            }

            // The tail only vacates when the body does not grow
            let grows = self.goal == Some(candidate);
            if self.body.is_occupied(candidate, !grows) {
                return None;
            }

            Some(self.step(candidate, grows))
        })
    }

    fn body_after(&self, _world: &World, _path: &[Cell]) -> Result<Body, PlanViolation> {
        Ok(self.body.clone())
    }
}

/// Head-only state over a frozen body snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelaxedState(pub Cell);

impl SearchableState for RelaxedState {
    fn initial(world: &World) -> Self {
        RelaxedState(world.head())
    }

    fn head(&self) -> Cell {
        self.0
    }

    fn successors<'a>(&'a self, world: &'a World) -> impl Iterator<Item = Self> + 'a {
        let bounds = world.bounds();
        let obstacles = world.body();
        let head = self.0;

        Move::ALL.into_iter().filter_map(move |mv| {
            let candidate = head.offset(mv);
            if bounds.in_bounds(candidate) && !obstacles.contains(candidate) {
                Some(RelaxedState(candidate))
            } else {
                None
            }
        })
    }

    fn body_after(&self, world: &World, path: &[Cell]) -> Result<Body, PlanViolation> {
        // Paths found by a relaxed search avoid the start body and never
        // revisit a cell, so for them this replay always succeeds.
        execute_plan(world, path)
    }
}

/// Reason a plan cannot be executed from a world snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanViolation {
    #[error("step {step}: {to} is not adjacent to {from}")]
    NotAdjacent { step: usize, from: Cell, to: Cell },

    #[error("step {step}: {cell} is out of bounds")]
    OutOfBounds { step: usize, cell: Cell },

    #[error("step {step}: {cell} collides with the body")]
    Collision { step: usize, cell: Cell },
}

/// Executes `path` from the world's start body under the full-body rules
///
/// Mirrors how a game loop consumes a plan: each cell becomes the move
/// `next - head`, the body shifts, and stepping on the goal grows it once.
///
/// # Returns
/// * `Ok(Body)` - The body after the last step
/// * `Err(PlanViolation)` - The first illegal step
pub fn execute_plan(world: &World, path: &[Cell]) -> Result<Body, PlanViolation> {
    let bounds = world.bounds();
    let mut state = FullState::initial(world);

    for (step, &cell) in path.iter().enumerate() {
        let head = state.head();
        if Move::between(head, cell).is_none() {
            return Err(PlanViolation::NotAdjacent {
                step,
                from: head,
                to: cell,
            });
        }

        if !bounds.in_bounds(cell) {
            return Err(PlanViolation::OutOfBounds { step, cell });
        }

        let grows = state.goal == Some(cell);
        if state.body.is_occupied(cell, !grows) {
            return Err(PlanViolation::Collision { step, cell });
        }

        state = state.step(cell, grows);
    }

    Ok(state.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(raw: &[(i32, i32)]) -> Vec<Cell> {
        raw.iter().map(|&(x, y)| Cell::new(x, y)).collect()
    }

    #[test]
    fn test_full_successors_shift_body() {
        let world = World::new(5, 5, cells(&[(2, 2), (2, 3), (2, 4)]), Some(Cell::new(0, 0))).unwrap();
        let start = FullState::initial(&world);

        let heads: Vec<Cell> = start.successors(&world).map(|s| s.head()).collect();
        // RIGHT is blocked by the neck
        assert_eq!(heads, cells(&[(1, 2), (3, 2), (2, 1)]));

        for succ in start.successors(&world) {
            assert_eq!(succ.body().len(), 3);
            assert_eq!(succ.goal(), Some(Cell::new(0, 0)));
            assert_eq!(succ.body().segments()[1], Cell::new(2, 2));
        }
    }

    #[test]
    fn test_full_successor_may_enter_vacating_tail() {
        // Head at (1,1), tail at (1,2): the tail moves away on a plain move
        let body = cells(&[(1, 1), (0, 1), (0, 2), (1, 2)]);
        let world = World::new(3, 3, body, Some(Cell::new(2, 2))).unwrap();
        let start = FullState::initial(&world);

        let heads: Vec<Cell> = start.successors(&world).map(|s| s.head()).collect();
        assert!(heads.contains(&Cell::new(1, 2)));
    }

    #[test]
    fn test_full_successor_cannot_enter_tail_when_growing() {
        let body = cells(&[(1, 1), (0, 1), (0, 2), (1, 2)]);
        let world = World::new(3, 3, body.clone(), Some(Cell::new(1, 2))).unwrap();
        // Stepping straight onto a tail goal would keep the tail in place
        let state = FullState::new(Body::new(body).unwrap(), Some(Cell::new(1, 2)));

        let heads: Vec<Cell> = state.successors(&world).map(|s| s.head()).collect();
        assert!(!heads.contains(&Cell::new(1, 2)));
    }

    #[test]
    fn test_full_successor_grows_on_goal() {
        let world = World::new(5, 5, cells(&[(2, 2), (2, 3)]), Some(Cell::new(1, 2))).unwrap();
        let start = FullState::initial(&world);

        let up = start
            .successors(&world)
            .find(|s| s.head() == Cell::new(1, 2))
            .unwrap();
        assert_eq!(up.body().segments(), &cells(&[(1, 2), (2, 2), (2, 3)])[..]);
        assert_eq!(up.goal(), None);
    }

    #[test]
    fn test_full_state_identity_is_the_body() {
        let body = Body::new(cells(&[(0, 0), (0, 1)])).unwrap();
        let a = FullState::new(body.clone(), Some(Cell::new(3, 3)));
        let b = FullState::new(body, None);
        assert_eq!(a, b);

        let c = FullState::new(Body::new(cells(&[(0, 0), (1, 0)])).unwrap(), None);
        assert_ne!(a, c);
    }

    #[test]
    fn test_relaxed_successors_avoid_static_body() {
        let world = World::new(5, 5, cells(&[(2, 2), (1, 2), (1, 3)]), Some(Cell::new(0, 0))).unwrap();
        let start = RelaxedState::initial(&world);

        let succs: Vec<Cell> = start.successors(&world).map(|s| s.head()).collect();
        assert_eq!(succs, cells(&[(3, 2), (2, 1), (2, 3)]));

        // The tail is a static obstacle in the relaxed model
        let beside_tail = RelaxedState(Cell::new(0, 3));
        assert!(!beside_tail
            .successors(&world)
            .any(|s| s.head() == Cell::new(1, 3)));
    }

    #[test]
    fn test_relaxed_successors_respect_bounds() {
        let world = World::new(2, 2, cells(&[(0, 0)]), None).unwrap();
        let succs: Vec<Cell> = RelaxedState::initial(&world)
            .successors(&world)
            .map(|s| s.head())
            .collect();
        assert_eq!(succs, cells(&[(1, 0), (0, 1)]));
    }

    #[test]
    fn test_execute_plan_grows_on_goal() {
        let world = World::new(5, 5, cells(&[(2, 2), (2, 3)]), Some(Cell::new(0, 2))).unwrap();
        let body = execute_plan(&world, &cells(&[(1, 2), (0, 2)])).unwrap();
        assert_eq!(body.segments(), &cells(&[(0, 2), (1, 2), (2, 2)])[..]);
    }

    #[test]
    fn test_execute_plan_reports_violations() {
        let world = World::new(3, 3, cells(&[(1, 1), (1, 2), (2, 2)]), Some(Cell::new(0, 0))).unwrap();

        assert_eq!(
            execute_plan(&world, &cells(&[(0, 0)])),
            Err(PlanViolation::NotAdjacent {
                step: 0,
                from: Cell::new(1, 1),
                to: Cell::new(0, 0)
            })
        );
        assert_eq!(
            execute_plan(&world, &cells(&[(1, 2)])),
            Err(PlanViolation::Collision {
                step: 0,
                cell: Cell::new(1, 2)
            })
        );
        assert_eq!(
            execute_plan(&world, &cells(&[(1, 0), (1, -1)])),
            Err(PlanViolation::OutOfBounds {
                step: 1,
                cell: Cell::new(1, -1)
            })
        );
    }

    #[test]
    fn test_relaxed_body_after_matches_execution() {
        let world = World::new(5, 5, cells(&[(2, 2), (2, 3), (2, 4)]), Some(Cell::new(0, 1))).unwrap();
        let path = cells(&[(1, 2), (0, 2), (0, 1)]);
        let body = RelaxedState(Cell::new(0, 1)).body_after(&world, &path).unwrap();
        assert_eq!(
            body.segments(),
            &cells(&[(0, 1), (0, 2), (1, 2), (2, 2)])[..]
        );
    }

    #[test]
    fn test_relaxed_body_after_reports_unexecutable_paths() {
        let world = World::new(5, 5, cells(&[(2, 2), (2, 3)]), Some(Cell::new(0, 2))).unwrap();
        let skipping = cells(&[(0, 2)]);
        assert_eq!(
            RelaxedState(Cell::new(0, 2)).body_after(&world, &skipping),
            Err(PlanViolation::NotAdjacent {
                step: 0,
                from: Cell::new(2, 2),
                to: Cell::new(0, 2)
            })
        );
    }
}
