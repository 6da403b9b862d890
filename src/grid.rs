// Grid world model
//
// Cells, moves, bounds, the agent body and the immutable world snapshot that
// every search starts from. Coordinates are row-major: `x` is the row index
// and ranges over `0..width`, `y` is the column index over `0..height`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{PlannerError, Result};

/// A single grid cell
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    /// Returns the cell reached by applying `mv` to this cell
    pub fn offset(&self, mv: Move) -> Cell {
        let (dx, dy) = mv.vector();
        Cell {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Cells reachable in one move, in move enumeration order
    pub fn neighbors(&self) -> [Cell; 4] {
        Move::ALL.map(|mv| self.offset(mv))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Parses `"x,y"`
impl FromStr for Cell {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        let (x, y) = s
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split_once(',')
            .ok_or_else(|| PlannerError::InvalidArgument(format!("Invalid cell '{}'", s)))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|e| PlannerError::InvalidArgument(format!("Invalid cell '{}': {}", s, e)))
        };

        Ok(Cell::new(parse(x)?, parse(y)?))
    }
}

/// The four unit moves available to the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Enumeration order used by every successor generator
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Unit vector `(dx, dy)` for this move
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Move::Up => (-1, 0),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
            Move::Right => (0, 1),
        }
    }

    pub fn opposite(self) -> Move {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        }
    }

    /// Converts a single step `from -> to` back into a move
    ///
    /// Returns `None` when the two cells are not 4-adjacent.
    pub fn between(from: Cell, to: Cell) -> Option<Move> {
        let delta = (to.x - from.x, to.y - from.y);
        Move::ALL.into_iter().find(|mv| mv.vector() == delta)
    }
}

impl FromStr for Move {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Move::Up),
            "down" => Ok(Move::Down),
            "left" => Ok(Move::Left),
            "right" => Ok(Move::Right),
            _ => Err(PlannerError::InvalidArgument(format!("Invalid move: {}", s))),
        }
    }
}

/// Grid dimensions; valid cells satisfy `0 <= x < width` and `0 <= y < height`
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(width: i32, height: i32) -> Self {
        Bounds { width, height }
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }
}

/// Returns true if `cell` is covered by `body`
///
/// When `allow_tail` is set the last segment does not count, since it vacates
/// on a non-growing move.
pub fn is_occupied(body: &[Cell], cell: Cell, allow_tail: bool) -> bool {
    match body.split_last() {
        None => false,
        Some((tail, rest)) => rest.contains(&cell) || (!allow_tail && *tail == cell),
    }
}

/// Ordered snake body, head first and tail last
///
/// Segments never repeat. A `Body` is never mutated in place: moving produces
/// a new value so successors derived from the same parent stay independent.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Body {
    segments: Vec<Cell>,
}

impl Body {
    /// Builds a body, rejecting empty or self-overlapping segment lists
    pub fn new(segments: Vec<Cell>) -> Result<Self> {
        if segments.is_empty() {
            return Err(PlannerError::InvalidWorld("body must not be empty".to_string()));
        }

        let mut seen = HashSet::with_capacity(segments.len());
        for cell in &segments {
            if !seen.insert(*cell) {
                return Err(PlannerError::InvalidWorld(format!(
                    "body segment {} appears more than once",
                    cell
                )));
            }
        }

        Ok(Body { segments })
    }

    pub fn head(&self) -> Cell {
        self.segments[0]
    }

    pub fn tail(&self) -> Cell {
        self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Cell] {
        &self.segments
    }

    /// Every segment except the tail
    pub fn without_tail(&self) -> &[Cell] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.segments.contains(&cell)
    }

    pub fn is_occupied(&self, cell: Cell, allow_tail: bool) -> bool {
        is_occupied(&self.segments, cell, allow_tail)
    }

    /// Returns the body after the head moves onto `new_head`
    ///
    /// A growing move keeps the tail; otherwise the tail is dropped so the
    /// length stays the same.
    pub fn advance(&self, new_head: Cell, grow: bool) -> Body {
        let kept = if grow {
            self.segments.len()
        } else {
            self.segments.len() - 1
        };

        let mut segments = Vec::with_capacity(kept + 1);
        segments.push(new_head);
        segments.extend_from_slice(&self.segments[..kept]);

        Body { segments }
    }
}

/// Immutable snapshot handed to a search: bounds, agent body and goal
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct World {
    bounds: Bounds,
    body: Body,
    goal: Option<Cell>,
}

impl World {
    /// Creates a validated world snapshot
    ///
    /// # Arguments
    /// * `width`, `height` - Grid dimensions, both positive
    /// * `body` - Snake segments, head first
    /// * `goal` - Goal cell, or `None` when there is nothing to reach
    pub fn new(width: i32, height: i32, body: Vec<Cell>, goal: Option<Cell>) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(PlannerError::InvalidWorld(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }

        let bounds = Bounds::new(width, height);
        let body = Body::new(body)?;

        if let Some(cell) = body.segments().iter().find(|c| !bounds.in_bounds(**c)) {
            return Err(PlannerError::InvalidWorld(format!(
                "body segment {} lies outside the {}x{} grid",
                cell, width, height
            )));
        }

        if let Some(goal) = goal {
            if !bounds.in_bounds(goal) {
                return Err(PlannerError::InvalidWorld(format!(
                    "goal {} lies outside the {}x{} grid",
                    goal, width, height
                )));
            }
        }

        Ok(World { bounds, body, goal })
    }

    /// Same body and bounds, different goal
    pub fn with_goal(&self, goal: Option<Cell>) -> Result<Self> {
        World::new(
            self.bounds.width,
            self.bounds.height,
            self.body.segments().to_vec(),
            goal,
        )
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body.head()
    }

    pub fn goal(&self) -> Option<Cell> {
        self.goal
    }

    /// True when the goal sits strictly between the head and the tail
    ///
    /// Such a goal can never be entered: the segment only vacates after the
    /// tail has passed it, and the head would have to run through its own neck.
    pub fn goal_on_body(&self) -> bool {
        match self.goal {
            Some(goal) if self.body.len() > 2 => {
                self.body.segments()[1..self.body.len() - 1].contains(&goal)
            }
            _ => false,
        }
    }

    /// True when the goal sits on the tail of a body longer than one cell
    pub fn goal_on_tail(&self) -> bool {
        self.body.len() > 1 && self.goal == Some(self.body.tail())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_vectors_are_row_major() {
        assert_eq!(Move::Up.vector(), (-1, 0));
        assert_eq!(Move::Down.vector(), (1, 0));
        assert_eq!(Move::Left.vector(), (0, -1));
        assert_eq!(Move::Right.vector(), (0, 1));
    }

    #[test]
    fn test_opposite_moves() {
        for mv in Move::ALL {
            assert_eq!(mv.opposite().opposite(), mv);
            let (dx, dy) = mv.vector();
            assert_eq!(mv.opposite().vector(), (-dx, -dy));
        }
    }

    #[test]
    fn test_move_between_adjacent_cells() {
        let from = Cell::new(2, 2);
        for mv in Move::ALL {
            assert_eq!(Move::between(from, from.offset(mv)), Some(mv));
        }
        assert_eq!(Move::between(from, Cell::new(3, 3)), None);
        assert_eq!(Move::between(from, from), None);
    }

    #[test]
    fn test_parse_cell_and_move() {
        assert_eq!("3,4".parse::<Cell>().unwrap(), Cell::new(3, 4));
        assert_eq!("(0, 7)".parse::<Cell>().unwrap(), Cell::new(0, 7));
        assert!("3;4".parse::<Cell>().is_err());
        assert_eq!("UP".parse::<Move>().unwrap(), Move::Up);
        assert!("north".parse::<Move>().is_err());
    }

    #[test]
    fn test_in_bounds() {
        let bounds = Bounds::new(3, 2);
        assert!(bounds.in_bounds(Cell::new(0, 0)));
        assert!(bounds.in_bounds(Cell::new(2, 1)));
        assert!(!bounds.in_bounds(Cell::new(3, 0)));
        assert!(!bounds.in_bounds(Cell::new(0, 2)));
        assert!(!bounds.in_bounds(Cell::new(-1, 0)));
    }

    #[test]
    fn test_is_occupied_tail_rule() {
        let body = [Cell::new(1, 1), Cell::new(1, 2), Cell::new(1, 3)];
        assert!(is_occupied(&body, Cell::new(1, 2), true));
        assert!(is_occupied(&body, Cell::new(1, 3), false));
        assert!(!is_occupied(&body, Cell::new(1, 3), true));
        assert!(!is_occupied(&body, Cell::new(0, 0), false));
        assert!(!is_occupied(&[], Cell::new(0, 0), false));
    }

    #[test]
    fn test_advance_shifts_or_grows() {
        let body = Body::new(vec![Cell::new(2, 2), Cell::new(2, 3)]).unwrap();

        let shifted = body.advance(Cell::new(1, 2), false);
        assert_eq!(shifted.segments(), &[Cell::new(1, 2), Cell::new(2, 2)]);

        let grown = body.advance(Cell::new(1, 2), true);
        assert_eq!(
            grown.segments(),
            &[Cell::new(1, 2), Cell::new(2, 2), Cell::new(2, 3)]
        );

        // Parent is untouched
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_world_validation() {
        assert!(World::new(5, 5, vec![Cell::new(2, 2)], Some(Cell::new(0, 0))).is_ok());
        assert!(World::new(0, 5, vec![Cell::new(0, 0)], None).is_err());
        assert!(World::new(5, 5, vec![], None).is_err());
        assert!(World::new(5, 5, vec![Cell::new(5, 0)], None).is_err());
        assert!(World::new(5, 5, vec![Cell::new(1, 1), Cell::new(1, 1)], None).is_err());
        assert!(World::new(5, 5, vec![Cell::new(1, 1)], Some(Cell::new(0, 9))).is_err());
    }

    #[test]
    fn test_goal_on_body_ignores_head_and_tail() {
        let body = vec![Cell::new(2, 2), Cell::new(2, 3), Cell::new(2, 4)];
        let world = World::new(5, 5, body, Some(Cell::new(2, 2))).unwrap();
        assert!(!world.goal_on_body());
        assert!(!world.goal_on_tail());

        let on_neck = world.with_goal(Some(Cell::new(2, 3))).unwrap();
        assert!(on_neck.goal_on_body());
        assert!(!on_neck.goal_on_tail());

        let on_tail = world.with_goal(Some(Cell::new(2, 4))).unwrap();
        assert!(!on_tail.goal_on_body());
        assert!(on_tail.goal_on_tail());

        assert!(!world.with_goal(None).unwrap().goal_on_body());
    }

    #[test]
    fn test_single_segment_body_has_no_tail_goal() {
        let world = World::new(3, 3, vec![Cell::new(1, 1)], Some(Cell::new(1, 1))).unwrap();
        assert!(!world.goal_on_body());
        assert!(!world.goal_on_tail());
    }
}
