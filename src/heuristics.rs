// Distance heuristics over two cells
//
// All functions are pure and ignore the board contents.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PlannerError, Result};
use crate::grid::Cell;

/// Calculates Manhattan distance between two cells
pub fn manhattan(a: Cell, b: Cell) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// Straight-line distance between two cells
pub fn euclidean(a: Cell, b: Cell) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx.hypot(dy)
}

/// Chebyshev distance, `max(|dx|, |dy|)`
pub fn diagonal(a: Cell, b: Cell) -> u32 {
    a.x.abs_diff(b.x).max(a.y.abs_diff(b.y))
}

/// Selectable heuristic used by the informed strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    #[default]
    Manhattan,
    Euclidean,
    Diagonal,
}

impl Heuristic {
    pub fn all() -> [Heuristic; 3] {
        [Heuristic::Manhattan, Heuristic::Euclidean, Heuristic::Diagonal]
    }

    /// Estimated number of moves from `from` to `to`
    pub fn distance(self, from: Cell, to: Cell) -> f64 {
        match self {
            Heuristic::Manhattan => manhattan(from, to) as f64,
            Heuristic::Euclidean => euclidean(from, to),
            Heuristic::Diagonal => diagonal(from, to) as f64,
        }
    }

    /// Whether A* with this heuristic is guaranteed optimal on 4-connected moves
    ///
    /// Chebyshev distance is kept for experimentation only.
    pub fn guarantees_optimality(self) -> bool {
        !matches!(self, Heuristic::Diagonal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Heuristic::Manhattan => "manhattan",
            Heuristic::Euclidean => "euclidean",
            Heuristic::Diagonal => "diagonal",
        }
    }
}

impl FromStr for Heuristic {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "manhattan" => Ok(Heuristic::Manhattan),
            "euclidean" => Ok(Heuristic::Euclidean),
            "diagonal" | "chebyshev" => Ok(Heuristic::Diagonal),
            _ => Err(PlannerError::InvalidArgument(format!("Unknown heuristic: {}", s))),
        }
    }
}
