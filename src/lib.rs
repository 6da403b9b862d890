// Library exports for the snake pathfinding engine
// The planner CLI and the analysis tools in src/bin all build on these modules

pub mod config;
pub mod error;
pub mod exploration;
pub mod grid;
pub mod heuristics;
pub mod profiler;
pub mod scenario;
pub mod search;
pub mod survival;
pub mod transition;

pub use error::{PlannerError, Result};
pub use grid::{Body, Bounds, Cell, Move, World};
pub use heuristics::Heuristic;
pub use search::{Planner, SearchOptions, SearchOutcome, SearchResult, StateModel, StrategyKind};
