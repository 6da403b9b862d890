// Search strategies
//
// BFS, DFS, Greedy best-first, A* and Safety-Checked A* share one loop. They
// differ only in the frontier discipline (FIFO, LIFO or priority) and in the
// priority key. The state model (full body or head only) is picked once per
// call and fixes the visited-set granularity for the whole search.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::str::FromStr;

use crate::config::SearchConfig;
use crate::error::{PlannerError, Result};
use crate::exploration::{ExpansionEvent, ExplorationObserver};
use crate::grid::{Cell, Move, World};
use crate::heuristics::Heuristic;
use crate::profile;
use crate::profiler::ProfileGuard;
use crate::survival;
use crate::transition::{FullState, RelaxedState, SearchableState};

/// Default expansion budget for a single search
pub const DEFAULT_MAX_EXPANSIONS: usize = 1_000_000;

/// Which frontier discipline and priority key to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum StrategyKind {
    #[serde(rename = "bfs")]
    Bfs,
    #[serde(rename = "dfs")]
    Dfs,
    #[serde(rename = "greedy")]
    Greedy,
    #[serde(rename = "astar")]
    AStar,
    #[serde(rename = "safe_astar")]
    SafeAStar,
}

impl StrategyKind {
    pub fn all() -> [StrategyKind; 5] {
        [
            StrategyKind::Bfs,
            StrategyKind::Dfs,
            StrategyKind::Greedy,
            StrategyKind::AStar,
            StrategyKind::SafeAStar,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Bfs => "bfs",
            StrategyKind::Dfs => "dfs",
            StrategyKind::Greedy => "greedy",
            StrategyKind::AStar => "astar",
            StrategyKind::SafeAStar => "safe_astar",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bfs" => Ok(StrategyKind::Bfs),
            "dfs" => Ok(StrategyKind::Dfs),
            "greedy" => Ok(StrategyKind::Greedy),
            "astar" | "a*" => Ok(StrategyKind::AStar),
            "safe_astar" | "safe-astar" | "safe_a*" => Ok(StrategyKind::SafeAStar),
            _ => Err(PlannerError::InvalidArgument(format!("Unknown strategy: {}", s))),
        }
    }
}

/// State representation used by a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateModel {
    /// Body-aware: the visited key is the full ordered body
    #[default]
    Full,
    /// Head-only: the starting body is a frozen obstacle
    Relaxed,
}

impl StateModel {
    pub fn is_relaxed(&self) -> bool {
        matches!(self, StateModel::Relaxed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StateModel::Full => "full",
            StateModel::Relaxed => "relaxed",
        }
    }
}

impl FromStr for StateModel {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "full" => Ok(StateModel::Full),
            "relaxed" => Ok(StateModel::Relaxed),
            _ => Err(PlannerError::InvalidArgument(format!("Unknown state model: {}", s))),
        }
    }
}

/// Why a search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// A goal-reaching path was returned
    Found,
    /// The world had no goal; nothing to do
    NoGoal,
    /// The goal lies on the body (not the head) and cannot be entered
    GoalOccupied,
    /// Frontier emptied; no path exists in this state model
    Exhausted,
    /// The expansion budget ran out first
    BudgetExceeded,
    /// Goal states were reached, but the oracle rejected every one of them
    UnsafeGoalOnly,
    /// The exploration observer asked the search to stop
    Halted,
}

/// Result contract shared by every strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Cells to visit in order; excludes the start, ends at the goal
    pub path: Vec<Cell>,
    pub nodes_expanded: usize,
    pub depth: usize,
    pub cost: usize,
    pub found: bool,
    pub outcome: SearchOutcome,
    /// Goal states discarded by the survivability oracle
    pub unsafe_goals_rejected: usize,
}

impl SearchResult {
    fn found(path: Vec<Cell>, nodes_expanded: usize, unsafe_goals_rejected: usize) -> Self {
        let steps = path.len();
        SearchResult {
            path,
            nodes_expanded,
            depth: steps,
            cost: steps,
            found: true,
            outcome: SearchOutcome::Found,
            unsafe_goals_rejected,
        }
    }

    fn not_found(outcome: SearchOutcome, nodes_expanded: usize, unsafe_goals_rejected: usize) -> Self {
        SearchResult {
            path: Vec::new(),
            nodes_expanded,
            depth: 0,
            cost: 0,
            found: false,
            outcome,
            unsafe_goals_rejected,
        }
    }

    /// Converts the path into the move sequence a game loop would execute
    pub fn moves(&self, start: Cell) -> Vec<Move> {
        std::iter::once(start)
            .chain(self.path.iter().copied())
            .zip(self.path.iter().copied())
            .filter_map(|(from, to)| Move::between(from, to))
            .collect()
    }
}

/// Tunables shared by every strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub heuristic: Heuristic,
    pub max_expansions: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            heuristic: Heuristic::Manhattan,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

/// Frontier entry; owned by the running search only
struct Node<S> {
    state: S,
    path: Vec<Cell>,
    g: usize,
}

/// Heap entry ordered as a min-heap on `(priority, insertion sequence)`
struct Prioritized<S> {
    priority: f64,
    seq: u64,
    node: Node<S>,
}

impl<S> PartialEq for Prioritized<S> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<S> Eq for Prioritized<S> {}

impl<S> PartialOrd for Prioritized<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S> Ord for Prioritized<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest key first
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

enum Frontier<S> {
    Fifo(VecDeque<Node<S>>),
    Lifo(Vec<Node<S>>),
    Priority {
        heap: BinaryHeap<Prioritized<S>>,
        next_seq: u64,
    },
}

impl<S> Frontier<S> {
    fn for_strategy(strategy: StrategyKind) -> Self {
        match strategy {
            StrategyKind::Bfs => Frontier::Fifo(VecDeque::new()),
            StrategyKind::Dfs => Frontier::Lifo(Vec::new()),
            StrategyKind::Greedy | StrategyKind::AStar | StrategyKind::SafeAStar => {
                Frontier::Priority {
                    heap: BinaryHeap::new(),
                    next_seq: 0,
                }
            }
        }
    }

    /// `priority` is ignored by the FIFO and LIFO disciplines
    fn push(&mut self, node: Node<S>, priority: f64) {
        match self {
            Frontier::Fifo(queue) => queue.push_back(node),
            Frontier::Lifo(stack) => stack.push(node),
            Frontier::Priority { heap, next_seq } => {
                heap.push(Prioritized {
                    priority,
                    seq: *next_seq,
                    node,
                });
                *next_seq += 1;
            }
        }
    }

    fn pop(&mut self) -> Option<Node<S>> {
        match self {
            Frontier::Fifo(queue) => queue.pop_front(),
            Frontier::Lifo(stack) => stack.pop(),
            Frontier::Priority { heap, .. } => heap.pop().map(|entry| entry.node),
        }
    }

    fn len(&self) -> usize {
        match self {
            Frontier::Fifo(queue) => queue.len(),
            Frontier::Lifo(stack) => stack.len(),
            Frontier::Priority { heap, .. } => heap.len(),
        }
    }
}

/// A configured search strategy
///
/// Holds no state between calls: every invocation builds and drops its own
/// frontier, visited set and counters, so one planner can be shared freely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planner {
    strategy: StrategyKind,
    model: StateModel,
    options: SearchOptions,
}

impl Planner {
    pub fn new(strategy: StrategyKind, model: StateModel) -> Self {
        Planner {
            strategy,
            model,
            options: SearchOptions::default(),
        }
    }

    /// Builds a planner from the `[search]` section of the configuration
    pub fn from_config(config: &SearchConfig) -> Self {
        Planner::new(config.strategy, config.model)
            .with_heuristic(config.heuristic)
            .with_max_expansions(config.max_expansions)
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.options.heuristic = heuristic;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.options.max_expansions = max_expansions;
        self
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn model(&self) -> StateModel {
        self.model
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Searches without instrumentation
    pub fn find_path(&self, world: &World) -> SearchResult {
        self.find_path_with_exploration(world, None)
    }

    /// Searches for a path from the snake's head to the world's goal
    ///
    /// The observer, when present, is called exactly once per popped node,
    /// before the goal test, so the final goal-reaching pop is reported too.
    ///
    /// # Arguments
    /// * `world` - Immutable snapshot to plan on
    /// * `observer` - Optional expansion observer; may halt the search
    ///
    /// # Returns
    /// * `SearchResult` - Either a complete path or `found = false` with the reason
    pub fn find_path_with_exploration(
        &self,
        world: &World,
        observer: Option<&mut dyn ExplorationObserver>,
    ) -> SearchResult {
        let _guard = ProfileGuard::new("search");

        debug!(
            "Starting {} search ({} model, heuristic={}, budget={})",
            self.strategy.as_str(),
            self.model.as_str(),
            self.options.heuristic.as_str(),
            self.options.max_expansions
        );

        let result = match world.goal() {
            None => SearchResult::not_found(SearchOutcome::NoGoal, 0, 0),
            // The relaxed model never moves the tail, so a goal there is walled in too
            Some(_)
                if world.goal_on_body() || (self.model.is_relaxed() && world.goal_on_tail()) =>
            {
                SearchResult::not_found(SearchOutcome::GoalOccupied, 0, 0)
            }
            Some(goal) => match self.model {
                StateModel::Full => self.run::<FullState>(world, goal, observer),
                StateModel::Relaxed => self.run::<RelaxedState>(world, goal, observer),
            },
        };

        debug!(
            "{} search finished: {:?} (expanded={}, cost={}, rejected={})",
            self.strategy.as_str(),
            result.outcome,
            result.nodes_expanded,
            result.cost,
            result.unsafe_goals_rejected
        );

        result
    }

    fn priority(&self, head: Cell, g: usize, goal: Cell) -> f64 {
        match self.strategy {
            StrategyKind::Bfs | StrategyKind::Dfs => 0.0,
            StrategyKind::Greedy => self.options.heuristic.distance(head, goal),
            StrategyKind::AStar | StrategyKind::SafeAStar => {
                g as f64 + self.options.heuristic.distance(head, goal)
            }
        }
    }

    fn run<S: SearchableState>(
        &self,
        world: &World,
        goal: Cell,
        mut observer: Option<&mut dyn ExplorationObserver>,
    ) -> SearchResult {
        let safety_checked = self.strategy == StrategyKind::SafeAStar;
        let bounds = world.bounds();
        let start = S::initial(world);

        // A* variants keep the best known g per state and re-queue on improvement;
        // the other strategies treat the first discovery as final.
        let reopens = matches!(self.strategy, StrategyKind::AStar | StrategyKind::SafeAStar);
        let mut best_g: HashMap<S, usize> = HashMap::new();
        let mut visited_heads: HashSet<Cell> = HashSet::new();
        // States whose live entry is still in the frontier; stale entries are not counted
        let mut queued: HashSet<S> = HashSet::new();
        best_g.insert(start.clone(), 0);
        visited_heads.insert(start.head());
        if reopens {
            queued.insert(start.clone());
        }

        let mut frontier = Frontier::for_strategy(self.strategy);
        let start_priority = self.priority(start.head(), 0, goal);
        frontier.push(
            Node {
                state: start,
                path: Vec::new(),
                g: 0,
            },
            start_priority,
        );

        let mut nodes_expanded = 0;
        let mut unsafe_goals_rejected = 0;

        while let Some(node) = frontier.pop() {
            if reopens && best_g.get(&node.state).is_some_and(|&g| g < node.g) {
                // Superseded by a cheaper entry for the same state
                continue;
            }

            if nodes_expanded >= self.options.max_expansions {
                return SearchResult::not_found(
                    SearchOutcome::BudgetExceeded,
                    nodes_expanded,
                    unsafe_goals_rejected,
                );
            }
            nodes_expanded += 1;
            if reopens {
                queued.remove(&node.state);
            }

            if let Some(obs) = observer.as_deref_mut() {
                let event = ExpansionEvent {
                    partial_path: &node.path,
                    visited_heads: &visited_heads,
                    nodes_expanded,
                    frontier_size: if reopens { queued.len() } else { frontier.len() },
                };
                if obs.on_expand(&event).is_break() {
                    return SearchResult::not_found(
                        SearchOutcome::Halted,
                        nodes_expanded,
                        unsafe_goals_rejected,
                    );
                }
            }

            if node.state.head() == goal {
                if !safety_checked {
                    return SearchResult::found(node.path, nodes_expanded, unsafe_goals_rejected);
                }

                let safe = match node.state.body_after(world, &node.path) {
                    Ok(body) => profile!("survival_check", {
                        survival::is_survivable(&bounds, &body)
                    }),
                    Err(violation) => {
                        warn!("Goal path cannot be replayed from the start body: {}", violation);
                        false
                    }
                };
                if safe {
                    return SearchResult::found(node.path, nodes_expanded, unsafe_goals_rejected);
                }

                // Dropped for good: not returned and not expanded further
                unsafe_goals_rejected += 1;
                trace!(
                    "Rejected unsafe goal state after {} moves (expansion {})",
                    node.path.len(),
                    nodes_expanded
                );
                continue;
            }

            profile!("transition", {
                for succ in node.state.successors(world) {
                    let g = node.g + 1;
                    let seen = match best_g.get(&succ) {
                        Some(&known) => !reopens || known <= g,
                        None => false,
                    };
                    if seen {
                        continue;
                    }

                    let head = succ.head();
                    let mut path = Vec::with_capacity(node.path.len() + 1);
                    path.extend_from_slice(&node.path);
                    path.push(head);

                    best_g.insert(succ.clone(), g);
                    visited_heads.insert(head);
                    if reopens {
                        queued.insert(succ.clone());
                    }
                    frontier.push(
                        Node {
                            state: succ,
                            path,
                            g,
                        },
                        self.priority(head, g, goal),
                    );
                }
            });
        }

        let outcome = if unsafe_goals_rejected > 0 {
            SearchOutcome::UnsafeGoalOnly
        } else {
            SearchOutcome::Exhausted
        };
        SearchResult::not_found(outcome, nodes_expanded, unsafe_goals_rejected)
    }
}
