// Survivability oracle
//
// Decides whether a body that has just reached the goal can keep moving:
// the head needs a free neighbour and the tail must be reachable from the head
// through cells not covered by the body. The tail itself counts as free since
// it vacates on the next non-growing move. Reaching the tail is a conservative
// proxy for "not boxed in", not a proof of indefinite survival.

use std::collections::{HashSet, VecDeque};

use crate::grid::{is_occupied, Body, Bounds, Cell};

/// True if the head has at least one neighbour it could legally move onto
pub fn has_free_neighbor(bounds: &Bounds, body: &Body) -> bool {
    let segments = body.segments();
    body.head()
        .neighbors()
        .iter()
        .any(|&n| bounds.in_bounds(n) && !is_occupied(segments, n, true))
}

/// Breadth-first reachability from head to tail over cells outside `body[..len-1]`
pub fn is_tail_reachable(bounds: &Bounds, body: &Body) -> bool {
    let head = body.head();
    let tail = body.tail();
    if head == tail {
        return true;
    }

    let blocked = body.without_tail();
    let mut visited: HashSet<Cell> = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(head);
    queue.push_back(head);

    while let Some(cell) = queue.pop_front() {
        for next in cell.neighbors() {
            if next == tail {
                return true;
            }
            if !bounds.in_bounds(next) || blocked.contains(&next) {
                continue;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    false
}

/// Combined check used by Safety-Checked A* on every candidate goal state
pub fn is_survivable(bounds: &Bounds, body: &Body) -> bool {
    has_free_neighbor(bounds, body) && is_tail_reachable(bounds, body)
}
