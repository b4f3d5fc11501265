//! Breadth-first search over walkable cells
//!
//! Both queries explore neighbours in [`Direction::ALL`] order (up, down,
//! left, right) with a FIFO queue, so ties between equally distant targets
//! always resolve the same way. Nothing is cached between calls; the grid
//! changes after every move.

use crate::grid::Grid;
use shared::{CellKind, Direction, Position};
use std::collections::{HashMap, HashSet, VecDeque};

/// Outcome of a nearest-coin query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResult {
    NotFound,
    Found(Position),
    /// Ordered start -> target, both ends included
    FoundWithRoute(Vec<Position>),
}

fn walkable_neighbors(grid: &Grid, pos: Position) -> impl Iterator<Item = Position> + '_ {
    Direction::ALL
        .into_iter()
        .filter_map(move |direction| direction.step(pos))
        .filter(move |next| grid.is_walkable(*next))
}

/// Returns the first coin dequeued by a BFS from `start`, or None when no
/// coin is reachable.
pub fn nearest_coin(grid: &Grid, start: Position) -> Option<Position> {
    if !grid.is_walkable(start) {
        return None;
    }

    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if grid.cell_at(current) == Ok(CellKind::Coin) {
            return Some(current);
        }

        for next in walkable_neighbors(grid, current) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    None
}

/// Shortest route from `start` to `target` through walkable cells, in
/// start -> target order. None when the target cannot be reached.
pub fn shortest_path_to(grid: &Grid, start: Position, target: Position) -> Option<Vec<Position>> {
    if !grid.is_walkable(start) || !grid.is_walkable(target) {
        return None;
    }

    let mut parents: HashMap<Position, Position> = HashMap::new();
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if current == target {
            return Some(backtrack(&parents, start, target));
        }

        for next in walkable_neighbors(grid, current) {
            if visited.insert(next) {
                parents.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    None
}

fn backtrack(
    parents: &HashMap<Position, Position>,
    start: Position,
    target: Position,
) -> Vec<Position> {
    let mut path = vec![target];
    let mut current = target;
    while current != start {
        match parents.get(&current) {
            Some(&parent) => {
                path.push(parent);
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
