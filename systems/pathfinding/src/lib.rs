#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* pathfinding over the tile grid used to steer monsters.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
};

use crawl_core::{Direction, Position};

/// Order in which neighbors are expanded; it decides between equal-cost paths.
pub const NEIGHBOR_ORDER: [Direction; 4] = [
    Direction::East,
    Direction::West,
    Direction::North,
    Direction::South,
];

/// Shortest-path search with reusable scratch buffers.
#[derive(Debug, Default)]
pub struct Pathfinder {
    frontier: BinaryHeap<FrontierEntry>,
    came_from: HashMap<Position, Position>,
    cost_so_far: HashMap<Position, u32>,
    sequence: u64,
}

impl Pathfinder {
    /// Creates a pathfinder with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a shortest path from `start` to `goal`, both inclusive.
    ///
    /// Every step costs one and the Manhattan distance guides the search.
    /// `is_passable` decides whether a neighbor may be entered and must reject
    /// out-of-grid positions. An unreachable goal yields an empty path.
    pub fn find_path<F>(&mut self, start: Position, goal: Position, mut is_passable: F) -> Vec<Position>
    where
        F: FnMut(Position) -> bool,
    {
        self.frontier.clear();
        self.came_from.clear();
        self.cost_so_far.clear();
        self.sequence = 0;

        self.push(start, 0);
        let _ = self.came_from.insert(start, start);
        let _ = self.cost_so_far.insert(start, 0);

        while let Some(entry) = self.frontier.pop() {
            let current = entry.position;
            if current == goal {
                return self.reconstruct(start, goal);
            }

            let Some(&current_cost) = self.cost_so_far.get(&current) else {
                continue;
            };
            let next_cost = current_cost + 1;

            for direction in NEIGHBOR_ORDER {
                let next = current.step(direction);
                if !is_passable(next) {
                    continue;
                }

                let improved = self
                    .cost_so_far
                    .get(&next)
                    .map_or(true, |&known| next_cost < known);
                if !improved {
                    continue;
                }

                let _ = self.cost_so_far.insert(next, next_cost);
                let _ = self.came_from.insert(next, current);
                self.push(next, next_cost + next.manhattan_distance(goal));
            }
        }

        Vec::new()
    }

    fn push(&mut self, position: Position, priority: u32) {
        self.frontier.push(FrontierEntry {
            priority,
            sequence: self.sequence,
            position,
        });
        self.sequence += 1;
    }

    fn reconstruct(&self, start: Position, goal: Position) -> Vec<Position> {
        let mut path = vec![goal];
        let mut cursor = goal;
        while cursor != start {
            match self.came_from.get(&cursor) {
                Some(&previous) => {
                    cursor = previous;
                    path.push(cursor);
                }
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrontierEntry {
    priority: u32,
    sequence: u64,
    position: Position,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passable_in(rows: &'static [&'static str]) -> impl Fn(Position) -> bool {
        move |position: Position| {
            let (Ok(x), Ok(y)) = (usize::try_from(position.x()), usize::try_from(position.y()))
            else {
                return false;
            };
            rows.get(y)
                .and_then(|row| row.as_bytes().get(x))
                .map_or(false, |glyph| *glyph != b'#')
        }
    }

    #[test]
    fn straight_corridor_is_walked_in_order() {
        let passable = passable_in(&["#######", "#.....#", "#######"]);
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder.find_path(Position::new(1, 1), Position::new(5, 1), passable);

        assert_eq!(path.len(), 5);
        for (index, position) in path.iter().enumerate() {
            assert_eq!(*position, Position::new(1 + index as i32, 1));
        }
    }

    #[test]
    fn walled_partition_yields_empty_path() {
        let passable = passable_in(&["#######", "#..#..#", "#..#..#", "#######"]);
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder.find_path(Position::new(1, 1), Position::new(5, 2), passable);

        assert!(path.is_empty());
    }

    #[test]
    fn path_to_self_contains_only_start() {
        let passable = passable_in(&["..."]);
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder.find_path(Position::new(1, 0), Position::new(1, 0), passable);

        assert_eq!(path, vec![Position::new(1, 0)]);
    }

    #[test]
    fn east_is_preferred_between_equal_paths() {
        let passable = passable_in(&["...", "...", "..."]);
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder.find_path(Position::new(0, 0), Position::new(1, 1), passable);

        assert_eq!(
            path,
            vec![Position::new(0, 0), Position::new(1, 0), Position::new(1, 1)]
        );
    }

    #[test]
    fn path_detours_around_obstacles() {
        let passable = passable_in(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        let mut pathfinder = Pathfinder::new();

        let path = pathfinder.find_path(Position::new(2, 1), Position::new(2, 3), passable);

        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&Position::new(2, 1)));
        assert_eq!(path.last(), Some(&Position::new(2, 3)));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
    }

    #[test]
    fn scratch_buffers_do_not_leak_between_searches() {
        let open = passable_in(&["....."]);
        let walled = passable_in(&["..#.."]);
        let mut pathfinder = Pathfinder::new();

        assert_eq!(
            pathfinder
                .find_path(Position::new(0, 0), Position::new(4, 0), open)
                .len(),
            5
        );
        assert!(pathfinder
            .find_path(Position::new(0, 0), Position::new(4, 0), walled)
            .is_empty());
    }
}
