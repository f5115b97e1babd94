//! Breadth-first inference of the background under map objects.

use std::collections::{HashSet, VecDeque};

use crawl_core::{Direction, Position};

use crate::tile::Terrain;

const NEIGHBORS: [Direction; 4] = [
    Direction::East,
    Direction::West,
    Direction::North,
    Direction::South,
];

/// Finds the nearest definite floor for tiles whose background is pending.
///
/// The search starts on the pending tile itself and spreads through tiles
/// accepted by `can_enter`. When no floor is reachable the tile defaults to
/// [`Terrain::Floor`].
#[derive(Debug, Default)]
pub(crate) struct BackgroundResolver {
    queue: VecDeque<Position>,
    visited: HashSet<Position>,
}

impl BackgroundResolver {
    pub(crate) fn resolve<F, G>(&mut self, start: Position, terrain_at: F, mut can_enter: G) -> Terrain
    where
        F: Fn(Position) -> Option<Terrain>,
        G: FnMut(Position) -> bool,
    {
        self.queue.clear();
        self.visited.clear();

        self.queue.push_back(start);
        let _ = self.visited.insert(start);

        while let Some(current) = self.queue.pop_front() {
            if let Some(terrain) = terrain_at(current).filter(|terrain| terrain.is_floor()) {
                return terrain;
            }

            for direction in NEIGHBORS {
                let next = current.step(direction);
                if !can_enter(next) {
                    continue;
                }
                if self.visited.insert(next) {
                    self.queue.push_back(next);
                }
            }
        }

        Terrain::Floor
    }
}
