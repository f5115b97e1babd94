//! Random chest and monster placement scaled by difficulty.

use std::collections::HashSet;

use crawl_core::{Difficulty, Position};
use rand::Rng;
use tracing::debug;

use crate::{level::Level, loot::Spawner};

/// Scatters chests, then monsters, over free walkable tiles.
///
/// Each batch holds `walkable * difficulty / 100` entries, with the walkable
/// count taken again after the chests went down. Tiles in `reserved`, portal
/// sources and tiles carrying an overlay are never used.
pub(crate) fn populate<R>(
    level: &mut Level,
    spawner: &mut Spawner<'_, R>,
    difficulty: Difficulty,
    reserved: &HashSet<Position>,
) where
    R: Rng + ?Sized,
{
    let chests = quota(level, difficulty);
    let mut placed_chests = 0;
    for _ in 0..chests {
        let Some(position) = free_tile(level, spawner, reserved) else {
            break;
        };
        let chest = spawner.random_chest(position);
        level.stack_mut(position).push(chest);
        if let Some(tile) = level.tile_mut(position) {
            tile.set_walkable(false);
            tile.set_actionable(true);
        }
        placed_chests += 1;
    }

    let monsters = quota(level, difficulty);
    let mut placed_monsters = 0;
    for _ in 0..monsters {
        let Some(position) = free_tile(level, spawner, reserved) else {
            break;
        };
        let monster = spawner.random_monster(position);
        let _ = level.monsters_mut().insert(position, monster);
        placed_monsters += 1;
    }

    debug!(
        level = level.name(),
        chests = placed_chests,
        monsters = placed_monsters,
        "populated level"
    );
}

fn quota(level: &Level, difficulty: Difficulty) -> usize {
    let walkable = level.tiles().filter(|(_, tile)| tile.is_walkable()).count();
    walkable * difficulty.get() as usize / 100
}

fn free_tile<R>(
    level: &Level,
    spawner: &mut Spawner<'_, R>,
    reserved: &HashSet<Position>,
) -> Option<Position>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<Position> = level
        .tiles()
        .filter(|(position, tile)| {
            tile.is_walkable()
                && tile.overlay().is_none()
                && !reserved.contains(position)
                && level.portal_at(*position).is_none()
                && level.monster_at(*position).is_none()
                && level.items_at(*position).is_empty()
        })
        .map(|(position, _)| position)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    candidates.get(spawner.pick(candidates.len())).copied()
}
