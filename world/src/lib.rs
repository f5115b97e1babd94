#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative dungeon state and the rules that mutate it.

mod actions;
pub mod character;
pub mod item;
pub mod level;
pub mod loader;
pub mod loot;
mod pending;
mod population;
pub mod tile;

use std::{
    collections::{BTreeMap, HashSet},
    path::Path,
};

use crawl_core::{Command, Difficulty, Event, Position, WELCOME_BANNER};
use crawl_system_visibility::Visibility;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::{
    character::Player,
    level::{Level, Portal},
    loader::{LevelBlueprint, SpawnKind, WorldBlueprint, WorldSource},
    loot::{IdAllocator, Spawner, MAP_CHEST_SIZE},
};

pub use crate::loader::LoadError;

/// Tuning applied whenever the levels are (re)built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldConfig {
    /// Population density of randomly placed chests and monsters.
    pub difficulty: Difficulty,
    /// Seed for every random draw; entropy is used when absent.
    pub seed: Option<u64>,
}

/// Represents the authoritative dungeon state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    blueprint: WorldBlueprint,
    difficulty: Difficulty,
    rng: ChaCha8Rng,
    ids: IdAllocator,
    levels: BTreeMap<String, Level>,
    current: String,
    player: Player,
    turn: u64,
    visibility: Visibility,
}

impl World {
    /// Instantiates every level of `blueprint` and places the player.
    #[must_use]
    pub fn new(blueprint: WorldBlueprint, config: WorldConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut world = Self {
            banner: WELCOME_BANNER,
            current: blueprint.start_level().to_owned(),
            player: Player::new(blueprint.player_start()),
            blueprint,
            difficulty: config.difficulty,
            rng,
            ids: IdAllocator::default(),
            levels: BTreeMap::new(),
            turn: 0,
            visibility: Visibility::new(),
        };
        world.rebuild();
        world
    }

    /// Loads the maps directory and builds a world from it.
    pub fn load(dir: impl AsRef<Path>, config: WorldConfig) -> Result<Self, LoadError> {
        let blueprint = WorldSource::from_dir(dir)?.parse()?;
        Ok(Self::new(blueprint, config))
    }

    /// Re-rolls every level from its blueprint and respawns the player.
    fn rebuild(&mut self) {
        let Self {
            blueprint,
            rng,
            ids,
            difficulty,
            ..
        } = self;
        let mut spawner = Spawner::new(rng, ids);

        let mut levels = BTreeMap::new();
        for (name, level_blueprint) in blueprint.levels() {
            let mut level = instantiate(name, level_blueprint, &mut spawner);
            let mut reserved: HashSet<Position> =
                level_blueprint.player_start().into_iter().collect();
            for link in blueprint.links() {
                if link.level == *name {
                    level.add_portal(
                        link.position,
                        Portal::new(link.target_level.clone(), link.target_position),
                    );
                    let _ = reserved.insert(link.position);
                }
                if link.target_level == *name {
                    let _ = reserved.insert(link.target_position);
                }
            }
            population::populate(&mut level, &mut spawner, *difficulty, &reserved);
            let _ = levels.insert(name.clone(), level);
        }

        self.levels = levels;
        self.current = self.blueprint.start_level().to_owned();
        self.player = Player::new(self.blueprint.player_start());
        if let Some(level) = self.levels.get_mut(&self.current) {
            actions::refresh_view(level, &self.player, &mut self.visibility, true);
        }

        info!(
            level = %self.current,
            difficulty = self.difficulty.get(),
            monsters = self.levels.values().map(|level| level.monsters().len()).sum::<usize>(),
            "world built"
        );
    }
}

fn instantiate<R>(name: &str, blueprint: &LevelBlueprint, spawner: &mut Spawner<'_, R>) -> Level
where
    R: rand::Rng + ?Sized,
{
    let mut level = Level::new(
        name.to_owned(),
        blueprint.width(),
        blueprint.height(),
        blueprint.tiles().to_vec(),
    );
    for spawn in blueprint.spawns() {
        let position = spawn.position;
        match spawn.kind {
            SpawnKind::Monster(kind) => {
                let monster = spawner.monster(kind, position);
                let _ = level.monsters_mut().insert(position, monster);
            }
            SpawnKind::Gear(kind) => {
                let item = spawner.gear(kind, position);
                level.stack_mut(position).push(item);
            }
            SpawnKind::Potion => {
                let item = spawner.potion(position);
                level.stack_mut(position).push(item);
            }
            SpawnKind::Chest => {
                let item = spawner.chest(position, MAP_CHEST_SIZE);
                level.stack_mut(position).push(item);
            }
        }
    }
    level
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MovePlayer { direction } => actions::move_player(world, direction, out_events),
        Command::Interact { item } => actions::interact(world, item, out_events),
        Command::TakeItem { item } => actions::take_item(world, item, out_events),
        Command::TakeAll => actions::take_all(world, out_events),
        Command::ToggleEquip { item } => actions::toggle_equip(world, item, out_events),
        Command::Drop { item } => actions::drop_item(world, item, out_events),
        Command::Restart => {
            world.rebuild();
            out_events.push(Event::WorldRestarted);
        }
        Command::SetDifficulty { difficulty } => {
            world.difficulty = difficulty;
            info!(difficulty = difficulty.get(), "difficulty changed");
            out_events.push(Event::DifficultyChanged { difficulty });
        }
        Command::Tick => actions::tick(world, out_events),
        Command::StepMonster { monster, to } => {
            actions::step_monster(world, monster, to, out_events);
        }
        Command::MonsterAttack { monster } => actions::monster_attack(world, monster, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use crawl_core::{Difficulty, MonsterTurn, Position};

    use super::World;
    use crate::{character::Player, level::Level};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Name of the level the player is in.
    #[must_use]
    pub fn level_name(world: &World) -> &str {
        &world.current
    }

    /// Level the player is in.
    #[must_use]
    pub fn current_level(world: &World) -> Option<&Level> {
        world.levels.get(&world.current)
    }

    /// Any level by name.
    #[must_use]
    pub fn level<'a>(world: &'a World, name: &str) -> Option<&'a Level> {
        world.levels.get(name)
    }

    /// The player character.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Difficulty applied by the next rebuild.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Number of ticks since the world was created.
    #[must_use]
    pub fn turn(world: &World) -> u64 {
        world.turn
    }

    /// Turn budgets of every monster in the current level, in spawn order.
    #[must_use]
    pub fn monster_turns(world: &World) -> Vec<MonsterTurn> {
        let Some(level) = current_level(world) else {
            return Vec::new();
        };
        let mut turns: Vec<MonsterTurn> = level
            .monsters()
            .values()
            .map(|monster| MonsterTurn {
                monster: monster.id(),
                position: monster.character().position(),
                action_points: monster.character().action_points(),
            })
            .collect();
        turns.sort_by_key(|turn| turn.monster);
        turns
    }

    /// Reports whether a character could step onto `position` right now.
    #[must_use]
    pub fn is_open(world: &World, position: Position) -> bool {
        current_level(world).is_some_and(|level| level.can_walk(position))
    }

    /// Reports whether a monster stands on `position`.
    #[must_use]
    pub fn is_occupied(world: &World, position: Position) -> bool {
        current_level(world).is_some_and(|level| level.monster_at(position).is_some())
    }

    /// Captures everything a viewer needs to draw the current state.
    #[must_use]
    pub fn snapshot(world: &World) -> Option<Snapshot> {
        let level = current_level(world)?;
        Some(Snapshot {
            level_name: world.current.clone(),
            level: level.clone(),
            player: world.player.clone(),
            difficulty: world.difficulty,
            turn: world.turn,
        })
    }

    /// Immutable copy of the visible simulation state.
    #[derive(Clone, Debug)]
    pub struct Snapshot {
        /// Name of the current level.
        pub level_name: String,
        /// Copy of the current level.
        pub level: Level,
        /// Copy of the player.
        pub player: Player,
        /// Difficulty applied by the next rebuild.
        pub difficulty: Difficulty,
        /// Tick counter.
        pub turn: u64,
    }
}
