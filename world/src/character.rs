//! Player and monster characters.

use crawl_core::{Direction, ItemId, ItemStats, Location, MonsterId, MonsterKind, Position};

use crate::item::{Entity, EntityKind, Item};

const PLAYER_NAME: &str = "Wizard";
const PLAYER_HEALTH: i32 = 50;
const PLAYER_SPEED: f64 = 1.0;
const PLAYER_SIGHT_RANGE: u32 = 7;
const PLAYER_INVENTORY_CAPACITY: usize = 10;
const MONSTER_SIGHT_RANGE: u32 = 10;

/// Shared state of anything that fights.
#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    entity: Entity,
    health: i32,
    max_health: i32,
    base: ItemStats,
    stats: ItemStats,
    speed: f64,
    action_points: f64,
    sight_range: u32,
    inventory: Vec<Item>,
    inventory_capacity: usize,
    equipped: Vec<Item>,
}

/// Outcome of toggling an item between inventory and equipment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EquipOutcome {
    Equipped,
    Unequipped,
    InventoryFull,
    SlotOccupied(Location),
    NotEquipable,
    NotHeld,
}

impl Character {
    fn new(entity: Entity, health: i32, base: ItemStats, speed: f64, sight_range: u32) -> Self {
        Self {
            entity,
            health,
            max_health: health,
            base,
            stats: base,
            speed,
            action_points: 0.0,
            sight_range,
            inventory: Vec::new(),
            inventory_capacity: PLAYER_INVENTORY_CAPACITY,
            equipped: Vec::new(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.entity.name()
    }

    /// Positional identity.
    #[must_use]
    pub const fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Tile currently occupied.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.entity.position
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Health ceiling.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Aggregate stats: natural values plus every equipped item.
    #[must_use]
    pub const fn stats(&self) -> ItemStats {
        self.stats
    }

    /// Action points gained per tick.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Accumulated action points.
    #[must_use]
    pub const fn action_points(&self) -> f64 {
        self.action_points
    }

    /// Field of view radius.
    #[must_use]
    pub const fn sight_range(&self) -> u32 {
        self.sight_range
    }

    /// Carried items in pickup order.
    #[must_use]
    pub fn inventory(&self) -> &[Item] {
        &self.inventory
    }

    /// Maximum number of carried items.
    #[must_use]
    pub const fn inventory_capacity(&self) -> usize {
        self.inventory_capacity
    }

    /// Worn items in equip order.
    #[must_use]
    pub fn equipped(&self) -> &[Item] {
        &self.equipped
    }

    /// Whether health is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.entity.position = position;
    }

    pub(crate) fn gain_action_points(&mut self) {
        self.action_points += self.speed;
    }

    pub(crate) fn spend_action_point(&mut self) {
        self.action_points -= 1.0;
    }

    pub(crate) fn take_damage(&mut self, damage: i32) {
        self.health -= damage;
    }

    /// Restores up to `amount` health and returns what was actually restored.
    pub(crate) fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    pub(crate) fn inventory_full(&self) -> bool {
        self.inventory.len() >= self.inventory_capacity
    }

    pub(crate) fn carry(&mut self, item: Item) {
        self.inventory.push(item);
    }

    pub(crate) fn holds(&self, item: ItemId) -> Option<&Item> {
        self.inventory.iter().find(|held| held.id() == item)
    }

    pub(crate) fn remove_from_inventory(&mut self, item: ItemId) -> Option<Item> {
        let index = self.inventory.iter().position(|held| held.id() == item)?;
        Some(self.inventory.remove(index))
    }

    pub(crate) fn drain_inventory(&mut self) -> Vec<Item> {
        std::mem::take(&mut self.inventory)
    }

    /// Equips a carried item, or unequips it when already worn and the
    /// inventory has room for it.
    pub(crate) fn toggle_equip(&mut self, item: ItemId) -> EquipOutcome {
        if let Some(index) = self.equipped.iter().position(|worn| worn.id() == item) {
            if self.inventory_full() {
                return EquipOutcome::InventoryFull;
            }
            let mut worn = self.equipped.remove(index);
            if let Some(equipable) = worn.as_equipable_mut() {
                equipable.set_equipped(false);
            }
            self.inventory.push(worn);
            self.recompute_stats();
            return EquipOutcome::Unequipped;
        }

        let Some(index) = self.inventory.iter().position(|held| held.id() == item) else {
            return EquipOutcome::NotHeld;
        };
        let Some(location) = self.inventory[index]
            .as_equipable()
            .map(|equipable| equipable.location())
        else {
            return EquipOutcome::NotEquipable;
        };

        let occupied = self.equipped.iter().any(|worn| {
            worn.as_equipable()
                .is_some_and(|equipable| equipable.location() == location)
        });
        if occupied {
            return EquipOutcome::SlotOccupied(location);
        }

        let mut carried = self.inventory.remove(index);
        if let Some(equipable) = carried.as_equipable_mut() {
            equipable.set_equipped(true);
        }
        self.equipped.push(carried);
        self.recompute_stats();
        EquipOutcome::Equipped
    }

    fn recompute_stats(&mut self) {
        self.stats = self
            .equipped
            .iter()
            .filter_map(Item::as_equipable)
            .fold(self.base, |total, equipable| total.combined(equipable.stats()));
    }
}

/// The single player character.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    character: Character,
    facing: Direction,
}

impl Player {
    /// Creates a fresh player standing on `position`.
    #[must_use]
    pub fn new(position: Position) -> Self {
        let entity = Entity::new(
            position,
            '@',
            EntityKind::Creature,
            PLAYER_NAME,
            "A wandering wizard.",
        );
        Self {
            character: Character::new(
                entity,
                PLAYER_HEALTH,
                ItemStats::new(1, 4, 0, 5.0),
                PLAYER_SPEED,
                PLAYER_SIGHT_RANGE,
            ),
            facing: Direction::South,
        }
    }

    /// Fighting state.
    #[must_use]
    pub const fn character(&self) -> &Character {
        &self.character
    }

    pub(crate) fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }

    /// Direction of the last attempted move.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    pub(crate) fn face(&mut self, direction: Direction) {
        self.facing = direction;
    }

    /// Tile directly in front of the player.
    #[must_use]
    pub const fn front(&self) -> Position {
        self.character.position().step(self.facing)
    }
}

/// A hostile character.
#[derive(Clone, Debug, PartialEq)]
pub struct Monster {
    id: MonsterId,
    kind: MonsterKind,
    character: Character,
}

impl Monster {
    /// Creates a monster carrying `loot`.
    #[must_use]
    pub fn new(id: MonsterId, kind: MonsterKind, position: Position, loot: Vec<Item>) -> Self {
        let (name, health, stats, speed) = match kind {
            MonsterKind::Rat => ("Rat", 5, ItemStats::new(1, 3, 0, 5.0), 2.0),
            MonsterKind::Spider => ("Spider", 30, ItemStats::new(2, 5, 2, 5.0), 1.0),
            MonsterKind::Bat => ("Bat", 8, ItemStats::new(1, 2, 0, 10.0), 1.5),
        };
        let entity = Entity::new(position, kind.glyph(), EntityKind::Creature, name, name);
        let mut character = Character::new(entity, health, stats, speed, MONSTER_SIGHT_RANGE);
        character.inventory_capacity = character.inventory_capacity.max(loot.len());
        character.inventory = loot;
        Self {
            id,
            kind,
            character,
        }
    }

    /// Spawn-order identifier.
    #[must_use]
    pub const fn id(&self) -> MonsterId {
        self.id
    }

    /// Roster entry.
    #[must_use]
    pub const fn kind(&self) -> MonsterKind {
        self.kind
    }

    /// Fighting state.
    #[must_use]
    pub const fn character(&self) -> &Character {
        &self.character
    }

    pub(crate) fn character_mut(&mut self) -> &mut Character {
        &mut self.character
    }
}
