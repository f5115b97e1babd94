#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the dungeon crawler.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! happened. Systems read immutable snapshots and respond exclusively with new
//! command batches.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the dungeon.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Moves the player one tile, attacking a monster standing in the way.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Contextual action on the tile in front of the player or on an item.
    Interact {
        /// Item the action applies to, if the adapter selected one.
        item: Option<ItemId>,
    },
    /// Moves a single item from the player's tile into the inventory.
    TakeItem {
        /// Identifier of the ground item to pick up.
        item: ItemId,
    },
    /// Moves every portable item on the player's tile into the inventory.
    TakeAll,
    /// Equips an inventory item, or unequips it when already worn.
    ToggleEquip {
        /// Identifier of the item to toggle.
        item: ItemId,
    },
    /// Drops an inventory item onto the player's tile.
    Drop {
        /// Identifier of the inventory item to drop.
        item: ItemId,
    },
    /// Rebuilds every level from scratch and respawns the player.
    Restart,
    /// Changes the population density applied by the next rebuild.
    SetDifficulty {
        /// Difficulty to apply.
        difficulty: Difficulty,
    },
    /// Advances the global clock by one turn, granting action points.
    Tick,
    /// Requests that a monster advance one tile along its path.
    StepMonster {
        /// Identifier of the monster attempting to move.
        monster: MonsterId,
        /// Adjacent position the monster wants to enter.
        to: Position,
    },
    /// Requests that a monster strike the player.
    MonsterAttack {
        /// Identifier of the attacking monster.
        monster: MonsterId,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Turn counter after the advance.
        turn: u64,
    },
    /// Confirms that the player moved between two tiles.
    PlayerMoved {
        /// Tile the player occupied before moving.
        from: Position,
        /// Tile the player occupies after moving.
        to: Position,
    },
    /// Confirms that the player stepped through a portal.
    PortalTraversed {
        /// Level the player left.
        from_level: String,
        /// Level the player arrived in.
        to_level: String,
        /// Arrival tile within the destination level.
        to: Position,
    },
    /// Reports that a closed door was opened.
    DoorOpened {
        /// Tile holding the door.
        at: Position,
    },
    /// Reports that an open door was closed.
    DoorClosed {
        /// Tile holding the door.
        at: Position,
    },
    /// Reports the outcome of a single attack.
    Attacked {
        /// Character that attacked.
        attacker: Actor,
        /// Character that received the blow.
        defender: Actor,
        /// Health removed from the defender.
        damage: i32,
        /// Whether the critical roll succeeded.
        critical: bool,
    },
    /// Confirms that a monster moved between two tiles.
    MonsterMoved {
        /// Identifier of the monster that moved.
        monster: MonsterId,
        /// Tile the monster occupied before moving.
        from: Position,
        /// Tile the monster occupies after moving.
        to: Position,
    },
    /// Reports that a monster died and dropped its belongings.
    MonsterKilled {
        /// Identifier of the dead monster.
        monster: MonsterId,
        /// Tile that received the monster's inventory.
        at: Position,
        /// Number of items spilled onto the ground.
        dropped: usize,
    },
    /// Reports that the player's health reached zero.
    PlayerDied,
    /// Confirms that every level was rebuilt.
    WorldRestarted,
    /// Confirms that an item moved from the ground into the inventory.
    ItemPickedUp {
        /// Identifier of the collected item.
        item: ItemId,
    },
    /// Reports that a pickup or unequip was refused because the inventory is full.
    InventoryFull {
        /// Identifier of the item left on the ground.
        item: ItemId,
    },
    /// Confirms that an item moved from the inventory onto the ground.
    ItemDropped {
        /// Identifier of the dropped item.
        item: ItemId,
        /// Tile that received the item.
        at: Position,
    },
    /// Confirms that a potion was consumed.
    PotionConsumed {
        /// Identifier of the consumed potion.
        item: ItemId,
        /// Health actually restored after clamping to the maximum.
        healed: i32,
    },
    /// Confirms that a treasure chest was opened.
    ChestOpened {
        /// Identifier of the chest.
        chest: ItemId,
        /// Tile holding the chest and its spilled contents.
        at: Position,
        /// Number of items moved onto the ground.
        spilled: usize,
    },
    /// Confirms that an item was equipped.
    ItemEquipped {
        /// Identifier of the equipped item.
        item: ItemId,
    },
    /// Confirms that an item was unequipped.
    ItemUnequipped {
        /// Identifier of the unequipped item.
        item: ItemId,
    },
    /// Reports that an equip request was ignored because the slot is taken.
    SlotOccupied {
        /// Identifier of the item that stayed in the inventory.
        item: ItemId,
        /// Slot that is already filled.
        location: Location,
    },
    /// Confirms that the difficulty changed.
    DifficultyChanged {
        /// Difficulty applied by the next rebuild.
        difficulty: Difficulty,
    },
    /// Reports that a command referenced state it is not allowed to touch.
    CommandRejected {
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The referenced item is not lying on the player's tile.
    ItemNotOnTile,
    /// The referenced item is not carried by the player.
    ItemNotHeld,
    /// The referenced item is a fixture and cannot be carried.
    NotPortable,
    /// The referenced item cannot be equipped.
    NotEquipable,
    /// The referenced item offers no action.
    NoAction,
    /// The referenced monster does not exist in the current level.
    MissingMonster,
    /// The monster step targets a tile it may not enter.
    StepBlocked,
}

/// Character taking part in an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// The single player character.
    Player,
    /// A monster identified by its spawn sequence.
    Monster(MonsterId),
}

/// Advisory tag describing the last mutation, consumed by renderers to pick
/// sounds and animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LastEvent {
    /// The player moved.
    Move,
    /// A door was opened.
    DoorOpen,
    /// A door was closed.
    DoorClose,
    /// An attack was resolved.
    Attack,
    /// An item was picked up.
    Pickup,
    /// An item was dropped.
    DropItem,
    /// A potion was consumed.
    ConsumePotion,
    /// A chest was opened.
    OpenChest,
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Column and row offsets produced by one step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Location of a single grid tile expressed as column and row coordinates.
///
/// Coordinates are signed so that stepping off the top or left edge yields a
/// position that simply fails bounds checks.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Position reached after one step in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Unique identifier assigned to a monster in spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an item when it is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a new item identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Population density multiplier applied when levels are (re)built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Difficulty(u32);

impl Difficulty {
    /// Difficulty used when nothing else is configured.
    pub const NORMAL: Self = Self(1);

    /// Creates a new difficulty value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric multiplier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Ordered quality tier scaling the stats of equipable items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    /// Base quality, multiplier 1.
    Common,
    /// Multiplier 1.5.
    Uncommon,
    /// Multiplier 1.75.
    Rare,
    /// Multiplier 2.
    Epic,
    /// Multiplier 3.
    Legendary,
}

impl Rarity {
    /// Fixed stat multiplier associated with the tier.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Common => 1.0,
            Self::Uncommon => 1.5,
            Self::Rare => 1.75,
            Self::Epic => 2.0,
            Self::Legendary => 3.0,
        }
    }

    /// Human readable tier name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
        }
    }
}

/// Equipment slot occupied by an equipable item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// Helmets.
    Head,
    /// Body armor.
    Chest,
    /// Leg armor.
    Legs,
    /// Footwear.
    Foots,
    /// Off-hand.
    LeftHand,
    /// Main hand.
    RightHand,
}

/// Combat modifiers carried by equipable items and aggregated on characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    /// Lower bound of the damage roll.
    pub min_damage: i32,
    /// Upper bound of the damage roll.
    pub max_damage: i32,
    /// Flat damage reduction.
    pub armor: i32,
    /// Critical hit chance expressed in percent.
    pub critical_chance: f64,
}

impl ItemStats {
    /// Creates a stats record from explicit values.
    #[must_use]
    pub const fn new(min_damage: i32, max_damage: i32, armor: i32, critical_chance: f64) -> Self {
        Self {
            min_damage,
            max_damage,
            armor,
            critical_chance,
        }
    }

    /// Applies the rarity multiplier, truncating integer stats toward zero.
    #[must_use]
    pub fn scaled(self, rarity: Rarity) -> Self {
        let multiplier = rarity.multiplier();
        Self {
            min_damage: (f64::from(self.min_damage) * multiplier) as i32,
            max_damage: (f64::from(self.max_damage) * multiplier) as i32,
            armor: (f64::from(self.armor) * multiplier) as i32,
            critical_chance: self.critical_chance * multiplier,
        }
    }

    /// Element-wise sum of two stats records.
    #[must_use]
    pub fn combined(self, other: ItemStats) -> Self {
        Self {
            min_damage: self.min_damage + other.min_damage,
            max_damage: self.max_damage + other.max_damage,
            armor: self.armor + other.armor,
            critical_chance: self.critical_chance + other.critical_chance,
        }
    }
}

/// Size class of a healing potion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PotionSize {
    /// Restores a quarter of the maximum health.
    Small,
    /// Restores half of the maximum health.
    Medium,
    /// Restores three quarters of the maximum health.
    Large,
}

impl PotionSize {
    /// Fraction of the maximum health restored by the potion.
    #[must_use]
    pub const fn heal_fraction(self) -> f64 {
        match self {
            Self::Small => 0.25,
            Self::Medium => 0.50,
            Self::Large => 0.75,
        }
    }

    /// Human readable size name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

/// Kinds of monsters that roam the dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Fast, fragile vermin.
    Rat,
    /// Slow and sturdy.
    Spider,
    /// Erratic flyer.
    Bat,
}

impl MonsterKind {
    /// Every monster kind, in roster order.
    pub const ALL: [Self; 3] = [Self::Bat, Self::Spider, Self::Rat];

    /// Map glyph that spawns this monster.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Rat => 'R',
            Self::Spider => 'S',
            Self::Bat => 'B',
        }
    }

    /// Resolves a map glyph into a monster kind.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            'R' => Some(Self::Rat),
            'S' => Some(Self::Spider),
            'B' => Some(Self::Bat),
            _ => None,
        }
    }
}

/// Immutable view of a monster's turn budget used by the AI system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterTurn {
    /// Identifier of the monster.
    pub monster: MonsterId,
    /// Tile currently occupied by the monster.
    pub position: Position,
    /// Action points accumulated so far.
    pub action_points: f64,
}
