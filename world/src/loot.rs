//! Random item, chest and monster generation.

use crawl_core::{ItemId, MonsterId, MonsterKind, Position, PotionSize, Rarity};
use rand::Rng;

use crate::{
    character::Monster,
    item::{GearKind, Item},
};

/// Chest capacity used for chests placed by map glyphs.
pub const MAP_CHEST_SIZE: usize = 3;

/// Maps a roll in `0..100` onto a rarity tier.
#[must_use]
pub const fn rarity_for_roll(roll: u32) -> Rarity {
    match roll {
        0..=2 => Rarity::Legendary,
        3..=10 => Rarity::Epic,
        11..=20 => Rarity::Rare,
        21..=40 => Rarity::Uncommon,
        _ => Rarity::Common,
    }
}

/// Maps a roll in `0..100` onto the capacity of a randomly placed chest.
#[must_use]
pub const fn chest_size_for_roll(roll: u32) -> usize {
    match roll {
        0..=1 => 8,
        2..=4 => 7,
        5..=6 => 6,
        7..=14 => 5,
        15..=19 => 4,
        20..=29 => 3,
        30..=39 => 2,
        _ => 1,
    }
}

/// Maps a roll in `0..100` onto the number of loot items generated.
#[must_use]
pub const fn loot_count_for_roll(roll: u32) -> usize {
    match roll {
        0..=4 => 4,
        5..=14 => 3,
        15..=29 => 2,
        30..=54 => 1,
        _ => 0,
    }
}

/// Hands out world-unique identifiers.
#[derive(Clone, Debug, Default)]
pub(crate) struct IdAllocator {
    next_item: u32,
    next_monster: u32,
}

impl IdAllocator {
    pub(crate) fn item(&mut self) -> ItemId {
        let id = ItemId::new(self.next_item);
        self.next_item = self.next_item.wrapping_add(1);
        id
    }

    pub(crate) fn monster(&mut self) -> MonsterId {
        let id = MonsterId::new(self.next_monster);
        self.next_monster = self.next_monster.wrapping_add(1);
        id
    }
}

/// Creates items and monsters from a random source.
pub(crate) struct Spawner<'a, R: Rng + ?Sized> {
    rng: &'a mut R,
    ids: &'a mut IdAllocator,
}

impl<'a, R: Rng + ?Sized> Spawner<'a, R> {
    pub(crate) fn new(rng: &'a mut R, ids: &'a mut IdAllocator) -> Self {
        Self { rng, ids }
    }

    fn roll(&mut self) -> u32 {
        self.rng.gen_range(0..100)
    }

    /// Gear of the given template with a freshly rolled rarity.
    pub(crate) fn gear(&mut self, kind: GearKind, position: Position) -> Item {
        let rarity = rarity_for_roll(self.roll());
        Item::gear(self.ids.item(), kind, position, rarity)
    }

    pub(crate) fn potion(&mut self, position: Position) -> Item {
        Item::potion(self.ids.item(), position, PotionSize::Small)
    }

    /// Chest of `size` filled with at most `size` random items.
    pub(crate) fn chest(&mut self, position: Position, size: usize) -> Item {
        let count = size.min(loot_count_for_roll(self.roll()));
        let contents = self.loot(position, count);
        Item::chest(self.ids.item(), position, size, contents)
    }

    /// Chest with a randomly drawn capacity.
    pub(crate) fn random_chest(&mut self, position: Position) -> Item {
        let size = chest_size_for_roll(self.roll());
        self.chest(position, size)
    }

    /// `count` items, each an independent uniform pick from the loot table.
    pub(crate) fn loot(&mut self, position: Position, count: usize) -> Vec<Item> {
        (0..count)
            .map(|_| {
                let pick = self.rng.gen_range(0..=GearKind::ALL.len());
                match GearKind::ALL.get(pick) {
                    Some(kind) => self.gear(*kind, position),
                    None => self.potion(position),
                }
            })
            .collect()
    }

    pub(crate) fn monster(&mut self, kind: MonsterKind, position: Position) -> Monster {
        let count = loot_count_for_roll(self.roll());
        let loot = self.loot(position, count);
        Monster::new(self.ids.monster(), kind, position, loot)
    }

    pub(crate) fn random_monster(&mut self, position: Position) -> Monster {
        let kind = MonsterKind::ALL[self.rng.gen_range(0..MonsterKind::ALL.len())];
        self.monster(kind, position)
    }

    pub(crate) fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}
