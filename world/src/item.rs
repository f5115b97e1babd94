//! Items lying on the ground, carried in inventories or worn as equipment.

use crawl_core::{ItemId, ItemStats, Location, Position, PotionSize, Rarity};

/// Origin tag carried by every entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Worn protection.
    Armor,
    /// Hand-held weapon.
    Weapon,
    /// Drinkable potion.
    Potion,
    /// Treasure chest fixture.
    TreasureChest,
    /// Player or monster.
    Creature,
}

/// Positional identity shared by characters and items.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Tile the entity occupies or was last placed on.
    pub position: Position,
    symbol: char,
    kind: EntityKind,
    name: String,
    description: String,
}

impl Entity {
    /// Creates a new entity.
    #[must_use]
    pub fn new(
        position: Position,
        symbol: char,
        kind: EntityKind,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            position,
            symbol,
            kind,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Display glyph.
    #[must_use]
    pub const fn symbol(&self) -> char {
        self.symbol
    }

    /// Origin tag.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Short display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flavour text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Equipable item templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GearKind {
    /// One-handed sword.
    Sword,
    /// Short bow.
    Bow,
    /// Helmet.
    Helmet,
    /// Plate armor.
    Plate,
    /// Pair of boots.
    Boots,
}

impl GearKind {
    /// Every gear template.
    pub const ALL: [Self; 5] = [
        Self::Sword,
        Self::Bow,
        Self::Helmet,
        Self::Plate,
        Self::Boots,
    ];

    /// Slot the gear occupies when worn.
    #[must_use]
    pub const fn location(self) -> Location {
        match self {
            Self::Sword | Self::Bow => Location::RightHand,
            Self::Helmet => Location::Head,
            Self::Plate => Location::Chest,
            Self::Boots => Location::Foots,
        }
    }

    /// Stats before rarity scaling.
    #[must_use]
    pub const fn base_stats(self) -> ItemStats {
        match self {
            Self::Sword | Self::Bow => ItemStats::new(5, 10, 0, 0.0),
            Self::Helmet | Self::Boots => ItemStats::new(0, 0, 5, 0.0),
            Self::Plate => ItemStats::new(0, 0, 10, 0.0),
        }
    }

    /// Map glyph, also used as display symbol.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Sword => 's',
            Self::Bow => 'w',
            Self::Helmet => 'h',
            Self::Plate => 'a',
            Self::Boots => 'b',
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Sword => "Sword",
            Self::Bow => "Bow",
            Self::Helmet => "Helmet",
            Self::Plate => "Plate",
            Self::Boots => "Boots",
        }
    }

    const fn description(self) -> &'static str {
        match self {
            Self::Sword => "A common sword...",
            Self::Bow => "A common bow...",
            Self::Helmet => "A common helmet...",
            Self::Plate => "Common plate...",
            Self::Boots => "Common boots...",
        }
    }

    const fn entity_kind(self) -> EntityKind {
        match self {
            Self::Sword | Self::Bow => EntityKind::Weapon,
            Self::Helmet | Self::Plate | Self::Boots => EntityKind::Armor,
        }
    }
}

/// Capability of items that can be worn in an equipment slot.
pub trait Equipable {
    /// Slot occupied when worn.
    fn location(&self) -> Location;
    /// Quality tier rolled at creation.
    fn rarity(&self) -> Rarity;
    /// Stats after rarity scaling.
    fn stats(&self) -> ItemStats;
    /// Whether the item is currently worn.
    fn is_equipped(&self) -> bool;
    /// Flags the item as worn or carried.
    fn set_equipped(&mut self, equipped: bool);
}

/// Capability of items that are used up when consumed.
pub trait Consumable {
    /// Size class that decides the amount healed.
    fn potion_size(&self) -> PotionSize;
}

/// Capability of fixtures that hold other items.
pub trait Openable {
    /// Nominal capacity.
    fn size(&self) -> usize;
    /// Items still inside.
    fn contents(&self) -> &[Item];
    /// Whether the fixture was opened.
    fn is_opened(&self) -> bool;
    /// Flags the fixture as opened and hands out everything inside.
    fn open(&mut self) -> Vec<Item>;
}

/// Weapon or armor piece.
#[derive(Clone, Debug, PartialEq)]
pub struct Gear {
    id: ItemId,
    entity: Entity,
    kind: GearKind,
    rarity: Rarity,
    equipped: bool,
    stats: ItemStats,
}

impl Gear {
    /// Template the gear was created from.
    #[must_use]
    pub const fn kind(&self) -> GearKind {
        self.kind
    }
}

impl Equipable for Gear {
    fn location(&self) -> Location {
        self.kind.location()
    }

    fn rarity(&self) -> Rarity {
        self.rarity
    }

    fn stats(&self) -> ItemStats {
        self.stats
    }

    fn is_equipped(&self) -> bool {
        self.equipped
    }

    fn set_equipped(&mut self, equipped: bool) {
        self.equipped = equipped;
    }
}

/// Healing potion.
#[derive(Clone, Debug, PartialEq)]
pub struct Potion {
    id: ItemId,
    entity: Entity,
    size: PotionSize,
}

impl Consumable for Potion {
    fn potion_size(&self) -> PotionSize {
        self.size
    }
}

/// Fixture that spills its contents when opened.
#[derive(Clone, Debug, PartialEq)]
pub struct TreasureChest {
    id: ItemId,
    entity: Entity,
    size: usize,
    contents: Vec<Item>,
    opened: bool,
}

impl Openable for TreasureChest {
    fn size(&self) -> usize {
        self.size
    }

    fn contents(&self) -> &[Item] {
        &self.contents
    }

    fn is_opened(&self) -> bool {
        self.opened
    }

    fn open(&mut self) -> Vec<Item> {
        self.opened = true;
        std::mem::take(&mut self.contents)
    }
}

/// Closed set of item variants.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    /// Hand-held weapon.
    Weapon(Gear),
    /// Worn armor.
    Armor(Gear),
    /// Healing potion.
    Potion(Potion),
    /// Treasure chest fixture.
    Chest(TreasureChest),
}

impl Item {
    /// Creates a weapon or armor piece with a fixed rarity.
    #[must_use]
    pub fn gear(id: ItemId, kind: GearKind, position: Position, rarity: Rarity) -> Self {
        let gear = Gear {
            id,
            entity: Entity::new(
                position,
                kind.glyph(),
                kind.entity_kind(),
                kind.name(),
                kind.description(),
            ),
            kind,
            rarity,
            equipped: false,
            stats: kind.base_stats().scaled(rarity),
        };
        match kind.entity_kind() {
            EntityKind::Weapon => Self::Weapon(gear),
            _ => Self::Armor(gear),
        }
    }

    /// Creates a healing potion.
    #[must_use]
    pub fn potion(id: ItemId, position: Position, size: PotionSize) -> Self {
        let description = format!("A {} health potion...", size.label().to_lowercase());
        Self::Potion(Potion {
            id,
            entity: Entity::new(position, 'p', EntityKind::Potion, "Potion", description),
            size,
        })
    }

    /// Creates a closed chest holding `contents`.
    #[must_use]
    pub fn chest(id: ItemId, position: Position, size: usize, contents: Vec<Item>) -> Self {
        Self::Chest(TreasureChest {
            id,
            entity: Entity::new(
                position,
                't',
                EntityKind::TreasureChest,
                "Treasure Chest",
                "A treasure chest...",
            ),
            size,
            contents,
            opened: false,
        })
    }

    /// World-unique identifier.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        match self {
            Self::Weapon(gear) | Self::Armor(gear) => gear.id,
            Self::Potion(potion) => potion.id,
            Self::Chest(chest) => chest.id,
        }
    }

    /// Positional identity.
    #[must_use]
    pub const fn entity(&self) -> &Entity {
        match self {
            Self::Weapon(gear) | Self::Armor(gear) => &gear.entity,
            Self::Potion(potion) => &potion.entity,
            Self::Chest(chest) => &chest.entity,
        }
    }

    fn entity_mut(&mut self) -> &mut Entity {
        match self {
            Self::Weapon(gear) | Self::Armor(gear) => &mut gear.entity,
            Self::Potion(potion) => &mut potion.entity,
            Self::Chest(chest) => &mut chest.entity,
        }
    }

    /// Tile the item lies on, or was last placed on.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.entity().position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.entity_mut().position = position;
    }

    /// Name used in log entries, including rarity or size.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Weapon(gear) | Self::Armor(gear) => {
                format!("{} {}", gear.rarity.label(), gear.entity.name())
            }
            Self::Potion(potion) => format!("{} {}", potion.size.label(), potion.entity.name()),
            Self::Chest(chest) => chest.entity.name().to_owned(),
        }
    }

    /// Whether the item can be moved into an inventory.
    #[must_use]
    pub const fn is_portable(&self) -> bool {
        !matches!(self, Self::Chest(_))
    }

    /// Equipment capability, if any.
    #[must_use]
    pub fn as_equipable(&self) -> Option<&dyn Equipable> {
        match self {
            Self::Weapon(gear) | Self::Armor(gear) => Some(gear),
            _ => None,
        }
    }

    /// Mutable equipment capability, if any.
    pub fn as_equipable_mut(&mut self) -> Option<&mut dyn Equipable> {
        match self {
            Self::Weapon(gear) | Self::Armor(gear) => Some(gear),
            _ => None,
        }
    }

    /// Consumable capability, if any.
    #[must_use]
    pub fn as_consumable(&self) -> Option<&dyn Consumable> {
        match self {
            Self::Potion(potion) => Some(potion),
            _ => None,
        }
    }

    /// Container capability, if any.
    #[must_use]
    pub fn as_openable(&self) -> Option<&dyn Openable> {
        match self {
            Self::Chest(chest) => Some(chest),
            _ => None,
        }
    }

    /// Mutable container capability, if any.
    pub fn as_openable_mut(&mut self) -> Option<&mut dyn Openable> {
        match self {
            Self::Chest(chest) => Some(chest),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rarity_gear_always_matches_scaled_base() {
        for rarity in [
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
        ] {
            for index in 0..10_000u32 {
                let kind = GearKind::ALL[index as usize % GearKind::ALL.len()];
                let item = Item::gear(ItemId::new(index), kind, Position::default(), rarity);
                let gear = item.as_equipable().expect("gear is equipable");
                assert_eq!(gear.stats(), kind.base_stats().scaled(rarity));
                assert_eq!(gear.rarity(), rarity);
            }
        }
    }

    #[test]
    fn legendary_sword_triples_damage() {
        let item = Item::gear(
            ItemId::new(1),
            GearKind::Sword,
            Position::new(2, 3),
            Rarity::Legendary,
        );

        assert!(matches!(item, Item::Weapon(_)));
        let stats = item.as_equipable().expect("sword").stats();
        assert_eq!((stats.min_damage, stats.max_damage), (15, 30));
        assert_eq!(item.display_name(), "Legendary Sword");
    }

    #[test]
    fn chests_are_fixtures_that_empty_once() {
        let potion = Item::potion(ItemId::new(2), Position::new(1, 1), PotionSize::Small);
        let mut chest = Item::chest(ItemId::new(3), Position::new(1, 1), 3, vec![potion]);

        assert!(!chest.is_portable());
        assert!(chest.as_equipable().is_none());

        let openable = chest.as_openable_mut().expect("chest is openable");
        let spilled = openable.open();
        assert_eq!(spilled.len(), 1);
        assert!(openable.is_opened());
        assert!(openable.contents().is_empty());
        assert_eq!(openable.size(), 3);
    }

    #[test]
    fn repositioning_moves_the_entity() {
        let mut item = Item::potion(ItemId::new(4), Position::new(0, 0), PotionSize::Large);
        item.set_position(Position::new(5, 6));

        assert_eq!(item.position(), Position::new(5, 6));
        assert_eq!(item.display_name(), "Large Potion");
        assert_eq!(item.entity().kind(), EntityKind::Potion);
    }
}
