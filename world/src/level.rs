//! Level grids with their monsters, items, portals and event log.

use std::collections::HashMap;

use crawl_core::{Actor, LastEvent, Position};

use crate::{character::Monster, item::Item, tile::Tile};

/// Number of entries kept by the circular event log.
pub const EVENT_LOG_CAPACITY: usize = 15;

/// Fixed-size ring of human readable log entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventLog {
    entries: Vec<String>,
    cursor: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            entries: vec![String::new(); EVENT_LOG_CAPACITY],
            cursor: 0,
        }
    }
}

impl EventLog {
    /// Raw slots; empty strings mark slots never written.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Slot the next entry will overwrite.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Written entries from oldest to newest.
    pub fn chronological(&self) -> impl Iterator<Item = &str> {
        let (newer, older) = self.entries.split_at(self.cursor);
        older
            .iter()
            .chain(newer.iter())
            .map(String::as_str)
            .filter(|entry| !entry.is_empty())
    }

    pub(crate) fn push(&mut self, entry: String) {
        if let Some(slot) = self.entries.get_mut(self.cursor) {
            *slot = entry;
        }
        self.cursor = (self.cursor + 1) % EVENT_LOG_CAPACITY;
    }
}

/// Destination of a portal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Portal {
    level: String,
    position: Position,
}

impl Portal {
    pub(crate) fn new(level: String, position: Position) -> Self {
        Self { level, position }
    }

    /// Name of the level the portal leads to.
    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Arrival tile in the destination level.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }
}

/// Snapshot of the most recent attack, consumed by renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LastAttack {
    /// Health removed from the defender.
    pub damage: i32,
    /// Whether the critical roll succeeded.
    pub critical: bool,
    /// Character that received the blow.
    pub defender: Actor,
}

/// One dungeon floor.
#[derive(Clone, Debug)]
pub struct Level {
    name: String,
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    monsters: HashMap<Position, Monster>,
    items: HashMap<Position, Vec<Item>>,
    portals: HashMap<Position, Portal>,
    events: EventLog,
    last_event: Option<LastEvent>,
    last_attack: Option<LastAttack>,
}

impl Level {
    pub(crate) fn new(name: String, width: u32, height: u32, tiles: Vec<Tile>) -> Self {
        Self {
            name,
            width,
            height,
            tiles,
            monsters: HashMap::new(),
            items: HashMap::new(),
            portals: HashMap::new(),
            events: EventLog::default(),
            last_event: None,
            last_attack: None,
        }
    }

    /// Level name, taken from the map file stem.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Tile at `position`, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.index(position).and_then(|index| self.tiles.get(index))
    }

    pub(crate) fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        self.index(position).and_then(|index| self.tiles.get_mut(index))
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Row-major iterator over every tile and its position.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> {
        let width = self.width.max(1) as usize;
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let x = i32::try_from(index % width).unwrap_or(i32::MAX);
            let y = i32::try_from(index / width).unwrap_or(i32::MAX);
            (Position::new(x, y), tile)
        })
    }

    /// Whether the tile exists and is walkable.
    #[must_use]
    pub fn is_walkable(&self, position: Position) -> bool {
        self.tile(position).is_some_and(Tile::is_walkable)
    }

    /// Whether a character could step onto the tile right now.
    #[must_use]
    pub fn can_walk(&self, position: Position) -> bool {
        self.is_walkable(position) && !self.monsters.contains_key(&position)
    }

    /// Monster standing on `position`.
    #[must_use]
    pub fn monster_at(&self, position: Position) -> Option<&Monster> {
        self.monsters.get(&position)
    }

    /// Every monster keyed by its tile.
    #[must_use]
    pub fn monsters(&self) -> &HashMap<Position, Monster> {
        &self.monsters
    }

    pub(crate) fn monsters_mut(&mut self) -> &mut HashMap<Position, Monster> {
        &mut self.monsters
    }

    /// Item stack lying on `position`, oldest first.
    #[must_use]
    pub fn items_at(&self, position: Position) -> &[Item] {
        self.items.get(&position).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every non-empty item stack keyed by its tile.
    #[must_use]
    pub fn items(&self) -> &HashMap<Position, Vec<Item>> {
        &self.items
    }

    pub(crate) fn stack_mut(&mut self, position: Position) -> &mut Vec<Item> {
        self.items.entry(position).or_default()
    }

    pub(crate) fn take_from_stack(&mut self, position: Position, index: usize) -> Option<Item> {
        let stack = self.items.get_mut(&position)?;
        if index >= stack.len() {
            return None;
        }
        let item = stack.remove(index);
        if stack.is_empty() {
            let _ = self.items.remove(&position);
        }
        Some(item)
    }

    /// Portal leaving from `position`.
    #[must_use]
    pub fn portal_at(&self, position: Position) -> Option<&Portal> {
        self.portals.get(&position)
    }

    pub(crate) fn add_portal(&mut self, position: Position, portal: Portal) {
        let _ = self.portals.insert(position, portal);
    }

    /// Recent human readable log entries.
    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    pub(crate) fn record(&mut self, entry: String) {
        self.events.push(entry);
    }

    pub(crate) fn adopt_events(&mut self, events: EventLog) {
        self.events = events;
    }

    /// Tag of the most recent mutation.
    #[must_use]
    pub const fn last_event(&self) -> Option<LastEvent> {
        self.last_event
    }

    pub(crate) fn set_last_event(&mut self, event: LastEvent) {
        self.last_event = Some(event);
    }

    /// Outcome of the most recent attack.
    #[must_use]
    pub const fn last_attack(&self) -> Option<LastAttack> {
        self.last_attack
    }

    pub(crate) fn set_last_attack(&mut self, attack: LastAttack) {
        self.last_attack = Some(attack);
    }

    fn index(&self, position: Position) -> Option<usize> {
        let column = u32::try_from(position.x()).ok()?;
        let row = u32::try_from(position.y()).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        Some(usize::try_from(row).ok()? * width + usize::try_from(column).ok()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Terrain;

    #[test]
    fn event_log_wraps_and_keeps_the_newest_entries() {
        let mut log = EventLog::default();
        for index in 0..20 {
            log.push(format!("entry {index}"));
        }

        assert_eq!(log.cursor(), 5);
        let entries: Vec<&str> = log.chronological().collect();
        assert_eq!(entries.len(), EVENT_LOG_CAPACITY);
        assert_eq!(entries.first(), Some(&"entry 5"));
        assert_eq!(entries.last(), Some(&"entry 19"));
    }

    #[test]
    fn partially_filled_log_skips_empty_slots() {
        let mut log = EventLog::default();
        log.push("first".to_owned());
        log.push("second".to_owned());

        assert_eq!(log.chronological().collect::<Vec<_>>(), vec!["first", "second"]);
    }

    #[test]
    fn out_of_grid_positions_have_no_tile() {
        let level = Level::new(
            "test".to_owned(),
            2,
            2,
            vec![Tile::new(Terrain::Floor, true); 4],
        );

        assert!(level.tile(Position::new(1, 1)).is_some());
        assert!(level.tile(Position::new(2, 0)).is_none());
        assert!(level.tile(Position::new(-1, 0)).is_none());
        assert!(!level.can_walk(Position::new(0, 5)));
        assert!(level.can_walk(Position::new(0, 1)));
    }
}
