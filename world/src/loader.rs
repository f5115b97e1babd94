//! Map and world-file parsing into immutable blueprints.
//!
//! Every `*.map` file in the maps directory describes one level named after
//! its file stem. The `world.txt` file names the starting level on its first
//! row and lists one portal per following row as
//! `level, x, y, target_level, target_x, target_y`.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use crawl_core::{MonsterKind, Position};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    item::GearKind,
    pending::BackgroundResolver,
    tile::{Animation, Overlay, Terrain, Tile},
};

/// Name of the file linking levels together.
pub const WORLD_FILE: &str = "world.txt";

/// Extension of level files.
pub const MAP_EXTENSION: &str = "map";

/// Fatal problems encountered while loading a world.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A map or world file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File or directory that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The maps directory holds no level files.
    #[error("no *.map level files found in {}", .0.display())]
    NoLevels(PathBuf),
    /// A level file contains a character with no meaning.
    #[error("invalid character {glyph:?} in level {level} at ({x}, {y})")]
    UnknownGlyph {
        /// Level containing the glyph.
        level: String,
        /// Offending character.
        glyph: char,
        /// Column of the glyph.
        x: usize,
        /// Row of the glyph.
        y: usize,
    },
    /// The world file has no starting level row.
    #[error("world file is empty")]
    EmptyWorldFile,
    /// The world file names a level without a matching map file.
    #[error("couldn't find level {0:?} referenced by the world file")]
    UnknownLevel(String),
    /// A portal row cannot be parsed.
    #[error("malformed world file line {line}: {reason}")]
    MalformedRow {
        /// One-based line number.
        line: usize,
        /// What is wrong with the row.
        reason: String,
    },
    /// The starting level has no `@` glyph.
    #[error("starting level {0:?} has no player start")]
    MissingPlayerStart(String),
}

/// What a map glyph places on its tile besides terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnKind {
    /// A monster of the given kind.
    Monster(MonsterKind),
    /// A weapon or armor piece with a rolled rarity.
    Gear(GearKind),
    /// A small healing potion.
    Potion,
    /// A treasure chest of the default map size.
    Chest,
}

/// Object placed on a tile when a level is instantiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spawn {
    /// Tile receiving the object.
    pub position: Position,
    /// Object to create.
    pub kind: SpawnKind,
}

/// Parsed, immutable description of one level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelBlueprint {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    spawns: Vec<Spawn>,
    player_start: Option<Position>,
}

impl LevelBlueprint {
    /// Number of columns, the length of the widest row.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major tiles with every pending background resolved.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Objects placed by map glyphs, in reading order.
    #[must_use]
    pub fn spawns(&self) -> &[Spawn] {
        &self.spawns
    }

    /// Tile of the `@` glyph, if the level has one.
    #[must_use]
    pub const fn player_start(&self) -> Option<Position> {
        self.player_start
    }
}

/// Directed link from a tile in one level to a tile in another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortalLink {
    /// Level holding the entry tile.
    pub level: String,
    /// Entry tile.
    pub position: Position,
    /// Destination level.
    pub target_level: String,
    /// Arrival tile.
    pub target_position: Position,
}

/// Fully validated world description used to (re)build levels.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldBlueprint {
    levels: BTreeMap<String, LevelBlueprint>,
    start_level: String,
    player_start: Position,
    links: Vec<PortalLink>,
}

impl WorldBlueprint {
    /// Every level keyed by name.
    #[must_use]
    pub fn levels(&self) -> &BTreeMap<String, LevelBlueprint> {
        &self.levels
    }

    /// Level the player starts in.
    #[must_use]
    pub fn start_level(&self) -> &str {
        &self.start_level
    }

    /// Tile the player starts on.
    #[must_use]
    pub const fn player_start(&self) -> Position {
        self.player_start
    }

    /// Portal links in world-file order.
    #[must_use]
    pub fn links(&self) -> &[PortalLink] {
        &self.links
    }
}

/// Raw text of every map file plus the world file.
#[derive(Clone, Debug, Default)]
pub struct WorldSource {
    maps: Vec<(String, String)>,
    links: String,
}

impl WorldSource {
    /// Reads every `*.map` file and the world file from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error(dir))? {
            let path = entry.map_err(io_error(dir))?.path();
            if path.extension().and_then(|extension| extension.to_str()) == Some(MAP_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut maps = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let text = fs::read_to_string(&path).map_err(io_error(&path))?;
            debug!(level = name, path = %path.display(), "read level file");
            maps.push((name.to_owned(), text));
        }
        if maps.is_empty() {
            return Err(LoadError::NoLevels(dir.to_path_buf()));
        }

        let world_path = dir.join(WORLD_FILE);
        let links = fs::read_to_string(&world_path).map_err(io_error(&world_path))?;

        Ok(Self { maps, links })
    }

    /// Builds a source from in-memory level texts and world-file text.
    #[must_use]
    pub fn from_parts<I, N, T>(maps: I, links: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: Into<String>,
    {
        Self {
            maps: maps
                .into_iter()
                .map(|(name, text)| (name.into(), text.into()))
                .collect(),
            links: links.into(),
        }
    }

    /// Parses and validates every level and portal.
    pub fn parse(&self) -> Result<WorldBlueprint, LoadError> {
        if self.maps.is_empty() {
            return Err(LoadError::NoLevels(PathBuf::new()));
        }

        let mut levels = BTreeMap::new();
        for (name, text) in &self.maps {
            let _ = levels.insert(name.clone(), parse_level(name, text)?);
        }

        let (start_level, links) = parse_world_file(&self.links)?;
        let start = levels
            .get(&start_level)
            .ok_or_else(|| LoadError::UnknownLevel(start_level.clone()))?;
        let player_start = start
            .player_start
            .ok_or_else(|| LoadError::MissingPlayerStart(start_level.clone()))?;

        for link in &links {
            if !levels.contains_key(&link.target_level) {
                return Err(LoadError::UnknownLevel(link.target_level.clone()));
            }
            let Some(level) = levels.get_mut(&link.level) else {
                return Err(LoadError::UnknownLevel(link.level.clone()));
            };
            if let Some(index) = index(level.width, level.height, link.position) {
                level.tiles[index].set_animation(Animation::Portal);
            }
        }

        info!(
            levels = levels.len(),
            portals = links.len(),
            start = %start_level,
            "parsed world"
        );

        Ok(WorldBlueprint {
            levels,
            start_level,
            player_start,
            links,
        })
    }
}

fn parse_level(name: &str, text: &str) -> Result<LevelBlueprint, LoadError> {
    let rows: Vec<Vec<char>> = text.lines().map(|line| line.chars().collect()).collect();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let height = rows.len();

    let mut tiles = vec![Tile::blank(); width * height];
    let mut spawns = Vec::new();
    let mut player_start = None;

    for (y, row) in rows.iter().enumerate() {
        for (x, &glyph) in row.iter().enumerate() {
            let position = Position::new(coordinate(x), coordinate(y));
            let pending = Tile::new(Terrain::Pending, true);
            let mut spawn = |kind| spawns.push(Spawn { position, kind });

            let tile = match glyph {
                ' ' | '\t' | '\r' => Tile::blank(),
                '#' => Tile::new(Terrain::Wall, false),
                '.' => Tile::new(Terrain::Floor, true),
                '|' => {
                    let mut tile = Tile::new(Terrain::Pending, false).with_overlay(Overlay::ClosedDoor);
                    tile.set_actionable(true);
                    tile
                }
                '/' => {
                    let mut tile = pending.with_overlay(Overlay::OpenDoor);
                    tile.set_actionable(true);
                    tile
                }
                'd' => pending.with_overlay(Overlay::DownStair),
                'u' => pending.with_overlay(Overlay::UpStair),
                't' => {
                    spawn(SpawnKind::Chest);
                    let mut tile = Tile::new(Terrain::Pending, false);
                    tile.set_actionable(true);
                    tile
                }
                'p' => {
                    spawn(SpawnKind::Potion);
                    pending
                }
                '@' => {
                    player_start = Some(position);
                    pending
                }
                other => {
                    if let Some(kind) = MonsterKind::from_glyph(other) {
                        spawn(SpawnKind::Monster(kind));
                    } else if let Some(kind) = gear_for_glyph(other) {
                        spawn(SpawnKind::Gear(kind));
                    } else {
                        return Err(LoadError::UnknownGlyph {
                            level: name.to_owned(),
                            glyph: other,
                            x,
                            y,
                        });
                    }
                    pending
                }
            };
            tiles[y * width + x] = tile;
        }
    }

    let width = u32::try_from(width).unwrap_or(u32::MAX);
    let height = u32::try_from(height).unwrap_or(u32::MAX);
    resolve_pending(&mut tiles, width, height, &spawns);

    debug!(
        level = name,
        width,
        height,
        spawns = spawns.len(),
        "parsed level"
    );

    Ok(LevelBlueprint {
        width,
        height,
        tiles,
        spawns,
        player_start,
    })
}

fn gear_for_glyph(glyph: char) -> Option<GearKind> {
    match glyph {
        's' => Some(GearKind::Sword),
        'h' => Some(GearKind::Helmet),
        'a' => Some(GearKind::Plate),
        'b' => Some(GearKind::Boots),
        _ => None,
    }
}

fn resolve_pending(tiles: &mut [Tile], width: u32, height: u32, spawns: &[Spawn]) {
    let monsters: HashSet<Position> = spawns
        .iter()
        .filter(|spawn| matches!(spawn.kind, SpawnKind::Monster(_)))
        .map(|spawn| spawn.position)
        .collect();

    let mut resolver = BackgroundResolver::default();
    let mut resolved = Vec::new();
    {
        let tiles: &[Tile] = tiles;
        let tile_at = |position: Position| {
            index(width, height, position).and_then(|index| tiles.get(index))
        };
        for (index, tile) in tiles.iter().enumerate() {
            if tile.terrain() != Terrain::Pending {
                continue;
            }
            let position = position_of(index, width);
            let terrain = resolver.resolve(
                position,
                |next| tile_at(next).map(Tile::terrain),
                |next| tile_at(next).is_some_and(Tile::is_walkable) && !monsters.contains(&next),
            );
            resolved.push((index, terrain));
        }
    }

    for (index, terrain) in resolved {
        tiles[index].set_terrain(terrain);
    }
}

fn parse_world_file(text: &str) -> Result<(String, Vec<PortalLink>), LoadError> {
    let mut rows = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, first) = rows.next().ok_or(LoadError::EmptyWorldFile)?;
    let start_level = first.split(',').next().unwrap_or_default().trim().to_owned();
    if start_level.is_empty() {
        return Err(LoadError::EmptyWorldFile);
    }

    let mut links = Vec::new();
    for (line_index, row) in rows {
        let line = line_index + 1;
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        if fields.len() < 6 {
            return Err(LoadError::MalformedRow {
                line,
                reason: format!("expected 6 fields, found {}", fields.len()),
            });
        }
        let number = |field: &str| {
            field.parse::<i32>().map_err(|error| LoadError::MalformedRow {
                line,
                reason: format!("{field:?} is not a coordinate: {error}"),
            })
        };
        links.push(PortalLink {
            level: fields[0].to_owned(),
            position: Position::new(number(fields[1])?, number(fields[2])?),
            target_level: fields[3].to_owned(),
            target_position: Position::new(number(fields[4])?, number(fields[5])?),
        });
    }

    Ok((start_level, links))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> LoadError {
    let path = path.to_path_buf();
    move |source| LoadError::Io { path, source }
}

fn coordinate(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn position_of(index: usize, width: u32) -> Position {
    let width = width.max(1) as usize;
    Position::new(coordinate(index % width), coordinate(index / width))
}

fn index(width: u32, height: u32, position: Position) -> Option<usize> {
    let column = u32::try_from(position.x()).ok()?;
    let row = u32::try_from(position.y()).ok()?;
    if column >= width || row >= height {
        return None;
    }
    Some(row as usize * width as usize + column as usize)
}
