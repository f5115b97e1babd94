//! Grid tiles and the symbols layered on them.

/// Background symbol of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terrain {
    /// Empty space outside the dungeon.
    Blank,
    /// Solid stone wall.
    Wall,
    /// Dirt floor.
    Floor,
    /// Background not yet inferred from the surrounding floor.
    Pending,
}

impl Terrain {
    /// Map glyph used to draw the terrain.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Blank | Self::Pending => ' ',
            Self::Wall => '#',
            Self::Floor => '.',
        }
    }

    /// Reports whether the terrain is a definite floor background.
    #[must_use]
    pub const fn is_floor(self) -> bool {
        matches!(self, Self::Floor)
    }
}

/// Fixture drawn on top of the terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Overlay {
    /// Door that blocks movement and sight.
    ClosedDoor,
    /// Door that can be walked through.
    OpenDoor,
    /// Stairs leading down.
    DownStair,
    /// Stairs leading up.
    UpStair,
}

impl Overlay {
    /// Map glyph used to draw the overlay.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::ClosedDoor => '|',
            Self::OpenDoor => '/',
            Self::DownStair => 'd',
            Self::UpStair => 'u',
        }
    }
}

/// Transient animation symbol attached to a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Animation {
    /// Marks the entry tile of a portal.
    Portal,
}

impl Animation {
    /// Glyph drawn over the tile while the animation runs.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Portal => '*',
        }
    }
}

/// Single cell of a level grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    terrain: Terrain,
    overlay: Option<Overlay>,
    animation: Option<Animation>,
    visible: bool,
    seen: bool,
    walkable: bool,
    actionable: bool,
}

impl Tile {
    /// Creates an unexplored tile without overlay.
    #[must_use]
    pub const fn new(terrain: Terrain, walkable: bool) -> Self {
        Self {
            terrain,
            overlay: None,
            animation: None,
            visible: false,
            seen: false,
            walkable,
            actionable: false,
        }
    }

    /// Blank tile used to pad short rows.
    #[must_use]
    pub const fn blank() -> Self {
        Self::new(Terrain::Blank, false)
    }

    /// Background symbol.
    #[must_use]
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Door or stair symbol drawn on top of the terrain.
    #[must_use]
    pub const fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    /// Animation symbol, if any.
    #[must_use]
    pub const fn animation(&self) -> Option<Animation> {
        self.animation
    }

    /// Whether the tile lies in the player's current field of view.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the tile was ever in the player's field of view.
    #[must_use]
    pub const fn is_seen(&self) -> bool {
        self.seen
    }

    /// Whether characters may enter the tile.
    #[must_use]
    pub const fn is_walkable(&self) -> bool {
        self.walkable
    }

    /// Whether the tile holds a door or an unopened chest.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        self.actionable
    }

    pub(crate) fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub(crate) fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = terrain;
    }

    pub(crate) fn set_overlay(&mut self, overlay: Overlay) {
        self.overlay = Some(overlay);
    }

    pub(crate) fn set_animation(&mut self, animation: Animation) {
        self.animation = Some(animation);
    }

    pub(crate) fn set_walkable(&mut self, walkable: bool) {
        self.walkable = walkable;
    }

    pub(crate) fn set_actionable(&mut self, actionable: bool) {
        self.actionable = actionable;
    }

    pub(crate) fn reveal(&mut self) {
        self.visible = true;
        self.seen = true;
    }

    pub(crate) fn hide(&mut self) {
        self.visible = false;
    }
}
