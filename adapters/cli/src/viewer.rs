//! Plain-text viewer that prints every snapshot to a writer.

use std::{
    fmt::Write as _,
    io::Write,
    sync::{mpsc::Receiver, Arc},
};

use anyhow::{Context, Result as AnyResult};
use crawl_core::{LastEvent, Position};
use crawl_session::Viewer;
use crawl_world::{level::Level, query::Snapshot, tile::Tile};

/// Viewer writing ASCII frames to `out`.
#[derive(Debug)]
pub(crate) struct TerminalViewer<W> {
    out: W,
}

impl<W: Write> TerminalViewer<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Viewer for TerminalViewer<W> {
    fn run(mut self, snapshots: Receiver<Arc<Snapshot>>) -> AnyResult<()> {
        for snapshot in snapshots {
            self.out
                .write_all(render(&snapshot).as_bytes())
                .context("failed to write frame")?;
            self.out.flush().context("failed to flush frame")?;
        }
        Ok(())
    }
}

/// Draws the map, the player's status and the recent log.
pub(crate) fn render(snapshot: &Snapshot) -> String {
    let level = &snapshot.level;
    let character = snapshot.player.character();
    let mut frame = String::new();

    let _ = writeln!(
        frame,
        "== {} | turn {} | difficulty {} ==",
        snapshot.level_name,
        snapshot.turn,
        snapshot.difficulty.get()
    );
    for y in 0..level.height() {
        let row: String = (0..level.width())
            .map(|x| {
                let position = Position::new(x as i32, y as i32);
                if position == character.position() {
                    '@'
                } else {
                    glyph(level, position)
                }
            })
            .collect();
        let _ = writeln!(frame, "{}", row.trim_end());
    }

    let stats = character.stats();
    let _ = writeln!(
        frame,
        "HP {}/{}  damage {}-{}  armor {}  crit {:.0}%",
        character.health(),
        character.max_health(),
        stats.min_damage,
        stats.max_damage,
        stats.armor,
        stats.critical_chance
    );
    if let (Some(LastEvent::Attack), Some(attack)) = (level.last_event(), level.last_attack()) {
        let critical = if attack.critical { " (critical)" } else { "" };
        let _ = writeln!(frame, "last hit: {}{critical}", attack.damage);
    }

    for item in character.equipped() {
        let _ = writeln!(frame, "  #{} {} (worn)", item.id().get(), item.display_name());
    }
    for item in character.inventory() {
        let _ = writeln!(frame, "  #{} {}", item.id().get(), item.display_name());
    }
    let here = level.items_at(character.position());
    if !here.is_empty() {
        let listed: Vec<String> = here
            .iter()
            .map(|item| format!("#{} {}", item.id().get(), item.display_name()))
            .collect();
        let _ = writeln!(frame, "here: {}", listed.join(", "));
    }

    for entry in level.events().chronological() {
        let _ = writeln!(frame, "> {entry}");
    }
    frame
}

fn glyph(level: &Level, position: Position) -> char {
    let Some(tile) = level.tile(position) else {
        return ' ';
    };
    if tile.is_visible() {
        if let Some(monster) = level.monster_at(position) {
            return monster.character().entity().symbol();
        }
        if let Some(item) = level.items_at(position).last() {
            return item.entity().symbol();
        }
        if let Some(animation) = tile.animation() {
            return animation.glyph();
        }
        return background(tile);
    }
    if tile.is_seen() {
        return background(tile);
    }
    ' '
}

fn background(tile: &Tile) -> char {
    tile.overlay()
        .map_or_else(|| tile.terrain().glyph(), |overlay| overlay.glyph())
}
