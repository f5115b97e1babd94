#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Field-of-view system that casts integer rays from the player.
//!
//! Every cell within the sight radius receives a Bresenham ray. Rays reveal
//! each tile they cross and stop right after the first opaque tile, so walls
//! are visible while whatever lies behind them along that ray stays dark.

use crawl_core::Position;

/// Ray caster that reuses its scratch buffers between passes.
#[derive(Debug, Default)]
pub struct Visibility {
    revealed: Vec<Position>,
    marked: Vec<bool>,
}

impl Visibility {
    /// Creates a new visibility system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes every tile revealed from `origin` within `sight_range`.
    ///
    /// The returned slice lists each revealed tile once, in the order rays
    /// first reached it. `is_transparent` is only queried for in-grid tiles.
    pub fn compute<F>(
        &mut self,
        origin: Position,
        sight_range: u32,
        columns: u32,
        rows: u32,
        mut is_transparent: F,
    ) -> &[Position]
    where
        F: FnMut(Position) -> bool,
    {
        self.revealed.clear();
        self.marked.clear();

        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        if cell_count == 0 {
            return &self.revealed;
        }
        self.marked.resize(cell_count, false);

        let range = sight_range.min(columns.saturating_add(rows));
        let range = i32::try_from(range).unwrap_or(i32::MAX);
        let limit = f64::from(range);

        for y in origin.y() - range..=origin.y() + range {
            for x in origin.x() - range..=origin.x() + range {
                let dx = origin.x() - x;
                let dy = origin.y() - y;
                let distance = f64::from(dx * dx + dy * dy).sqrt();
                if distance <= limit {
                    self.cast(
                        origin,
                        Position::new(x, y),
                        columns,
                        rows,
                        &mut is_transparent,
                    );
                }
            }
        }

        &self.revealed
    }

    /// Walks a Bresenham line from `start` toward `end`, excluding `end`.
    fn cast<F>(&mut self, start: Position, end: Position, columns: u32, rows: u32, is_transparent: &mut F)
    where
        F: FnMut(Position) -> bool,
    {
        let (mut start_x, mut start_y) = (start.x(), start.y());
        let (mut end_x, mut end_y) = (end.x(), end.y());

        let steep = (end_y - start_y).abs() > (end_x - start_x).abs();
        if steep {
            std::mem::swap(&mut start_x, &mut start_y);
            std::mem::swap(&mut end_x, &mut end_y);
        }

        let delta_x = (end_x - start_x).abs();
        let delta_y = (end_y - start_y).abs();
        let x_step = if start_x > end_x { -1 } else { 1 };
        let y_step = if start_y >= end_y { -1 } else { 1 };

        let mut error = 0;
        let mut x = start_x;
        let mut y = start_y;
        while x != end_x {
            let position = if steep {
                Position::new(y, x)
            } else {
                Position::new(x, y)
            };

            if !self.reveal(position, columns, rows) {
                return;
            }
            if !is_transparent(position) {
                return;
            }

            error += delta_y;
            if 2 * error >= delta_x {
                y += y_step;
                error -= delta_x;
            }
            x += x_step;
        }
    }

    fn reveal(&mut self, position: Position, columns: u32, rows: u32) -> bool {
        let Some(index) = index(position, columns, rows) else {
            return false;
        };
        if !self.marked[index] {
            self.marked[index] = true;
            self.revealed.push(position);
        }
        true
    }
}

fn index(position: Position, columns: u32, rows: u32) -> Option<usize> {
    let column = u32::try_from(position.x()).ok()?;
    let row = u32::try_from(position.y()).ok()?;
    if column >= columns || row >= rows {
        return None;
    }
    let width = usize::try_from(columns).ok()?;
    usize::try_from(row)
        .ok()?
        .checked_mul(width)?
        .checked_add(usize::try_from(column).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Grid {
        columns: u32,
        rows: u32,
        opaque: Vec<Position>,
    }

    impl Grid {
        fn parse(rows: &[&str]) -> Self {
            let mut opaque = Vec::new();
            for (y, row) in rows.iter().enumerate() {
                for (x, glyph) in row.chars().enumerate() {
                    if glyph == '#' {
                        opaque.push(Position::new(x as i32, y as i32));
                    }
                }
            }
            Self {
                columns: rows[0].len() as u32,
                rows: rows.len() as u32,
                opaque,
            }
        }

        fn reveal(&self, origin: Position, range: u32) -> Vec<Position> {
            let mut visibility = Visibility::new();
            visibility
                .compute(origin, range, self.columns, self.rows, |position| {
                    !self.opaque.contains(&position)
                })
                .to_vec()
        }
    }

    #[test]
    fn wall_blocks_tiles_directly_behind_it() {
        let grid = Grid::parse(&["#########", "#..#....#", "#########"]);
        let revealed = grid.reveal(Position::new(2, 1), 6);

        assert!(revealed.contains(&Position::new(2, 1)));
        assert!(revealed.contains(&Position::new(3, 1)), "wall must be revealed");
        assert!(!revealed.contains(&Position::new(4, 1)));
        assert!(!revealed.contains(&Position::new(5, 1)));
    }

    #[test]
    fn open_room_reveals_interior_within_range() {
        let grid = Grid::parse(&[
            "#######", "#.....#", "#.....#", "#.....#", "#.....#", "#.....#", "#######",
        ]);
        let revealed = grid.reveal(Position::new(3, 3), 6);

        for y in 0..7 {
            for x in 0..7 {
                assert!(
                    revealed.contains(&Position::new(x, y)),
                    "({x}, {y}) should be visible"
                );
            }
        }
    }

    #[test]
    fn ray_endpoints_at_the_edge_of_range_stay_dark() {
        let grid = Grid::parse(&["...........", "...........", "..........."]);
        let revealed = grid.reveal(Position::new(5, 1), 2);

        assert!(revealed.contains(&Position::new(6, 1)));
        assert!(!revealed.contains(&Position::new(7, 1)));
        assert!(!revealed.contains(&Position::new(8, 1)));
    }

    #[test]
    fn rays_stop_at_grid_boundary() {
        let grid = Grid::parse(&["...", "...", "..."]);
        let revealed = grid.reveal(Position::new(0, 0), 5);

        assert!(revealed
            .iter()
            .all(|position| position.x() >= 0 && position.y() >= 0));
        assert!(revealed.iter().all(|position| position.x() < 3 && position.y() < 3));
    }

    #[test]
    fn each_tile_is_reported_once() {
        let grid = Grid::parse(&[".....", ".....", "....."]);
        let revealed = grid.reveal(Position::new(2, 1), 3);
        let mut sorted = revealed.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), revealed.len());
    }

    #[test]
    fn empty_grid_reveals_nothing() {
        let mut visibility = Visibility::new();
        assert!(visibility
            .compute(Position::new(0, 0), 4, 0, 0, |_| true)
            .is_empty());
    }
}
