//! Scrollable window onto the unbounded world.

use super::cells::Coord;

/// Inclusive world-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl Rect {
    pub fn contains(&self, (x, y): Coord) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

/// Offset plus the screen size captured at startup.
///
/// The offset is never clamped: there are no world edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    x_offset: i64,
    y_offset: i64,
    rows: u16,
    cols: u16,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            x_offset: 0,
            y_offset: 0,
            rows,
            cols,
        }
    }

    pub fn offset(&self) -> Coord {
        (self.x_offset, self.y_offset)
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Shift the window by `(dx, dy)` cells.
    pub fn translate(&mut self, dx: i64, dy: i64) {
        self.x_offset = self.x_offset.saturating_add(dx);
        self.y_offset = self.y_offset.saturating_add(dy);
    }

    /// World rectangle `[x_off, x_off+cols-1] x [y_off, y_off+rows-1]`,
    /// cut short at the edge of the coordinate range.
    pub fn visible_rect(&self) -> Rect {
        Rect {
            x_min: self.x_offset,
            y_min: self.y_offset,
            x_max: self.x_offset.saturating_add(i64::from(self.cols) - 1),
            y_max: self.y_offset.saturating_add(i64::from(self.rows) - 1),
        }
    }

    /// Screen `(col, row)` of a world coordinate, if it is on screen.
    pub fn to_screen(&self, coord: Coord) -> Option<(u16, u16)> {
        let rect = self.visible_rect();
        if !rect.contains(coord) {
            return None;
        }
        let col = (coord.0 - rect.x_min) as u16;
        let row = (coord.1 - rect.y_min) as u16;
        Some((col, row))
    }

    /// World coordinate under a screen position.
    pub fn to_world(&self, col: u16, row: u16) -> Coord {
        (
            self.x_offset.saturating_add(i64::from(col)),
            self.y_offset.saturating_add(i64::from(row)),
        )
    }
}
