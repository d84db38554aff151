//! Frame renderer
//!
//! Every frame is a full repaint: cull the active set against the visible
//! rectangle, write the grid row by row, then overlay the two-line status
//! header on top of the first grid rows.

use tracing::trace;
use unicode_width::UnicodeWidthChar;

use crate::core::cells::ActiveCellSet;
use crate::core::viewport::{Rect, Viewport};
use crate::error::Result;
use crate::ui::terminal::Terminal;

/// Rows covered by the status header
pub const STATUS_ROWS: u16 = 2;

/// Default glyph for an active cell
pub const DEFAULT_MARKER: char = '#';

const BLANK: char = ' ';

/// One screen worth of characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    cols: u16,
    rows: u16,
    cells: Vec<char>,
}

impl Frame {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![BLANK; cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    #[inline]
    fn idx(&self, col: u16, row: u16) -> Option<usize> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    pub fn get(&self, col: u16, row: u16) -> Option<char> {
        self.idx(col, row).map(|i| self.cells[i])
    }

    pub fn set(&mut self, col: u16, row: u16, ch: char) {
        if let Some(i) = self.idx(col, row) {
            self.cells[i] = ch;
        }
    }

    pub fn row(&self, row: u16) -> String {
        match self.idx(0, row) {
            Some(start) => self.cells[start..start + self.cols as usize].iter().collect(),
            None => String::new(),
        }
    }

    /// Number of non-blank cells
    pub fn marked(&self) -> usize {
        self.cells.iter().filter(|&&ch| ch != BLANK).count()
    }
}

/// Cull `cells` to the viewport and mark the survivors in a fresh frame.
pub fn build_frame(cells: &ActiveCellSet, viewport: &Viewport, marker: char) -> Frame {
    let rect = viewport.visible_rect();
    let mut frame = Frame::new(viewport.cols(), viewport.rows());
    for (x, y) in cells.iter() {
        if rect.contains((x, y)) {
            frame.set((x - rect.x_min) as u16, (y - rect.y_min) as u16, marker);
        }
    }
    frame
}

/// The two header lines for the given visible rectangle
pub fn status_lines(rect: &Rect) -> [String; 2] {
    [
        format!(
            "Press q to exit, +/- to change speed.      x-range: [{}, {}] ",
            rect.x_min, rect.x_max
        ),
        format!(
            "Press p to (un)pause, = for default speed. y-range: [{}, {}] ",
            rect.y_min, rect.y_max
        ),
    ]
}

/// Longest prefix of `text` that fits in `cols` display columns
pub fn fit_width(text: &str, cols: u16) -> &str {
    let mut width = 0usize;
    for (idx, ch) in text.char_indices() {
        width += ch.width().unwrap_or(0);
        if width > cols as usize {
            return &text[..idx];
        }
    }
    text
}

/// Draws frames onto a terminal
pub struct Renderer {
    marker: char,
    frames: u64,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl Renderer {
    pub fn new(marker: char) -> Self {
        Self { marker, frames: 0 }
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    /// Frames drawn so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Render one full frame and flush it.
    pub fn draw<T: Terminal + ?Sized>(
        &mut self,
        term: &mut T,
        cells: &ActiveCellSet,
        viewport: &Viewport,
    ) -> Result<()> {
        let frame = build_frame(cells, viewport, self.marker);
        let last = frame.rows().saturating_sub(1);

        for y in 0..last {
            term.put_line(y, &frame.row(y))?;
        }
        term.insert_line(last, &frame.row(last))?;

        let header = status_lines(&viewport.visible_rect());
        for (y, line) in (0..STATUS_ROWS.min(last)).zip(header.iter()) {
            term.put_line(y, fit_width(line, frame.cols()))?;
        }

        term.flush()?;
        self.frames += 1;
        trace!("frame {} drawn, {} cells visible", self.frames, frame.marked());
        Ok(())
    }
}
