//! Terminal backends
//!
//! The viewer only talks to a [`Terminal`]: line writes, a flush and a
//! non-blocking input poll. `CrosstermTerminal` drives the real console;
//! `ScriptedTerminal` keeps an in-memory screen and replays queued input.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::Duration;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture},
    queue,
    style::Print,
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use tracing::{debug, trace};

use crate::error::Result;
use crate::ui::keymapper::InputCode;

/// Insert one blank cell at the cursor, shifting the rest of the line right.
const INSERT_CHAR: &str = "\x1b[1@";

/// Capabilities the viewer needs from a terminal
pub trait Terminal {
    /// Current size as `(cols, rows)`
    fn size(&self) -> Result<(u16, u16)>;

    /// Raw mode, hidden cursor, mouse capture, cleared screen
    fn enter(&mut self) -> Result<()>;

    /// Undo everything `enter` did
    fn leave(&mut self) -> Result<()>;

    /// Write `text` starting at column 0 of `row`
    fn put_line(&mut self, row: u16, text: &str) -> Result<()>;

    /// Write `text` on `row` without the cursor ever passing the last column.
    ///
    /// Used for the bottom row, where a plain write into the bottom-right
    /// cell would scroll the screen.
    fn insert_line(&mut self, row: u16, text: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    /// Next pending input, or `None` if nothing is waiting. Never blocks.
    fn poll_input(&mut self) -> Result<Option<InputCode>>;
}

impl<T: Terminal + ?Sized> Terminal for &mut T {
    fn size(&self) -> Result<(u16, u16)> {
        (**self).size()
    }

    fn enter(&mut self) -> Result<()> {
        (**self).enter()
    }

    fn leave(&mut self) -> Result<()> {
        (**self).leave()
    }

    fn put_line(&mut self, row: u16, text: &str) -> Result<()> {
        (**self).put_line(row, text)
    }

    fn insert_line(&mut self, row: u16, text: &str) -> Result<()> {
        (**self).insert_line(row, text)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn poll_input(&mut self) -> Result<Option<InputCode>> {
        (**self).poll_input()
    }
}

/// Real terminal via crossterm
pub struct CrosstermTerminal {
    stdout: io::Stdout,
    initialized: bool,
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            initialized: false,
        }
    }
}

impl Terminal for CrosstermTerminal {
    fn size(&self) -> Result<(u16, u16)> {
        Ok(terminal::size()?)
    }

    fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        // From here on a failed enter still leaves something for leave() to undo
        self.initialized = true;
        queue!(
            self.stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            DisableLineWrap,
            Hide,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        self.stdout.flush()?;
        debug!("terminal acquired");
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        let _ = queue!(
            self.stdout,
            Clear(ClearType::All),
            DisableMouseCapture,
            EnableLineWrap,
            Show,
            LeaveAlternateScreen
        );
        let _ = self.stdout.flush();

        // Disable raw mode - this is the most important part
        terminal::disable_raw_mode()?;
        debug!("terminal restored");
        Ok(())
    }

    fn put_line(&mut self, row: u16, text: &str) -> Result<()> {
        queue!(self.stdout, MoveTo(0, row), Print(text))?;
        Ok(())
    }

    fn insert_line(&mut self, row: u16, text: &str) -> Result<()> {
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return Ok(());
        };
        queue!(self.stdout, MoveTo(0, row), Print(chars.as_str()), MoveTo(0, row))?;
        write!(self.stdout, "{}", INSERT_CHAR)?;
        queue!(self.stdout, Print(first))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    fn poll_input(&mut self) -> Result<Option<InputCode>> {
        if !event::poll(Duration::ZERO)? {
            return Ok(None);
        }
        let evt = event::read()?;
        trace!("event: {:?}", evt);
        Ok(InputCode::from_event(&evt))
    }
}

/// In-memory terminal with a scripted input queue
#[derive(Debug, Clone)]
pub struct ScriptedTerminal {
    cols: u16,
    rows: u16,
    screen: Vec<Vec<char>>,
    input: VecDeque<Option<InputCode>>,
    entered: bool,
    enter_count: usize,
    leave_count: usize,
    flush_count: usize,
    polls: usize,
    inserted_rows: Vec<u16>,
    fail_enter: bool,
}

impl ScriptedTerminal {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            screen: vec![vec![' '; cols as usize]; rows as usize],
            input: VecDeque::new(),
            entered: false,
            enter_count: 0,
            leave_count: 0,
            flush_count: 0,
            polls: 0,
            inserted_rows: Vec::new(),
            fail_enter: false,
        }
    }

    /// Queue an input code for a later poll
    pub fn push_input(&mut self, code: InputCode) {
        self.input.push_back(Some(code));
    }

    /// Queue `count` empty polls, to let frames pass before the next input
    pub fn push_idle(&mut self, count: usize) {
        self.input.extend(std::iter::repeat(None).take(count));
    }

    /// Make the next `enter` fail after it has already switched modes
    pub fn fail_next_enter(&mut self) {
        self.fail_enter = true;
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn enter_count(&self) -> usize {
        self.enter_count
    }

    pub fn leave_count(&self) -> usize {
        self.leave_count
    }

    /// Completed frames, one flush each
    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    pub fn poll_count(&self) -> usize {
        self.polls
    }

    /// Rows written through `insert_line`, in order
    pub fn inserted_rows(&self) -> &[u16] {
        &self.inserted_rows
    }

    pub fn cell(&self, col: u16, row: u16) -> Option<char> {
        self.screen
            .get(row as usize)
            .and_then(|line| line.get(col as usize))
            .copied()
    }

    pub fn line(&self, row: u16) -> String {
        self.screen
            .get(row as usize)
            .map(|line| line.iter().collect())
            .unwrap_or_default()
    }

    fn write_at(&mut self, row: u16, text: &str) {
        if let Some(line) = self.screen.get_mut(row as usize) {
            for (slot, ch) in line.iter_mut().zip(text.chars()) {
                *slot = ch;
            }
        }
    }
}

impl Terminal for ScriptedTerminal {
    fn size(&self) -> Result<(u16, u16)> {
        Ok((self.cols, self.rows))
    }

    fn enter(&mut self) -> Result<()> {
        self.entered = true;
        self.enter_count += 1;
        if std::mem::take(&mut self.fail_enter) {
            return Err(io::Error::new(io::ErrorKind::Other, "scripted enter failure").into());
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        self.entered = false;
        self.leave_count += 1;
        for line in &mut self.screen {
            line.fill(' ');
        }
        Ok(())
    }

    fn put_line(&mut self, row: u16, text: &str) -> Result<()> {
        self.write_at(row, text);
        Ok(())
    }

    fn insert_line(&mut self, row: u16, text: &str) -> Result<()> {
        // Same end result as the real backend: columns 1.. written first,
        // then column 0 inserted in front.
        let mut chars = text.chars();
        if let Some(first) = chars.next() {
            let rest: String = chars.collect();
            self.write_at(row, &rest);
            if let Some(line) = self.screen.get_mut(row as usize) {
                line.insert(0, first);
                line.pop();
            }
        }
        self.inserted_rows.push(row);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_count += 1;
        Ok(())
    }

    fn poll_input(&mut self) -> Result<Option<InputCode>> {
        self.polls += 1;
        Ok(self.input.pop_front().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_line_overwrites_prefix_only() {
        let mut term = ScriptedTerminal::new(6, 2);
        term.put_line(0, "abcdef").unwrap();
        term.put_line(0, "XY").unwrap();
        assert_eq!(term.line(0), "XYcdef");
    }

    #[test]
    fn test_put_line_clips_at_right_edge() {
        let mut term = ScriptedTerminal::new(3, 1);
        term.put_line(0, "abcdef").unwrap();
        assert_eq!(term.line(0), "abc");
    }

    #[test]
    fn test_insert_line_fills_the_whole_row() {
        let mut term = ScriptedTerminal::new(5, 2);
        term.insert_line(1, "#  ##").unwrap();
        assert_eq!(term.line(1), "#  ##");
        assert_eq!(term.inserted_rows(), &[1]);
    }

    #[test]
    fn test_leave_undoes_failed_enter() {
        let mut term = ScriptedTerminal::new(5, 5);
        term.fail_next_enter();
        assert!(term.enter().is_err());
        assert!(term.is_entered());
        term.leave().unwrap();
        assert!(!term.is_entered());
        assert!(term.enter().is_ok());
    }

    #[test]
    fn test_scripted_input_order() {
        let mut term = ScriptedTerminal::new(5, 5);
        term.push_idle(1);
        term.push_input(InputCode::char('q'));
        assert_eq!(term.poll_input().unwrap(), None);
        assert_eq!(term.poll_input().unwrap(), Some(InputCode::char('q')));
        assert_eq!(term.poll_input().unwrap(), None);
        assert_eq!(term.poll_count(), 3);
    }
}
