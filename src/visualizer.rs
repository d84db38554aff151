//! The viewer object: owns the terminal, the current cell set and all
//! input-driven state, and runs the playback loop.
//!
//! # Playback
//!
//! ```text
//!            p                     burst of `speed` frames
//!  Paused ────────► Running ──────────────────────────────► Paused
//!    ▲  │                                 (auto_pause)
//!    └──┘ one frame + input poll per turn
//! ```
//!
//! `render` returns [`LoopControl::Quit`] as soon as a quit input is
//! dispatched; the caller is expected to call [`Visualizer::shutdown`].

use tracing::{debug, info, trace, warn};

use crate::core::cells::ActiveCellSet;
use crate::core::playback::{PlaybackState, DEFAULT_SPEED};
use crate::core::state::{LoopControl, MousePosition, ViewState};
use crate::core::viewport::Viewport;
use crate::error::{Error, Result};
use crate::ui::keymapper::{InputCode, KeyMap};
use crate::ui::renderer::{Renderer, DEFAULT_MARKER, STATUS_ROWS};
use crate::ui::terminal::Terminal;

/// Smallest usable screen: the header plus one grid row
pub const MIN_COLS: u16 = 10;
pub const MIN_ROWS: u16 = STATUS_ROWS + 1;

/// Input events polled after every frame
pub const DEFAULT_EVENTS_PER_FRAME: usize = 10;

/// Per-call options for [`Visualizer::render`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub events_per_frame: usize,
    /// Force the paused state after each running burst
    pub auto_pause: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            events_per_frame: DEFAULT_EVENTS_PER_FRAME,
            auto_pause: true,
        }
    }
}

/// Construction-time settings
#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub default_speed: u32,
    pub marker: char,
    pub keymap: KeyMap,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            default_speed: DEFAULT_SPEED,
            marker: DEFAULT_MARKER,
            keymap: KeyMap::default(),
        }
    }
}

pub struct Visualizer<T: Terminal> {
    terminal: T,
    cells: ActiveCellSet,
    state: ViewState,
    keymap: KeyMap,
    renderer: Renderer,
    active: bool,
}

impl<T: Terminal> Visualizer<T> {
    /// Acquire `terminal` with default settings
    pub fn new(terminal: T, cells: ActiveCellSet) -> Result<Self> {
        Self::with_settings(terminal, cells, ViewerSettings::default())
    }

    /// Acquire `terminal` and capture its size for the whole session.
    ///
    /// Fails without touching the terminal mode if the screen is smaller
    /// than [`MIN_COLS`] x [`MIN_ROWS`].
    pub fn with_settings(mut terminal: T, cells: ActiveCellSet, settings: ViewerSettings) -> Result<Self> {
        let (cols, rows) = terminal.size()?;
        if cols < MIN_COLS || rows < MIN_ROWS {
            return Err(Error::TerminalTooSmall {
                cols,
                rows,
                min_cols: MIN_COLS,
                min_rows: MIN_ROWS,
            });
        }

        if let Err(e) = terminal.enter() {
            let _ = terminal.leave();
            return Err(e);
        }
        info!("viewer started: {}x{}, {} cells", cols, rows, cells.len());

        Ok(Self {
            terminal,
            cells,
            state: ViewState::new(
                Viewport::new(cols, rows),
                PlaybackState::new(settings.default_speed),
            ),
            keymap: settings.keymap,
            renderer: Renderer::new(settings.marker),
            active: true,
        })
    }

    /// Replace the displayed set wholesale
    pub fn update(&mut self, cells: ActiveCellSet) {
        trace!("state update: {} cells", cells.len());
        self.cells = cells;
    }

    /// Run one playback cycle.
    ///
    /// Running: `speed` frames, each followed by an input poll, then paused
    /// (with `auto_pause`). Paused: frames and polls until unpaused. Returns
    /// `Quit` immediately when a quit input is dispatched.
    pub fn render(&mut self, options: &RenderOptions) -> Result<LoopControl> {
        if !self.active {
            warn!("render called after shutdown");
            return Ok(LoopControl::Quit);
        }

        if !self.state.playback.is_paused() {
            let burst = self.state.playback.speed();
            debug!("running burst of {} frames", burst);
            for _ in 0..burst {
                if self.frame(options)? == LoopControl::Quit {
                    return Ok(LoopControl::Quit);
                }
            }
            if options.auto_pause {
                self.state.playback.set_paused(true);
            }
        }

        if self.state.playback.is_paused() {
            debug!("paused");
        }
        while self.state.playback.is_paused() {
            if self.frame(options)? == LoopControl::Quit {
                return Ok(LoopControl::Quit);
            }
        }

        Ok(LoopControl::Continue)
    }

    /// Draw one frame, then poll up to `events_per_frame` inputs.
    fn frame(&mut self, options: &RenderOptions) -> Result<LoopControl> {
        self.renderer
            .draw(&mut self.terminal, &self.cells, &self.state.viewport)?;

        for _ in 0..options.events_per_frame {
            if let Some(code) = self.terminal.poll_input()? {
                if self.dispatch(code) == LoopControl::Quit {
                    return Ok(LoopControl::Quit);
                }
            }
        }
        Ok(LoopControl::Continue)
    }

    /// Apply one input code. Unbound codes are ignored.
    pub fn dispatch(&mut self, code: InputCode) -> LoopControl {
        match self.keymap.lookup(&code) {
            Some(action) => {
                trace!("dispatch {:?} -> {}", code, action);
                self.state.apply(action)
            }
            None => {
                trace!("unbound input {:?}", code);
                LoopControl::Continue
            }
        }
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.terminal.leave()?;
        info!("viewer shut down after {} frames", self.renderer.frames());
        Ok(())
    }

    pub fn cells(&self) -> &ActiveCellSet {
        &self.cells
    }

    pub fn viewport(&self) -> &Viewport {
        &self.state.viewport
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.state.playback
    }

    pub fn mouse_position(&self) -> Option<MousePosition> {
        self.state.mouse
    }

    pub fn frames(&self) -> u64 {
        self.renderer.frames()
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    /// Mutable terminal access, e.g. to queue scripted input
    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }
}

impl<T: Terminal> Drop for Visualizer<T> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.shutdown();
        }
    }
}
