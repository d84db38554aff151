//! cellview - terminal viewer for sparse 2D cell sets
//!
//! Displays successive snapshots of an unbounded set of active `(x, y)`
//! cells, as produced by an external simulation, in a fixed-size terminal.
//! The view scrolls in eight directions, playback runs in bursts of
//! `speed` frames, and a two-line header shows the visible world range.
//!
//! # Example
//!
//! ```no_run
//! use cellview::{ActiveCellSet, CrosstermTerminal, LoopControl, RenderOptions, Visualizer};
//!
//! fn main() -> cellview::Result<()> {
//!     let glider: ActiveCellSet = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)].into_iter().collect();
//!     let mut vis = Visualizer::new(CrosstermTerminal::new(), glider.clone())?;
//!     let options = RenderOptions::default();
//!     let mut state = glider;
//!     while vis.render(&options)? == LoopControl::Continue {
//!         state = state.translated(1, 1);
//!         vis.update(state.clone());
//!     }
//!     vis.shutdown()
//! }
//! ```
//!
//! # Default keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Arrows, 4/8/6/2 | Move view |
//! | 7/9/3/1 | Move view diagonally |
//! | p | Pause / unpause |
//! | + / - | Fewer / more frames per cycle |
//! | = | Default speed |
//! | q, Ctrl+C | Quit |

pub mod config;
pub mod core;
pub mod error;
pub mod ui;
pub mod visualizer;

pub use crate::config::Config;
pub use crate::core::cells::{ActiveCellSet, Coord};
pub use crate::core::state::{LoopControl, MousePosition};
pub use crate::core::viewport::{Rect, Viewport};
pub use crate::error::{Error, Result};
pub use crate::ui::terminal::{CrosstermTerminal, ScriptedTerminal, Terminal};
pub use crate::visualizer::{RenderOptions, ViewerSettings, Visualizer};
