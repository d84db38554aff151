//! Viewer state, independent of any terminal.
//!
//! - **cells**: the sparse set of active world coordinates
//! - **viewport**: scroll offset and world/screen conversion
//! - **playback**: pause flag and speed policy
//! - **state**: the state input actions mutate, and the loop result type
//!
//! # Architecture
//!
//! ```text
//! Visualizer
//! ├── ActiveCellSet (replaced on every update)
//! └── ViewState
//!     ├── Viewport
//!     ├── PlaybackState
//!     └── MousePosition (last click)
//! ```

pub mod cells;
pub mod playback;
pub mod state;
pub mod viewport;
