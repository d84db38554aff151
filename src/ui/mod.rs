//! Terminal rendering and input handling.
//!
//! - **terminal**: the terminal capability trait and its backends
//! - **keymapper**: terminal events to input codes to actions
//! - **renderer**: culling, frame layout and the status header

pub mod keymapper;
pub mod renderer;
pub mod terminal;

pub use keymapper::{Action, InputCode, Key, KeyBinding, KeyMap, Modifiers};
pub use renderer::Renderer;
pub use terminal::{CrosstermTerminal, ScriptedTerminal, Terminal};
