//! Mutable viewer state touched by input actions.

use tracing::debug;

use super::playback::PlaybackState;
use super::viewport::Viewport;
use crate::ui::keymapper::Action;

/// Outcome of one input dispatch or one render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Last mouse click, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MousePosition {
    pub column: u16,
    pub row: u16,
}

/// Everything the input dispatcher is allowed to change.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub viewport: Viewport,
    pub playback: PlaybackState,
    pub mouse: Option<MousePosition>,
}

impl ViewState {
    pub fn new(viewport: Viewport, playback: PlaybackState) -> Self {
        Self {
            viewport,
            playback,
            mouse: None,
        }
    }

    /// Apply one action. Only `Quit` ends the loop.
    pub fn apply(&mut self, action: Action) -> LoopControl {
        match action {
            Action::Move { dx, dy } => self.viewport.translate(dx, dy),
            Action::TogglePause => {
                self.playback.toggle_pause();
                debug!("paused = {}", self.playback.is_paused());
            }
            Action::SpeedUp => {
                self.playback.speed_up();
                debug!("speed = {}", self.playback.speed());
            }
            Action::SpeedDown => {
                self.playback.speed_down();
                debug!("speed = {}", self.playback.speed());
            }
            Action::SpeedReset => self.playback.reset_speed(),
            Action::RecordMouse { column, row } => {
                self.mouse = Some(MousePosition { column, row });
            }
            Action::Quit => {
                debug!("quit requested");
                return LoopControl::Quit;
            }
        }
        LoopControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ViewState {
        ViewState::new(Viewport::new(20, 10), PlaybackState::default())
    }

    #[test]
    fn test_diagonal_move_shifts_both_axes() {
        let mut s = state();
        for _ in 0..4 {
            assert_eq!(s.apply(Action::Move { dx: 1, dy: -1 }), LoopControl::Continue);
        }
        assert_eq!(s.viewport.offset(), (4, -4));
    }

    #[test]
    fn test_quit_is_the_only_terminal_action() {
        let mut s = state();
        let actions = [
            Action::Move { dx: -1, dy: 0 },
            Action::TogglePause,
            Action::SpeedUp,
            Action::SpeedDown,
            Action::SpeedReset,
            Action::RecordMouse { column: 1, row: 1 },
        ];
        for action in actions {
            assert_eq!(s.apply(action), LoopControl::Continue);
        }
        assert_eq!(s.apply(Action::Quit), LoopControl::Quit);
    }

    #[test]
    fn test_mouse_reflects_last_click() {
        let mut s = state();
        assert_eq!(s.mouse, None);
        s.apply(Action::RecordMouse { column: 3, row: 7 });
        s.apply(Action::RecordMouse { column: 12, row: 0 });
        assert_eq!(s.mouse, Some(MousePosition { column: 12, row: 0 }));
    }
}
