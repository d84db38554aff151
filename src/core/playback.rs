//! Pause flag and playback speed.
//!
//! Speed is the number of frames rendered per unpaused cycle. The clamp
//! policy is asymmetric: anything below [`MIN_SPEED`] becomes `MIN_SPEED`,
//! but anything above [`SPEED_CEILING_TRIGGER`] jumps to [`MAX_SPEED`].

/// Default frames per cycle.
pub const DEFAULT_SPEED: u32 = 512;
/// Lower clamp.
pub const MIN_SPEED: u32 = 10;
/// Values above this are replaced by [`MAX_SPEED`].
pub const SPEED_CEILING_TRIGGER: u32 = 5000;
/// Value substituted once the trigger is exceeded.
pub const MAX_SPEED: u32 = 7000;
/// Multiplier used by the speed up/down actions.
pub const SPEED_STEP: f64 = 1.1;

/// Playback state machine input.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    paused: bool,
    speed: u32,
    default_speed: u32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

impl PlaybackState {
    /// Start paused, at `default_speed` (clamped like any adjustment).
    pub fn new(default_speed: u32) -> Self {
        let default_speed = clamp_speed(i64::from(default_speed));
        Self {
            paused: true,
            speed: default_speed,
            default_speed,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn default_speed(&self) -> u32 {
        self.default_speed
    }

    /// Fewer frames per cycle: `speed / 1.1`, then `+1`, truncated, reclamped.
    pub fn speed_up(&mut self) {
        self.set_speed_from(f64::from(self.speed) / SPEED_STEP);
    }

    /// More frames per cycle: `speed * 1.1`, then `+1`, truncated, reclamped.
    pub fn speed_down(&mut self) {
        self.set_speed_from(f64::from(self.speed) * SPEED_STEP);
    }

    pub fn reset_speed(&mut self) {
        self.speed = self.default_speed;
    }

    fn set_speed_from(&mut self, value: f64) {
        self.speed = clamp_speed((value + 1.0) as i64);
    }
}

/// Apply the speed bounds to an already truncated value.
pub fn clamp_speed(value: i64) -> u32 {
    if value < i64::from(MIN_SPEED) {
        MIN_SPEED
    } else if value > i64::from(SPEED_CEILING_TRIGGER) {
        MAX_SPEED
    } else {
        value as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = PlaybackState::default();
        assert!(state.is_paused());
        assert_eq!(state.speed(), 512);
    }

    #[test]
    fn test_speed_steps_from_default() {
        let mut state = PlaybackState::default();
        state.speed_up();
        // 512 / 1.1 + 1 = 466.45
        assert_eq!(state.speed(), 466);

        state.reset_speed();
        state.speed_down();
        // 512 * 1.1 + 1 = 564.2
        assert_eq!(state.speed(), 564);
    }

    #[test]
    fn test_speed_up_settles_above_floor() {
        // x / 1.1 + 1 has its fixed point at 11, so repeated speed-ups stop
        // there and never reach the floor.
        let mut state = PlaybackState::default();
        for _ in 0..100 {
            state.speed_up();
        }
        assert_eq!(state.speed(), 11);
    }

    #[test]
    fn test_speed_floor() {
        let mut state = PlaybackState::new(3);
        assert_eq!(state.speed(), MIN_SPEED);
        state.speed_up();
        assert_eq!(state.speed(), MIN_SPEED);
        state.speed_down();
        assert_eq!(state.speed(), 12);
    }

    #[test]
    fn test_speed_ceiling_jumps_to_7000() {
        // Over 5000 becomes 7000, not 5000. Kept as-is on purpose.
        let mut state = PlaybackState::new(4600);
        state.speed_down();
        assert_eq!(state.speed(), MAX_SPEED);

        // 7000 / 1.1 + 1 is still over 5000, so speeding up from the
        // ceiling leaves the value stuck at 7000.
        state.speed_up();
        assert_eq!(state.speed(), MAX_SPEED);

        state.reset_speed();
        assert_eq!(state.speed(), 4600);
    }

    #[test]
    fn test_speed_stays_in_bounds() {
        let mut state = PlaybackState::default();
        let ops: [fn(&mut PlaybackState); 3] = [
            PlaybackState::speed_up,
            PlaybackState::speed_down,
            PlaybackState::reset_speed,
        ];
        let mut seed: u32 = 7;
        for _ in 0..2000 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            ops[(seed >> 16) as usize % 3](&mut state);
            assert!((MIN_SPEED..=MAX_SPEED).contains(&state.speed()));
        }
        state.reset_speed();
        assert_eq!(state.speed(), DEFAULT_SPEED);
    }

    #[test]
    fn test_pause_toggle_is_involutive() {
        let mut state = PlaybackState::default();
        let before = state.is_paused();
        state.toggle_pause();
        assert_ne!(state.is_paused(), before);
        state.toggle_pause();
        assert_eq!(state.is_paused(), before);
    }

    #[test]
    fn test_clamp_speed_edges() {
        assert_eq!(clamp_speed(-5), 10);
        assert_eq!(clamp_speed(9), 10);
        assert_eq!(clamp_speed(10), 10);
        assert_eq!(clamp_speed(5000), 5000);
        assert_eq!(clamp_speed(5001), 7000);
    }
}
