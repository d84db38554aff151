//! Key mapping for viewer input
//!
//! Converts terminal events into logical input codes and looks them up in a
//! fixed binding table. Codes with no binding are ignored.

use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};

use crate::error::{Error, Result};

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

/// Keys the viewer can bind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Esc,
    Tab,
    Backspace,
    F(u8),
}

impl Key {
    fn from_code(code: KeyCode) -> Option<Self> {
        let key = match code {
            KeyCode::Char(ch) => Key::Char(ch),
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Esc,
            KeyCode::Tab => Key::Tab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::F(n) => Key::F(n),
            _ => return None,
        };
        Some(key)
    }
}

/// A key plus modifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: Key,
    pub mods: Modifiers,
}

impl KeyBinding {
    /// Build a binding. Shift is dropped for characters since the character
    /// itself already carries it (`+` arrives as Shift+`+` on most layouts).
    pub fn new(key: Key, mods: Modifiers) -> Self {
        let mods = match key {
            Key::Char(_) => mods - Modifiers::SHIFT,
            _ => mods,
        };
        Self { key, mods }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::empty())
    }

    /// Parse a key spec such as `q`, `ctrl+c`, `shift+up` or `f5`.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = || Error::Config(format!("invalid key spec: {:?}", spec));

        // A lone "+" (or "ctrl++") names the plus key itself.
        let (prefix, key_part) = match spec.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None if spec == "+" => ("", "+"),
            None => match spec.rsplit_once('+') {
                Some((prefix, key)) => (prefix, key),
                None => ("", spec),
            },
        };

        let mut mods = Modifiers::empty();
        for part in prefix.split('+').filter(|p| !p.is_empty()) {
            mods |= match part.to_ascii_lowercase().as_str() {
                "shift" => Modifiers::SHIFT,
                "ctrl" | "control" => Modifiers::CTRL,
                "alt" | "meta" => Modifiers::ALT,
                _ => return Err(invalid()),
            };
        }

        let mut chars = key_part.chars();
        let key = match (chars.next(), chars.next()) {
            (None, _) => return Err(invalid()),
            (Some(ch), None) => Key::Char(ch),
            _ => match key_part.to_ascii_lowercase().as_str() {
                "up" => Key::Up,
                "down" => Key::Down,
                "left" => Key::Left,
                "right" => Key::Right,
                "home" => Key::Home,
                "end" => Key::End,
                "pageup" => Key::PageUp,
                "pagedown" => Key::PageDown,
                "enter" => Key::Enter,
                "esc" | "escape" => Key::Esc,
                "tab" => Key::Tab,
                "backspace" => Key::Backspace,
                "space" => Key::Char(' '),
                other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                    Some(n) if (1..=24).contains(&n) => Key::F(n),
                    _ => return Err(invalid()),
                },
            },
        };

        Ok(Self::new(key, mods))
    }
}

/// Logical input event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputCode {
    Key(KeyBinding),
    MouseClick { column: u16, row: u16 },
}

impl InputCode {
    /// Convert a crossterm event. Key releases, repeats, resizes and
    /// non-click mouse events yield `None`.
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::Key(key) => Self::from_key_event(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => Some(InputCode::MouseClick {
                    column: mouse.column,
                    row: mouse.row,
                }),
                _ => None,
            },
            _ => None,
        }
    }

    fn from_key_event(event: &KeyEvent) -> Option<Self> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        let key = Key::from_code(event.code)?;
        Some(InputCode::Key(KeyBinding::new(key, event.modifiers.into())))
    }

    pub fn key(key: Key) -> Self {
        InputCode::Key(KeyBinding::plain(key))
    }

    pub fn char(ch: char) -> Self {
        Self::key(Key::Char(ch))
    }
}

/// What an input does to the viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Move { dx: i64, dy: i64 },
    Quit,
    TogglePause,
    SpeedUp,
    SpeedDown,
    SpeedReset,
    RecordMouse { column: u16, row: u16 },
}

/// Bindable action names, as used in the `[keys]` config table.
pub const ACTION_NAMES: [&str; 13] = [
    "move_left",
    "move_right",
    "move_up",
    "move_down",
    "move_up_left",
    "move_up_right",
    "move_down_left",
    "move_down_right",
    "quit",
    "pause",
    "speed_up",
    "speed_down",
    "speed_reset",
];

impl Action {
    /// Look up an action by config name
    pub fn by_name(name: &str) -> Option<Self> {
        let action = match name {
            "move_left" => Action::Move { dx: -1, dy: 0 },
            "move_right" => Action::Move { dx: 1, dy: 0 },
            "move_up" => Action::Move { dx: 0, dy: -1 },
            "move_down" => Action::Move { dx: 0, dy: 1 },
            "move_up_left" => Action::Move { dx: -1, dy: -1 },
            "move_up_right" => Action::Move { dx: 1, dy: -1 },
            "move_down_left" => Action::Move { dx: -1, dy: 1 },
            "move_down_right" => Action::Move { dx: 1, dy: 1 },
            "quit" => Action::Quit,
            "pause" => Action::TogglePause,
            "speed_up" => Action::SpeedUp,
            "speed_down" => Action::SpeedDown,
            "speed_reset" => Action::SpeedReset,
            _ => return None,
        };
        Some(action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move { dx, dy } => write!(f, "move({}, {})", dx, dy),
            Action::Quit => f.write_str("quit"),
            Action::TogglePause => f.write_str("pause"),
            Action::SpeedUp => f.write_str("speed_up"),
            Action::SpeedDown => f.write_str("speed_down"),
            Action::SpeedReset => f.write_str("speed_reset"),
            Action::RecordMouse { column, row } => write!(f, "mouse({}, {})", column, row),
        }
    }
}

/// Binding table from keys to actions
#[derive(Clone, Debug)]
pub struct KeyMap {
    bindings: HashMap<KeyBinding, Action>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self::empty();
        let table: [(Key, &str); 17] = [
            (Key::Left, "move_left"),
            (Key::Char('4'), "move_left"),
            (Key::Up, "move_up"),
            (Key::Char('8'), "move_up"),
            (Key::Right, "move_right"),
            (Key::Char('6'), "move_right"),
            (Key::Down, "move_down"),
            (Key::Char('2'), "move_down"),
            (Key::Char('7'), "move_up_left"),
            (Key::Char('9'), "move_up_right"),
            (Key::Char('3'), "move_down_right"),
            (Key::Char('1'), "move_down_left"),
            (Key::Char('q'), "quit"),
            (Key::Char('p'), "pause"),
            (Key::Char('+'), "speed_up"),
            (Key::Char('-'), "speed_down"),
            (Key::Char('='), "speed_reset"),
        ];
        for (key, name) in table {
            if let Some(action) = Action::by_name(name) {
                map.bind(KeyBinding::plain(key), action);
            }
        }
        // Raw mode swallows SIGINT, so Ctrl+C has to be an ordinary binding
        map.bind(KeyBinding::new(Key::Char('c'), Modifiers::CTRL), Action::Quit);
        map
    }
}

impl KeyMap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, binding: KeyBinding, action: Action) {
        self.bindings.insert(binding, action);
    }

    /// Drop every binding that triggers `action`
    pub fn unbind_action(&mut self, action: Action) {
        self.bindings.retain(|_, bound| *bound != action);
    }

    /// Replace the bindings of a named action with the given key specs
    pub fn rebind(&mut self, name: &str, specs: &[String]) -> Result<()> {
        let action = Action::by_name(name)
            .ok_or_else(|| Error::Config(format!("unknown action: {:?}", name)))?;
        let bindings = specs
            .iter()
            .map(|spec| KeyBinding::parse(spec))
            .collect::<Result<Vec<_>>>()?;
        self.unbind_action(action);
        for binding in bindings {
            self.bind(binding, action);
        }
        Ok(())
    }

    /// Resolve an input code. Mouse clicks always record their position.
    pub fn lookup(&self, code: &InputCode) -> Option<Action> {
        match *code {
            InputCode::Key(binding) => self.bindings.get(&binding).copied(),
            InputCode::MouseClick { column, row } => Some(Action::RecordMouse { column, row }),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};

    fn press(code: KeyCode, mods: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, mods))
    }

    #[test]
    fn test_default_directions() {
        let map = KeyMap::default();
        let cases = [
            (Key::Left, (-1, 0)),
            (Key::Char('4'), (-1, 0)),
            (Key::Up, (0, -1)),
            (Key::Char('8'), (0, -1)),
            (Key::Right, (1, 0)),
            (Key::Char('6'), (1, 0)),
            (Key::Down, (0, 1)),
            (Key::Char('2'), (0, 1)),
            (Key::Char('7'), (-1, -1)),
            (Key::Char('9'), (1, -1)),
            (Key::Char('3'), (1, 1)),
            (Key::Char('1'), (-1, 1)),
        ];
        for (key, (dx, dy)) in cases {
            assert_eq!(map.lookup(&InputCode::key(key)), Some(Action::Move { dx, dy }), "{:?}", key);
        }
    }

    #[test]
    fn test_default_controls() {
        let map = KeyMap::default();
        assert_eq!(map.lookup(&InputCode::char('q')), Some(Action::Quit));
        assert_eq!(map.lookup(&InputCode::char('p')), Some(Action::TogglePause));
        assert_eq!(map.lookup(&InputCode::char('+')), Some(Action::SpeedUp));
        assert_eq!(map.lookup(&InputCode::char('-')), Some(Action::SpeedDown));
        assert_eq!(map.lookup(&InputCode::char('=')), Some(Action::SpeedReset));
        assert_eq!(map.lookup(&InputCode::char('5')), None);
        assert_eq!(map.lookup(&InputCode::char('Q')), None);
        assert_eq!(map.lookup(&InputCode::key(Key::F(1))), None);
    }

    #[test]
    fn test_ctrl_c_quits_by_default() {
        let code = InputCode::from_event(&press(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(KeyMap::default().lookup(&code.unwrap()), Some(Action::Quit));
        assert_eq!(KeyMap::default().lookup(&InputCode::char('c')), None);
    }

    #[test]
    fn test_mouse_click_always_records() {
        let map = KeyMap::empty();
        assert_eq!(
            map.lookup(&InputCode::MouseClick { column: 4, row: 9 }),
            Some(Action::RecordMouse { column: 4, row: 9 })
        );
    }

    #[test]
    fn test_from_event_shifted_plus() {
        let code = InputCode::from_event(&press(KeyCode::Char('+'), KeyModifiers::SHIFT));
        assert_eq!(code, Some(InputCode::char('+')));
        assert_eq!(KeyMap::default().lookup(&code.unwrap()), Some(Action::SpeedUp));
    }

    #[test]
    fn test_from_event_ignores_release_and_other_clicks() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(InputCode::from_event(&release), None);
        assert_eq!(InputCode::from_event(&Event::Resize(10, 10)), None);

        let right = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: 1,
            row: 1,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(InputCode::from_event(&right), None);

        let left = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(
            InputCode::from_event(&left),
            Some(InputCode::MouseClick { column: 7, row: 3 })
        );
    }

    #[test]
    fn test_parse_key_specs() {
        assert_eq!(KeyBinding::parse("q").unwrap(), KeyBinding::plain(Key::Char('q')));
        assert_eq!(KeyBinding::parse("+").unwrap(), KeyBinding::plain(Key::Char('+')));
        assert_eq!(
            KeyBinding::parse("ctrl+c").unwrap(),
            KeyBinding::new(Key::Char('c'), Modifiers::CTRL)
        );
        assert_eq!(
            KeyBinding::parse("ctrl++").unwrap(),
            KeyBinding::new(Key::Char('+'), Modifiers::CTRL)
        );
        assert_eq!(
            KeyBinding::parse("Shift+Up").unwrap(),
            KeyBinding::new(Key::Up, Modifiers::SHIFT)
        );
        assert_eq!(KeyBinding::parse("f5").unwrap(), KeyBinding::plain(Key::F(5)));
        assert_eq!(KeyBinding::parse("space").unwrap(), KeyBinding::plain(Key::Char(' ')));

        assert!(KeyBinding::parse("").is_err());
        assert!(KeyBinding::parse("hyper+x").is_err());
        assert!(KeyBinding::parse("f99").is_err());
        assert!(KeyBinding::parse("banana").is_err());
    }

    #[test]
    fn test_rebind_replaces_previous_keys() {
        let mut map = KeyMap::default();
        map.rebind("quit", &["esc".to_string(), "ctrl+c".to_string()]).unwrap();
        assert_eq!(map.lookup(&InputCode::char('q')), None);
        assert_eq!(map.lookup(&InputCode::key(Key::Esc)), Some(Action::Quit));
        assert_eq!(
            map.lookup(&InputCode::Key(KeyBinding::new(Key::Char('c'), Modifiers::CTRL))),
            Some(Action::Quit)
        );

        assert!(map.rebind("fly", &["x".to_string()]).is_err());
        // A bad spec leaves the old bindings in place.
        assert!(map.rebind("pause", &["nope-key".to_string()]).is_err());
        assert_eq!(map.lookup(&InputCode::char('p')), Some(Action::TogglePause));
    }

    #[test]
    fn test_every_action_name_resolves() {
        for name in ACTION_NAMES {
            assert!(Action::by_name(name).is_some(), "{}", name);
        }
    }
}
