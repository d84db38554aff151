//! Configuration for cellview.
//!
//! Loaded from `~/.cellview/config.toml`. Every field is optional:
//!
//! ```toml
//! # Glyph drawn for an active cell
//! marker = "#"
//!
//! # Log level when RUST_LOG is not set
//! log_level = "info"
//!
//! [playback]
//! default_speed = 512     # frames per unpaused cycle
//! events_per_frame = 10   # input events polled after each frame
//! auto_pause = true       # pause again after every burst
//!
//! [keys]
//! # Per-action key lists. A listed action loses its default keys.
//! quit = ["q", "ctrl+c"]
//! move_up = ["up", "8", "k"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;
use unicode_width::UnicodeWidthChar;

use crate::core::playback::DEFAULT_SPEED;
use crate::error::{Error, Result};
use crate::ui::keymapper::KeyMap;
use crate::ui::renderer::DEFAULT_MARKER;
use crate::visualizer::{RenderOptions, ViewerSettings, DEFAULT_EVENTS_PER_FRAME};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Active cell glyph
    pub marker: char,
    /// Fallback log filter
    pub log_level: String,
    /// Playback settings
    pub playback: PlaybackConfig,
    /// Key overrides, action name -> key specs
    pub keys: BTreeMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
            log_level: "info".to_string(),
            playback: PlaybackConfig::default(),
            keys: BTreeMap::new(),
        }
    }
}

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub default_speed: u32,
    pub events_per_frame: usize,
    pub auto_pause: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_speed: DEFAULT_SPEED,
            events_per_frame: DEFAULT_EVENTS_PER_FRAME,
            auto_pause: true,
        }
    }
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> Self {
        match Self::get_config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        }
    }

    /// Load from the default path. `Ok(None)` when there is no file.
    ///
    /// For callers that must report a bad file before logging is set up.
    pub fn try_load() -> Result<Option<Self>> {
        match Self::get_config_path() {
            Some(path) => Self::load_optional(&path),
            None => Ok(None),
        }
    }

    /// Load from `path`; unreadable or invalid files give the defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_optional(path) {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load from `path` if it exists
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(path).map(Some)
    }

    /// Load from `path`, reporting any failure
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::get_config_path()
            .ok_or_else(|| Error::Config("Could not determine config path".to_string()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Directory holding the config file and the log
    pub fn config_dir() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".cellview"))
    }

    /// Get config file path
    pub fn get_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Check values that serde alone cannot reject
    pub fn validate(&self) -> Result<()> {
        if self.marker.width() != Some(1) {
            return Err(Error::Config(format!(
                "marker must be one column wide: {:?}",
                self.marker
            )));
        }
        if self.playback.events_per_frame == 0 {
            return Err(Error::Config("events_per_frame must be at least 1".to_string()));
        }
        self.keymap().map(|_| ())
    }

    /// Default bindings with the `[keys]` overrides applied
    pub fn keymap(&self) -> Result<KeyMap> {
        let mut map = KeyMap::default();
        for (action, specs) in &self.keys {
            map.rebind(action, specs)?;
        }
        Ok(map)
    }

    pub fn viewer_settings(&self) -> Result<ViewerSettings> {
        Ok(ViewerSettings {
            default_speed: self.playback.default_speed,
            marker: self.marker,
            keymap: self.keymap()?,
        })
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            events_per_frame: self.playback.events_per_frame,
            auto_pause: self.playback.auto_pause,
        }
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::keymapper::{Action, InputCode, Key};

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.render_options(), RenderOptions::default());
        assert_eq!(config.viewer_settings().unwrap().default_speed, 512);
    }

    #[test]
    fn test_partial_tables() {
        let config = Config::parse(
            r#"
            marker = "@"

            [playback]
            auto_pause = false
            "#,
        )
        .unwrap();
        assert_eq!(config.marker, '@');
        assert!(!config.playback.auto_pause);
        assert_eq!(config.playback.default_speed, 512);
        assert_eq!(config.playback.events_per_frame, 10);
    }

    #[test]
    fn test_key_overrides() {
        let config = Config::parse(
            r#"
            [keys]
            quit = ["esc"]
            move_up = ["up", "k"]
            "#,
        )
        .unwrap();
        let map = config.keymap().unwrap();
        assert_eq!(map.lookup(&InputCode::key(Key::Esc)), Some(Action::Quit));
        assert_eq!(map.lookup(&InputCode::char('q')), None);
        assert_eq!(map.lookup(&InputCode::char('k')), Some(Action::Move { dx: 0, dy: -1 }));
        assert_eq!(map.lookup(&InputCode::char('8')), None);
        assert_eq!(map.lookup(&InputCode::char('p')), Some(Action::TogglePause));
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(Config::parse("marker = \"ab\""), Err(Error::Config(_))));
        assert!(matches!(Config::parse("marker = \"日\""), Err(Error::Config(_))));
        assert!(matches!(
            Config::parse("[playback]\nevents_per_frame = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::parse("[keys]\nteleport = [\"t\"]"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::parse("[keys]\nquit = [\"hyper+q\"]"),
            Err(Error::Config(_))
        ));
        assert!(matches!(Config::parse("[playback"), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join(format!("cellview-test-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = Config::default();
        config.marker = '*';
        config.playback.default_speed = 100;
        config.keys.insert("pause".to_string(), vec!["space".to_string()]);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = std::env::temp_dir().join("cellview-no-such-dir").join("config.toml");
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn test_bad_file_is_reported_not_swallowed() {
        let dir = std::env::temp_dir().join(format!("cellview-bad-{}", std::process::id()));
        let path = dir.join("config.toml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "marker = \"ab\"").unwrap();

        assert!(matches!(Config::load_optional(&path), Err(Error::Config(_))));
        assert_eq!(Config::load_or_default(&path), Config::default());

        let missing = dir.join("missing.toml");
        assert_eq!(Config::load_optional(&missing).unwrap(), None);

        let _ = fs::remove_dir_all(&dir);
    }
}
