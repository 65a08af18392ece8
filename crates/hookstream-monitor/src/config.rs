//! TOML configuration for the monitor.
//!
//! Read from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\hookstream\monitor.toml`
//! - Linux:    `$XDG_CONFIG_HOME/hookstream/monitor.toml` or `~/.config/hookstream/monitor.toml`
//! - macOS:    `~/Library/Application Support/hookstream/monitor.toml`
//!
//! ```toml
//! [monitor]
//! log_level = "info"
//! keyboard = true
//! mouse = true
//! log_mouse_moves = false
//! json = false
//!
//! [filters]
//! swallow = ["Ctrl+Alt+K"]
//! quit = "Ctrl+Shift+Q"
//! ```
//!
//! Every field has a default, so a missing file, a missing section or a
//! missing key all fall back to the values above (with an empty swallow list).

use std::path::{Path, PathBuf};

use hookstream_core::{Key, KeyCombination, Requirement};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed. Malformed key combinations are
    /// reported here too, with the offending key path.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level monitor configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub filters: FiltersSection,
}

/// What to hook and how to print it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorSection {
    /// `tracing` level for diagnostics; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub keyboard: bool,
    #[serde(default = "default_true")]
    pub mouse: bool,
    /// Pointer moves are frequent enough to drown everything else.
    #[serde(default)]
    pub log_mouse_moves: bool,
    /// One JSON object per line instead of plain text.
    #[serde(default)]
    pub json: bool,
}

/// Key combinations the monitor acts on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FiltersSection {
    /// Presses matching any of these are swallowed.
    #[serde(default)]
    pub swallow: Vec<KeyCombination>,
    /// Pressing this stops the monitor. The press itself is swallowed.
    #[serde(default = "default_quit")]
    pub quit: Option<KeyCombination>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_quit() -> Option<KeyCombination> {
    Some(
        KeyCombination::new(Key::Q)
            .with_ctrl(Requirement::Pressed)
            .with_shift(Requirement::Pressed),
    )
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            keyboard: default_true(),
            mouse: default_true(),
            log_mouse_moves: false,
            json: false,
        }
    }
}

impl Default for FiltersSection {
    fn default() -> Self {
        Self {
            swallow: Vec::new(),
            quit: default_quit(),
        }
    }
}

impl MonitorConfig {
    /// Parses a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Renders the configuration as a TOML document.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("monitor.toml"))
}

/// Loads the config from the default location, returning defaults if the
/// file does not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<MonitorConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => MonitorConfig::from_toml(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(MonitorConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Loads the config from an explicit path. Unlike [`load_config`], a missing
/// file is an error: the caller asked for that file by name.
pub fn load_config_from(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    MonitorConfig::from_toml(&content)
}

/// Resolves the platform config base directory joined with `hookstream`.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("hookstream"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("hookstream"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("hookstream")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_config_hooks_both_devices_in_text_mode() {
        // Arrange / Act
        let cfg = MonitorConfig::default();

        // Assert
        assert!(cfg.monitor.keyboard);
        assert!(cfg.monitor.mouse);
        assert!(!cfg.monitor.json);
        assert!(!cfg.monitor.log_mouse_moves);
        assert_eq!(cfg.monitor.log_level, "info");
    }

    #[test]
    fn test_default_quit_is_ctrl_shift_q() {
        let cfg = MonitorConfig::default();
        assert_eq!(
            cfg.filters.quit.map(|c| c.to_string()).as_deref(),
            Some("Ctrl+Shift+Q")
        );
        assert!(cfg.filters.swallow.is_empty());
    }

    // ── Parsing ───────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_document_uses_defaults() {
        let cfg = MonitorConfig::from_toml("").expect("empty config");
        assert_eq!(cfg, MonitorConfig::default());
    }

    #[test]
    fn test_full_document_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[monitor]
log_level = "debug"
mouse = false
json = true

[filters]
swallow = ["Ctrl+Alt+K", "Win+L"]
quit = "Ctrl+Q"
"#;

        // Act
        let cfg = MonitorConfig::from_toml(toml_str).expect("parse");

        // Assert
        assert_eq!(cfg.monitor.log_level, "debug");
        assert!(cfg.monitor.keyboard);
        assert!(!cfg.monitor.mouse);
        assert!(cfg.monitor.json);
        assert_eq!(cfg.filters.swallow.len(), 2);
        assert_eq!(cfg.filters.swallow[0].to_string(), "Ctrl+Alt+K");
        assert_eq!(
            cfg.filters.quit,
            Some(KeyCombination::new(Key::Q).with_ctrl(Requirement::Pressed))
        );
    }

    #[test]
    fn test_unknown_combination_key_is_a_parse_error() {
        let result = MonitorConfig::from_toml("[filters]\nswallow = [\"Ctrl+Bogus\"]\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let result = MonitorConfig::from_toml("[[[ not valid toml");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_survives_toml_rendering() {
        // Arrange
        let mut cfg = MonitorConfig::default();
        cfg.monitor.json = true;
        cfg.filters.swallow.push("Ctrl+Alt+K".parse().expect("combo"));

        // Act
        let rendered = cfg.to_toml().expect("serialize");
        let restored = MonitorConfig::from_toml(&rendered).expect("parse");

        // Assert
        assert!(rendered.contains("Ctrl+Alt+K"));
        assert_eq!(cfg, restored);
    }

    // ── Loading from disk ─────────────────────────────────────────────────────

    #[test]
    fn test_load_from_missing_explicit_path_is_io_error() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/monitor.toml");

        let result = load_config_from(&path);

        match result {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_explicit_path_reads_file() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("hookstream_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create dir");
        let path = dir.join("monitor.toml");
        std::fs::write(&path, "[monitor]\nkeyboard = false\n").expect("write");

        // Act
        let cfg = load_config_from(&path).expect("load");

        // Assert
        assert!(!cfg.monitor.keyboard);
        assert!(cfg.monitor.mouse);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_monitor_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("hookstream/monitor.toml"),
                "unexpected config path {path:?}"
            );
        }
        // NoPlatformConfigDir in a stripped environment is also acceptable.
    }
}
