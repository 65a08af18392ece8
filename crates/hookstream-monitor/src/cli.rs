//! Command-line flags. Each flag overrides the matching config file value.

use std::path::PathBuf;

use clap::Parser;
use hookstream_core::KeyCombination;

use crate::config::MonitorConfig;

/// Print every global keyboard and mouse event.
#[derive(Debug, Parser)]
#[command(name = "hookstream-monitor", version, about)]
pub struct Cli {
    /// Config file to read instead of the platform default.
    #[arg(long, env = "HOOKSTREAM_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print one JSON object per event.
    #[arg(long, env = "HOOKSTREAM_JSON")]
    pub json: bool,

    /// Do not install the mouse hook.
    #[arg(long)]
    pub no_mouse: bool,

    /// Do not install the keyboard hook.
    #[arg(long)]
    pub no_keyboard: bool,

    /// Diagnostic log level (error, warn, info, debug, trace).
    #[arg(long, env = "HOOKSTREAM_LOG_LEVEL", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Key combination that stops the monitor, e.g. `Ctrl+Shift+Q`.
    #[arg(long, value_name = "COMBO")]
    pub quit: Option<KeyCombination>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Layers the flags that were given over `config`.
    pub fn apply(&self, config: &mut MonitorConfig) {
        if self.json {
            config.monitor.json = true;
        }
        if self.no_mouse {
            config.monitor.mouse = false;
        }
        if self.no_keyboard {
            config.monitor.keyboard = false;
        }
        if let Some(level) = &self.log_level {
            config.monitor.log_level = level.clone();
        }
        if let Some(quit) = self.quit {
            config.filters.quit = Some(quit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hookstream-monitor").chain(args.iter().copied()))
            .expect("arguments must parse")
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        // Arrange
        let cli = parse(&[]);
        let mut cfg = MonitorConfig::default();

        // Act
        cli.apply(&mut cfg);

        // Assert
        assert_eq!(cfg, MonitorConfig::default());
    }

    #[test]
    fn test_flags_override_config_values() {
        // Arrange
        let cli = parse(&["--no-mouse", "--log-level", "trace", "--quit", "Ctrl+Q"]);
        let mut cfg = MonitorConfig::default();

        // Act
        cli.apply(&mut cfg);

        // Assert
        assert!(!cfg.monitor.mouse);
        assert!(cfg.monitor.keyboard);
        assert_eq!(cfg.monitor.log_level, "trace");
        assert_eq!(cfg.filters.quit.map(|c| c.to_string()).as_deref(), Some("Ctrl+Q"));
    }

    #[test]
    fn test_invalid_quit_combination_is_rejected() {
        let result = Cli::try_parse_from(["hookstream-monitor", "--quit", "Ctrl+Nope"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_path_is_captured() {
        let cli = parse(&["--config", "custom.toml", "--print-config"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(cli.print_config);
    }
}
