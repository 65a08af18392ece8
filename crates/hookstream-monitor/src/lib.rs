//! # hookstream-monitor
//!
//! Installs global keyboard and mouse hooks and prints one line per event.
//!
//! - **`config`** – TOML configuration at the platform config directory.
//! - **`cli`** – command-line flags layered over the configuration.
//! - **`rules`** – which events to swallow, when to quit, how to print.
//! - **`output`** – bounded line queue drained by a writer thread, so the
//!   hook callback never blocks on the console.
//! - **`monitor`** – wires sessions, rules and the message loop together over
//!   any host, so the whole flow runs against the in-process mock in tests.
//! - **`shutdown`** – Ctrl-C watcher that stops the loop from a helper thread.

pub mod cli;
pub mod config;
pub mod monitor;
pub mod output;
pub mod rules;
pub mod shutdown;

pub use config::{ConfigError, MonitorConfig};
pub use monitor::{Monitor, MonitorStats};
pub use rules::MonitorRules;
