//! hookstream monitor entry point.
//!
//! ```text
//! main()
//!  └─ Cli::parse() + config load     -- file values, then flag overrides
//!  └─ tracing subscriber             -- RUST_LOG wins over the configured level
//!  └─ platform::run()
//!       ├─ line writer               -- helper thread, prints queued lines
//!       ├─ Monitor::new()            -- installs the enabled hooks
//!       ├─ Ctrl-C watcher            -- helper thread, posts quit
//!       └─ Monitor::run()            -- message loop on this thread
//! ```

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hookstream_monitor::cli::Cli;
use hookstream_monitor::config::{self, MonitorConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => config::load_config().context("failed to load config")?,
    };
    cli.apply(&mut config);

    if cli.print_config {
        print!("{}", config.to_toml().context("failed to render config")?);
        return Ok(());
    }

    // Event lines go to stdout; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.monitor.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("hookstream monitor starting");
    platform::run(&config)
}

#[cfg(target_os = "windows")]
mod platform {
    use anyhow::Context;
    use hookstream_monitor::output::{line_channel, spawn_line_writer, QUEUE_CAPACITY};
    use hookstream_monitor::shutdown::spawn_ctrl_c_watcher;
    use hookstream_monitor::Monitor;
    use hookstream_windows::WindowsHost;
    use tracing::{info, warn};

    use super::MonitorConfig;

    pub fn run(config: &MonitorConfig) -> anyhow::Result<()> {
        let (output, lines) = line_channel(QUEUE_CAPACITY);
        let writer =
            spawn_line_writer(std::io::stdout(), lines).context("failed to spawn line writer")?;
        let monitor =
            Monitor::new(WindowsHost::new(), config, output).context("failed to install hooks")?;

        spawn_ctrl_c_watcher(monitor.quit_handle()).context("failed to spawn Ctrl-C watcher")?;
        if let Some(quit) = config.filters.quit {
            info!("press {quit} or Ctrl-C to exit");
        }

        monitor.run().context("message loop failed")?;
        monitor.dispose();
        let stats = monitor.stats();

        // The listeners held the last senders; dropping them ends the writer.
        drop(monitor);
        if writer.join().is_err() {
            warn!("line writer panicked");
        }

        info!(
            keyboard = stats.keyboard_events,
            mouse = stats.mouse_events,
            swallowed = stats.swallowed,
            dropped_lines = stats.dropped_lines,
            "hookstream monitor stopped"
        );
        Ok(())
    }
}

#[cfg(not(target_os = "windows"))]
mod platform {
    use super::MonitorConfig;

    pub fn run(_config: &MonitorConfig) -> anyhow::Result<()> {
        anyhow::bail!("global input hooks are only available on Windows")
    }
}
