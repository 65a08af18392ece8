//! Ctrl-C handling.
//!
//! The hook thread is blocked in the message loop, so the signal is awaited
//! on a helper thread with its own current-thread Tokio runtime and turned
//! into a quit message through a [`QuitHandle`].

use std::thread::{self, JoinHandle};

use hookstream_core::QuitHandle;
use tracing::{info, warn};

/// Spawns the watcher. The thread lives until Ctrl-C or process exit.
///
/// # Errors
///
/// Returns the OS error if the thread cannot be spawned.
pub fn spawn_ctrl_c_watcher(quit: QuitHandle) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("ctrl-c-watcher".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("failed to start Ctrl-C runtime: {e}");
                    return;
                }
            };
            runtime.block_on(wait_then_quit(quit));
        })
}

async fn wait_then_quit(quit: QuitHandle) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("shutdown signal received");
            quit.quit();
        }
        Err(e) => warn!("failed to listen for Ctrl-C: {e}"),
    }
}
