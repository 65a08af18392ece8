//! Sessions, rules and the message loop, wired together over any host.

use std::cell::RefCell;
use std::rc::Rc;

use hookstream_core::{
    EventSource, HookApp, HookError, HookFacility, KeyboardHost, KeyboardSession, MessagePump,
    MouseSession, QuitHandle,
};
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::output::{enqueue, LineSender};
use crate::rules::MonitorRules;

/// Event counters, reported when the monitor stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub keyboard_events: u64,
    pub mouse_events: u64,
    pub swallowed: u64,
    /// Lines lost because the output queue was full or closed.
    pub dropped_lines: u64,
}

/// The optional keyboard and mouse sessions, driven as one source.
pub struct MonitorSources<H: HookFacility + KeyboardHost + 'static> {
    pub keyboard: Option<KeyboardSession<H>>,
    pub mouse: Option<MouseSession<H>>,
}

impl<H: HookFacility + KeyboardHost + 'static> EventSource for MonitorSources<H> {
    fn start(&self) -> Result<(), HookError> {
        if let Some(keyboard) = &self.keyboard {
            keyboard.start()?;
        }
        if let Some(mouse) = &self.mouse {
            mouse.start()?;
        }
        Ok(())
    }

    fn pause(&self) -> Result<(), HookError> {
        if let Some(keyboard) = &self.keyboard {
            keyboard.pause()?;
        }
        if let Some(mouse) = &self.mouse {
            mouse.pause()?;
        }
        Ok(())
    }

    fn dispose(&self) {
        if let Some(keyboard) = &self.keyboard {
            keyboard.dispose();
        }
        if let Some(mouse) = &self.mouse {
            mouse.dispose();
        }
    }

    fn is_active(&self) -> bool {
        self.keyboard.as_ref().is_some_and(|s| s.is_active())
            || self.mouse.as_ref().is_some_and(|s| s.is_active())
    }

    fn is_disposed(&self) -> bool {
        self.keyboard.as_ref().map_or(true, |s| s.is_disposed())
            && self.mouse.as_ref().map_or(true, |s| s.is_disposed())
    }
}

/// Prints global input events until the quit combination or a [`QuitHandle`]
/// stops the loop.
pub struct Monitor<H: HookFacility + KeyboardHost + MessagePump + Clone + 'static> {
    app: HookApp<MonitorSources<H>, H>,
    stats: Rc<RefCell<MonitorStats>>,
}

impl<H: HookFacility + KeyboardHost + MessagePump + Clone + 'static> Monitor<H> {
    /// Installs the hooks `config` enables and registers the printing
    /// listeners, which queue their lines on `output`. Nothing is delivered
    /// until [`Monitor::run`].
    ///
    /// # Errors
    ///
    /// Any install failure. Hooks installed before the failure are released.
    pub fn new(host: H, config: &MonitorConfig, output: LineSender) -> Result<Self, HookError> {
        let keyboard = if config.monitor.keyboard {
            Some(KeyboardSession::new(host.clone())?)
        } else {
            None
        };
        let mouse = if config.monitor.mouse {
            Some(MouseSession::new(host.clone())?)
        } else {
            None
        };
        if keyboard.is_none() && mouse.is_none() {
            warn!("both hooks are disabled; the monitor will only wait for quit");
        }

        let app = HookApp::new(MonitorSources { keyboard, mouse }, host);
        let rules = Rc::new(MonitorRules::from_config(config));
        let stats = Rc::new(RefCell::new(MonitorStats::default()));

        if let Some(keyboard) = &app.source().keyboard {
            let rules = Rc::clone(&rules);
            let stats = Rc::clone(&stats);
            let output = output.clone();
            let quit = app.quit_handle();
            keyboard.add_listener(move |event| {
                let mut stats = stats.borrow_mut();
                stats.keyboard_events += 1;
                let quitting = rules.should_quit(event);
                if quitting || rules.should_swallow(event) {
                    event.set_handled(true);
                    stats.swallowed += 1;
                }
                if !enqueue(&output, rules.format_keyboard(event)) {
                    stats.dropped_lines += 1;
                }
                if quitting {
                    info!(key = %event.key(), "quit combination pressed");
                    quit.quit();
                }
            })?;
        }

        if let Some(mouse) = &app.source().mouse {
            let rules = Rc::clone(&rules);
            let stats = Rc::clone(&stats);
            mouse.add_listener(move |event| {
                let mut stats = stats.borrow_mut();
                stats.mouse_events += 1;
                if rules.should_print_mouse(event) && !enqueue(&output, rules.format_mouse(event)) {
                    stats.dropped_lines += 1;
                }
            })?;
        }

        Ok(Self { app, stats })
    }

    /// A `Send` handle that stops [`Monitor::run`] from any thread.
    pub fn quit_handle(&self) -> QuitHandle {
        self.app.quit_handle()
    }

    pub fn sources(&self) -> &MonitorSources<H> {
        self.app.source()
    }

    /// Starts the hooks and blocks in the message loop until quit.
    pub fn run(&self) -> Result<(), HookError> {
        info!("monitor running");
        self.app.run()
    }

    pub fn stats(&self) -> MonitorStats {
        *self.stats.borrow()
    }

    /// Releases both hooks. Also happens on drop.
    pub fn dispose(&self) {
        self.app.dispose();
    }
}
