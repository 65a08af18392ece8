//! A session bundled with the message loop that drives it.

use std::cell::{Cell, RefCell};

use tracing::debug;

use crate::facility::{HookError, MessagePump, QuitHandle, ThreadMessage};
use crate::session::EventSource;

type Router = Box<dyn FnMut(&ThreadMessage)>;

/// Runs a session's message loop on the current thread.
///
/// For programs that have no message loop of their own. [`HookApp::run`]
/// starts the session and blocks until the loop receives the quit message,
/// posted by [`HookApp::exit`], [`HookApp::dispose`] or a [`QuitHandle`].
///
/// ```ignore
/// let host = WindowsHost::new();
/// let app = HookApp::new(KeyboardSession::new(host)?, host);
/// let quit = app.quit_handle();
/// app.source().add_listener(move |e| if e.key() == Key::ESCAPE { quit.quit() })?;
/// app.run()?;
/// ```
pub struct HookApp<S, P> {
    source: S,
    pump: P,
    router: RefCell<Option<Router>>,
    running: Cell<bool>,
}

impl<S: EventSource, P: MessagePump> HookApp<S, P> {
    pub fn new(source: S, pump: P) -> Self {
        Self {
            source,
            pump,
            router: RefCell::new(None),
            running: Cell::new(false),
        }
    }

    /// Routes every message the loop retrieves to `router`, after the pump
    /// has dispatched it.
    pub fn with_router(self, router: impl FnMut(&ThreadMessage) + 'static) -> Self {
        *self.router.borrow_mut() = Some(Box::new(router));
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Starts the session and runs the message loop until quit.
    ///
    /// # Errors
    ///
    /// [`HookError::Disposed`] after disposal; [`HookError::LoopRunning`]
    /// when called from inside the loop.
    pub fn run(&self) -> Result<(), HookError> {
        if self.running.get() {
            return Err(HookError::LoopRunning);
        }
        self.source.start()?;

        let mut guard = RunGuard {
            running: &self.running,
            slot: &self.router,
            router: self.router.borrow_mut().take(),
        };
        self.running.set(true);
        debug!("message loop entered");
        self.pump.run(&mut |msg| {
            if let Some(route) = guard.router.as_mut() {
                route(msg);
            }
        });
        drop(guard);
        debug!("message loop exited");
        Ok(())
    }

    /// Asks a running loop to exit. No-op when the loop is not running.
    pub fn exit(&self) -> Result<(), HookError> {
        if self.source.is_disposed() {
            return Err(HookError::Disposed);
        }
        if self.running.get() {
            self.pump.post_quit();
        }
        Ok(())
    }

    /// Pauses event delivery; the loop keeps running.
    pub fn pause(&self) -> Result<(), HookError> {
        self.source.pause()
    }

    /// A handle that stops the loop from any thread.
    pub fn quit_handle(&self) -> QuitHandle {
        self.pump.quit_handle()
    }

    /// Disposes the session. A running loop first drains queued messages and
    /// is then told to exit.
    pub fn dispose(&self) {
        if self.source.is_disposed() {
            return;
        }
        self.source.dispose();
        if self.running.get() {
            self.pump.pump_pending(&mut |_| {});
            self.pump.post_quit();
        }
    }
}

/// Clears the running flag and hands the router back when the loop returns
/// or unwinds. A router installed while the loop ran is kept.
struct RunGuard<'a> {
    running: &'a Cell<bool>,
    slot: &'a RefCell<Option<Router>>,
    router: Option<Router>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.set(false);
        if let Ok(mut slot) = self.slot.try_borrow_mut() {
            if slot.is_none() {
                *slot = self.router.take();
            }
        }
    }
}
