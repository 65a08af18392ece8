//! State shared by keyboard and mouse sessions: the native handle, the
//! lifecycle and the listener registry.

use std::cell::{Cell, RefCell};

use tracing::{debug, trace, warn};

use crate::facility::{HookError, HookFacility, HookKind};
use crate::pipeline::{Cancellable, Dispatcher, ListenerId, RawSignal, SWALLOW};
use crate::session::lifecycle::Lifecycle;

pub(crate) struct HookLink<H: HookFacility, E> {
    pub(crate) host: H,
    kind: HookKind,
    handle: Cell<Option<H::Handle>>,
    pub(crate) lifecycle: Lifecycle,
    listeners: RefCell<Dispatcher<E>>,
    listener_count: Cell<usize>,
    /// Set when dispose ran while the registry was borrowed by a dispatch.
    clear_pending: Cell<bool>,
}

impl<H: HookFacility, E: Cancellable> HookLink<H, E> {
    pub(crate) fn new(host: H, kind: HookKind) -> Self {
        Self {
            host,
            kind,
            handle: Cell::new(None),
            lifecycle: Lifecycle::new(),
            listeners: RefCell::new(Dispatcher::new()),
            listener_count: Cell::new(0),
            clear_pending: Cell::new(false),
        }
    }

    pub(crate) fn attach(&self, handle: H::Handle) {
        debug!(kind = %self.kind, ?handle, "hook installed");
        self.handle.set(Some(handle));
    }

    pub(crate) fn handle(&self) -> Option<H::Handle> {
        self.handle.get()
    }

    pub(crate) fn is_active(&self) -> bool {
        self.handle.get().is_some() && self.lifecycle.is_active()
    }

    pub(crate) fn pause(&self) -> Result<(), HookError> {
        if self.lifecycle.pause()? {
            debug!(kind = %self.kind, "session paused");
        }
        Ok(())
    }

    /// Uninstalls the hook and drops every listener. Never fails; an
    /// uninstall error is logged and otherwise ignored.
    pub(crate) fn dispose(&self) {
        if !self.lifecycle.dispose() {
            return;
        }
        if let Some(handle) = self.handle.take() {
            match self.host.uninstall(handle) {
                Ok(()) => debug!(kind = %self.kind, ?handle, "hook uninstalled"),
                Err(e) => warn!(kind = %self.kind, ?handle, "uninstall failed during dispose: {e}"),
            }
        }
        match self.listeners.try_borrow_mut() {
            Ok(mut listeners) => listeners.clear(),
            Err(_) => self.clear_pending.set(true),
        }
        self.listener_count.set(0);
    }

    pub(crate) fn add_listener(
        &self,
        listener: impl FnMut(&mut E) + 'static,
    ) -> Result<ListenerId, HookError> {
        if self.lifecycle.is_disposed() {
            return Err(HookError::Disposed);
        }
        let mut listeners = self
            .listeners
            .try_borrow_mut()
            .map_err(|_| HookError::RegistryBusy)?;
        let id = listeners.add(listener);
        self.listener_count.set(listeners.len());
        Ok(id)
    }

    pub(crate) fn remove_listener(&self, id: ListenerId) -> Result<bool, HookError> {
        let mut listeners = self
            .listeners
            .try_borrow_mut()
            .map_err(|_| HookError::RegistryBusy)?;
        let removed = listeners.remove(id);
        self.listener_count.set(listeners.len());
        Ok(removed)
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listener_count.get()
    }

    /// True while a dispatch holds the registry, i.e. the current signal
    /// arrived from inside a listener.
    pub(crate) fn is_dispatching(&self) -> bool {
        self.listeners.try_borrow().is_err()
    }

    pub(crate) fn forward(&self, code: i32, signal: &RawSignal) -> isize {
        self.host.forward(self.handle.get(), code, signal)
    }

    /// Dispatches `event` and translates the outcome into the callback
    /// result: swallow if handled, otherwise forward with the original code.
    pub(crate) fn deliver(&self, event: &mut E, code: i32, signal: &RawSignal) -> isize {
        let handled = match self.listeners.try_borrow_mut() {
            Ok(mut listeners) => listeners.dispatch(event),
            Err(_) => {
                trace!(kind = %self.kind, "re-entrant signal forwarded without dispatch");
                return self.forward(code, signal);
            }
        };
        if self.clear_pending.take() {
            if let Ok(mut listeners) = self.listeners.try_borrow_mut() {
                listeners.clear();
            }
        }
        if handled {
            SWALLOW
        } else {
            self.forward(code, signal)
        }
    }
}
