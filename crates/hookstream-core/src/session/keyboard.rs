//! Global keyboard hook session.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::domain::{HeldKeySet, KeyTransition, KeyboardEvent, KeyboardState};
use crate::facility::{HookError, HookFacility, HookKind, KeyboardHost, SignalSink};
use crate::pipeline::{
    classify_key, key_direction, CharacterResolver, ListenerId, RawSignal, SignalData, HC_ACTION,
};
use crate::session::link::HookLink;
use crate::session::EventSource;

/// Owns one global keyboard hook and turns its raw signals into
/// [`KeyboardEvent`]s for registered listeners.
///
/// # Threading
///
/// A session is bound to the thread that created it: the hook is installed
/// there, callbacks arrive there (only while that thread runs a message
/// loop), and the type is neither `Send` nor `Sync`. Independent sessions on
/// independent threads share nothing.
///
/// # Listeners
///
/// Listeners run synchronously inside the hook callback, on the critical path
/// of global input delivery. They must not block and must not panic: a panic
/// unwinds into the host's callback frame, which aborts the process.
///
/// # Lifecycle
///
/// [`KeyboardSession::new`] installs the hook and leaves the session paused;
/// paused sessions forward every signal untouched. Dropping the session
/// disposes it.
pub struct KeyboardSession<H>
where
    H: HookFacility + KeyboardHost + 'static,
{
    inner: Rc<KeyboardInner<H>>,
}

struct KeyboardInner<H: HookFacility + KeyboardHost> {
    link: HookLink<H, KeyboardEvent>,
    held: RefCell<HeldKeySet>,
    resolver: RefCell<CharacterResolver>,
}

impl<H> KeyboardSession<H>
where
    H: HookFacility + KeyboardHost + 'static,
{
    /// Installs a keyboard hook through `host`.
    ///
    /// # Errors
    ///
    /// Whatever the host's install reports, typically
    /// [`HookError::Install`] or [`HookError::AlreadyInstalled`]. Nothing
    /// stays installed on failure.
    pub fn new(host: H) -> Result<Self, HookError> {
        let inner = Rc::new(KeyboardInner {
            link: HookLink::new(host, HookKind::Keyboard),
            held: RefCell::new(HeldKeySet::new()),
            resolver: RefCell::new(CharacterResolver::new()),
        });
        let weak: Weak<KeyboardInner<H>> = Rc::downgrade(&inner);
        let sink: Weak<dyn SignalSink> = weak;
        let handle = inner.link.host.install(HookKind::Keyboard, sink)?;
        inner.link.attach(handle);
        Ok(Self { inner })
    }

    /// Starts delivering events.
    ///
    /// When resuming from a pause, keys the host no longer reports as
    /// physically pressed are dropped from the held set, so a release missed
    /// while paused does not turn the next press into a hold.
    pub fn start(&self) -> Result<(), HookError> {
        let link = &self.inner.link;
        if link.lifecycle.start()? {
            let host = &link.host;
            let pruned = self
                .inner
                .held
                .borrow_mut()
                .retain(|key| host.query_key_pressed(key));
            debug!(pruned, "keyboard session started");
        }
        Ok(())
    }

    /// Stops delivering events. The held set is left as it is.
    pub fn pause(&self) -> Result<(), HookError> {
        self.inner.link.pause()
    }

    /// Uninstalls the hook and drops every listener. Idempotent.
    pub fn dispose(&self) {
        self.inner.link.dispose();
    }

    /// True iff the hook is installed, the session is started and not disposed.
    pub fn is_active(&self) -> bool {
        self.inner.link.is_active()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.link.lifecycle.is_disposed()
    }

    /// Registers a listener. Listeners run in registration order.
    ///
    /// # Errors
    ///
    /// [`HookError::RegistryBusy`] when called from inside a listener of this
    /// session; [`HookError::Disposed`] after disposal.
    pub fn add_listener(
        &self,
        listener: impl FnMut(&mut KeyboardEvent) + 'static,
    ) -> Result<ListenerId, HookError> {
        self.inner.link.add_listener(listener)
    }

    /// Unregisters a listener. `Ok(false)` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> Result<bool, HookError> {
        self.inner.link.remove_listener(id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.link.listener_count()
    }

    /// Snapshot of the keys this session believes to be held.
    pub fn held_keys(&self) -> KeyboardState {
        self.inner.held.borrow().snapshot()
    }

    pub fn handle(&self) -> Option<H::Handle> {
        self.inner.link.handle()
    }
}

impl<H> SignalSink for KeyboardInner<H>
where
    H: HookFacility + KeyboardHost,
{
    fn on_signal(&self, code: i32, signal: &RawSignal) -> isize {
        let link = &self.link;
        if code != HC_ACTION || !link.is_active() {
            return link.forward(code, signal);
        }
        if link.is_dispatching() {
            trace!("re-entrant keyboard signal forwarded untouched");
            return link.forward(code, signal);
        }
        let SignalData::Keyboard { key, scan_code, .. } = signal.data else {
            return link.forward(code, signal);
        };
        let Some(direction) = key_direction(signal.message) else {
            trace!(message = signal.message, "unrecognised keyboard message forwarded");
            return link.forward(code, signal);
        };

        let (transition, state) = {
            let mut held = self.held.borrow_mut();
            let transition = classify_key(direction, key, &mut held);
            (transition, held.snapshot())
        };

        let characters = match transition {
            KeyTransition::Up => String::new(),
            KeyTransition::Down | KeyTransition::Hold => {
                self.resolver
                    .borrow_mut()
                    .resolve(&link.host, key, scan_code, &state)
            }
        };

        trace!(?transition, %key, scan_code, chars = %characters, "keyboard signal classified");
        let mut event = KeyboardEvent::new(transition, key, scan_code, state, characters);
        link.deliver(&mut event, code, signal)
    }
}

impl<H> EventSource for KeyboardSession<H>
where
    H: HookFacility + KeyboardHost + 'static,
{
    fn start(&self) -> Result<(), HookError> {
        KeyboardSession::start(self)
    }

    fn pause(&self) -> Result<(), HookError> {
        KeyboardSession::pause(self)
    }

    fn dispose(&self) {
        KeyboardSession::dispose(self);
    }

    fn is_active(&self) -> bool {
        KeyboardSession::is_active(self)
    }

    fn is_disposed(&self) -> bool {
        KeyboardSession::is_disposed(self)
    }
}

impl<H> Drop for KeyboardSession<H>
where
    H: HookFacility + KeyboardHost + 'static,
{
    fn drop(&mut self) {
        self.inner.link.dispose();
    }
}

impl<H> std::fmt::Debug for KeyboardSession<H>
where
    H: HookFacility + KeyboardHost + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardSession")
            .field("state", &self.inner.link.lifecycle.state())
            .field("handle", &self.inner.link.handle())
            .field("held", &self.inner.held.borrow().len())
            .field("listeners", &self.inner.link.listener_count())
            .finish()
    }
}
