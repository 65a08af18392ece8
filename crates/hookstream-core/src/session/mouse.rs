//! Global mouse hook session.

use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::domain::MouseEvent;
use crate::facility::{HookError, HookFacility, HookKind, SignalSink};
use crate::pipeline::{classify_mouse, ListenerId, RawSignal, SignalData, HC_ACTION};
use crate::session::link::HookLink;
use crate::session::EventSource;

/// Owns one global mouse hook and turns its raw signals into
/// [`MouseEvent`]s for registered listeners.
///
/// Same threading, listener and lifecycle rules as
/// [`crate::session::KeyboardSession`]. Mouse classification is stateless, so
/// there is nothing to reconcile on resume.
pub struct MouseSession<H>
where
    H: HookFacility + 'static,
{
    inner: Rc<MouseInner<H>>,
}

struct MouseInner<H: HookFacility> {
    link: HookLink<H, MouseEvent>,
}

impl<H> MouseSession<H>
where
    H: HookFacility + 'static,
{
    /// Installs a mouse hook through `host`. The session starts paused.
    pub fn new(host: H) -> Result<Self, HookError> {
        let inner = Rc::new(MouseInner {
            link: HookLink::new(host, HookKind::Mouse),
        });
        let weak: Weak<MouseInner<H>> = Rc::downgrade(&inner);
        let sink: Weak<dyn SignalSink> = weak;
        let handle = inner.link.host.install(HookKind::Mouse, sink)?;
        inner.link.attach(handle);
        Ok(Self { inner })
    }

    pub fn start(&self) -> Result<(), HookError> {
        if self.inner.link.lifecycle.start()? {
            debug!("mouse session started");
        }
        Ok(())
    }

    pub fn pause(&self) -> Result<(), HookError> {
        self.inner.link.pause()
    }

    pub fn dispose(&self) {
        self.inner.link.dispose();
    }

    pub fn is_active(&self) -> bool {
        self.inner.link.is_active()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.link.lifecycle.is_disposed()
    }

    pub fn add_listener(
        &self,
        listener: impl FnMut(&mut MouseEvent) + 'static,
    ) -> Result<ListenerId, HookError> {
        self.inner.link.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> Result<bool, HookError> {
        self.inner.link.remove_listener(id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.link.listener_count()
    }

    pub fn handle(&self) -> Option<H::Handle> {
        self.inner.link.handle()
    }
}

impl<H: HookFacility> SignalSink for MouseInner<H> {
    fn on_signal(&self, code: i32, signal: &RawSignal) -> isize {
        let link = &self.link;
        if code != HC_ACTION || !link.is_active() {
            return link.forward(code, signal);
        }
        if link.is_dispatching() {
            trace!("re-entrant mouse signal forwarded untouched");
            return link.forward(code, signal);
        }
        let SignalData::Mouse { point, mouse_data, .. } = signal.data else {
            return link.forward(code, signal);
        };

        let class = classify_mouse(signal.message, mouse_data);
        trace!(kind = ?class.kind, button = ?class.button, delta = class.delta, "mouse signal classified");
        let mut event = MouseEvent::new(point, class.kind, class.button, class.delta, signal.message);
        link.deliver(&mut event, code, signal)
    }
}

impl<H: HookFacility + 'static> EventSource for MouseSession<H> {
    fn start(&self) -> Result<(), HookError> {
        MouseSession::start(self)
    }

    fn pause(&self) -> Result<(), HookError> {
        MouseSession::pause(self)
    }

    fn dispose(&self) {
        MouseSession::dispose(self);
    }

    fn is_active(&self) -> bool {
        MouseSession::is_active(self)
    }

    fn is_disposed(&self) -> bool {
        MouseSession::is_disposed(self)
    }
}

impl<H: HookFacility + 'static> Drop for MouseSession<H> {
    fn drop(&mut self) {
        self.inner.link.dispose();
    }
}

impl<H: HookFacility + 'static> std::fmt::Debug for MouseSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MouseSession")
            .field("state", &self.inner.link.lifecycle.state())
            .field("handle", &self.inner.link.handle())
            .field("listeners", &self.inner.link.listener_count())
            .finish()
    }
}
