//! Ordered listener registry and synchronous dispatch.

use std::fmt;

use crate::domain::{KeyboardEvent, MouseEvent};

/// Events that carry a cancellation flag.
pub trait Cancellable {
    fn handled(&self) -> bool;
}

impl Cancellable for KeyboardEvent {
    fn handled(&self) -> bool {
        KeyboardEvent::handled(self)
    }
}

impl Cancellable for MouseEvent {
    fn handled(&self) -> bool {
        MouseEvent::handled(self)
    }
}

/// Identifies a registered listener for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

type Listener<E> = Box<dyn FnMut(&mut E)>;

/// Listeners for one event type, invoked in registration order.
///
/// Every listener receives the same event, so later listeners see earlier
/// listeners' cancellation decisions. A panicking listener aborts dispatch;
/// nothing here catches it.
pub struct Dispatcher<E> {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener<E>)>,
}

impl<E: Cancellable> Dispatcher<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    pub fn add(&mut self, listener: impl FnMut(&mut E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if `id` was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|(lid, _)| *lid == id) {
            Some(index) => {
                drop(self.listeners.remove(index));
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Runs every listener on `event` and returns the final cancellation flag.
    pub fn dispatch(&mut self, event: &mut E) -> bool {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
        event.handled()
    }
}

impl<E: Cancellable> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::domain::{MouseButton, MouseEventKind, Point};

    fn click() -> MouseEvent {
        MouseEvent::new(
            Point::new(0, 0),
            MouseEventKind::ButtonDown,
            MouseButton::Left,
            0,
            0x0201,
        )
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        // Arrange
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = Dispatcher::<MouseEvent>::new();
        for n in 0..3 {
            let order = Rc::clone(&order);
            dispatcher.add(move |_| order.borrow_mut().push(n));
        }

        // Act
        dispatcher.dispatch(&mut click());

        // Assert
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_later_listener_sees_and_can_revert_cancellation() {
        let seen = Rc::new(RefCell::new(None));
        let mut dispatcher = Dispatcher::<MouseEvent>::new();
        dispatcher.add(|e| e.set_handled(true));
        {
            let seen = Rc::clone(&seen);
            dispatcher.add(move |e| {
                *seen.borrow_mut() = Some(e.handled());
                e.set_handled(false);
            });
        }

        let handled = dispatcher.dispatch(&mut click());

        assert_eq!(*seen.borrow(), Some(true));
        assert!(!handled);
    }

    #[test]
    fn test_remove_unregisters_only_the_given_listener() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = Dispatcher::<MouseEvent>::new();
        let ids: Vec<_> = (0..3)
            .map(|n| {
                let calls = Rc::clone(&calls);
                dispatcher.add(move |_| calls.borrow_mut().push(n))
            })
            .collect();

        assert!(dispatcher.remove(ids[1]));
        assert!(!dispatcher.remove(ids[1]));
        dispatcher.dispatch(&mut click());

        assert_eq!(*calls.borrow(), vec![0, 2]);
        assert_eq!(dispatcher.len(), 2);
    }

    #[test]
    fn test_empty_dispatcher_leaves_event_unhandled() {
        let mut dispatcher = Dispatcher::<MouseEvent>::new();
        assert!(dispatcher.is_empty());
        assert!(!dispatcher.dispatch(&mut click()));
    }

    #[test]
    fn test_ids_are_not_reused_after_clear() {
        let mut dispatcher = Dispatcher::<MouseEvent>::new();
        let first = dispatcher.add(|_| {});
        dispatcher.clear();
        let second = dispatcher.add(|_| {});
        assert_ne!(first, second);
    }
}
