//! In-process host for testing sessions without an operating system.
//!
//! [`MockHost`] implements [`HookFacility`], [`KeyboardHost`] and
//! [`MessagePump`]. Tests keep a clone of the host, hand another to a session
//! and then drive the session by delivering synthetic raw signals:
//!
//! ```
//! use hookstream_core::mock::MockHost;
//! use hookstream_core::{Key, KeyboardSession};
//!
//! let host = MockHost::us_layout();
//! let session = KeyboardSession::new(host.clone()).unwrap();
//! session.start().unwrap();
//! session.add_listener(|e| assert_eq!(e.characters(), "a")).unwrap();
//! host.key_down(Key::A);
//! ```
//!
//! The host records every install, uninstall and forward so tests can assert
//! on how signals were disposed of.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::Point;
use crate::facility::{
    HookError, HookFacility, HookKind, KeyboardHost, MessagePump, QuitHandle, SignalSink,
    ThreadMessage,
};
use crate::keymap::Key;
use crate::pipeline::signal::message::{WM_KEYDOWN, WM_KEYUP, WM_QUIT};
use crate::pipeline::{ModifierBuffer, RawSignal, HC_ACTION};

/// What [`MockHost::forward`] returns, like an empty hook chain.
pub const FORWARDED: isize = 0;

/// Handle issued by [`MockHost::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockHandle(pub u32);

/// One call to [`HookFacility::forward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardRecord {
    pub handle: Option<MockHandle>,
    pub code: i32,
    pub message: u32,
}

struct InstalledHook {
    handle: MockHandle,
    kind: HookKind,
    sink: Weak<dyn SignalSink>,
}

#[derive(Default)]
struct MockState {
    next_handle: u32,
    hooks: Vec<InstalledHook>,
    installs: Vec<(HookKind, MockHandle)>,
    uninstalls: Vec<MockHandle>,
    forwards: Vec<ForwardRecord>,
    fail_install: Option<String>,
    fail_uninstall: bool,

    layout: HashMap<Key, (String, String)>,
    dead_keys: HashMap<Key, char>,
    compositions: HashMap<(char, Key), String>,
    pending_dead: Option<char>,
    toggled: BTreeSet<Key>,
    pressed: BTreeSet<Key>,
    decode_calls: usize,

    queue: VecDeque<ThreadMessage>,
    dispatched: Vec<u32>,
}

/// A recording, scriptable host. Clones share state.
#[derive(Clone, Default)]
pub struct MockHost {
    state: Rc<RefCell<MockState>>,
    quit_requested: Arc<AtomicBool>,
}

impl MockHost {
    /// A host with an empty layout: every key decodes to nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// A host with US-style letters, digits and space mapped.
    pub fn us_layout() -> Self {
        let host = Self::new();
        for code in b'A'..=b'Z' {
            let upper = char::from(code).to_string();
            host.map_key(Key(code), &upper.to_lowercase(), &upper);
        }
        let shifted_digits = [")", "!", "@", "#", "$", "%", "^", "&", "*", "("];
        for (n, shifted) in shifted_digits.iter().enumerate() {
            let code = b'0' + n as u8;
            host.map_key(Key(code), &char::from(code).to_string(), shifted);
        }
        host.map_key(Key::SPACE, " ", " ");
        host
    }

    // ── Scripting ────────────────────────────────────────────────────────────

    /// Makes `key` type `plain`, or `shifted` while Shift is held.
    pub fn map_key(&self, key: Key, plain: &str, shifted: &str) {
        self.state
            .borrow_mut()
            .layout
            .insert(key, (plain.to_string(), shifted.to_string()));
    }

    /// Makes `key` a dead key carrying `accent`.
    pub fn add_dead_key(&self, key: Key, accent: char) {
        self.state.borrow_mut().dead_keys.insert(key, accent);
    }

    /// What `key` types right after dead key `accent`.
    pub fn add_composition(&self, accent: char, key: Key, text: &str) {
        self.state
            .borrow_mut()
            .compositions
            .insert((accent, key), text.to_string());
    }

    pub fn set_toggled(&self, key: Key, on: bool) {
        let mut state = self.state.borrow_mut();
        if on {
            state.toggled.insert(key);
        } else {
            state.toggled.remove(&key);
        }
    }

    /// Sets what [`KeyboardHost::query_key_pressed`] reports for `key`.
    pub fn set_pressed(&self, key: Key, pressed: bool) {
        let mut state = self.state.borrow_mut();
        if pressed {
            state.pressed.insert(key);
        } else {
            state.pressed.remove(&key);
        }
    }

    /// The next install fails with `reason`.
    pub fn fail_next_install(&self, reason: &str) {
        self.state.borrow_mut().fail_install = Some(reason.to_string());
    }

    /// Every uninstall fails while set.
    pub fn fail_uninstall(&self, fail: bool) {
        self.state.borrow_mut().fail_uninstall = fail;
    }

    /// Queues a message for [`MessagePump::run`].
    pub fn post_message(&self, message: u32) {
        self.state.borrow_mut().queue.push_back(ThreadMessage {
            message,
            ..ThreadMessage::default()
        });
    }

    // ── Delivery ─────────────────────────────────────────────────────────────

    /// Delivers `signal` to the installed hook of `kind`, as the host's
    /// callback would. `None` when no such hook is installed.
    pub fn deliver(&self, kind: HookKind, code: i32, signal: &RawSignal) -> Option<isize> {
        let (handle, sink) = {
            let state = self.state.borrow();
            let hook = state.hooks.iter().find(|h| h.kind == kind)?;
            (hook.handle, hook.sink.clone())
        };
        match sink.upgrade() {
            Some(sink) => Some(sink.on_signal(code, signal)),
            None => Some(self.forward(Some(handle), code, signal)),
        }
    }

    pub fn key_down(&self, key: Key) -> Option<isize> {
        self.deliver(
            HookKind::Keyboard,
            HC_ACTION,
            &RawSignal::keyboard(WM_KEYDOWN, key, u32::from(key.code())),
        )
    }

    pub fn key_up(&self, key: Key) -> Option<isize> {
        self.deliver(
            HookKind::Keyboard,
            HC_ACTION,
            &RawSignal::keyboard(WM_KEYUP, key, u32::from(key.code())),
        )
    }

    /// Presses and releases `key`, returning both callback results.
    pub fn tap(&self, key: Key) -> (Option<isize>, Option<isize>) {
        (self.key_down(key), self.key_up(key))
    }

    pub fn mouse(&self, message: u32, point: Point, mouse_data: u32) -> Option<isize> {
        self.deliver(
            HookKind::Mouse,
            HC_ACTION,
            &RawSignal::mouse(message, point, mouse_data),
        )
    }

    // ── Records ──────────────────────────────────────────────────────────────

    pub fn is_installed(&self, kind: HookKind) -> bool {
        self.state.borrow().hooks.iter().any(|h| h.kind == kind)
    }

    pub fn installs(&self) -> Vec<(HookKind, MockHandle)> {
        self.state.borrow().installs.clone()
    }

    pub fn uninstalls(&self) -> Vec<MockHandle> {
        self.state.borrow().uninstalls.clone()
    }

    pub fn forwards(&self) -> Vec<ForwardRecord> {
        self.state.borrow().forwards.clone()
    }

    pub fn forward_count(&self) -> usize {
        self.state.borrow().forwards.len()
    }

    pub fn decode_calls(&self) -> usize {
        self.state.borrow().decode_calls
    }

    /// Ids of messages handed to `on_message` by the pump.
    pub fn dispatched(&self) -> Vec<u32> {
        self.state.borrow().dispatched.clone()
    }

    pub fn pending_messages(&self) -> usize {
        self.state.borrow().queue.len()
    }

    pub fn clear_records(&self) {
        let mut state = self.state.borrow_mut();
        state.installs.clear();
        state.uninstalls.clear();
        state.forwards.clear();
        state.dispatched.clear();
        state.decode_calls = 0;
    }

    fn pop_message(&self, stop_at_quit: bool) -> Option<ThreadMessage> {
        let mut state = self.state.borrow_mut();
        if stop_at_quit && state.queue.front().map(|m| m.message) == Some(WM_QUIT) {
            return None;
        }
        state.queue.pop_front()
    }

    fn record_dispatch(&self, message: u32) {
        self.state.borrow_mut().dispatched.push(message);
    }
}

impl std::fmt::Debug for MockHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MockHost")
            .field("hooks", &state.hooks.len())
            .field("forwards", &state.forwards.len())
            .field("queue", &state.queue.len())
            .finish()
    }
}

impl HookFacility for MockHost {
    type Handle = MockHandle;

    fn install(&self, kind: HookKind, sink: Weak<dyn SignalSink>) -> Result<MockHandle, HookError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = state.fail_install.take() {
            return Err(HookError::Install { kind, reason });
        }
        if state.hooks.iter().any(|h| h.kind == kind) {
            return Err(HookError::AlreadyInstalled(kind));
        }
        state.next_handle += 1;
        let handle = MockHandle(state.next_handle);
        state.hooks.push(InstalledHook { handle, kind, sink });
        state.installs.push((kind, handle));
        Ok(handle)
    }

    fn uninstall(&self, handle: MockHandle) -> Result<(), HookError> {
        let mut state = self.state.borrow_mut();
        state.uninstalls.push(handle);
        if state.fail_uninstall {
            return Err(HookError::Uninstall(format!("{handle:?} refused")));
        }
        let before = state.hooks.len();
        state.hooks.retain(|h| h.handle != handle);
        if state.hooks.len() == before {
            return Err(HookError::Uninstall(format!("{handle:?} is not installed")));
        }
        Ok(())
    }

    fn forward(&self, handle: Option<MockHandle>, code: i32, signal: &RawSignal) -> isize {
        self.state.borrow_mut().forwards.push(ForwardRecord {
            handle,
            code,
            message: signal.message,
        });
        FORWARDED
    }
}

/// Decoding follows a simple model: Shift selects the shifted text, CapsLock
/// inverts Shift for alphabetic keys, Ctrl without Alt types nothing, and a
/// dead key either composes with the next mapped key or is emitted before it.
impl KeyboardHost for MockHost {
    fn decode_characters(
        &self,
        key: Key,
        _scan_code: u32,
        modifiers: &ModifierBuffer,
        out: &mut [u16],
    ) -> i32 {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.decode_calls += 1;

        if modifiers.is_down(Key::CONTROL) && !modifiers.is_down(Key::MENU) {
            return 0;
        }

        if let Some(accent) = state.dead_keys.get(&key).copied() {
            return match state.pending_dead.take() {
                Some(previous) => write_units(out, &format!("{previous}{accent}")),
                None => {
                    state.pending_dead = Some(accent);
                    write_units(out, &accent.to_string());
                    -1
                }
            };
        }

        let Some((plain, shifted)) = state.layout.get(&key).cloned() else {
            return 0;
        };
        let caps = modifiers.is_toggled(Key::CAPITAL) && plain.chars().all(char::is_alphabetic);
        let text = if modifiers.is_down(Key::SHIFT) != caps {
            shifted
        } else {
            plain
        };

        match state.pending_dead.take() {
            Some(accent) => match state.compositions.get(&(accent, key)).cloned() {
                Some(composed) => write_units(out, &composed),
                None => write_units(out, &format!("{accent}{text}")),
            },
            None => write_units(out, &text),
        }
    }

    fn query_key_toggle_state(&self, key: Key) -> i16 {
        i16::from(self.state.borrow().toggled.contains(&key))
    }

    fn query_key_pressed(&self, key: Key) -> bool {
        self.state.borrow().pressed.contains(&key)
    }
}

fn write_units(out: &mut [u16], text: &str) -> i32 {
    let mut n = 0;
    for (slot, unit) in out.iter_mut().zip(text.encode_utf16()) {
        *slot = unit;
        n += 1;
    }
    n
}

/// The queue ends the loop when it runs dry so tests never block.
impl MessagePump for MockHost {
    fn run(&self, on_message: &mut dyn FnMut(&ThreadMessage)) {
        loop {
            if self.quit_requested.swap(false, Ordering::SeqCst) {
                break;
            }
            let Some(msg) = self.pop_message(false) else {
                break;
            };
            if msg.message == WM_QUIT {
                break;
            }
            self.record_dispatch(msg.message);
            on_message(&msg);
        }
    }

    fn pump_pending(&self, on_message: &mut dyn FnMut(&ThreadMessage)) {
        while let Some(msg) = self.pop_message(true) {
            self.record_dispatch(msg.message);
            on_message(&msg);
        }
    }

    fn post_quit(&self) {
        self.post_message(WM_QUIT);
    }

    fn quit_handle(&self) -> QuitHandle {
        let flag = Arc::clone(&self.quit_requested);
        QuitHandle::new(move || flag.store(true, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        seen: RefCell<Vec<u32>>,
    }

    impl SignalSink for Recorder {
        fn on_signal(&self, _code: i32, signal: &RawSignal) -> isize {
            self.seen.borrow_mut().push(signal.message);
            7
        }
    }

    fn recorder() -> Rc<Recorder> {
        Rc::new(Recorder {
            seen: RefCell::new(Vec::new()),
        })
    }

    #[test]
    fn test_deliver_reaches_installed_sink() {
        // Arrange
        let host = MockHost::new();
        let sink = recorder();
        let weak: Weak<Recorder> = Rc::downgrade(&sink);
        host.install(HookKind::Keyboard, weak).expect("install");

        // Act
        let result = host.key_down(Key::A);

        // Assert
        assert_eq!(result, Some(7));
        assert_eq!(*sink.seen.borrow(), vec![WM_KEYDOWN]);
        assert_eq!(host.mouse(0x200, Point::default(), 0), None);
    }

    #[test]
    fn test_second_install_of_same_kind_is_rejected() {
        let host = MockHost::new();
        let sink = recorder();
        let weak: Weak<Recorder> = Rc::downgrade(&sink);
        host.install(HookKind::Mouse, weak.clone()).expect("first install");

        let second = host.install(HookKind::Mouse, weak);

        assert_eq!(second, Err(HookError::AlreadyInstalled(HookKind::Mouse)));
    }

    #[test]
    fn test_dropped_sink_is_forwarded() {
        let host = MockHost::new();
        let weak: Weak<Recorder> = Rc::downgrade(&recorder());
        host.install(HookKind::Keyboard, weak).expect("install");

        assert_eq!(host.key_down(Key::A), Some(FORWARDED));
        assert_eq!(host.forward_count(), 1);
    }

    #[test]
    fn test_dead_key_composes_with_next_key() {
        // Arrange
        let host = MockHost::us_layout();
        host.add_dead_key(Key::OEM_7, '\u{b4}');
        host.add_composition('\u{b4}', Key::E, "\u{e9}");
        let buf = ModifierBuffer::new();
        let mut out = [0u16; 8];

        // Act
        let dead = host.decode_characters(Key::OEM_7, 0, &buf, &mut out);
        let composed = host.decode_characters(Key::E, 0, &buf, &mut out);

        // Assert
        assert_eq!(dead, -1);
        assert_eq!(composed, 1);
        assert_eq!(String::from_utf16_lossy(&out[..1]), "\u{e9}");
    }

    #[test]
    fn test_run_stops_at_quit_and_pump_pending_leaves_it_queued() {
        let host = MockHost::new();
        host.post_message(0x400);
        host.post_quit();
        host.post_message(0x401);

        host.pump_pending(&mut |_| {});
        assert_eq!(host.dispatched(), vec![0x400]);
        assert_eq!(host.pending_messages(), 2);

        host.run(&mut |_| {});
        assert_eq!(host.dispatched(), vec![0x400]);
        assert_eq!(host.pending_messages(), 1);
    }
}
