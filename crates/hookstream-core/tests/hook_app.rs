//! Integration tests for `HookApp`: a session driven by its own message loop.

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use hookstream_core::mock::MockHost;
use hookstream_core::{HookApp, HookError, Key, KeyboardSession, MouseSession, SWALLOW};

const WM_USER: u32 = 0x0400;

fn keyboard_app(host: &MockHost) -> HookApp<KeyboardSession<MockHost>, MockHost> {
    let session = KeyboardSession::new(host.clone()).expect("install must succeed");
    HookApp::new(session, host.clone())
}

#[test]
fn test_run_starts_session_and_routes_messages() {
    // Arrange
    let host = MockHost::us_layout();
    let routed = Rc::new(RefCell::new(Vec::new()));
    let app = {
        let routed = Rc::clone(&routed);
        keyboard_app(&host).with_router(move |msg| routed.borrow_mut().push(msg.message))
    };
    host.post_message(WM_USER);
    host.post_message(WM_USER + 1);

    // Act
    app.run().expect("run");

    // Assert
    assert_eq!(*routed.borrow(), vec![WM_USER, WM_USER + 1]);
    assert!(app.source().is_active());
    assert!(!app.is_running());
}

#[test]
fn test_listener_events_arrive_while_loop_runs() {
    // Arrange
    let host = MockHost::us_layout();
    let typed = Rc::new(RefCell::new(String::new()));
    let app = {
        let host = host.clone();
        keyboard_app(&host).with_router(move |msg| {
            if msg.message == WM_USER {
                host.tap(Key::H);
                host.tap(Key::I);
            }
        })
    };
    {
        let typed = Rc::clone(&typed);
        app.source()
            .add_listener(move |e| typed.borrow_mut().push_str(e.characters()))
            .expect("listener");
    }
    host.post_message(WM_USER);

    // Act
    app.run().expect("run");

    // Assert
    assert_eq!(*typed.borrow(), "hi");
}

#[test]
fn test_exit_from_listener_stops_loop() {
    // Arrange
    let host = MockHost::us_layout();
    let app = Rc::new({
        let host = host.clone();
        keyboard_app(&host).with_router(move |msg| {
            if msg.message == WM_USER {
                host.key_down(Key::ESCAPE);
                host.post_message(WM_USER + 5);
            }
        })
    });
    {
        let weak = Rc::downgrade(&app);
        app.source()
            .add_listener(move |e| {
                if e.key() == Key::ESCAPE {
                    e.set_handled(true);
                    if let Some(app) = weak.upgrade() {
                        app.exit().expect("exit");
                    }
                }
            })
            .expect("listener");
    }
    host.post_message(WM_USER);
    host.post_message(WM_USER + 1);

    // Act
    app.run().expect("run");

    // Assert
    assert_eq!(host.dispatched(), vec![WM_USER, WM_USER + 1]);
    assert_eq!(host.pending_messages(), 1);
}

#[test]
fn test_quit_handle_stops_loop_before_next_message() {
    let host = MockHost::new();
    let quit = Rc::new(RefCell::new(None::<hookstream_core::QuitHandle>));
    let app = {
        let quit = Rc::clone(&quit);
        keyboard_app(&host).with_router(move |_| {
            if let Some(handle) = quit.borrow().as_ref() {
                handle.quit();
            }
        })
    };
    *quit.borrow_mut() = Some(app.quit_handle());
    host.post_message(WM_USER);
    host.post_message(WM_USER + 1);

    app.run().expect("run");

    assert_eq!(host.dispatched(), vec![WM_USER]);
}

#[test]
fn test_exit_outside_loop_is_a_no_op() {
    let host = MockHost::new();
    let app = keyboard_app(&host);

    app.exit().expect("exit");

    assert_eq!(host.pending_messages(), 0);
}

#[test]
fn test_dispose_inside_loop_drains_and_quits() {
    // Arrange
    let host = MockHost::new();
    let app = Rc::new_cyclic(|weak: &std::rc::Weak<HookApp<KeyboardSession<MockHost>, MockHost>>| {
        let weak = weak.clone();
        keyboard_app(&host).with_router(move |msg| {
            if msg.message == WM_USER {
                if let Some(app) = weak.upgrade() {
                    app.dispose();
                }
            }
        })
    });
    host.post_message(WM_USER);
    host.post_message(WM_USER + 1);
    host.post_message(WM_USER + 2);

    // Act
    app.run().expect("run");

    // Assert
    assert_eq!(host.dispatched(), vec![WM_USER, WM_USER + 1, WM_USER + 2]);
    assert_eq!(host.pending_messages(), 0);
    assert!(app.source().is_disposed());
    assert_eq!(host.uninstalls().len(), 1);
}

#[test]
fn test_disposed_app_rejects_run_exit_and_pause() {
    let host = MockHost::new();
    let app = keyboard_app(&host);

    app.dispose();
    app.dispose();

    assert_eq!(app.run(), Err(HookError::Disposed));
    assert_eq!(app.exit(), Err(HookError::Disposed));
    assert_eq!(app.pause(), Err(HookError::Disposed));
}

#[test]
fn test_nested_run_is_rejected() {
    let host = MockHost::new();
    let nested = Rc::new(RefCell::new(None));
    let app = Rc::new_cyclic(|weak: &std::rc::Weak<HookApp<MouseSession<MockHost>, MockHost>>| {
        let weak = weak.clone();
        let nested = Rc::clone(&nested);
        let session = MouseSession::new(host.clone()).expect("install");
        HookApp::new(session, host.clone()).with_router(move |_| {
            if let Some(app) = weak.upgrade() {
                *nested.borrow_mut() = Some(app.run());
            }
        })
    });
    host.post_message(WM_USER);

    app.run().expect("outer run");

    assert_eq!(*nested.borrow(), Some(Err(HookError::LoopRunning)));
}

#[test]
fn test_unwinding_loop_leaves_app_ready_to_run_again() {
    // Arrange
    let host = MockHost::us_layout();
    let routed = Rc::new(RefCell::new(Vec::new()));
    let app = {
        let routed = Rc::clone(&routed);
        let first = Cell::new(true);
        keyboard_app(&host).with_router(move |msg| {
            if first.replace(false) {
                panic!("router failure");
            }
            routed.borrow_mut().push(msg.message);
        })
    };
    host.post_message(WM_USER);

    // Act
    let unwound = panic::catch_unwind(AssertUnwindSafe(|| app.run()));
    host.post_message(WM_USER + 1);
    let second = app.run();

    // Assert
    assert!(unwound.is_err());
    assert_eq!(second, Ok(()));
    assert_eq!(*routed.borrow(), vec![WM_USER + 1]);
    assert!(!app.is_running());
}

#[test]
fn test_handled_event_inside_app_is_swallowed() {
    let host = MockHost::us_layout();
    let app = keyboard_app(&host);
    app.source().add_listener(|e| e.set_handled(true)).expect("listener");

    app.run().expect("run");

    assert_eq!(host.key_down(Key::A), Some(SWALLOW));
}
