//! `WH_KEYBOARD_LL` / `WH_MOUSE_LL` installation and the native callbacks.
//!
//! The native hook procedure receives no user data, so each installing thread
//! keeps one route per [`HookKind`] in thread-local storage. The route holds a
//! weak reference to the owning session; once the session is gone the callback
//! degrades to a plain `CallNextHookEx`.

use std::cell::RefCell;
use std::rc::Weak;
use std::thread::LocalKey;

use hookstream_core::pipeline::NativeArgs;
use hookstream_core::{
    HookError, HookFacility, HookKind, Key, Point, RawSignal, SignalData, SignalSink, HC_ACTION,
};
use tracing::debug;
use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, SetWindowsHookExW, UnhookWindowsHookEx, HHOOK, HOOKPROC, KBDLLHOOKSTRUCT,
    MSLLHOOKSTRUCT, WH_KEYBOARD_LL, WH_MOUSE_LL, WINDOWS_HOOK_ID,
};

use crate::WindowsHost;

struct Route {
    hook: HHOOK,
    sink: Weak<dyn SignalSink>,
}

thread_local! {
    static KEYBOARD_ROUTE: RefCell<Option<Route>> = const { RefCell::new(None) };
    static MOUSE_ROUTE: RefCell<Option<Route>> = const { RefCell::new(None) };
}

fn route_for(kind: HookKind) -> &'static LocalKey<RefCell<Option<Route>>> {
    match kind {
        HookKind::Keyboard => &KEYBOARD_ROUTE,
        HookKind::Mouse => &MOUSE_ROUTE,
    }
}

fn native_hook(kind: HookKind) -> (WINDOWS_HOOK_ID, HOOKPROC) {
    match kind {
        HookKind::Keyboard => (WH_KEYBOARD_LL, Some(keyboard_hook_proc)),
        HookKind::Mouse => (WH_MOUSE_LL, Some(mouse_hook_proc)),
    }
}

/// Returns `true` if the calling thread currently routes hooks of `kind`.
pub fn is_routed(kind: HookKind) -> bool {
    route_for(kind).with(|route| route.borrow().is_some())
}

impl HookFacility for WindowsHost {
    type Handle = HHOOK;

    fn install(&self, kind: HookKind, sink: Weak<dyn SignalSink>) -> Result<HHOOK, HookError> {
        if is_routed(kind) {
            return Err(HookError::AlreadyInstalled(kind));
        }

        let (id, proc) = native_hook(kind);
        // SAFETY: GetModuleHandleW(None) returns the handle of the running
        // executable and has no preconditions.
        let module = unsafe { GetModuleHandleW(None) }.ok().map(HINSTANCE::from);
        // SAFETY: `proc` is a valid `extern "system"` hook procedure for `id`.
        // Low-level hooks run on this thread, which must pump messages for the
        // callback to be invoked.
        let hook = unsafe { SetWindowsHookExW(id, proc, module, 0) }.map_err(|e| {
            HookError::Install {
                kind,
                reason: e.to_string(),
            }
        })?;

        route_for(kind).with(|route| *route.borrow_mut() = Some(Route { hook, sink }));
        debug!(%kind, ?hook, "native hook registered");
        Ok(hook)
    }

    fn uninstall(&self, handle: HHOOK) -> Result<(), HookError> {
        // SAFETY: `handle` was returned by SetWindowsHookExW on this thread.
        let result = unsafe { UnhookWindowsHookEx(handle) };

        for kind in [HookKind::Keyboard, HookKind::Mouse] {
            route_for(kind).with(|route| {
                let mut route = route.borrow_mut();
                if route.as_ref().is_some_and(|r| r.hook == handle) {
                    *route = None;
                }
            });
        }

        result.map_err(|e| HookError::Uninstall(e.to_string()))
    }

    fn forward(&self, handle: Option<HHOOK>, code: i32, signal: &RawSignal) -> isize {
        // SAFETY: wparam/lparam are the untouched arguments of the current
        // hook invocation, which is still on the stack.
        let result = unsafe {
            CallNextHookEx(
                handle,
                code,
                WPARAM(signal.native.wparam),
                LPARAM(signal.native.lparam),
            )
        };
        result.0
    }
}

/// Hands `signal` to the session routed for `kind`, or passes it down the
/// chain when no live session owns the route.
fn route_signal(kind: HookKind, code: i32, signal: RawSignal) -> LRESULT {
    // The route borrow ends before dispatch so listeners may uninstall.
    let sink = route_for(kind).with(|route| route.borrow().as_ref().map(|r| r.sink.clone()));

    match sink.and_then(|weak| weak.upgrade()) {
        Some(sink) => LRESULT(sink.on_signal(code, &signal)),
        None => {
            // SAFETY: Forward the event to the next hook in the chain.
            unsafe {
                CallNextHookEx(
                    None,
                    code,
                    WPARAM(signal.native.wparam),
                    LPARAM(signal.native.lparam),
                )
            }
        }
    }
}

unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code != HC_ACTION {
        // SAFETY: l_param carries no hook struct for other codes.
        return unsafe { CallNextHookEx(None, n_code, w_param, l_param) };
    }

    // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
    let kbd = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };

    let signal = RawSignal {
        message: w_param.0 as u32,
        data: SignalData::Keyboard {
            key: Key(kbd.vkCode as u8),
            scan_code: kbd.scanCode,
            flags: kbd.flags.0,
            time_ms: kbd.time,
        },
        native: NativeArgs {
            wparam: w_param.0,
            lparam: l_param.0,
        },
    };
    route_signal(HookKind::Keyboard, n_code, signal)
}

unsafe extern "system" fn mouse_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code != HC_ACTION {
        // SAFETY: l_param carries no hook struct for other codes.
        return unsafe { CallNextHookEx(None, n_code, w_param, l_param) };
    }

    // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code == HC_ACTION.
    let ms = unsafe { &*(l_param.0 as *const MSLLHOOKSTRUCT) };

    let signal = RawSignal {
        message: w_param.0 as u32,
        data: SignalData::Mouse {
            point: Point::new(ms.pt.x, ms.pt.y),
            mouse_data: ms.mouseData,
            flags: ms.flags,
            time_ms: ms.time,
        },
        native: NativeArgs {
            wparam: w_param.0,
            lparam: l_param.0,
        },
    };
    route_signal(HookKind::Mouse, n_code, signal)
}
