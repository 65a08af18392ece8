//! The calling thread's Win32 message queue as a [`MessagePump`].

use hookstream_core::{MessagePump, Point, QuitHandle, ThreadMessage};
use tracing::{trace, warn};
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, PeekMessageW, PostQuitMessage, PostThreadMessageW,
    TranslateMessage, MSG, PM_NOREMOVE, PM_REMOVE, WM_QUIT,
};

use crate::WindowsHost;

fn thread_message(msg: &MSG) -> ThreadMessage {
    ThreadMessage {
        message: msg.message,
        wparam: msg.wParam.0,
        lparam: msg.lParam.0,
        time: msg.time,
        pt: Point::new(msg.pt.x, msg.pt.y),
    }
}

fn translate_and_dispatch(msg: &MSG) {
    // SAFETY: `msg` was filled by GetMessageW/PeekMessageW on this thread.
    unsafe {
        let _ = TranslateMessage(msg);
        DispatchMessageW(msg);
    }
}

impl MessagePump for WindowsHost {
    fn run(&self, on_message: &mut dyn FnMut(&ThreadMessage)) {
        let mut msg = MSG::default();
        loop {
            // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
            let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match ret.0 {
                0 => break,
                -1 => {
                    warn!("GetMessageW failed: {}", std::io::Error::last_os_error());
                    break;
                }
                _ => {}
            }
            translate_and_dispatch(&msg);
            on_message(&thread_message(&msg));
        }
        trace!("message loop exited");
    }

    fn pump_pending(&self, on_message: &mut dyn FnMut(&ThreadMessage)) {
        let mut msg = MSG::default();
        // SAFETY: PeekMessageW only writes into `msg`.
        while unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE) }.as_bool() {
            if msg.message == WM_QUIT {
                break;
            }
            // SAFETY: as above; removes the message just inspected.
            if !unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {
                break;
            }
            translate_and_dispatch(&msg);
            on_message(&thread_message(&msg));
        }
    }

    fn post_quit(&self) {
        // SAFETY: PostQuitMessage posts to the calling thread's queue.
        unsafe { PostQuitMessage(0) };
    }

    fn quit_handle(&self) -> QuitHandle {
        // SAFETY: GetCurrentThreadId has no preconditions.
        let thread = unsafe { GetCurrentThreadId() };
        QuitHandle::new(move || {
            // SAFETY: posting WM_QUIT to a thread id is valid from any thread.
            let posted = unsafe { PostThreadMessageW(thread, WM_QUIT, WPARAM(0), LPARAM(0)) };
            if let Err(e) = posted {
                warn!(thread, "failed to post WM_QUIT: {e}");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posted_quit_ends_run() {
        std::thread::spawn(|| {
            let host = WindowsHost::new();
            let mut seen = 0;
            host.post_quit();

            host.run(&mut |_| seen += 1);

            assert_eq!(seen, 0);
        })
        .join()
        .expect("loop thread must not panic");
    }

    #[test]
    fn test_quit_handle_stops_loop_from_another_thread() {
        let (tx, rx) = std::sync::mpsc::channel();
        let looper = std::thread::spawn(move || {
            let host = WindowsHost::new();
            // Force creation of the thread's message queue before handing out the handle.
            host.pump_pending(&mut |_| {});
            tx.send(host.quit_handle()).expect("send handle");
            host.run(&mut |_| {});
        });

        let quit = rx.recv().expect("receive handle");
        quit.quit();

        looper.join().expect("loop thread must not panic");
    }
}
