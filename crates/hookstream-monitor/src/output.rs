//! Event-line output.
//!
//! Listeners run inside the hook callback, so they never touch the console.
//! They queue lines on a bounded channel with `try_send` and a writer thread
//! does the blocking writes. When the queue is full the line is dropped and
//! counted rather than stalling input delivery.

use std::io::Write;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use tracing::warn;

/// Lines that may wait for the writer before new ones are dropped.
pub const QUEUE_CAPACITY: usize = 4096;

/// Sending half handed to the monitor's listeners.
pub type LineSender = SyncSender<String>;

/// A bounded line queue of `capacity` entries.
pub fn line_channel(capacity: usize) -> (LineSender, Receiver<String>) {
    mpsc::sync_channel(capacity)
}

/// Queues `line` without blocking. Returns `false` if it was dropped because
/// the queue is full or the writer has gone away.
pub fn enqueue(sender: &LineSender, line: String) -> bool {
    match sender.try_send(line) {
        Ok(()) => true,
        Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => false,
    }
}

/// Writes every queued line to `out` until all senders are dropped.
///
/// Output is flushed each time the queue runs empty. A write error ends the
/// thread; later lines are then dropped at the sender.
///
/// # Errors
///
/// Returns the OS error if the thread cannot be spawned.
pub fn spawn_line_writer<W>(mut out: W, lines: Receiver<String>) -> std::io::Result<JoinHandle<()>>
where
    W: Write + Send + 'static,
{
    thread::Builder::new()
        .name("line-writer".to_string())
        .spawn(move || {
            while let Ok(line) = lines.recv() {
                let mut result = writeln!(out, "{line}");
                for line in lines.try_iter() {
                    if result.is_err() {
                        break;
                    }
                    result = writeln!(out, "{line}");
                }
                if let Err(e) = result.and_then(|()| out.flush()) {
                    warn!("failed to write event lines: {e}");
                    return;
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buffer lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_prints_queued_lines_in_order_and_exits_when_senders_drop() {
        // Arrange
        let buffer = Shared::default();
        let (tx, rx) = line_channel(8);
        let writer = spawn_line_writer(buffer.clone(), rx).expect("spawn writer");

        // Act
        assert!(enqueue(&tx, "first".to_string()));
        assert!(enqueue(&tx, "second".to_string()));
        drop(tx);
        writer.join().expect("writer thread");

        // Assert
        let text = String::from_utf8(buffer.0.lock().expect("buffer lock").clone()).expect("utf8");
        assert_eq!(text, "first\nsecond\n");
    }

    #[test]
    fn test_full_queue_drops_instead_of_blocking() {
        // Arrange: nobody drains the queue.
        let (tx, _rx) = line_channel(1);

        // Act
        let accepted = enqueue(&tx, "kept".to_string());
        let overflow = enqueue(&tx, "dropped".to_string());

        // Assert
        assert!(accepted);
        assert!(!overflow);
    }

    #[test]
    fn test_failed_writer_makes_later_lines_drop() {
        // Arrange
        let (tx, rx) = line_channel(4);
        let writer = spawn_line_writer(Broken, rx).expect("spawn writer");

        // Act
        assert!(enqueue(&tx, "lost".to_string()));
        writer.join().expect("writer thread");
        let after = enqueue(&tx, "later".to_string());

        // Assert
        assert!(!after);
    }
}
