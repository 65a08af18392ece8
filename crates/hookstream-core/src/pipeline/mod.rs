//! The per-signal hot path: raw signal → classification → character
//! resolution → dispatch.
//!
//! Everything here runs synchronously inside the hook callback. Nothing
//! allocates beyond the event itself, blocks, or performs I/O.

pub mod classify;
pub mod decode;
pub mod dispatch;
pub mod signal;

pub use classify::{classify_key, classify_mouse, key_direction, KeyDirection, MouseClassification};
pub use decode::{CharacterResolver, ModifierBuffer, CHAR_CAPACITY};
pub use dispatch::{Cancellable, Dispatcher, ListenerId};
pub use signal::{NativeArgs, RawSignal, SignalData, HC_ACTION, SWALLOW};
