//! Value types produced by the translation pipeline.
//!
//! - **`held`**   – the per-session set of keys currently pressed.
//! - **`state`**  – immutable snapshots of that set, with modifier queries.
//! - **`combo`**  – key combinations ("keystroke filters") matched against snapshots.
//! - **`event`**  – the structured keyboard and mouse events handed to listeners.
//!
//! Nothing in here touches the host; everything is plain data.

pub mod combo;
pub mod event;
pub mod held;
pub mod state;

pub use combo::{KeyCombination, ParseComboError, Requirement};
pub use event::{KeyTransition, KeyboardEvent, MouseButton, MouseEvent, MouseEventKind, Point};
pub use held::HeldKeySet;
pub use state::{KeyboardState, ModifierState};
