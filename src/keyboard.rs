//! Keyboard mode and shift handling. [`KeyboardState`] is the state
//! machine translating key presses, releases and committed events into
//! layout switches on a [`SwitchActions`] implementation.

// Modules
pub mod key_cache;
pub mod modifier;
pub mod state;

// Re-exports
pub use key_cache::{Key, UniqueKeysCache};
pub use modifier::{AlphabetShiftState, ModifierKeyState};
pub use state::{KeyboardState, SwitchActions};
