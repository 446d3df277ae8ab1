#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

// Imports from other crates
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

// Modules
pub mod config;
pub mod event;
pub mod gesture;
pub mod keyboard;
pub mod points;
pub mod trail;

// Re-exports
pub use config::{Params, RecognitionParams, TrailParams};
pub use event::{codes, AutoCapsFlags, KeyboardEvent, RecapitalizeMode};
pub use gesture::{BatchInputArbiter, BatchInputListener, GestureEnabler, GestureSession};
pub use keyboard::{KeyboardState, SwitchActions};
pub use points::InputPointers;

/// Default capacity of the per-stroke and aggregated gesture point buffers.
/// A typical swipe keeps well under a hundred samples after decimation.
pub const DEFAULT_GESTURE_POINTS_CAPACITY: usize = 128;
