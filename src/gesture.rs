//! Gesture stroke recognition and batch input arbitration.
//!
//! One `StrokeRecognizer` per active pointer classifies and decimates that
//! finger's touch samples; one `BatchInputArbiter` per pointer merges the
//! kept samples into the shared `GestureSession` aggregate that eventually
//! goes to the word decoder.

// Modules
mod arbiter;
mod enabler;
mod recognition;

// Re-exports
pub use arbiter::{BatchInputArbiter, BatchInputListener, GestureSession};
pub use enabler::GestureEnabler;
pub use recognition::{StrokeRecognizer, EXTRA_GESTURE_TRAIL_AREA_ABOVE_KEYBOARD_RATIO};
