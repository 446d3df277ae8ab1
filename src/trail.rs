//! Geometry for rendering gesture trails. A stroke's sampled points are
//! smoothed with cubic Hermite interpolation and each trail section is
//! widened into a rounded outline for drawing.

// Modules
pub mod hermite;
pub mod rounded_line;
pub mod stroke;

// Re-exports
pub use hermite::HermiteInterpolator;
pub use rounded_line::{Bounds, PathOp, RoundedLine};
pub use stroke::{StrokeTrailPoints, TrailPoints};
