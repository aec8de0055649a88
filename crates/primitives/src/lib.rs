//! Value types for the xasy bridge: points, affine transforms and colors.
//!
//! Everything here is pure. Nothing in this crate talks to the interpreter; the
//! textual forms produced by [`Transform`] and [`Point`] are exactly the literals
//! the interpreter accepts, so callers can splice them into generated code.

/// Cubic Bezier sampling for native outline drawing.
pub mod bezier;
/// RGB colors, colorspace conversion and display formatting.
pub mod color;
/// Two-dimensional points.
pub mod point;
/// Six-scalar affine transforms.
pub mod transform;

pub use bezier::{CubicSegment, DEFAULT_SAMPLES};
pub use color::{Colorspace, Rgb};
pub use point::Point;
pub use transform::{Product, Transform, TransformError};
