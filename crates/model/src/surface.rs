//! The display collaborator.
//!
//! This crate never touches pixels on screen. A [`Surface`] is handed bounding
//! boxes, decoded rasters, transformed point lists and display colors, and
//! answers with opaque [`DisplayHandle`]s the item keeps so it can update or
//! remove what it placed.

use std::fmt;

use xasy_primitives::Point;

use crate::fragment::Fragment;

/// Identity of a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Handle of one element placed on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(pub u64);

/// A path flattened for native drawing, in screen coordinates (y down).
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
	/// Polyline vertices.
	pub points: Vec<Point>,
	/// Display color as `#rrggbb`.
	pub color: String,
	/// Stroke width.
	pub width: f64,
	/// Whether to fill the polygon instead of stroking it.
	pub filled: bool,
}

/// Receives what items render.
pub trait Surface: Send {
	/// Identity used to detect rebinding.
	fn id(&self) -> SurfaceId;

	/// Show a non-empty fragment with its top-left corner at `(bbox.left, -bbox.top)`.
	fn place_fragment(&mut self, fragment: &Fragment) -> DisplayHandle;

	/// Show a native outline.
	fn place_outline(&mut self, outline: &Outline) -> DisplayHandle;

	/// Replace a previously placed outline.
	fn update_outline(&mut self, handle: DisplayHandle, outline: &Outline);

	/// Remove a placed element. Unknown handles are ignored.
	fn remove(&mut self, handle: DisplayHandle);
}
