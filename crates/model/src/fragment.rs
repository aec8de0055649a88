//! Rendered output fragments.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;

use crate::surface::DisplayHandle;
use crate::{Error, Result};

/// Bounding box of a fragment in interpreter coordinates (y up).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
	/// Left edge.
	pub left: f64,
	/// Bottom edge.
	pub bottom: f64,
	/// Right edge.
	pub right: f64,
	/// Top edge.
	pub top: f64,
}

impl BoundingBox {
	/// Create a box.
	pub const fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
		Self { left, bottom, right, top }
	}

	/// The all-zero box that marks a fragment with no pixels.
	pub fn is_empty(&self) -> bool {
		self.left == 0.0 && self.bottom == 0.0 && self.right == 0.0 && self.top == 0.0
	}

	/// Width of the box.
	pub fn width(&self) -> f64 {
		self.right - self.left
	}

	/// Height of the box.
	pub fn height(&self) -> f64 {
		self.top - self.bottom
	}
}

impl fmt::Display for BoundingBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{} {} {} {}]", self.left, self.bottom, self.right, self.top)
	}
}

/// One rendered output unit of a deconstruction pass.
///
/// Empty fragments carry no raster but keep their slot so fragment indices
/// stay aligned with per-fragment transforms.
#[derive(Debug, Clone)]
pub struct Fragment {
	/// Position in the pass.
	pub index: usize,
	/// Bounding box in interpreter coordinates.
	pub bbox: BoundingBox,
	/// Image format extension reported by the interpreter.
	pub format: String,
	/// Magnification reported by the interpreter.
	pub scale: f64,
	/// Decoded pixels, absent for empty fragments.
	pub raster: Option<Arc<DynamicImage>>,
	/// Handle of the fragment on a display surface, once placed.
	pub handle: Option<DisplayHandle>,
}

impl Fragment {
	/// Whether the fragment has no pixel data.
	pub fn is_empty(&self) -> bool {
		self.raster.is_none()
	}
}

/// Decodes fragment image files.
pub trait RasterDecoder: Send + Sync {
	/// Decode the image at `path`.
	fn decode(&self, path: &Path) -> Result<DynamicImage>;
}

/// [`RasterDecoder`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl RasterDecoder for ImageDecoder {
	fn decode(&self, path: &Path) -> Result<DynamicImage> {
		image::open(path).map_err(|e| Error::malformed(format!("cannot decode {}: {e}", path.display())))
	}
}
