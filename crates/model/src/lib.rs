//! Editable drawing items mirrored through the interpreter.
//!
//! The editor keeps each item in a form it can edit directly (nodes and links,
//! symbolic colors, raw script text) and asks the interpreter for everything it
//! cannot compute itself: Bezier controls, concrete colors and rendered raster
//! fragments. Those requests go through the [`Oracle`] capability so that the
//! text grammar of interpreter responses stays in one place.
//!
//! - [`Pen`]: color, width and style suffix; symbolic colors resolve via the oracle.
//! - [`Path`]: explicit node/link form or computed node/control form.
//! - [`Item`]: shape, filled shape, text label or script, each generating its own
//!   code and refreshing itself by deconstruction.
//! - [`Surface`]: the display collaborator that receives fragments and outlines.

mod deconstruct;
mod fragment;
mod item;
mod label;
mod oracle;
mod path;
mod pen;
#[cfg(test)]
mod stub;
mod surface;

pub use deconstruct::{BOX_FILE, BoxFile, fragment_file_name, parse_box_file, parse_fragment_count};
pub use fragment::{BoundingBox, Fragment, ImageDecoder, RasterDecoder};
pub use item::{Item, ItemKind, ItemState, Script, Shape, Text};
pub use label::Label;
pub use oracle::{AsyOracle, Oracle};
pub use path::{ComputedPath, ExplicitPath, Link, LinkAlphabet, LinkKind, Node, Path, parse_path_report};
pub use pen::{ColorSource, DEFAULT_WIDTH, Pen, parse_color_report};
pub use surface::{DisplayHandle, Outline, Surface, SurfaceId};
pub use xasy_primitives::{Point, Rgb, Transform, TransformError};

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The interpreter was unavailable or answered with malformed text.
	#[error(transparent)]
	Session(#[from] xasy_session::Error),
	/// A transform literal had the wrong shape.
	#[error(transparent)]
	Transform(#[from] TransformError),
	/// The item is already displayed on another surface.
	#[error("item is bound to surface {bound}, cannot attach it to surface {requested}")]
	AlreadyBound {
		/// Surface the item is bound to.
		bound: SurfaceId,
		/// Surface that was requested.
		requested: SurfaceId,
	},
	/// The path does not have the shape the operation needs.
	#[error("invalid path topology: {0}")]
	InvalidTopology(String),
	/// A node, link or control index is past the end.
	#[error("index {index} out of range for length {len}")]
	IndexOutOfRange {
		/// Requested index.
		index: usize,
		/// Length of the indexed sequence.
		len: usize,
	},
	/// The operation needs a different kind of item.
	#[error("{operation} does not apply to {kind} items")]
	WrongKind {
		/// What was attempted.
		operation: &'static str,
		/// Kind of the item it was attempted on.
		kind: &'static str,
	},
}

impl Error {
	pub(crate) fn malformed(reason: impl Into<String>) -> Self {
		Self::Session(xasy_session::Error::malformed(reason))
	}

	/// Whether the interpreter was dead or could not be started.
	pub fn is_process_unavailable(&self) -> bool {
		matches!(self, Self::Session(e) if e.is_process_unavailable())
	}

	/// Whether the interpreter's answer could not be parsed.
	pub fn is_malformed(&self) -> bool {
		matches!(self, Self::Session(e) if e.is_malformed())
	}
}
