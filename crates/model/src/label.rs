use std::fmt;

use xasy_primitives::Point;

use crate::pen::Pen;

/// Text placed at a location with a pen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Label {
	/// The text, in the interpreter's markup.
	pub text: String,
	/// Anchor point.
	pub location: Point,
	/// Pen used for the text.
	pub pen: Pen,
}

impl Label {
	/// Create a label.
	pub fn new(text: impl Into<String>, location: Point, pen: Pen) -> Self {
		Self {
			text: text.into(),
			location,
			pen,
		}
	}

	/// `Label("text",(x,y),<pen>,align=SE)`.
	///
	/// Backslashes pass through untouched so TeX macros reach TeX as written;
	/// only the double quote needs escaping inside the string literal.
	pub fn code(&self) -> String {
		let text = self.text.replace('"', "\\\"");
		format!("Label(\"{text}\",{},{},align=SE)", self.location, self.pen.code())
	}
}

impl fmt::Display for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.code())
	}
}
