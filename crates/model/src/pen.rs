//! Pens and color resolution.

use tracing::debug;
use xasy_primitives::{Colorspace, Rgb};

use crate::{Error, Oracle, Result};

/// Stroke width of a default pen.
pub const DEFAULT_WIDTH: f64 = 0.5;

/// Where a pen's color comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSource {
	/// A concrete RGB triple.
	Rgb(Rgb),
	/// An interpreter expression such as `red` or `0.5*blue+green`.
	Expr(String),
}

/// A color, a stroke width and an opaque style suffix.
///
/// Symbolic colors are unresolved until [`Pen::resolve`] asks the interpreter for
/// the concrete value. The generated code keeps the symbolic expression, so the
/// interpreter always sees what the user wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
	source: ColorSource,
	width: f64,
	options: String,
	resolved: Option<Rgb>,
}

impl Pen {
	/// A pen with an explicit color.
	pub fn new(color: Rgb, width: f64) -> Self {
		let color = Rgb::clamped(color.r, color.g, color.b);
		Self {
			source: ColorSource::Rgb(color),
			width: width.max(0.0),
			options: String::new(),
			resolved: Some(color),
		}
	}

	/// A pen whose color is an interpreter expression.
	pub fn symbolic(expr: impl Into<String>, width: f64) -> Self {
		Self {
			source: ColorSource::Expr(expr.into()),
			width: width.max(0.0),
			options: String::new(),
			resolved: None,
		}
	}

	/// Append a style suffix such as `dashed` or `linetype("4 4")`.
	///
	/// The suffix may change the color, so the pen becomes unresolved.
	pub fn with_options(mut self, options: impl Into<String>) -> Self {
		self.set_options(options);
		self
	}

	/// The color source.
	pub fn color_source(&self) -> &ColorSource {
		&self.source
	}

	/// Stroke width.
	pub fn width(&self) -> f64 {
		self.width
	}

	/// Style suffix, possibly empty.
	pub fn options(&self) -> &str {
		&self.options
	}

	/// The resolved color, if known.
	pub fn color(&self) -> Option<Rgb> {
		self.resolved
	}

	/// Whether the concrete color is known.
	pub fn is_resolved(&self) -> bool {
		self.resolved.is_some()
	}

	/// Set the stroke width. Negative widths become zero.
	pub fn set_width(&mut self, width: f64) {
		self.width = width.max(0.0);
	}

	/// Set an explicit color.
	pub fn set_color(&mut self, color: Rgb) {
		let color = Rgb::clamped(color.r, color.g, color.b);
		self.source = ColorSource::Rgb(color);
		self.resolved = self.options.is_empty().then_some(color);
	}

	/// Set a symbolic color.
	pub fn set_expr(&mut self, expr: impl Into<String>) {
		self.source = ColorSource::Expr(expr.into());
		self.resolved = None;
	}

	/// Replace the style suffix.
	pub fn set_options(&mut self, options: impl Into<String>) {
		self.options = options.into();
		self.resolved = match (&self.source, self.options.is_empty()) {
			(ColorSource::Rgb(color), true) => Some(*color),
			_ => None,
		};
	}

	/// Interpreter code: `<color>+<width>[+<options>]`.
	pub fn code(&self) -> String {
		let color = match &self.source {
			ColorSource::Rgb(color) => color.code(),
			ColorSource::Expr(expr) => expr.clone(),
		};
		let mut code = format!("{color}+{}", self.width);
		if !self.options.is_empty() {
			code.push('+');
			code.push_str(&self.options);
		}
		code
	}

	/// Resolve the concrete color, asking the interpreter only when needed.
	///
	/// On failure the pen stays unresolved.
	pub async fn resolve(&mut self, oracle: &dyn Oracle) -> Result<Rgb> {
		if let Some(color) = self.resolved {
			return Ok(color);
		}
		let color = oracle.pen_color(&self.code()).await?;
		debug!(pen = %self.code(), color = %color.to_hex(), "pen color resolved");
		self.resolved = Some(color);
		Ok(color)
	}

	/// Display color as `#rrggbb`, resolving first if needed.
	pub async fn display_color(&mut self, oracle: &dyn Oracle) -> Result<String> {
		self.resolve(oracle).await.map(Rgb::to_hex)
	}
}

impl Default for Pen {
	fn default() -> Self {
		Self::new(Rgb::BLACK, DEFAULT_WIDTH)
	}
}

/// Parse the answer to a colorspace + components query.
///
/// The first non-blank line names the colorspace; each following non-blank line
/// carries one component as its last token.
pub fn parse_color_report<S: AsRef<str>>(lines: &[S]) -> Result<Rgb> {
	let mut lines = lines.iter().map(|l| l.as_ref().trim()).filter(|l| !l.is_empty());
	let name = lines
		.next()
		.ok_or_else(|| Error::malformed("no colorspace reported"))?;
	let space = Colorspace::from_report(name)
		.ok_or_else(|| Error::malformed(format!("unrecognized colorspace {name:?}")))?;
	let components = lines.map(component).collect::<Result<Vec<_>>>()?;
	space.to_rgb(&components).ok_or_else(|| {
		Error::malformed(format!(
			"{space} pen reported {} components, expected {}",
			components.len(),
			space.component_count()
		))
	})
}

fn component(line: &str) -> Result<f64> {
	line.split_whitespace()
		.last()
		.map(|token| token.trim_end_matches([',', ';']))
		.and_then(|token| token.parse().ok())
		.ok_or_else(|| Error::malformed(format!("not a color component: {line:?}")))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn code_for_explicit_and_symbolic_colors() {
		assert_eq!(Pen::default().code(), "rgb(0,0,0)+0.5");
		assert_eq!(Pen::new(Rgb::new(1.0, 0.0, 0.5), 2.0).code(), "rgb(1,0,0.5)+2");
		assert_eq!(
			Pen::symbolic("red", 1.0).with_options("dashed").code(),
			"red+1+dashed"
		);
	}

	#[test]
	fn explicit_color_is_resolved_until_options_are_added() {
		let mut pen = Pen::new(Rgb::new(0.2, 0.4, 0.6), 1.0);
		assert_eq!(pen.color(), Some(Rgb::new(0.2, 0.4, 0.6)));
		pen.set_options("dotted");
		assert!(!pen.is_resolved());
		pen.set_options("");
		assert_eq!(pen.color(), Some(Rgb::new(0.2, 0.4, 0.6)));
	}

	#[test]
	fn width_is_never_negative() {
		let mut pen = Pen::new(Rgb::BLACK, -1.0);
		assert_eq!(pen.width(), 0.0);
		pen.set_width(-3.0);
		assert_eq!(pen.width(), 0.0);
	}

	#[test]
	fn parses_each_colorspace() {
		assert_eq!(parse_color_report(&["rgb", "1", "0", "0.5"]).unwrap(), Rgb::new(1.0, 0.0, 0.5));
		assert_eq!(parse_color_report(&["gray", "0.25"]).unwrap(), Rgb::gray(0.25));
		assert_eq!(parse_color_report(&["cmyk", "0", "0", "0", "0"]).unwrap(), Rgb::WHITE);
		assert_eq!(parse_color_report(&["cmyk", "0", "0", "0", "1"]).unwrap(), Rgb::BLACK);
	}

	#[test]
	fn components_may_carry_index_prefixes() {
		let lines = ["", "rgb", "[0]\t0.5", "[1]\t0.25", "[2]\t1"];
		assert_eq!(parse_color_report(&lines).unwrap(), Rgb::new(0.5, 0.25, 1.0));
	}

	#[test]
	fn unknown_colorspace_is_malformed() {
		let err = parse_color_report(&["pattern", "1"]).unwrap_err();
		assert!(err.is_malformed(), "{err}");
	}

	#[test]
	fn wrong_component_count_is_malformed() {
		assert!(parse_color_report(&["rgb", "1", "0"]).unwrap_err().is_malformed());
		assert!(parse_color_report(&["gray", "x"]).unwrap_err().is_malformed());
		assert!(parse_color_report::<&str>(&[]).unwrap_err().is_malformed());
	}
}
