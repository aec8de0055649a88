use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A point (or pair) in interpreter coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// The origin.
	pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

	/// Create a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Translate the point by `offset`.
	pub fn offset(self, offset: Point) -> Self {
		self + offset
	}

	/// Approximate equality for coordinates that went through floating point math.
	pub fn approx_eq(self, other: Point, tolerance: f64) -> bool {
		(self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
	}
}

impl From<(f64, f64)> for Point {
	fn from((x, y): (f64, f64)) -> Self {
		Self { x, y }
	}
}

impl From<Point> for (f64, f64) {
	fn from(p: Point) -> Self {
		(p.x, p.y)
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

/// Pair literal: `(x,y)` with no interior whitespace.
impl fmt::Display for Point {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({},{})", self.x, self.y)
	}
}

/// A pair literal could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pair literal: {0:?}")]
pub struct ParsePointError(pub String);

impl FromStr for Point {
	type Err = ParsePointError;

	/// Parse `(x,y)`. Whitespace anywhere in the literal is ignored.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
		let inner = compact
			.strip_prefix('(')
			.and_then(|rest| rest.strip_suffix(')'))
			.ok_or_else(|| ParsePointError(s.to_string()))?;
		let (x, y) = inner
			.split_once(',')
			.ok_or_else(|| ParsePointError(s.to_string()))?;
		let x = x.parse().map_err(|_| ParsePointError(s.to_string()))?;
		let y = y.parse().map_err(|_| ParsePointError(s.to_string()))?;
		Ok(Self { x, y })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_has_no_interior_whitespace() {
		assert_eq!(Point::new(0.0, 1.5).to_string(), "(0,1.5)");
		assert_eq!(Point::new(-2.0, 0.25).to_string(), "(-2,0.25)");
	}

	#[test]
	fn parses_interpreter_pairs() {
		assert_eq!("(0.333333, 0)".parse::<Point>(), Ok(Point::new(0.333333, 0.0)));
		assert_eq!("( -1,1e-05 )".parse::<Point>(), Ok(Point::new(-1.0, 1e-05)));
	}

	#[test]
	fn rejects_non_pairs() {
		assert!("cycle".parse::<Point>().is_err());
		assert!("(1,2,3)".parse::<Point>().is_err());
		assert!("1,2".parse::<Point>().is_err());
	}
}
