use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use crate::Point;

/// Errors from building or applying a [`Transform`] out of loose scalars.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TransformError {
	/// A transform literal must carry exactly six scalars.
	#[error("a transform needs exactly 6 scalars, got {0}")]
	InvalidArity(usize),
	/// A transform can only multiply a transform (6 scalars) or a point (2 scalars).
	#[error("cannot multiply a transform by a {0}-tuple")]
	InvalidOperand(usize),
	/// The literal text is not a parenthesised scalar tuple.
	#[error("invalid transform literal: {0:?}")]
	Syntax(String),
}

/// Affine map `p' = (dx,dy) + M·p` with `M = [[xx, xy], [yx, yy]]`.
///
/// The field order matches the interpreter's transform literal
/// `(dx,dy,xx,xy,yx,yy)`. Composition is associative but not commutative:
/// `a * b` applies `b` first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
	/// Horizontal shift.
	pub dx: f64,
	/// Vertical shift.
	pub dy: f64,
	/// Matrix entry (row 0, column 0).
	pub xx: f64,
	/// Matrix entry (row 0, column 1).
	pub xy: f64,
	/// Matrix entry (row 1, column 0).
	pub yx: f64,
	/// Matrix entry (row 1, column 1).
	pub yy: f64,
}

/// Result of multiplying a transform by a loosely shaped operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Product {
	/// The operand was a transform; this is the composition.
	Transform(Transform),
	/// The operand was a point; this is the mapped point.
	Point(Point),
}

impl Transform {
	/// The neutral element of composition.
	pub const IDENTITY: Self = Self::new(0.0, 0.0, 1.0, 0.0, 0.0, 1.0);

	/// Create a transform from its six components in literal order.
	pub const fn new(dx: f64, dy: f64, xx: f64, xy: f64, yx: f64, yy: f64) -> Self {
		Self { dx, dy, xx, xy, yx, yy }
	}

	/// Pure translation.
	pub const fn translation(dx: f64, dy: f64) -> Self {
		Self::new(dx, dy, 1.0, 0.0, 0.0, 1.0)
	}

	/// Build a transform from a scalar tuple, which must have six entries.
	pub fn from_scalars(scalars: &[f64]) -> Result<Self, TransformError> {
		match *scalars {
			[dx, dy, xx, xy, yx, yy] => Ok(Self::new(dx, dy, xx, xy, yx, yy)),
			_ => Err(TransformError::InvalidArity(scalars.len())),
		}
	}

	/// The six components in literal order.
	pub const fn to_scalars(self) -> [f64; 6] {
		[self.dx, self.dy, self.xx, self.xy, self.yx, self.yy]
	}

	/// Whether this is exactly the identity.
	pub fn is_identity(&self) -> bool {
		*self == Self::IDENTITY
	}

	/// Map a point through the transform.
	pub fn apply(&self, p: Point) -> Point {
		Point::new(
			self.dx + self.xx * p.x + self.xy * p.y,
			self.dy + self.yx * p.x + self.yy * p.y,
		)
	}

	/// Compose with `other`, which is applied first.
	pub fn compose(&self, other: &Transform) -> Transform {
		Transform {
			dx: self.dx + self.xx * other.dx + self.xy * other.dy,
			dy: self.dy + self.yx * other.dx + self.yy * other.dy,
			xx: self.xx * other.xx + self.xy * other.yx,
			xy: self.xx * other.xy + self.xy * other.yy,
			yx: self.yx * other.xx + self.yy * other.yx,
			yy: self.yx * other.xy + self.yy * other.yy,
		}
	}

	/// Multiply by an operand given as a scalar tuple.
	///
	/// Six scalars are read as a transform and composed; two are read as a point
	/// and mapped. Any other length is rejected.
	pub fn mul_scalars(&self, operand: &[f64]) -> Result<Product, TransformError> {
		match *operand {
			[x, y] => Ok(Product::Point(self.apply(Point::new(x, y)))),
			[_, _, _, _, _, _] => Ok(Product::Transform(self.compose(&Self::from_scalars(operand)?))),
			_ => Err(TransformError::InvalidOperand(operand.len())),
		}
	}

	/// Interpreter code for this transform: the literal tuple.
	pub fn code(&self) -> String {
		self.to_string()
	}

	/// Component-wise comparison within `tolerance`.
	pub fn approx_eq(&self, other: &Transform, tolerance: f64) -> bool {
		self.to_scalars()
			.iter()
			.zip(other.to_scalars())
			.all(|(a, b)| (a - b).abs() <= tolerance)
	}
}

impl Default for Transform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl TryFrom<&[f64]> for Transform {
	type Error = TransformError;

	fn try_from(scalars: &[f64]) -> Result<Self, Self::Error> {
		Self::from_scalars(scalars)
	}
}

impl From<[f64; 6]> for Transform {
	fn from([dx, dy, xx, xy, yx, yy]: [f64; 6]) -> Self {
		Self::new(dx, dy, xx, xy, yx, yy)
	}
}

impl Mul for Transform {
	type Output = Transform;

	fn mul(self, rhs: Transform) -> Transform {
		self.compose(&rhs)
	}
}

impl Mul<Point> for Transform {
	type Output = Point;

	fn mul(self, rhs: Point) -> Point {
		self.apply(rhs)
	}
}

impl Mul<(f64, f64)> for Transform {
	type Output = Point;

	fn mul(self, (x, y): (f64, f64)) -> Point {
		self.apply(Point::new(x, y))
	}
}

impl Mul<[f64; 6]> for Transform {
	type Output = Transform;

	fn mul(self, rhs: [f64; 6]) -> Transform {
		self.compose(&Transform::from(rhs))
	}
}

impl fmt::Display for Transform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"({},{},{},{},{},{})",
			self.dx, self.dy, self.xx, self.xy, self.yx, self.yy
		)
	}
}

impl FromStr for Transform {
	type Err = TransformError;

	/// Parse `(dx,dy,xx,xy,yx,yy)`, ignoring whitespace.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
		let inner = compact
			.strip_prefix('(')
			.and_then(|rest| rest.strip_suffix(')'))
			.ok_or_else(|| TransformError::Syntax(s.to_string()))?;
		let scalars = inner
			.split(',')
			.map(str::parse::<f64>)
			.collect::<Result<Vec<_>, _>>()
			.map_err(|_| TransformError::Syntax(s.to_string()))?;
		Self::from_scalars(&scalars)
	}
}

#[cfg(test)]
mod tests;
