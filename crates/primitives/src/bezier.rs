use crate::{Point, Transform};

/// Samples taken per segment when flattening for display.
pub const DEFAULT_SAMPLES: usize = 16;

/// One cubic Bezier segment: two nodes and the controls between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
	/// Starting node.
	pub start: Point,
	/// Control leaving `start`.
	pub c0: Point,
	/// Control entering `end`.
	pub c1: Point,
	/// Ending node.
	pub end: Point,
}

impl CubicSegment {
	/// Create a segment.
	pub const fn new(start: Point, c0: Point, c1: Point, end: Point) -> Self {
		Self { start, c0, c1, end }
	}

	/// Evaluate the curve at parameter `t` in `[0, 1]`.
	pub fn point_at(&self, t: f64) -> Point {
		let u = 1.0 - t;
		let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
		Point::new(
			a * self.start.x + b * self.c0.x + c * self.c1.x + d * self.end.x,
			a * self.start.y + b * self.c0.y + c * self.c1.y + d * self.end.y,
		)
	}

	/// Map all four points through `t`. Affine maps commute with Bezier evaluation.
	pub fn transformed(&self, t: &Transform) -> Self {
		Self::new(t.apply(self.start), t.apply(self.c0), t.apply(self.c1), t.apply(self.end))
	}

	/// `steps + 1` evenly spaced points from `start` to `end` inclusive.
	pub fn sample(&self, steps: usize) -> Vec<Point> {
		let steps = steps.max(1);
		(0..=steps)
			.map(|i| match i {
				0 => self.start,
				i if i == steps => self.end,
				i => self.point_at(i as f64 / steps as f64),
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_hits_endpoints() {
		let seg = CubicSegment::new(
			Point::new(0.0, 0.0),
			Point::new(0.0, 1.0),
			Point::new(1.0, 1.0),
			Point::new(1.0, 0.0),
		);
		let points = seg.sample(4);
		assert_eq!(points.len(), 5);
		assert_eq!(points[0], seg.start);
		assert_eq!(points[4], seg.end);
		assert!(points[2].approx_eq(Point::new(0.5, 0.75), 1e-12));
	}

	#[test]
	fn straight_controls_stay_on_the_line() {
		let seg = CubicSegment::new(
			Point::new(0.0, 0.0),
			Point::new(1.0 / 3.0, 0.0),
			Point::new(2.0 / 3.0, 0.0),
			Point::new(1.0, 0.0),
		);
		for p in seg.sample(8) {
			assert!(p.y.abs() < 1e-12);
		}
	}

	#[test]
	fn transform_commutes_with_evaluation() {
		let seg = CubicSegment::new(
			Point::new(0.0, 0.0),
			Point::new(0.2, 1.0),
			Point::new(0.8, 1.0),
			Point::new(1.0, 0.0),
		);
		let t = Transform::new(3.0, -1.0, 2.0, 0.5, 0.0, 1.5);
		let direct = t.apply(seg.point_at(0.3));
		let mapped = seg.transformed(&t).point_at(0.3);
		assert!(direct.approx_eq(mapped, 1e-9));
	}
}
