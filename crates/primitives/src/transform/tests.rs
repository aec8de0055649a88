use proptest::prelude::*;

use super::*;

const TOLERANCE: f64 = 1e-6;

fn scalar() -> impl Strategy<Value = f64> {
	-10.0f64..10.0
}

fn transform() -> impl Strategy<Value = Transform> {
	prop::array::uniform6(scalar()).prop_map(Transform::from)
}

fn point() -> impl Strategy<Value = Point> {
	(scalar(), scalar()).prop_map(Point::from)
}

fn close(a: Point, b: Point) -> bool {
	let scale = 1.0 + a.x.abs().max(a.y.abs());
	a.approx_eq(b, TOLERANCE * scale)
}

proptest! {
	#[test]
	fn composition_is_associative(a in transform(), b in transform(), c in transform(), p in point()) {
		let left = ((a * b) * c) * p;
		let right = (a * (b * c)) * p;
		prop_assert!(close(left, right), "left={left:?} right={right:?}");
	}

	#[test]
	fn identity_is_neutral(t in transform()) {
		prop_assert_eq!(Transform::IDENTITY * t, t);
		prop_assert_eq!(t * Transform::IDENTITY, t);
	}

	#[test]
	fn composition_applies_right_operand_first(a in transform(), b in transform(), p in point()) {
		prop_assert!(close((a * b) * p, a * (b * p)));
	}
}

#[test]
fn composition_is_not_commutative() {
	let shift = Transform::translation(1.0, 0.0);
	let scale = Transform::new(0.0, 0.0, 2.0, 0.0, 0.0, 2.0);
	assert_eq!((shift * scale) * Point::new(1.0, 1.0), Point::new(3.0, 2.0));
	assert_eq!((scale * shift) * Point::new(1.0, 1.0), Point::new(4.0, 2.0));
}

#[test]
fn code_is_compact_six_tuple() {
	assert_eq!(Transform::IDENTITY.code(), "(0,0,1,0,0,1)");
	assert_eq!(Transform::new(1.5, -2.0, 0.5, 0.0, 0.0, 0.5).code(), "(1.5,-2,0.5,0,0,0.5)");
}

#[test]
fn literal_parses_back() {
	let t: Transform = "(1, 2, 3, 4, 5, 6)".parse().unwrap();
	assert_eq!(t, Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0));
	assert_eq!(t.code().parse::<Transform>().unwrap(), t);
}

#[test]
fn construction_needs_six_scalars() {
	assert_eq!(Transform::from_scalars(&[1.0, 2.0]), Err(TransformError::InvalidArity(2)));
	assert_eq!("(1,2,3)".parse::<Transform>(), Err(TransformError::InvalidArity(3)));
	assert!(matches!("1,2,3,4,5,6".parse::<Transform>(), Err(TransformError::Syntax(_))));
}

#[test]
fn multiplication_dispatches_on_operand_shape() {
	let t = Transform::translation(1.0, 2.0);
	assert_eq!(t.mul_scalars(&[1.0, 1.0]), Ok(Product::Point(Point::new(2.0, 3.0))));
	assert_eq!(
		t.mul_scalars(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
		Ok(Product::Transform(t))
	);
	assert_eq!(t.mul_scalars(&[1.0, 2.0, 3.0]), Err(TransformError::InvalidOperand(3)));
	assert_eq!(t.mul_scalars(&[]), Err(TransformError::InvalidOperand(0)));
}

#[test]
fn tuple_operands() {
	let t = Transform::new(0.0, 0.0, 0.0, -1.0, 1.0, 0.0);
	assert_eq!(t * (1.0, 0.0), Point::new(0.0, 1.0));
	assert_eq!(t * [1.0, 0.0, 1.0, 0.0, 0.0, 1.0], Transform::new(0.0, 1.0, 0.0, -1.0, 1.0, 0.0));
}
