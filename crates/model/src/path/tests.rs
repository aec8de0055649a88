use pretty_assertions::assert_eq;

use super::*;
use crate::stub::StubOracle;

fn p(x: f64, y: f64) -> Point {
	Point::new(x, y)
}

fn square_explicit() -> Option<ExplicitPath> {
	ExplicitPath::from_parts(
		vec![(0.0, 0.0).into(), (1.0, 0.0).into(), (1.0, 1.0).into(), (0.0, 1.0).into(), Node::Cycle],
		vec![LinkKind::Straight.into(); 4],
	)
	.ok()
}

fn square() -> Path {
	Path::Explicit(square_explicit().unwrap())
}

#[test]
fn explicit_code_uses_link_separators() {
	let path = Path::from_nodes(
		vec![(0.0, 0.0).into(), (1.0, 0.0).into(), (1.0, 1.0).into(), Node::Cycle],
		vec![
			LinkKind::Straight.into(),
			LinkKind::Guess.into(),
			LinkKind::ExplicitControl.into(),
		],
	)
	.unwrap();
	assert_eq!(path.code(), "(0,0)--(1,0)..(1,1)::cycle");

	let alphabet = LinkAlphabet {
		straight: " -- ".into(),
		..LinkAlphabet::default()
	};
	assert_eq!(path.code_with(&alphabet), "(0,0) -- (1,0)..(1,1)::cycle");
	assert_eq!(alphabet.kind_of(" -- "), Some(LinkKind::Straight));
	assert_eq!(alphabet.kind_of("~~"), None);
}

#[test]
fn square_code() {
	assert_eq!(square().code(), "(0,0)--(1,0)--(1,1)--(0,1)--cycle");
	assert!(square().is_cyclic());
	assert_eq!(Path::new().code(), "");
}

#[test]
fn cycle_must_close_the_path() {
	let err = Path::from_nodes(
		vec![(0.0, 0.0).into(), Node::Cycle, (1.0, 0.0).into()],
		vec![LinkKind::Straight.into(); 2],
	)
	.unwrap_err();
	assert!(matches!(err, Error::InvalidTopology(_)), "{err}");

	let err = Path::from_nodes(vec![Node::Cycle], Vec::new()).unwrap_err();
	assert!(matches!(err, Error::InvalidTopology(_)), "{err}");
}

#[test]
fn link_count_must_match_nodes() {
	let err = Path::from_nodes(vec![(0.0, 0.0).into(), (1.0, 0.0).into()], Vec::new()).unwrap_err();
	assert!(matches!(err, Error::InvalidTopology(_)), "{err}");

	let err = Path::from_controls(vec![(0.0, 0.0).into(), (1.0, 0.0).into()], Vec::new()).unwrap_err();
	assert!(matches!(err, Error::InvalidTopology(_)), "{err}");
}

#[test]
fn points_are_appended_before_cycle() {
	let mut path = ExplicitPath::new();
	path.push_node((0.0, 0.0).into(), LinkKind::Straight.into()).unwrap();
	assert!(path.links().is_empty());
	path.push_node((1.0, 0.0).into(), LinkKind::Straight.into()).unwrap();
	path.push_node(Node::Cycle, LinkKind::Straight.into()).unwrap();
	path.push_node((1.0, 1.0).into(), LinkKind::Guess.into()).unwrap();

	assert_eq!(path.code(), "(0,0)--(1,0)--(1,1)..cycle");
	assert!(path.push_node(Node::Cycle, LinkKind::Straight.into()).is_err());
	assert!(ExplicitPath::new().push_node(Node::Cycle, LinkKind::Straight.into()).is_err());
}

#[test]
fn insert_keeps_links_aligned() {
	let mut path = square();
	path.insert_node(1, p(0.5, -0.5), LinkKind::Guess.into()).unwrap();
	assert_eq!(path.code(), "(0,0)--(0.5,-0.5)..(1,0)--(1,1)--(0,1)--cycle");

	let err = path.insert_node(6, p(9.0, 9.0), LinkKind::Guess.into()).unwrap_err();
	assert!(matches!(err, Error::IndexOutOfRange { index: 6, len: 6 }), "{err}");
}

#[test]
fn remove_last_point_skips_cycle() {
	let mut path = square();
	path.remove_last_point();
	assert_eq!(path.code(), "(0,0)--(1,0)--(1,1)--cycle");

	let mut single = Path::from_nodes(vec![(2.0, 2.0).into(), Node::Cycle], vec![LinkKind::Straight.into()]).unwrap();
	single.remove_last_point();
	assert!(single.nodes().is_empty());

	let mut empty = Path::new();
	empty.remove_last_point();
	assert!(empty.nodes().is_empty());
}

#[test]
fn set_last_point_skips_cycle() {
	let mut path = square();
	path.set_last_point(p(-1.0, 1.0)).unwrap();
	assert_eq!(path.code(), "(0,0)--(1,0)--(1,1)--(-1,1)--cycle");
	assert!(Path::new().set_last_point(p(0.0, 0.0)).is_err());
}

#[test]
fn cycle_is_never_moved_or_assigned() {
	let mut path = square();
	path.move_node(4, p(5.0, 5.0)).unwrap();
	assert_eq!(path.nodes()[4], Node::Cycle);

	let err = path.set_node(4, p(5.0, 5.0)).unwrap_err();
	assert!(matches!(err, Error::InvalidTopology(_)), "{err}");

	path.move_node(2, p(0.5, 0.5)).unwrap();
	assert_eq!(path.nodes()[2], Node::Point(p(1.5, 1.5)));
	assert!(matches!(path.move_node(9, p(0.0, 0.0)), Err(Error::IndexOutOfRange { .. })));
}

#[test]
fn editing_a_computed_path_reverts_to_explicit_without_losing_geometry() {
	let mut path = Path::unit_square();
	let before = path.computed().unwrap().controls().to_vec();

	path.move_node(1, p(0.5, 0.0)).unwrap();
	assert!(!path.is_computed());

	let Path::Explicit(explicit) = &path else {
		panic!("expected explicit path");
	};
	assert_eq!(explicit.nodes()[1], Node::Point(p(1.5, 0.0)));
	assert_eq!(explicit.links()[0], Link::Controls(before[0][0], before[0][1]));
	assert!(path.code().starts_with("(0,0)..controls(0.333333,0)and(0.666667,0)..(1.5,0)"));
}

#[test]
fn controls_are_edited_only_in_computed_form() {
	let mut path = Path::unit_circle();
	path.set_control(0, 1, p(0.5, 1.0)).unwrap();
	path.move_control(0, 0, p(0.0, 0.5)).unwrap();
	let controls = path.computed().unwrap().controls()[0];
	assert!(controls[0].approx_eq(p(1.0, 1.052285), 1e-9));
	assert_eq!(controls[1], p(0.5, 1.0));
	assert!(path.is_computed());

	assert!(matches!(path.set_control(0, 2, p(0.0, 0.0)), Err(Error::IndexOutOfRange { .. })));
	assert!(matches!(square().set_control(0, 0, p(0.0, 0.0)), Err(Error::InvalidTopology(_))));
}

#[test]
fn segments_close_back_to_the_first_node() {
	let path = Path::unit_square();
	let segments = path.computed().unwrap().segments();
	assert_eq!(segments.len(), 4);
	assert_eq!(segments[3].start, p(0.0, 1.0));
	assert_eq!(segments[3].end, p(0.0, 0.0));
}

#[tokio::test]
async fn compute_controls_switches_form() {
	let oracle = StubOracle::new();
	let mut path = square();
	path.compute_controls(&oracle).await.unwrap();

	let computed = path.computed().unwrap();
	assert_eq!(computed.segment_count(), 4);
	assert_eq!(computed.controls()[0], [p(1.0 / 3.0, 0.0), p(2.0 / 3.0, 0.0)]);
	assert_eq!(oracle.calls(), vec!["path (0,0)--(1,0)--(1,1)--(0,1)--cycle"]);

	// Already computed: no round trip.
	path.compute_controls(&oracle).await.unwrap();
	assert_eq!(oracle.calls().len(), 1);
}

#[tokio::test]
async fn editing_after_compute_keeps_the_user_links() {
	let oracle = StubOracle::new();
	let mut path = square();
	path.compute_controls(&oracle).await.unwrap();

	path.set_node(2, p(2.0, 2.0)).unwrap();
	assert!(!path.is_computed());
	assert_eq!(path.code(), "(0,0)--(1,0)--(2,2)--(0,1)--cycle");

	path.compute_controls(&oracle).await.unwrap();
	path.set_link(0, LinkKind::Guess.into()).unwrap();
	assert_eq!(path.code(), "(0,0)..(1,0)--(2,2)--(0,1)--cycle");
}

#[tokio::test]
async fn hand_edited_controls_are_pinned_on_the_next_edit() {
	let oracle = StubOracle::new();
	let mut path = square();
	path.compute_controls(&oracle).await.unwrap();
	assert_eq!(path.computed().unwrap().source(), square_explicit().as_ref());

	path.set_control(0, 0, p(0.5, -1.0)).unwrap();
	assert_eq!(path.computed().unwrap().source(), None);
	path.move_node(3, p(0.0, 1.0)).unwrap();
	assert_eq!(path.nodes()[3], Node::Point(p(0.0, 2.0)));
	assert!(path.code().starts_with("(0,0)..controls(0.5,-1)and("));
}

#[tokio::test]
async fn rejected_edits_keep_the_computed_form() {
	let oracle = StubOracle::new();
	let mut path = square();
	path.compute_controls(&oracle).await.unwrap();
	let before = path.clone();

	assert!(matches!(path.set_node(4, p(5.0, 5.0)), Err(Error::InvalidTopology(_))));
	assert!(matches!(path.move_node(9, p(1.0, 1.0)), Err(Error::IndexOutOfRange { .. })));
	assert!(matches!(
		path.insert_node(7, p(1.0, 1.0), LinkKind::Guess.into()),
		Err(Error::IndexOutOfRange { .. })
	));
	assert!(matches!(path.set_link(4, LinkKind::Guess.into()), Err(Error::IndexOutOfRange { .. })));
	assert_eq!(path, before);
}

#[tokio::test]
async fn empty_path_is_refused_without_a_round_trip() {
	let oracle = StubOracle::new();
	let mut path = Path::new();
	let err = path.compute_controls(&oracle).await.unwrap_err();
	assert!(matches!(err, Error::InvalidTopology(_)), "{err}");
	assert!(Path::new().compute(&oracle).await.is_err());
	assert!(oracle.calls().is_empty());
	assert_eq!(path, Path::new());
}

#[test]
fn leading_link_before_the_first_node_is_dropped() {
	let path = Path::from_nodes(
		vec![(0.0, 0.0).into(), (1.0, 0.0).into(), Node::Cycle],
		vec![LinkKind::Guess.into(), LinkKind::Straight.into(), LinkKind::Guess.into()],
	)
	.unwrap();
	assert_eq!(path.code(), "(0,0)--(1,0)..cycle");

	let err = Path::from_nodes(Vec::new(), vec![LinkKind::Straight.into()]).unwrap_err();
	assert!(matches!(err, Error::InvalidTopology(_)), "{err}");
}

#[tokio::test]
async fn failed_computation_leaves_the_path_unchanged() {
	let oracle = StubOracle::new();
	oracle.set_offline(true);
	let mut path = square();
	let err = path.compute_controls(&oracle).await.unwrap_err();
	assert!(err.is_process_unavailable());
	assert_eq!(path, square());
}

#[tokio::test]
async fn appending_to_a_computed_path_recomputes() {
	let oracle = StubOracle::new();
	let mut path = square();
	path.compute_controls(&oracle).await.unwrap();

	path.add_node((0.5, 2.0).into(), LinkKind::Straight.into(), &oracle)
		.await
		.unwrap();

	let computed = path.computed().unwrap();
	assert_eq!(computed.segment_count(), 5);
	assert_eq!(computed.nodes()[4], Node::Point(p(0.5, 2.0)));
	assert_eq!(computed.nodes()[5], Node::Cycle);
	assert_eq!(oracle.calls().len(), 2);
}

#[tokio::test]
async fn appending_to_an_explicit_path_stays_explicit() {
	let oracle = StubOracle::new();
	let mut path = Path::new();
	path.add_node((0.0, 0.0).into(), LinkKind::Straight.into(), &oracle)
		.await
		.unwrap();
	path.add_node((1.0, 0.0).into(), LinkKind::Guess.into(), &oracle)
		.await
		.unwrap();
	assert_eq!(path.code(), "(0,0)..(1,0)");
	assert!(oracle.calls().is_empty());
}

#[tokio::test]
async fn failed_recompute_keeps_the_node_in_explicit_form() {
	let oracle = StubOracle::new();
	let mut path = square();
	path.compute_controls(&oracle).await.unwrap();
	oracle.set_offline(true);

	let err = path
		.add_node((0.5, 2.0).into(), LinkKind::Straight.into(), &oracle)
		.await
		.unwrap_err();
	assert!(err.is_process_unavailable());
	assert!(!path.is_computed());
	assert_eq!(path.nodes().len(), 6);
}

#[test]
fn parses_multiline_listing() {
	let report = [
		"3",
		"(0,0).. controls (0.5,0) and (1,0.5)",
		" ..(1,1).. controls (1,1.5) and (0.5,2)",
		" ..(0,2)..controls (-0.5,2) and (-0.5,0)",
		" ..cycle",
	];
	let path = parse_path_report(&report).unwrap();
	assert_eq!(
		path.nodes(),
		&[Node::Point(p(0.0, 0.0)), Node::Point(p(1.0, 1.0)), Node::Point(p(0.0, 2.0)), Node::Cycle]
	);
	assert_eq!(path.controls()[2], [p(-0.5, 2.0), p(-0.5, 0.0)]);
}

#[test]
fn direction_markers_are_ignored() {
	let report = ["1", "(0,0).. controls (1,0) and (2,0)", " ..>(3,0)"];
	let path = parse_path_report(&report).unwrap();
	assert_eq!(path.nodes()[1], Node::Point(p(3.0, 0.0)));
}

#[test]
fn single_node_path_has_no_controls() {
	let path = parse_path_report(&["0", "(4,2)"]).unwrap();
	assert_eq!(path.nodes(), &[Node::Point(p(4.0, 2.0))]);
	assert_eq!(path.segment_count(), 0);
}

#[test]
fn malformed_listings_are_rejected() {
	// Fewer lines than the reported length implies.
	assert!(parse_path_report(&["2", "(0,0).. controls (1,0) and (2,0)", " ..(3,0)"])
		.unwrap_err()
		.is_malformed());
	// Control clause without its second point.
	assert!(parse_path_report(&["1", "(0,0).. controls (1,0)", " ..(3,0)"])
		.unwrap_err()
		.is_malformed());
	// Unparseable node.
	assert!(parse_path_report(&["1", "(0,0).. controls (1,0) and (2,0)", " ..(3;0)"])
		.unwrap_err()
		.is_malformed());
	assert!(parse_path_report(&["many"]).unwrap_err().is_malformed());
	assert!(parse_path_report::<&str>(&[]).unwrap_err().is_malformed());
}
