//! Paths in their two forms.
//!
//! An [`ExplicitPath`] is what the user edits: nodes joined by links. A
//! [`ComputedPath`] is what the interpreter makes of it: nodes joined by cubic
//! Bezier segments with explicit control points. [`Path`] is always exactly one
//! of the two; the explicit form becomes computed only through a round trip via
//! the [`Oracle`](crate::Oracle). A computed path remembers the explicit path it
//! came from, and any edit that could make the controls stale drops the controls
//! and applies the edit to that source instead.

use std::fmt;

use xasy_primitives::{CubicSegment, Point};

use crate::{Error, Oracle, Result};

mod parse;

pub use parse::parse_path_report;

/// A path node: a point, or the `cycle` sentinel closing the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
	/// A point on the path.
	Point(Point),
	/// Closes the path back to the first node. Only ever the last node.
	Cycle,
}

impl Node {
	/// Whether this is the `cycle` sentinel.
	pub fn is_cycle(&self) -> bool {
		matches!(self, Self::Cycle)
	}

	/// The point, unless this is the sentinel.
	pub fn point(&self) -> Option<Point> {
		match self {
			Self::Point(p) => Some(*p),
			Self::Cycle => None,
		}
	}
}

impl From<Point> for Node {
	fn from(p: Point) -> Self {
		Self::Point(p)
	}
}

impl From<(f64, f64)> for Node {
	fn from(p: (f64, f64)) -> Self {
		Self::Point(p.into())
	}
}

impl fmt::Display for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Point(p) => p.fmt(f),
			Self::Cycle => f.write_str("cycle"),
		}
	}
}

/// The joining rules a user can pick between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
	/// A straight segment.
	Straight,
	/// A smooth curve whose controls the interpreter guesses.
	Guess,
	/// A smooth curve with bounded tension.
	ExplicitControl,
}

/// Separator text for each [`LinkKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAlphabet {
	/// Separator for [`LinkKind::Straight`].
	pub straight: String,
	/// Separator for [`LinkKind::Guess`].
	pub guess: String,
	/// Separator for [`LinkKind::ExplicitControl`].
	pub explicit_control: String,
}

impl Default for LinkAlphabet {
	fn default() -> Self {
		Self {
			straight: "--".into(),
			guess: "..".into(),
			explicit_control: "::".into(),
		}
	}
}

impl LinkAlphabet {
	/// Separator for `kind`.
	pub fn separator(&self, kind: LinkKind) -> &str {
		match kind {
			LinkKind::Straight => &self.straight,
			LinkKind::Guess => &self.guess,
			LinkKind::ExplicitControl => &self.explicit_control,
		}
	}

	/// The kind rendered as `separator`, if any.
	pub fn kind_of(&self, separator: &str) -> Option<LinkKind> {
		[LinkKind::Straight, LinkKind::Guess, LinkKind::ExplicitControl]
			.into_iter()
			.find(|&kind| self.separator(kind) == separator)
	}
}

/// How consecutive nodes of an explicit path are joined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Link {
	/// A user-selected joining rule.
	Kind(LinkKind),
	/// A segment pinned to known Bezier controls, as left behind when a computed
	/// path is edited.
	Controls(Point, Point),
}

impl From<LinkKind> for Link {
	fn from(kind: LinkKind) -> Self {
		Self::Kind(kind)
	}
}

impl Link {
	fn write(&self, alphabet: &LinkAlphabet, out: &mut String) {
		match self {
			Self::Kind(kind) => out.push_str(alphabet.separator(*kind)),
			Self::Controls(a, b) => out.push_str(&format!("..controls{a}and{b}..")),
		}
	}
}

fn validate_nodes(nodes: &[Node]) -> Result<()> {
	if let Some(i) = nodes.iter().position(Node::is_cycle)
		&& i + 1 != nodes.len()
	{
		return Err(Error::InvalidTopology(format!(
			"cycle at node {i} of {}; it must be the last node",
			nodes.len()
		)));
	}
	if nodes.first().is_some_and(Node::is_cycle) {
		return Err(Error::InvalidTopology("a path cannot start with cycle".into()));
	}
	Ok(())
}

fn check_index(index: usize, len: usize) -> Result<()> {
	if index < len {
		Ok(())
	} else {
		Err(Error::IndexOutOfRange { index, len })
	}
}

/// Nodes joined by user-chosen links.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExplicitPath {
	nodes: Vec<Node>,
	links: Vec<Link>,
}

impl ExplicitPath {
	/// An empty path.
	pub fn new() -> Self {
		Self::default()
	}

	/// Build from nodes and the links between them.
	///
	/// Links may number one fewer than the nodes, or as many when the first link
	/// stands before the first node; that leading link joins nothing and is dropped.
	pub fn from_parts(nodes: Vec<Node>, mut links: Vec<Link>) -> Result<Self> {
		validate_nodes(&nodes)?;
		if !nodes.is_empty() && links.len() == nodes.len() {
			links.remove(0);
		}
		let expected = nodes.len().saturating_sub(1);
		if links.len() != expected {
			return Err(Error::InvalidTopology(format!(
				"{} nodes need {expected} links, got {}",
				nodes.len(),
				links.len()
			)));
		}
		Ok(Self { nodes, links })
	}

	/// The nodes.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// The links; `links()[i]` joins node `i` to node `i + 1`.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Whether the last node is `cycle`.
	pub fn is_cyclic(&self) -> bool {
		self.nodes.last().is_some_and(Node::is_cycle)
	}

	/// Path literal using the default separators.
	pub fn code(&self) -> String {
		self.code_with(&LinkAlphabet::default())
	}

	/// Path literal using `alphabet`.
	pub fn code_with(&self, alphabet: &LinkAlphabet) -> String {
		let mut out = String::new();
		let Some(first) = self.nodes.first() else {
			return out;
		};
		out.push_str(&first.to_string());
		for (link, node) in self.links.iter().zip(&self.nodes[1..]) {
			link.write(alphabet, &mut out);
			out.push_str(&node.to_string());
		}
		out
	}

	fn point_count(&self) -> usize {
		self.nodes.len() - usize::from(self.is_cyclic())
	}

	/// Append a node. Points go before a closing `cycle`.
	pub fn push_node(&mut self, node: Node, link: Link) -> Result<()> {
		match node {
			Node::Cycle if self.nodes.is_empty() || self.is_cyclic() => {
				return Err(Error::InvalidTopology(
					"cycle needs an open path with at least one point".into(),
				));
			}
			Node::Point(p) if self.is_cyclic() => {
				self.nodes.insert(self.nodes.len() - 1, Node::Point(p));
			}
			node => self.nodes.push(node),
		}
		if self.nodes.len() > 1 {
			self.links.push(link);
		}
		Ok(())
	}

	/// Insert a point at `index`, together with a link.
	pub fn insert_node(&mut self, index: usize, point: Point, link: Link) -> Result<()> {
		let limit = self.point_count();
		if index > limit {
			return Err(Error::IndexOutOfRange { index, len: limit + 1 });
		}
		let had_nodes = !self.nodes.is_empty();
		self.nodes.insert(index, Node::Point(point));
		if had_nodes {
			let at = index.min(self.links.len());
			self.links.insert(at, link);
		}
		Ok(())
	}

	/// Replace the point at `index`.
	pub fn set_node(&mut self, index: usize, point: Point) -> Result<()> {
		check_index(index, self.nodes.len())?;
		if self.nodes[index].is_cycle() {
			return Err(Error::InvalidTopology("cannot assign a point to cycle".into()));
		}
		self.nodes[index] = Node::Point(point);
		Ok(())
	}

	/// Translate the point at `index`. The `cycle` sentinel does not move.
	pub fn move_node(&mut self, index: usize, offset: Point) -> Result<()> {
		check_index(index, self.nodes.len())?;
		if let Node::Point(p) = &mut self.nodes[index] {
			*p = *p + offset;
		}
		Ok(())
	}

	/// Change the link at `index`.
	pub fn set_link(&mut self, index: usize, link: Link) -> Result<()> {
		check_index(index, self.links.len())?;
		self.links[index] = link;
		Ok(())
	}

	/// Remove the last point, keeping a closing `cycle` in place.
	///
	/// Removing the only point of a closed path leaves an empty path.
	pub fn remove_last_point(&mut self) {
		match (self.is_cyclic(), self.point_count()) {
			(_, 0) => {}
			(true, 1) => {
				self.nodes.clear();
				self.links.clear();
			}
			(true, n) => {
				self.nodes.remove(n - 1);
				self.links.pop();
			}
			(false, _) => {
				self.nodes.pop();
				self.links.pop();
			}
		}
	}

	/// Replace the last point, which sits before `cycle` on a closed path.
	pub fn set_last_point(&mut self, point: Point) -> Result<()> {
		let count = self.point_count();
		if count == 0 {
			return Err(Error::IndexOutOfRange { index: 0, len: 0 });
		}
		self.nodes[count - 1] = Node::Point(point);
		Ok(())
	}
}

/// Nodes joined by cubic Bezier segments, as computed by the interpreter.
///
/// `controls()[i]` belongs to the segment from node `i` to node `i + 1`; for a
/// closed path the last pair belongs to the segment ending at `cycle`, which
/// resolves to the first node.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedPath {
	nodes: Vec<Node>,
	controls: Vec<[Point; 2]>,
	source: Option<ExplicitPath>,
}

impl ComputedPath {
	/// Build from nodes and one control pair per segment.
	pub fn from_parts(nodes: Vec<Node>, controls: Vec<[Point; 2]>) -> Result<Self> {
		validate_nodes(&nodes)?;
		let expected = nodes.len().saturating_sub(1);
		if controls.len() != expected {
			return Err(Error::InvalidTopology(format!(
				"{} nodes need {expected} control pairs, got {}",
				nodes.len(),
				controls.len()
			)));
		}
		Ok(Self {
			nodes,
			controls,
			source: None,
		})
	}

	/// Remember the explicit path these controls were computed from.
	pub fn with_source(mut self, source: ExplicitPath) -> Self {
		self.source = Some(source);
		self
	}

	/// The explicit path these controls were computed from, if known.
	///
	/// Editing a control by hand forgets the source: the controls are then the
	/// only description of the geometry.
	pub fn source(&self) -> Option<&ExplicitPath> {
		self.source.as_ref()
	}

	/// The nodes.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Control pairs, one per segment.
	pub fn controls(&self) -> &[[Point; 2]] {
		&self.controls
	}

	/// Number of Bezier segments.
	pub fn segment_count(&self) -> usize {
		self.controls.len()
	}

	/// Whether the last node is `cycle`.
	pub fn is_cyclic(&self) -> bool {
		self.nodes.last().is_some_and(Node::is_cycle)
	}

	/// Path literal with every control spelled out.
	pub fn code(&self) -> String {
		self.pinned().code()
	}

	/// The explicit form to edit: the source when known, otherwise the same
	/// geometry with every segment pinned to its controls.
	pub fn to_explicit(&self) -> ExplicitPath {
		match &self.source {
			Some(source) => source.clone(),
			None => self.pinned(),
		}
	}

	fn pinned(&self) -> ExplicitPath {
		ExplicitPath {
			nodes: self.nodes.clone(),
			links: self.controls.iter().map(|[a, b]| Link::Controls(*a, *b)).collect(),
		}
	}

	/// The Bezier segments, with `cycle` resolved to the first node.
	pub fn segments(&self) -> Vec<CubicSegment> {
		let first = self.nodes.first().and_then(Node::point);
		let resolve = |node: &Node| node.point().or(first);
		self.nodes
			.windows(2)
			.zip(&self.controls)
			.filter_map(|(pair, [c0, c1])| {
				Some(CubicSegment::new(resolve(&pair[0])?, *c0, *c1, resolve(&pair[1])?))
			})
			.collect()
	}

	/// Move control `which` (0 leaves the start node, 1 enters the end node) of `segment`.
	pub fn set_control(&mut self, segment: usize, which: usize, position: Point) -> Result<()> {
		check_index(segment, self.controls.len())?;
		check_index(which, 2)?;
		self.controls[segment][which] = position;
		self.source = None;
		Ok(())
	}

	/// Translate a control point.
	pub fn move_control(&mut self, segment: usize, which: usize, offset: Point) -> Result<()> {
		check_index(segment, self.controls.len())?;
		check_index(which, 2)?;
		let control = &mut self.controls[segment][which];
		*control = *control + offset;
		self.source = None;
		Ok(())
	}
}

/// A path in exactly one of its two forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Path {
	/// User-editable nodes and links.
	Explicit(ExplicitPath),
	/// Interpreter-computed nodes and controls.
	Computed(ComputedPath),
}

impl Default for Path {
	fn default() -> Self {
		Self::Explicit(ExplicitPath::new())
	}
}

impl Path {
	/// An empty explicit path.
	pub fn new() -> Self {
		Self::default()
	}

	/// An explicit path from nodes and links.
	pub fn from_nodes(nodes: Vec<Node>, links: Vec<Link>) -> Result<Self> {
		ExplicitPath::from_parts(nodes, links).map(Self::Explicit)
	}

	/// A computed path from nodes and control pairs.
	pub fn from_controls(nodes: Vec<Node>, controls: Vec<[Point; 2]>) -> Result<Self> {
		ComputedPath::from_parts(nodes, controls).map(Self::Computed)
	}

	/// The interpreter's `unitcircle`.
	pub fn unit_circle() -> Self {
		const K: f64 = 0.552285;
		Self::Computed(ComputedPath {
			nodes: vec![
				(1.0, 0.0).into(),
				(0.0, 1.0).into(),
				(-1.0, 0.0).into(),
				(0.0, -1.0).into(),
				Node::Cycle,
			],
			controls: vec![
				[Point::new(1.0, K), Point::new(K, 1.0)],
				[Point::new(-K, 1.0), Point::new(-1.0, K)],
				[Point::new(-1.0, -K), Point::new(-K, -1.0)],
				[Point::new(K, -1.0), Point::new(1.0, -K)],
			],
			source: None,
		})
	}

	/// The interpreter's `unitsquare`.
	pub fn unit_square() -> Self {
		const A: f64 = 0.333333;
		const B: f64 = 0.666667;
		Self::Computed(ComputedPath {
			nodes: vec![
				(0.0, 0.0).into(),
				(1.0, 0.0).into(),
				(1.0, 1.0).into(),
				(0.0, 1.0).into(),
				Node::Cycle,
			],
			controls: vec![
				[Point::new(A, 0.0), Point::new(B, 0.0)],
				[Point::new(1.0, A), Point::new(1.0, B)],
				[Point::new(B, 1.0), Point::new(A, 1.0)],
				[Point::new(0.0, B), Point::new(0.0, A)],
			],
			source: None,
		})
	}

	/// The nodes, in either form.
	pub fn nodes(&self) -> &[Node] {
		match self {
			Self::Explicit(p) => p.nodes(),
			Self::Computed(p) => p.nodes(),
		}
	}

	/// Whether the controls are current.
	pub fn is_computed(&self) -> bool {
		matches!(self, Self::Computed(_))
	}

	/// Whether the last node is `cycle`.
	pub fn is_cyclic(&self) -> bool {
		self.nodes().last().is_some_and(Node::is_cycle)
	}

	/// The computed form, if current.
	pub fn computed(&self) -> Option<&ComputedPath> {
		match self {
			Self::Computed(p) => Some(p),
			Self::Explicit(_) => None,
		}
	}

	/// Path literal using the default separators.
	pub fn code(&self) -> String {
		self.code_with(&LinkAlphabet::default())
	}

	/// Path literal using `alphabet`.
	pub fn code_with(&self, alphabet: &LinkAlphabet) -> String {
		match self {
			Self::Explicit(p) => p.code_with(alphabet),
			Self::Computed(p) => p.code(),
		}
	}

	/// Ask the interpreter for the computed form without changing `self`.
	pub async fn compute(&self, oracle: &dyn Oracle) -> Result<ComputedPath> {
		match self {
			Self::Computed(p) => Ok(p.clone()),
			Self::Explicit(p) => query_controls(p, oracle).await,
		}
	}

	/// Switch to the computed form. On error the path is left as it was.
	///
	/// An empty path has no literal to evaluate and is refused with
	/// [`Error::InvalidTopology`].
	pub async fn compute_controls(&mut self, oracle: &dyn Oracle) -> Result<()> {
		if let Self::Explicit(p) = self {
			let computed = query_controls(p, oracle).await?;
			*self = Self::Computed(computed);
		}
		Ok(())
	}

	/// Apply `edit` to the explicit form. A computed path commits to its
	/// explicit form only when the edit succeeds.
	fn edit_explicit<R>(&mut self, edit: impl FnOnce(&mut ExplicitPath) -> Result<R>) -> Result<R> {
		match self {
			Self::Explicit(p) => edit(p),
			Self::Computed(p) => {
				let mut explicit = p.to_explicit();
				let out = edit(&mut explicit)?;
				*self = Self::Explicit(explicit);
				Ok(out)
			}
		}
	}

	/// Append a node.
	///
	/// A computed path has its controls recomputed straight away. If that round
	/// trip fails the node stays appended and the path is left explicit.
	pub async fn add_node(&mut self, node: Node, link: Link, oracle: &dyn Oracle) -> Result<()> {
		let was_computed = self.is_computed();
		self.edit_explicit(|p| p.push_node(node, link))?;
		if was_computed {
			self.compute_controls(oracle).await?;
		}
		Ok(())
	}

	/// Insert a point at `index`. The path becomes explicit.
	pub fn insert_node(&mut self, index: usize, point: Point, link: Link) -> Result<()> {
		self.edit_explicit(|p| p.insert_node(index, point, link))
	}

	/// Replace the point at `index`. The path becomes explicit.
	pub fn set_node(&mut self, index: usize, point: Point) -> Result<()> {
		self.edit_explicit(|p| p.set_node(index, point))
	}

	/// Translate the point at `index`. The path becomes explicit.
	pub fn move_node(&mut self, index: usize, offset: Point) -> Result<()> {
		self.edit_explicit(|p| p.move_node(index, offset))
	}

	/// Change the link at `index`. The path becomes explicit.
	pub fn set_link(&mut self, index: usize, link: Link) -> Result<()> {
		self.edit_explicit(|p| p.set_link(index, link))
	}

	/// Remove the last point, keeping `cycle`. The path becomes explicit.
	pub fn remove_last_point(&mut self) {
		let _ = self.edit_explicit(|p| {
			p.remove_last_point();
			Ok(())
		});
	}

	/// Replace the last point before `cycle`. The path becomes explicit.
	pub fn set_last_point(&mut self, point: Point) -> Result<()> {
		self.edit_explicit(|p| p.set_last_point(point))
	}

	/// Move a control point of a computed path. Explicit paths have none.
	pub fn set_control(&mut self, segment: usize, which: usize, position: Point) -> Result<()> {
		self.computed_mut()?.set_control(segment, which, position)
	}

	/// Translate a control point of a computed path.
	pub fn move_control(&mut self, segment: usize, which: usize, offset: Point) -> Result<()> {
		self.computed_mut()?.move_control(segment, which, offset)
	}

	fn computed_mut(&mut self) -> Result<&mut ComputedPath> {
		match self {
			Self::Computed(p) => Ok(p),
			Self::Explicit(_) => Err(Error::InvalidTopology("path has no computed controls".into())),
		}
	}
}

async fn query_controls(path: &ExplicitPath, oracle: &dyn Oracle) -> Result<ComputedPath> {
	if path.nodes().is_empty() {
		return Err(Error::InvalidTopology("an empty path has no controls".into()));
	}
	let computed = oracle.path_controls(&path.code()).await?;
	Ok(computed.with_source(path.clone()))
}

impl fmt::Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.code())
	}
}

#[cfg(test)]
mod tests;
