//! Drawable items.
//!
//! An [`Item`] is one of a closed set of kinds, each with its own code template.
//! Code generation is local and cached; [`Item::asyfy`] is the only operation
//! that renders through the interpreter, and [`Item::draw_outline`] the only one
//! that asks it for geometry on the way to the screen.

use std::fmt;

use tracing::debug;
use xasy_primitives::{DEFAULT_SAMPLES, Point, Transform};

use crate::fragment::Fragment;
use crate::label::Label;
use crate::path::{Link, Node, Path};
use crate::pen::Pen;
use crate::surface::{DisplayHandle, Outline, Surface, SurfaceId};
use crate::{Error, Oracle, Result};

/// A path stroked or filled with a pen.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
	path: Path,
	pen: Pen,
	transform: Transform,
	filled: bool,
}

impl Shape {
	/// The path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The pen.
	pub fn pen(&self) -> &Pen {
		&self.pen
	}

	/// The transform applied when drawing.
	pub fn transform(&self) -> Transform {
		self.transform
	}

	/// Whether the path is filled rather than stroked.
	pub fn is_filled(&self) -> bool {
		self.filled
	}

	fn code(&self) -> String {
		let command = if self.filled { "fill" } else { "draw" };
		format!(
			"xformStack.push({});\n{command}({},{});",
			self.transform.code(),
			self.path.code(),
			self.pen.code()
		)
	}

	/// Screen-space polyline of the computed path: sampled, transformed, y flipped.
	fn outline_points(&self) -> Vec<Point> {
		let Some(path) = self.path.computed() else {
			return Vec::new();
		};
		let flip = |p: Point| Point::new(p.x, -p.y);
		match path.nodes() {
			[] | [Node::Cycle] => Vec::new(),
			[Node::Point(p)] => vec![flip(self.transform.apply(*p))],
			_ => {
				let mut points = Vec::new();
				for (i, segment) in path.segments().iter().enumerate() {
					let samples = segment.transformed(&self.transform).sample(DEFAULT_SAMPLES);
					points.extend(samples.into_iter().skip(usize::from(i > 0)).map(flip));
				}
				points
			}
		}
	}
}

/// A label placed with a transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
	label: Label,
	transform: Transform,
}

impl Text {
	/// The label.
	pub fn label(&self) -> &Label {
		&self.label
	}

	/// The transform applied when drawing.
	pub fn transform(&self) -> Transform {
		self.transform
	}

	fn code(&self) -> String {
		format!("xformStack.push({});\nlabel({});", self.transform.code(), self.label.code())
	}
}

/// Opaque interpreter code with one transform per rendered fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
	text: String,
	transforms: Vec<Transform>,
}

impl Script {
	/// The script source.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Per-fragment transforms, by fragment index.
	pub fn transforms(&self) -> &[Transform] {
		&self.transforms
	}

	fn code(&self) -> String {
		let mut code = String::new();
		if !self.transforms.is_empty() {
			let indexed: Vec<String> = self
				.transforms
				.iter()
				.enumerate()
				.map(|(i, t)| format!("indexedTransform({i},{t})"))
				.collect();
			code.push_str(&format!("xformStack.add({});\n", indexed.join(",\n")));
		}
		code.push_str("startScript();{\n");
		code.push_str(&self.text.replace('\t', " "));
		code.truncate(code.trim_end().len());
		code.push_str("\n}endScript();\n");
		code
	}
}

/// What an item draws.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
	/// A stroked or filled path.
	Shape(Shape),
	/// A label.
	Text(Text),
	/// A script block.
	Script(Script),
}

impl ItemKind {
	/// Short name of the kind.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Shape(shape) if shape.filled => "filled shape",
			Self::Shape(_) => "shape",
			Self::Text(_) => "text",
			Self::Script(_) => "script",
		}
	}

	fn code(&self) -> String {
		match self {
			Self::Shape(shape) => shape.code(),
			Self::Text(text) => text.code(),
			Self::Script(script) => script.code(),
		}
	}
}

/// Whether an item's fragments match its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
	/// Never rendered.
	Unrealized,
	/// Fragments were rendered from the current code.
	Current,
	/// Edited since the fragments were rendered.
	Stale,
}

/// A drawable item with its cached code, fragments and display binding.
#[derive(Debug, Clone)]
pub struct Item {
	kind: ItemKind,
	code: Option<String>,
	fragments: Vec<Fragment>,
	surface: Option<SurfaceId>,
	outline: Option<DisplayHandle>,
	state: ItemState,
}

impl Item {
	fn from_kind(kind: ItemKind) -> Self {
		Self {
			kind,
			code: None,
			fragments: Vec::new(),
			surface: None,
			outline: None,
			state: ItemState::Unrealized,
		}
	}

	/// A stroked path.
	pub fn shape(path: Path, pen: Pen) -> Self {
		Self::from_kind(ItemKind::Shape(Shape {
			path,
			pen,
			transform: Transform::IDENTITY,
			filled: false,
		}))
	}

	/// A filled path. The path must end with `cycle`.
	pub fn filled_shape(path: Path, pen: Pen) -> Result<Self> {
		if !path.is_cyclic() {
			return Err(Error::InvalidTopology("filled paths must end with cycle".into()));
		}
		Ok(Self::from_kind(ItemKind::Shape(Shape {
			path,
			pen,
			transform: Transform::IDENTITY,
			filled: true,
		})))
	}

	/// A label.
	pub fn text(label: Label) -> Self {
		Self::from_kind(ItemKind::Text(Text {
			label,
			transform: Transform::IDENTITY,
		}))
	}

	/// A script block with initial per-fragment transforms.
	pub fn script(text: impl Into<String>, transforms: Vec<Transform>) -> Self {
		Self::from_kind(ItemKind::Script(Script {
			text: text.into(),
			transforms,
		}))
	}

	/// Replace the transform of a shape or label.
	pub fn with_transform(mut self, transform: Transform) -> Self {
		self.set_transform(transform);
		self
	}

	/// What the item draws.
	pub fn kind(&self) -> &ItemKind {
		&self.kind
	}

	/// Rendering state.
	pub fn state(&self) -> ItemState {
		self.state
	}

	/// Fragments of the last successful render.
	pub fn fragments(&self) -> &[Fragment] {
		&self.fragments
	}

	/// The surface the item is displayed on, if any.
	pub fn surface(&self) -> Option<SurfaceId> {
		self.surface
	}

	/// The item's transforms: one for shapes and labels, one per fragment for scripts.
	pub fn transforms(&self) -> &[Transform] {
		match &self.kind {
			ItemKind::Shape(shape) => std::slice::from_ref(&shape.transform),
			ItemKind::Text(text) => std::slice::from_ref(&text.transform),
			ItemKind::Script(script) => &script.transforms,
		}
	}

	/// Interpreter code for the item, regenerated only after an edit.
	pub fn code(&mut self) -> &str {
		self.code.get_or_insert_with(|| self.kind.code())
	}

	fn touch(&mut self) {
		self.code = None;
		if self.state == ItemState::Current {
			self.state = ItemState::Stale;
		}
	}

	/// Set the transform. A script applies it to every fragment.
	pub fn set_transform(&mut self, transform: Transform) {
		match &mut self.kind {
			ItemKind::Shape(shape) => shape.transform = transform,
			ItemKind::Text(text) => text.transform = transform,
			ItemKind::Script(script) => script.transforms.fill(transform),
		}
		self.touch();
	}

	/// Set the transform at `index` of [`Item::transforms`].
	pub fn set_fragment_transform(&mut self, index: usize, transform: Transform) -> Result<()> {
		let transforms: &mut [Transform] = match &mut self.kind {
			ItemKind::Shape(shape) => std::slice::from_mut(&mut shape.transform),
			ItemKind::Text(text) => std::slice::from_mut(&mut text.transform),
			ItemKind::Script(script) => &mut script.transforms,
		};
		let len = transforms.len();
		let slot = transforms
			.get_mut(index)
			.ok_or(Error::IndexOutOfRange { index, len })?;
		*slot = transform;
		self.touch();
		Ok(())
	}

	/// Reset transforms to the identity; a script gets one per current fragment.
	pub fn clear_transforms(&mut self) {
		match &mut self.kind {
			ItemKind::Shape(shape) => shape.transform = Transform::IDENTITY,
			ItemKind::Text(text) => text.transform = Transform::IDENTITY,
			ItemKind::Script(script) => {
				script.transforms = vec![Transform::IDENTITY; self.fragments.len()];
			}
		}
		self.touch();
	}

	/// Replace the pen of a shape or label.
	pub fn set_pen(&mut self, pen: Pen) -> Result<()> {
		let kind = self.kind.name();
		match &mut self.kind {
			ItemKind::Shape(shape) => shape.pen = pen,
			ItemKind::Text(text) => text.label.pen = pen,
			ItemKind::Script(_) => {
				return Err(Error::WrongKind {
					operation: "setting a pen",
					kind,
				});
			}
		}
		self.touch();
		Ok(())
	}

	/// Replace the label of a text item.
	pub fn set_label(&mut self, label: Label) -> Result<()> {
		let kind = self.kind.name();
		let ItemKind::Text(text) = &mut self.kind else {
			return Err(Error::WrongKind {
				operation: "setting a label",
				kind,
			});
		};
		text.label = label;
		self.touch();
		Ok(())
	}

	/// Replace the source of a script item. Transforms are reconciled on the next render.
	pub fn set_script(&mut self, source: impl Into<String>) -> Result<()> {
		let kind = self.kind.name();
		let ItemKind::Script(script) = &mut self.kind else {
			return Err(Error::WrongKind {
				operation: "setting script text",
				kind,
			});
		};
		script.text = source.into();
		self.touch();
		Ok(())
	}

	/// Edit the path of a shape.
	///
	/// An edit that would leave a filled shape open is undone and reported as
	/// [`Error::InvalidTopology`].
	pub fn edit_path<R>(&mut self, edit: impl FnOnce(&mut Path) -> Result<R>) -> Result<R> {
		let kind = self.kind.name();
		let ItemKind::Shape(shape) = &mut self.kind else {
			return Err(Error::WrongKind {
				operation: "editing a path",
				kind,
			});
		};
		let before = shape.path.clone();
		let result = edit(&mut shape.path);
		if shape.filled && !shape.path.is_cyclic() {
			shape.path = before;
			return Err(Error::InvalidTopology("filled paths must end with cycle".into()));
		}
		self.touch();
		result
	}

	/// Append a node to a shape's path, recomputing controls if they were current.
	pub async fn add_node(&mut self, node: Node, link: Link, oracle: &dyn Oracle) -> Result<()> {
		let kind = self.kind.name();
		let ItemKind::Shape(shape) = &mut self.kind else {
			return Err(Error::WrongKind {
				operation: "adding a node",
				kind,
			});
		};
		let result = shape.path.add_node(node, link, oracle).await;
		self.touch();
		result
	}

	fn check_binding(&self, surface: &dyn Surface) -> Result<()> {
		match self.surface {
			Some(bound) if bound != surface.id() => Err(Error::AlreadyBound {
				bound,
				requested: surface.id(),
			}),
			_ => Ok(()),
		}
	}

	/// Render the item through the interpreter.
	///
	/// Prior fragments are dropped first, and removed from `surface` when one is
	/// given. A script's transform list is resized to the new fragment count,
	/// padding with identities. New non-empty fragments are placed on `surface`,
	/// which the item is then bound to.
	pub async fn asyfy(&mut self, oracle: &dyn Oracle, mut surface: Option<&mut dyn Surface>) -> Result<&[Fragment]> {
		if let Some(surface) = surface.as_deref() {
			self.check_binding(surface)?;
		}

		let previous = std::mem::take(&mut self.fragments);
		if let Some(surface) = surface.as_deref_mut() {
			for handle in previous.iter().filter_map(|f| f.handle) {
				surface.remove(handle);
			}
		}

		let code = self.code().to_string();
		let mut fragments = match oracle.deconstruct(&code).await {
			Ok(fragments) => fragments,
			Err(e) => {
				if self.state == ItemState::Current {
					self.state = ItemState::Stale;
				}
				return Err(e);
			}
		};
		debug!(kind = self.kind.name(), fragments = fragments.len(), "asyfied");

		if let ItemKind::Script(script) = &mut self.kind
			&& script.transforms.len() != fragments.len()
		{
			script.transforms.resize(fragments.len(), Transform::IDENTITY);
			self.code = None;
		}

		if let Some(surface) = surface {
			for fragment in fragments.iter_mut().filter(|f| !f.is_empty()) {
				let handle = surface.place_fragment(fragment);
				fragment.handle = Some(handle);
			}
			self.surface = Some(surface.id());
		}

		self.fragments = fragments;
		self.state = ItemState::Current;
		Ok(&self.fragments)
	}

	/// Draw a shape natively instead of as fragments.
	///
	/// Controls are computed and the pen color resolved through `oracle` when
	/// needed. The outline is placed once and updated in place afterwards.
	pub async fn draw_outline(&mut self, oracle: &dyn Oracle, surface: &mut dyn Surface) -> Result<DisplayHandle> {
		self.check_binding(surface)?;
		let kind = self.kind.name();
		let ItemKind::Shape(shape) = &mut self.kind else {
			return Err(Error::WrongKind {
				operation: "outline drawing",
				kind,
			});
		};

		if !shape.path.is_computed() {
			shape.path.compute_controls(oracle).await?;
			self.code = None;
		}
		let outline = Outline {
			color: shape.pen.display_color(oracle).await?,
			width: shape.pen.width(),
			filled: shape.filled,
			points: shape.outline_points(),
		};

		let handle = match self.outline {
			Some(handle) => {
				surface.update_outline(handle, &outline);
				handle
			}
			None => surface.place_outline(&outline),
		};
		self.outline = Some(handle);
		self.surface = Some(surface.id());
		Ok(handle)
	}

	/// Remove everything the item placed on `surface` and unbind it.
	pub fn remove_from_surface(&mut self, surface: &mut dyn Surface) -> Result<()> {
		self.check_binding(surface)?;
		for handle in self.fragments.iter_mut().filter_map(|f| f.handle.take()) {
			surface.remove(handle);
		}
		if let Some(handle) = self.outline.take() {
			surface.remove(handle);
		}
		self.surface = None;
		Ok(())
	}
}

impl fmt::Display for Item {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let code = self.code.clone().unwrap_or_else(|| self.kind.code());
		let body = code.lines().collect::<Vec<_>>().join("\n\t");
		match &self.kind {
			ItemKind::Shape(shape) if shape.filled => write!(f, "Filled shape code: {body}"),
			ItemKind::Shape(_) => write!(f, "Shape code: {body}"),
			ItemKind::Text(_) => write!(f, "Text code: {body}"),
			ItemKind::Script(script) => {
				let transforms: Vec<String> = script.transforms.iter().map(Transform::code).collect();
				write!(f, "Script with transforms [{}] code: {body}", transforms.join(", "))
			}
		}
	}
}
