//! An [`Oracle`] that answers without an interpreter.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::DynamicImage;
use xasy_primitives::{Point, Rgb};

use crate::fragment::{BoundingBox, Fragment};
use crate::path::{ComputedPath, Node};
use crate::{Error, Oracle, Result};

/// Computes straight-line controls, reports a fixed color and produces a fixed
/// number of one-pixel fragments. Every request is recorded.
pub(crate) struct StubOracle {
	calls: Mutex<Vec<String>>,
	offline: AtomicBool,
	color: Rgb,
	fragments: AtomicUsize,
}

impl StubOracle {
	pub(crate) fn new() -> Self {
		Self::with_color(Rgb::BLACK)
	}

	pub(crate) fn with_color(color: Rgb) -> Self {
		Self {
			calls: Mutex::new(Vec::new()),
			offline: AtomicBool::new(false),
			color,
			fragments: AtomicUsize::new(1),
		}
	}

	/// Make every request fail as if the interpreter were gone.
	pub(crate) fn set_offline(&self, offline: bool) {
		self.offline.store(offline, Ordering::SeqCst);
	}

	pub(crate) fn set_fragment_count(&self, count: usize) {
		self.fragments.store(count, Ordering::SeqCst);
	}

	pub(crate) fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap().clone()
	}

	fn record(&self, call: String) -> Result<()> {
		self.calls.lock().unwrap().push(call);
		if self.offline.load(Ordering::SeqCst) {
			return Err(Error::Session(xasy_session::Error::ProcessUnavailable(
				"stub interpreter is offline".into(),
			)));
		}
		Ok(())
	}
}

fn third(a: Point, b: Point, k: f64) -> Point {
	Point::new(a.x + (b.x - a.x) * k, a.y + (b.y - a.y) * k)
}

#[async_trait]
impl Oracle for StubOracle {
	async fn path_controls(&self, literal: &str) -> Result<ComputedPath> {
		self.record(format!("path {literal}"))?;
		let nodes: Vec<Node> = literal
			.replace("--", "..")
			.replace("::", "..")
			.split("..")
			.filter(|part| !part.is_empty() && !part.starts_with("controls"))
			.map(|part| match part {
				"cycle" => Ok(Node::Cycle),
				p => p.parse::<Point>().map(Node::Point).map_err(|e| Error::malformed(e.0)),
			})
			.collect::<Result<_>>()?;
		let first = nodes.first().and_then(Node::point).unwrap_or_default();
		let controls = nodes
			.windows(2)
			.map(|pair| {
				let a = pair[0].point().unwrap_or(first);
				let b = pair[1].point().unwrap_or(first);
				[third(a, b, 1.0 / 3.0), third(a, b, 2.0 / 3.0)]
			})
			.collect();
		ComputedPath::from_parts(nodes, controls)
	}

	async fn pen_color(&self, pen: &str) -> Result<Rgb> {
		self.record(format!("pen {pen}"))?;
		Ok(self.color)
	}

	async fn deconstruct(&self, code: &str) -> Result<Vec<Fragment>> {
		self.record(format!("deconstruct {code}"))?;
		let count = self.fragments.load(Ordering::SeqCst);
		Ok((0..count)
			.map(|index| Fragment {
				index,
				bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
				format: "png".into(),
				scale: 1.0,
				raster: Some(Arc::new(DynamicImage::new_rgb8(1, 1))),
				handle: None,
			})
			.collect())
	}
}
