use xasy_primitives::Point;

use super::{ComputedPath, Node};
use crate::{Error, Result};

/// Parse the answer to a `write(length(p)); write(p);` query.
///
/// The first non-blank line carries the segment count `N` as its last token.
/// The path listing follows on exactly `N + 1` lines, one segment break per line:
///
/// ```text
/// (0,0).. controls (0.33,0) and (0.67,0)
///  ..(1,0).. controls (1,0.33) and (1,0.67)
///  ..cycle
/// ```
pub fn parse_path_report<S: AsRef<str>>(lines: &[S]) -> Result<ComputedPath> {
	let mut lines = lines.iter().map(|l| l.as_ref().trim()).filter(|l| !l.is_empty());
	let header = lines
		.next()
		.ok_or_else(|| Error::malformed("no path length reported"))?;
	let segments: usize = header
		.split_whitespace()
		.last()
		.and_then(|token| token.parse().ok())
		.ok_or_else(|| Error::malformed(format!("not a path length: {header:?}")))?;

	let listing: Vec<&str> = lines.collect();
	if listing.len() != segments + 1 {
		return Err(Error::malformed(format!(
			"path of {segments} segments listed on {} lines",
			listing.len()
		)));
	}

	let text: String = listing
		.concat()
		.chars()
		.filter(|c| !c.is_whitespace() && *c != '>')
		.collect();

	let mut nodes = Vec::with_capacity(segments + 1);
	let mut controls = Vec::with_capacity(segments);
	for fragment in text.split("..") {
		if let Some(pair) = fragment.strip_prefix("controls") {
			let (a, b) = pair
				.split_once("and")
				.ok_or_else(|| Error::malformed(format!("control clause without `and`: {fragment:?}")))?;
			controls.push([point(a)?, point(b)?]);
		} else if fragment == "cycle" {
			nodes.push(Node::Cycle);
		} else {
			nodes.push(Node::Point(point(fragment)?));
		}
	}

	if controls.len() != segments || nodes.len() != segments + 1 {
		return Err(Error::malformed(format!(
			"path of {segments} segments listed {} nodes and {} control pairs",
			nodes.len(),
			controls.len()
		)));
	}
	ComputedPath::from_parts(nodes, controls).map_err(|e| Error::malformed(e.to_string()))
}

fn point(text: &str) -> Result<Point> {
	text.parse()
		.map_err(|_| Error::malformed(format!("not a point: {text:?}")))
}
