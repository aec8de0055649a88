//! The deconstruction pass.
//!
//! The interpreter renders the current picture into one image file per
//! fragment, named by index and format, and describes them in a metadata file
//! with a fixed name. Both live in the interpreter's working directory and are
//! overwritten by every pass, so a pass owns them for its whole duration.

use std::io;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, trace};
use xasy_session::Exchange;

use crate::fragment::{BoundingBox, Fragment, RasterDecoder};
use crate::{Error, Result};

/// Name of the metadata file written by the interpreter.
pub const BOX_FILE: &str = ".out_0.box";

/// Name of the image file holding fragment `index`.
pub fn fragment_file_name(index: usize, format: &str) -> String {
	format!(".out_{index}.{format}")
}

/// Parsed metadata file.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxFile {
	/// Magnification.
	pub scale: f64,
	/// Image format extension.
	pub format: String,
	/// One box per fragment written so far.
	pub boxes: Vec<BoundingBox>,
}

/// Parse a metadata file: `<scale> <format>` then one `l b r t` line per fragment.
pub fn parse_box_file(text: &str) -> Result<BoxFile> {
	let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
	let header = lines
		.next()
		.ok_or_else(|| Error::malformed("empty fragment metadata"))?;
	let (scale, format) = match header.split_whitespace().collect::<Vec<_>>()[..] {
		[scale, format] => (scale, format),
		_ => return Err(Error::malformed(format!("bad metadata header {header:?}"))),
	};
	let scale = scale
		.parse()
		.map_err(|_| Error::malformed(format!("bad scale in metadata header {header:?}")))?;

	let boxes = lines
		.map(|line| {
			let values = line
				.split_whitespace()
				.map(str::parse)
				.collect::<std::result::Result<Vec<f64>, _>>()
				.map_err(|_| Error::malformed(format!("bad bounding box {line:?}")))?;
			match values[..] {
				[l, b, r, t] => Ok(BoundingBox::new(l, b, r, t)),
				_ => Err(Error::malformed(format!("bounding box needs four values: {line:?}"))),
			}
		})
		.collect::<Result<_>>()?;

	Ok(BoxFile {
		scale,
		format: format.to_string(),
		boxes,
	})
}

/// Parse the fragment count: the last token of the count line.
pub fn parse_fragment_count(line: &str) -> Result<usize> {
	line.split_whitespace()
		.last()
		.and_then(|token| token.parse().ok())
		.ok_or_else(|| Error::malformed(format!("not a fragment count: {line:?}")))
}

/// Render `code` into fragments.
///
/// The metadata file is removed before the pass and again afterwards, whether
/// or not the pass succeeded. A failed pass also removes every fragment image
/// it left behind.
pub(crate) async fn deconstruct(
	exchange: &mut Exchange<'_>,
	work_dir: &Path,
	code: &str,
	decoder: &Arc<dyn RasterDecoder>,
) -> Result<Vec<Fragment>> {
	let box_path = work_dir.join(BOX_FILE);
	let result = run_pass(exchange, work_dir, &box_path, code, decoder).await;
	remove_if_present(&box_path).await;
	if result.is_err() {
		sweep_fragment_files(work_dir).await;
	}
	result
}

async fn run_pass(
	exchange: &mut Exchange<'_>,
	work_dir: &Path,
	box_path: &Path,
	code: &str,
	decoder: &Arc<dyn RasterDecoder>,
) -> Result<Vec<Fragment>> {
	exchange.send("").await?;
	exchange.send("reset;").await?;
	exchange.send("initXasyMode();").await?;
	exchange.send("atexit(null);").await?;
	exchange.sync().await?;

	exchange.send_lines(code).await?;
	exchange.sync().await?;

	remove_if_present(box_path).await;
	exchange.send("deconstruct(countonly=true);").await?;
	exchange.send("deconstruct();").await?;

	let count = parse_fragment_count(&next_nonblank(exchange).await?)?;
	debug!(fragments = count, "deconstructing");

	let mut fragments = Vec::with_capacity(count);
	for index in 0..count {
		let progress = exchange.read_line().await?;
		trace!(index, progress, "fragment written");

		let text = tokio::fs::read_to_string(box_path)
			.await
			.map_err(|e| Error::malformed(format!("fragment {index} of {count}: no metadata: {e}")))?;
		let meta = parse_box_file(&text)?;
		let bbox = *meta.boxes.get(index).ok_or_else(|| {
			Error::malformed(format!(
				"fragment {index} of {count}: metadata lists {} boxes",
				meta.boxes.len()
			))
		})?;

		let raster = if bbox.is_empty() {
			None
		} else {
			let image_path = work_dir.join(fragment_file_name(index, &meta.format));
			let image = decode(decoder, &image_path).await;
			remove_if_present(&image_path).await;
			Some(Arc::new(image?))
		};

		fragments.push(Fragment {
			index,
			bbox,
			format: meta.format,
			scale: meta.scale,
			raster,
			handle: None,
		});
	}
	Ok(fragments)
}

async fn decode(decoder: &Arc<dyn RasterDecoder>, path: &Path) -> Result<DynamicImage> {
	let decoder = Arc::clone(decoder);
	let path = path.to_path_buf();
	tokio::task::spawn_blocking(move || decoder.decode(&path))
		.await
		.map_err(|e| Error::Session(xasy_session::Error::Io(io::Error::other(e))))?
}

/// Whether `name` is a fragment image, `.out_<index>.<format>`.
fn is_fragment_file(name: &str) -> bool {
	name.strip_prefix(".out_")
		.and_then(|rest| rest.split_once('.'))
		.is_some_and(|(index, format)| {
			!index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) && !format.is_empty() && format != "box"
		})
}

async fn sweep_fragment_files(work_dir: &Path) {
	let mut entries = match tokio::fs::read_dir(work_dir).await {
		Ok(entries) => entries,
		Err(e) => {
			debug!(dir = %work_dir.display(), error = %e, "cannot list side-channel files");
			return;
		}
	};
	while let Ok(Some(entry)) = entries.next_entry().await {
		if entry.file_name().to_str().is_some_and(is_fragment_file) {
			remove_if_present(&entry.path()).await;
		}
	}
}

async fn next_nonblank(exchange: &mut Exchange<'_>) -> Result<String> {
	loop {
		let line = exchange.read_line().await?;
		if !line.trim().is_empty() {
			return Ok(line);
		}
	}
}

async fn remove_if_present(path: &Path) {
	match tokio::fs::remove_file(path).await {
		Ok(()) => {}
		Err(e) if e.kind() == io::ErrorKind::NotFound => {}
		Err(e) => debug!(path = %path.display(), error = %e, "could not remove side-channel file"),
	}
}
