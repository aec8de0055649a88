//! The interpreter as a source of truth.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::debug;
use xasy_primitives::Rgb;
use xasy_session::Session;

use crate::deconstruct::deconstruct;
use crate::fragment::{Fragment, ImageDecoder, RasterDecoder};
use crate::path::{ComputedPath, parse_path_report};
use crate::pen::parse_color_report;
use crate::Result;

/// Everything the model needs to ask the interpreter.
///
/// Implementations own the text grammar of the answers; callers only see typed
/// results.
#[async_trait]
pub trait Oracle: Send + Sync {
	/// Bezier controls of the path literal `literal`.
	async fn path_controls(&self, literal: &str) -> Result<ComputedPath>;

	/// Concrete color of the pen expression `pen`.
	async fn pen_color(&self, pen: &str) -> Result<Rgb>;

	/// Render `code` into fragments.
	async fn deconstruct(&self, code: &str) -> Result<Vec<Fragment>>;
}

/// [`Oracle`] backed by a live [`Session`].
#[derive(Clone)]
pub struct AsyOracle {
	session: Arc<Session>,
	work_dir: PathBuf,
	decoder: Arc<dyn RasterDecoder>,
	queries: Arc<AtomicU64>,
}

impl std::fmt::Debug for AsyOracle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AsyOracle")
			.field("session", &self.session)
			.field("work_dir", &self.work_dir)
			.finish_non_exhaustive()
	}
}

impl AsyOracle {
	/// Wrap a session whose interpreter runs in `work_dir`.
	pub fn new(session: Arc<Session>, work_dir: impl Into<PathBuf>) -> Self {
		Self {
			session,
			work_dir: work_dir.into(),
			decoder: Arc::new(ImageDecoder),
			queries: Arc::new(AtomicU64::new(0)),
		}
	}

	/// Use a different raster decoder.
	pub fn with_decoder(mut self, decoder: Arc<dyn RasterDecoder>) -> Self {
		self.decoder = decoder;
		self
	}

	/// The underlying session.
	pub fn session(&self) -> &Arc<Session> {
		&self.session
	}

	/// A variable name no earlier query used. A declaration the interpreter
	/// rejects then leaves the name undefined, so the follow-up writes print
	/// nothing instead of an older value.
	fn fresh_name(&self, prefix: &str) -> String {
		format!("{prefix}{}", self.queries.fetch_add(1, Ordering::Relaxed))
	}
}

#[async_trait]
impl Oracle for AsyOracle {
	async fn path_controls(&self, literal: &str) -> Result<ComputedPath> {
		let mut exchange = self.session.exchange().await?;
		let name = self.fresh_name("xasyPath");
		exchange.sync().await?;
		exchange.send(&format!("path {name}={literal};")).await?;
		exchange.send(&format!("write(length({name}));")).await?;
		exchange.send(&format!("write({name});")).await?;
		let report = exchange.sync_collect().await?;
		let path = parse_path_report(&report)?;
		debug!(segments = path.segment_count(), "path controls computed");
		Ok(path)
	}

	async fn pen_color(&self, pen: &str) -> Result<Rgb> {
		let mut exchange = self.session.exchange().await?;
		let name = self.fresh_name("xasyPen");
		exchange.sync().await?;
		exchange.send(&format!("pen {name}={pen};")).await?;
		exchange.send(&format!("write(colorspace({name}));")).await?;
		exchange.send(&format!("write(colors({name}));")).await?;
		let report = exchange.sync_collect().await?;
		parse_color_report(&report)
	}

	async fn deconstruct(&self, code: &str) -> Result<Vec<Fragment>> {
		let mut exchange = self.session.exchange().await?;
		deconstruct(&mut exchange, &self.work_dir, code, &self.decoder).await
	}
}
