//! Byte-stream link to one interpreter instance.

use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::SessionConfig;

/// Boxed interpreter input channel.
pub type BoxWriter = Box<dyn AsyncWrite + Send + Unpin>;
/// Boxed interpreter output channel.
pub type BoxReader = Box<dyn AsyncRead + Send + Unpin>;

enum Liveness {
	/// A spawned child; alive until it has exited.
	Process(Child),
	/// An in-process peer; alive while the flag is set.
	Flag(Arc<AtomicBool>),
}

/// Duplex line channel to a running interpreter.
pub struct Link {
	writer: Option<BoxWriter>,
	lines: Lines<BufReader<BoxReader>>,
	liveness: Liveness,
}

impl std::fmt::Debug for Link {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let kind = match &self.liveness {
			Liveness::Process(child) => format!("process {:?}", child.id()),
			Liveness::Flag(_) => "pipes".to_string(),
		};
		f.debug_struct("Link")
			.field("kind", &kind)
			.field("input_open", &self.writer.is_some())
			.finish_non_exhaustive()
	}
}

impl Link {
	/// Wrap a spawned child whose stdin and stdout are piped.
	///
	/// Stderr is left on the child; the launcher decides what to do with it.
	pub fn from_process(mut child: Child) -> io::Result<Self> {
		let stdin = child
			.stdin
			.take()
			.ok_or_else(|| io::Error::other("interpreter stdin is not piped"))?;
		let stdout = child
			.stdout
			.take()
			.ok_or_else(|| io::Error::other("interpreter stdout is not piped"))?;
		Ok(Self {
			writer: Some(Box::new(stdin)),
			lines: BufReader::new(Box::new(stdout) as BoxReader).lines(),
			liveness: Liveness::Process(child),
		})
	}

	/// Wrap an arbitrary pair of pipes. The peer is considered alive while `alive` is set.
	pub fn from_pipes(writer: BoxWriter, reader: BoxReader, alive: Arc<AtomicBool>) -> Self {
		Self {
			writer: Some(writer),
			lines: BufReader::new(reader).lines(),
			liveness: Liveness::Flag(alive),
		}
	}

	/// Whether the peer is still running and its input is open.
	pub fn is_alive(&mut self) -> bool {
		if self.writer.is_none() {
			return false;
		}
		match &mut self.liveness {
			Liveness::Process(child) => matches!(child.try_wait(), Ok(None)),
			Liveness::Flag(alive) => alive.load(Ordering::Acquire),
		}
	}

	/// Write `line` followed by a newline and flush.
	pub(crate) async fn write_line(&mut self, line: &str) -> io::Result<()> {
		let writer = self
			.writer
			.as_mut()
			.ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "interpreter input closed"))?;
		writer.write_all(line.as_bytes()).await?;
		writer.write_all(b"\n").await?;
		writer.flush().await
	}

	/// Next output line without its terminator, or `None` at end of stream.
	pub(crate) async fn read_line(&mut self) -> io::Result<Option<String>> {
		self.lines.next_line().await
	}

	/// Kill the peer without waiting for it.
	pub(crate) fn kill(&mut self) {
		self.writer = None;
		match &mut self.liveness {
			Liveness::Process(child) => {
				if let Err(e) = child.start_kill() {
					debug!(error = %e, "interpreter already gone");
				}
			}
			Liveness::Flag(alive) => alive.store(false, Ordering::Release),
		}
	}

	/// Close the peer's input and wait for it to exit. Errors are swallowed: the
	/// peer may already be dead.
	pub(crate) async fn shutdown(mut self) {
		self.writer = None;
		if let Liveness::Process(child) = &mut self.liveness {
			match child.wait().await {
				Ok(status) => debug!(%status, "interpreter exited"),
				Err(e) => debug!(error = %e, "waiting for interpreter failed"),
			}
		}
	}
}

/// Starts interpreter instances.
#[async_trait]
pub trait Launcher: Send + Sync {
	/// Start a fresh interpreter.
	async fn launch(&self) -> io::Result<Link>;
}

/// Launcher that spawns the configured interpreter executable.
#[derive(Debug, Clone)]
pub struct AsyLauncher {
	config: SessionConfig,
}

impl AsyLauncher {
	/// Create a launcher for `config`.
	pub fn new(config: SessionConfig) -> Self {
		Self { config }
	}

	/// The launch configuration.
	pub fn config(&self) -> &SessionConfig {
		&self.config
	}
}

#[async_trait]
impl Launcher for AsyLauncher {
	async fn launch(&self) -> io::Result<Link> {
		let cfg = &self.config;
		let mut cmd = Command::new(&cfg.command);
		cmd.args(&cfg.args)
			.envs(&cfg.env)
			.current_dir(&cfg.work_dir)
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true);

		let mut child = cmd.spawn()?;
		if let Some(status) = child.try_wait()? {
			return Err(io::Error::other(format!("interpreter exited at startup: {status}")));
		}
		debug!(command = %cfg.command.display(), pid = ?child.id(), "interpreter started");

		if let Some(stderr) = child.stderr.take() {
			tokio::spawn(async move {
				let mut lines = BufReader::new(stderr).lines();
				while let Ok(Some(line)) = lines.next_line().await {
					warn!(stderr = %line, "interpreter diagnostic");
				}
			});
		}

		Link::from_process(child)
	}
}
