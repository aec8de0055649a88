//! An in-memory interpreter speaking the line protocol.
//!
//! [`FakeInterpreter`] answers `write("...");` statements by printing the string
//! literal, ignores blank lines, and hands every other line to a handler supplied
//! by the test. Every received line is recorded in a transcript.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::task::JoinHandle;

use crate::link::{Launcher, Link};

const PIPE_CAPACITY: usize = 64 * 1024;

type Handler = Box<dyn FnMut(&str) -> Vec<String> + Send>;

/// Scripted stand-in for the interpreter process.
pub struct FakeInterpreter {
	handler: Arc<Mutex<Handler>>,
	transcript: Arc<Mutex<Vec<String>>>,
	launches: AtomicUsize,
	failing_launches: AtomicUsize,
	current: Mutex<Option<Instance>>,
}

struct Instance {
	alive: Arc<AtomicBool>,
	task: JoinHandle<()>,
}

impl FakeInterpreter {
	/// Create a fake that answers non-`write` statements with `handler`.
	pub fn new(handler: impl FnMut(&str) -> Vec<String> + Send + 'static) -> Arc<Self> {
		Arc::new(Self {
			handler: Arc::new(Mutex::new(Box::new(handler))),
			transcript: Arc::new(Mutex::new(Vec::new())),
			launches: AtomicUsize::new(0),
			failing_launches: AtomicUsize::new(0),
			current: Mutex::new(None),
		})
	}

	/// A fake that only echoes `write("...");` statements.
	pub fn echo_only() -> Arc<Self> {
		Self::new(|_| Vec::new())
	}

	/// Replace the handler for subsequent lines.
	pub fn set_handler(&self, handler: impl FnMut(&str) -> Vec<String> + Send + 'static) {
		*self.handler.lock() = Box::new(handler);
	}

	/// Every line received so far, across all instances.
	pub fn transcript(&self) -> Vec<String> {
		self.transcript.lock().clone()
	}

	/// Forget the transcript.
	pub fn clear_transcript(&self) {
		self.transcript.lock().clear();
	}

	/// Launch attempts so far, including failed ones.
	pub fn launches(&self) -> usize {
		self.launches.load(Ordering::SeqCst)
	}

	/// Make the next `count` launches fail as if the executable were missing.
	pub fn fail_next_launches(&self, count: usize) {
		self.failing_launches.store(count, Ordering::SeqCst);
	}

	/// Kill the running instance, if any.
	pub fn kill(&self) {
		if let Some(instance) = self.current.lock().take() {
			instance.alive.store(false, Ordering::Release);
			instance.task.abort();
		}
	}
}

#[async_trait]
impl Launcher for FakeInterpreter {
	async fn launch(&self) -> io::Result<Link> {
		self.launches.fetch_add(1, Ordering::SeqCst);
		let failing = self.failing_launches.load(Ordering::SeqCst);
		if failing > 0 {
			self.failing_launches.store(failing - 1, Ordering::SeqCst);
			return Err(io::Error::new(io::ErrorKind::NotFound, "fake interpreter not found"));
		}

		let (client_input, server_input) = tokio::io::duplex(PIPE_CAPACITY);
		let (server_output, client_output) = tokio::io::duplex(PIPE_CAPACITY);
		let alive = Arc::new(AtomicBool::new(true));
		let task = tokio::spawn(serve(
			server_input,
			server_output,
			self.handler.clone(),
			self.transcript.clone(),
			alive.clone(),
		));

		if let Some(old) = self.current.lock().replace(Instance {
			alive: alive.clone(),
			task,
		}) {
			old.alive.store(false, Ordering::Release);
			old.task.abort();
		}

		Ok(Link::from_pipes(Box::new(client_input), Box::new(client_output), alive))
	}
}

async fn serve(
	input: DuplexStream,
	mut output: DuplexStream,
	handler: Arc<Mutex<Handler>>,
	transcript: Arc<Mutex<Vec<String>>>,
	alive: Arc<AtomicBool>,
) {
	let mut lines = BufReader::new(input).lines();
	while let Ok(Some(line)) = lines.next_line().await {
		transcript.lock().push(line.clone());
		let replies = if let Some(text) = write_literal(&line) {
			vec![text.to_string()]
		} else if line.trim().is_empty() {
			Vec::new()
		} else {
			let mut handler = handler.lock();
			(*handler)(&line)
		};
		for reply in replies {
			if output.write_all(reply.as_bytes()).await.is_err()
				|| output.write_all(b"\n").await.is_err()
			{
				alive.store(false, Ordering::Release);
				return;
			}
		}
		if output.flush().await.is_err() {
			break;
		}
	}
	alive.store(false, Ordering::Release);
}

/// The string literal of a bare `write("...");` statement.
fn write_literal(line: &str) -> Option<&str> {
	let text = line.trim().strip_prefix("write(\"")?.strip_suffix("\");")?;
	(!text.contains('"')).then_some(text)
}
