//! Interpreter lifecycle and the sync-barrier exchange.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, trace, warn};

use crate::link::{Launcher, Link};
use crate::token::{SyncToken, TokenSource};
use crate::{AsyLauncher, Error, Result, SessionConfig};

/// One interpreter session.
///
/// The session starts its interpreter lazily, restarts it once when it is found
/// dead, and hands out [`Exchange`]s one at a time. Barrier tokens come from a
/// single counter owned by the session, so they stay unique across restarts.
pub struct Session {
	launcher: Arc<dyn Launcher>,
	state: Mutex<State>,
	response_timeout: Option<Duration>,
}

struct State {
	link: Option<Link>,
	/// Sticky until a launch succeeds.
	failed: bool,
	tokens: TokenSource,
	launches: u64,
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("response_timeout", &self.response_timeout)
			.finish_non_exhaustive()
	}
}

impl Session {
	/// Create a session around `launcher`. Nothing is started until first use.
	pub fn new(launcher: Arc<dyn Launcher>) -> Self {
		Self {
			launcher,
			state: Mutex::new(State {
				link: None,
				failed: false,
				tokens: TokenSource::new(),
				launches: 0,
			}),
			response_timeout: None,
		}
	}

	/// Create a session that spawns the interpreter described by `config`.
	pub fn with_config(config: SessionConfig) -> Self {
		let timeout = config.response_timeout;
		Self::new(Arc::new(AsyLauncher::new(config))).response_timeout(timeout)
	}

	/// Kill and restart the interpreter when a single output line takes longer than `timeout`.
	pub fn response_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.response_timeout = timeout;
		self
	}

	/// Start the interpreter now rather than on first use.
	pub async fn start(&self) -> Result<()> {
		let mut state = self.state.lock().await;
		state.ensure_running(self.launcher.as_ref()).await
	}

	/// Stop the current interpreter, if any, and start a fresh one.
	pub async fn restart(&self) -> Result<()> {
		let mut state = self.state.lock().await;
		state.relaunch(self.launcher.as_ref()).await
	}

	/// Whether an interpreter is running and not flagged as failed.
	pub async fn is_running(&self) -> bool {
		self.state.lock().await.is_running()
	}

	/// How many launches have been attempted over the session's lifetime.
	pub async fn launches(&self) -> u64 {
		self.state.lock().await.launches
	}

	/// Lock the session for a multi-step exchange.
	///
	/// Verifies the interpreter is alive first, restarting it once if not. The
	/// returned [`Exchange`] holds the session lock until dropped.
	pub async fn exchange(&self) -> Result<Exchange<'_>> {
		let mut state = self.state.lock().await;
		state.ensure_running(self.launcher.as_ref()).await?;
		Ok(Exchange {
			state,
			response_timeout: self.response_timeout,
		})
	}

	/// Run a statement whose output is not needed.
	///
	/// Output from earlier statements is drained first so it cannot be mistaken
	/// for a later response.
	pub async fn execute(&self, statement: &str) -> Result<()> {
		let mut exchange = self.exchange().await?;
		exchange.sync().await?;
		exchange.send(statement).await
	}

	/// Insert a barrier and drain everything before it.
	pub async fn sync(&self) -> Result<()> {
		self.exchange().await?.sync().await.map(drop)
	}
}

impl State {
	fn is_running(&mut self) -> bool {
		!self.failed && self.link.as_mut().is_some_and(Link::is_alive)
	}

	async fn ensure_running(&mut self, launcher: &dyn Launcher) -> Result<()> {
		if self.is_running() {
			return Ok(());
		}
		if self.link.is_some() || self.failed {
			warn!(launches = self.launches, "interpreter not running; restarting");
		}
		self.relaunch(launcher).await
	}

	async fn relaunch(&mut self, launcher: &dyn Launcher) -> Result<()> {
		if let Some(old) = self.link.take() {
			old.shutdown().await;
		}
		self.launches += 1;
		match launcher.launch().await {
			Ok(link) => {
				debug!(attempt = self.launches, "interpreter launched");
				self.link = Some(link);
				self.failed = false;
				Ok(())
			}
			Err(e) => {
				error!(attempt = self.launches, error = %e, "failed to launch interpreter");
				self.failed = true;
				Err(Error::ProcessUnavailable(format!("launch failed: {e}")))
			}
		}
	}
}

/// Exclusive access to the interpreter for one logical exchange.
///
/// Anything that fails on the pipes marks the interpreter dead and reports
/// [`Error::ProcessUnavailable`]; the next [`Session::exchange`] restarts it. A
/// half-sent exchange is never retried.
pub struct Exchange<'a> {
	state: MutexGuard<'a, State>,
	response_timeout: Option<Duration>,
}

impl std::fmt::Debug for Exchange<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Exchange").field("response_timeout", &self.response_timeout).finish_non_exhaustive()
	}
}

impl Exchange<'_> {
	/// Send one statement followed by a newline.
	pub async fn send(&mut self, command: &str) -> Result<()> {
		trace!(command, "send");
		let link = self.link()?;
		if let Err(e) = link.write_line(command).await {
			return Err(self.mark_dead(format!("write failed: {e}")));
		}
		Ok(())
	}

	/// Send a code block line by line.
	pub async fn send_lines(&mut self, code: &str) -> Result<()> {
		for line in code.lines() {
			self.send(line).await?;
		}
		Ok(())
	}

	/// Read the next output line.
	pub async fn read_line(&mut self) -> Result<String> {
		let timeout = self.response_timeout;
		let link = self.link()?;
		let read = match timeout {
			Some(limit) => match tokio::time::timeout(limit, link.read_line()).await {
				Ok(read) => read,
				Err(_) => {
					return Err(self.mark_dead(format!("no output within {limit:?}")));
				}
			},
			None => link.read_line().await,
		};
		match read {
			Ok(Some(line)) => Ok(line),
			Ok(None) => Err(self.mark_dead("interpreter closed its output".to_string())),
			Err(e) => Err(self.mark_dead(format!("read failed: {e}"))),
		}
	}

	/// Insert a barrier and discard all output before it.
	pub async fn sync(&mut self) -> Result<SyncToken> {
		let (token, discarded) = self.barrier().await?;
		if !discarded.is_empty() {
			trace!(token = %token, lines = discarded.len(), "discarded stale output");
		}
		Ok(token)
	}

	/// Insert a barrier and return the output produced before it.
	pub async fn sync_collect(&mut self) -> Result<Vec<String>> {
		self.barrier().await.map(|(_, lines)| lines)
	}

	/// Number of barrier tokens issued over the session's lifetime.
	pub fn tokens_issued(&self) -> u64 {
		self.state.tokens.issued()
	}

	async fn barrier(&mut self) -> Result<(SyncToken, Vec<String>)> {
		let token = self.state.tokens.issue();
		self.send("").await?;
		self.send(&token.command()).await?;
		let mut before = Vec::new();
		loop {
			let line = self.read_line().await?;
			if token.matches(&line) {
				return Ok((token, before));
			}
			before.push(line);
		}
	}

	fn link(&mut self) -> Result<&mut Link> {
		self.state
			.link
			.as_mut()
			.ok_or_else(|| Error::ProcessUnavailable("interpreter is not running".to_string()))
	}

	fn mark_dead(&mut self, reason: String) -> Error {
		warn!(%reason, "interpreter connection lost");
		if let Some(link) = self.state.link.as_mut() {
			link.kill();
		}
		self.state.failed = true;
		Error::ProcessUnavailable(reason)
	}
}
