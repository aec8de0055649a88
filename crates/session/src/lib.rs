//! Session manager for a long-lived graphics interpreter process.
//!
//! The interpreter is driven as a REPL over its standard streams. Output is
//! unbounded and arrives at whatever granularity the interpreter chooses, so every
//! exchange that must parse a response is bracketed by a *sync barrier*: the
//! session asks the interpreter to print a token that has never been used before
//! and drains output until that token comes back.
//!
//! # Structure
//!
//! - [`Launcher`] starts an interpreter and hands back a [`Link`] (writer, line
//!   reader, liveness probe). [`AsyLauncher`] spawns the real executable.
//! - [`Session`] owns at most one live [`Link`], restarts it once on failure, and
//!   serializes all traffic behind one lock.
//! - [`Exchange`] is the locked view of the session. Commands, barriers and reads
//!   happen through it, so a multi-step exchange can never interleave with
//!   another caller's.
//!
//! ```ignore
//! use xasy_session::{Session, SessionConfig};
//!
//! let session = Session::with_config(SessionConfig::default());
//! let mut exchange = session.exchange().await?;
//! exchange.sync().await?;
//! exchange.send("write(1+1);").await?;
//! let lines = exchange.sync_collect().await?;
//! ```
use std::io;

/// Interpreter launch configuration.
pub mod config;
mod link;
mod session;
mod token;

/// In-memory interpreter for tests.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{DEFAULT_ARGS, DEFAULT_COMMAND, SessionConfig};
pub use link::{AsyLauncher, BoxReader, BoxWriter, Launcher, Link};
pub use session::{Exchange, Session};
pub use token::{SYNC_SEED, SyncToken, TokenSource};

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The interpreter could not be started, or died and the single restart
	/// attempt did not bring it back.
	#[error("interpreter unavailable: {0}")]
	ProcessUnavailable(String),
	/// The interpreter answered with text that does not fit the expected grammar.
	#[error("malformed interpreter response: {0}")]
	MalformedResponse(String),
	/// Side-channel file access failed.
	#[error("{0}")]
	Io(#[from] io::Error),
}

impl Error {
	/// Shorthand for [`Error::MalformedResponse`].
	pub fn malformed(reason: impl Into<String>) -> Self {
		Self::MalformedResponse(reason.into())
	}

	/// Whether the error reports a dead or unstartable interpreter.
	pub fn is_process_unavailable(&self) -> bool {
		matches!(self, Self::ProcessUnavailable(_))
	}

	/// Whether the error reports an unparseable response.
	pub fn is_malformed(&self) -> bool {
		matches!(self, Self::MalformedResponse(_))
	}
}
