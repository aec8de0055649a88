use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Executable launched when no other is configured.
pub const DEFAULT_COMMAND: &str = "asy";

/// Flags selecting non-verbose, quiet, multi-line, interactive mode.
pub const DEFAULT_ARGS: [&str; 4] = ["-noV", "-q", "-multiline", "-interactive"];

/// Configuration for starting an interpreter.
#[derive(Debug, Clone)]
pub struct SessionConfig {
	/// Interpreter executable.
	pub command: PathBuf,
	/// Arguments passed to the executable.
	pub args: Vec<String>,
	/// Extra environment variables.
	pub env: HashMap<String, String>,
	/// Directory the interpreter runs in. Deconstruction side-channel files appear here.
	pub work_dir: PathBuf,
	/// Longest wait for a single output line before the process is killed.
	pub response_timeout: Option<Duration>,
}

impl SessionConfig {
	/// Create a configuration for the given executable with the default flags.
	pub fn new(command: impl Into<PathBuf>) -> Self {
		Self {
			command: command.into(),
			args: DEFAULT_ARGS.iter().map(|a| a.to_string()).collect(),
			env: HashMap::new(),
			work_dir: PathBuf::from("."),
			response_timeout: None,
		}
	}

	/// Replace the command line arguments.
	pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.args = args.into_iter().map(Into::into).collect();
		self
	}

	/// Add environment variables.
	pub fn env(
		mut self,
		env: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
	) -> Self {
		self.env.extend(env.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}

	/// Set the working directory.
	pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.work_dir = dir.into();
		self
	}

	/// Set the per-line response timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.response_timeout = Some(timeout);
		self
	}
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self::new(DEFAULT_COMMAND)
	}
}
