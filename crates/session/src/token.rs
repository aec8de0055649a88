//! Sync barrier tokens.

use std::fmt;

/// Fixed high-entropy prefix of every barrier token.
pub const SYNC_SEED: &str = "wGd3I26kOcu4ZI4arZZMqoJufO2h1QE2D728f1Lai3aqeTQC9";

/// A barrier token. Never reused within one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncToken(String);

impl SyncToken {
	/// The token text.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Statement that makes the interpreter print the token on its own line.
	pub fn command(&self) -> String {
		format!("write(\"{}\");", self.0)
	}

	/// Whether an output line closes this barrier.
	pub fn matches(&self, line: &str) -> bool {
		line.trim_end().ends_with(&self.0)
	}
}

impl fmt::Display for SyncToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Monotonic token generator, one per session.
#[derive(Debug, Default)]
pub struct TokenSource {
	next: u64,
}

impl TokenSource {
	/// Create a generator starting at zero.
	pub fn new() -> Self {
		Self::default()
	}

	/// Issue the next token.
	pub fn issue(&mut self) -> SyncToken {
		let token = SyncToken(format!("{SYNC_SEED}-id {}", self.next));
		self.next += 1;
		token
	}

	/// Number of tokens issued so far.
	pub fn issued(&self) -> u64 {
		self.next
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn tokens_are_unique() {
		let mut source = TokenSource::new();
		let tokens: HashSet<_> = (0..1000).map(|_| source.issue()).collect();
		assert_eq!(tokens.len(), 1000);
		assert_eq!(source.issued(), 1000);
	}

	#[test]
	fn earlier_token_does_not_close_later_barrier() {
		let mut source = TokenSource::new();
		let first = source.issue();
		let tokens: Vec<_> = (0..20).map(|_| source.issue()).collect();
		let eleventh = &tokens[10];
		assert!(!eleventh.matches(first.as_str()));
		assert!(!first.matches(eleventh.as_str()));
		assert!(eleventh.matches(&format!("{eleventh}\r\n")));
	}

	#[test]
	fn command_writes_the_token() {
		let token = TokenSource::new().issue();
		assert_eq!(token.command(), format!("write(\"{SYNC_SEED}-id 0\");"));
	}
}
