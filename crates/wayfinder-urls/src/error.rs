//! Compile-time route registration errors.

use thiserror::Error;

/// Fatal errors surfaced synchronously while registering or compiling
/// route patterns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
	/// The pattern string violates the grammar.
	#[error("malformed pattern '{pattern}': {reason}")]
	MalformedPattern { pattern: String, reason: String },

	/// Two differently-shaped parameters were registered at the same trie
	/// position.
	#[error("conflicting parameter at '{at}': ':{existing}' is already registered here, cannot register ':{conflicting}'")]
	ConflictingParameter {
		at: String,
		existing: String,
		conflicting: String,
	},
}

impl PatternError {
	pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
		Self::MalformedPattern {
			pattern: pattern.to_string(),
			reason: reason.into(),
		}
	}
}

/// A required parameter was absent while synthesizing a path from a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing parameter ':{name}' for pattern '{pattern}'")]
pub struct MissingParam {
	pub pattern: String,
	pub name: String,
}
