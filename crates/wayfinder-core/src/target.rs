//! Raw, caller-supplied navigation targets.
//!
//! A raw target is whatever a `push`/`replace`/`resolve` caller hands the
//! router: a URL-like string, or a structured form naming a route or a path
//! with explicit params, query and hash. The resolver turns either form into
//! a canonical [`Location`](crate::location::Location).

use crate::params::{ParamValue, Params};
use crate::query::Query;

/// Structured navigation target.
#[derive(Debug, Clone, Default)]
pub struct LocationParts {
	/// Absolute or relative path; mutually exclusive with `name` in practice
	/// (`path` wins when both are set).
	pub path: Option<String>,
	/// Name of a registered route to synthesize a path for.
	pub name: Option<String>,
	/// Parameters substituted into a named route's pattern.
	pub params: Params,
	/// Query map for the resolved location.
	pub query: Query,
	/// Fragment without the leading `#`.
	pub hash: Option<String>,
	/// Bypasses duplicate-navigation short-circuiting when set.
	pub force: bool,
}

impl LocationParts {
	/// Starts a structured target for a path.
	pub fn path(path: impl Into<String>) -> Self {
		Self {
			path: Some(path.into()),
			..Self::default()
		}
	}

	/// Starts a structured target for a named route.
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			..Self::default()
		}
	}

	/// Adds a parameter.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.params.insert(name.into(), value.into());
		self
	}

	/// Replaces the query map.
	pub fn with_query(mut self, query: Query) -> Self {
		self.query = query;
		self
	}

	/// Sets the fragment.
	pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
		self.hash = Some(hash.into());
		self
	}

	/// Marks the navigation as forced.
	pub fn forced(mut self) -> Self {
		self.force = true;
		self
	}
}

/// A navigation target as supplied by the caller.
#[derive(Debug, Clone)]
pub enum RawLocation {
	/// A URL-like string: path, optional `?query`, optional `#hash`.
	Path(String),
	/// A structured target.
	Parts(LocationParts),
}

impl RawLocation {
	/// Whether the caller requested a forced navigation.
	pub fn force(&self) -> bool {
		match self {
			Self::Path(_) => false,
			Self::Parts(parts) => parts.force,
		}
	}
}

impl From<&str> for RawLocation {
	fn from(value: &str) -> Self {
		Self::Path(value.to_string())
	}
}

impl From<String> for RawLocation {
	fn from(value: String) -> Self {
		Self::Path(value)
	}
}

impl From<LocationParts> for RawLocation {
	fn from(parts: LocationParts) -> Self {
		Self::Parts(parts)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_named_target_builder() {
		let raw: RawLocation = LocationParts::named("user")
			.with_param("id", "42")
			.with_hash("bio")
			.into();

		match raw {
			RawLocation::Parts(parts) => {
				assert_eq!(parts.name.as_deref(), Some("user"));
				assert_eq!(
					parts.params.get("id").and_then(ParamValue::as_str),
					Some("42")
				);
				assert_eq!(parts.hash.as_deref(), Some("bio"));
				assert!(!parts.force);
			}
			RawLocation::Path(_) => panic!("expected structured target"),
		}
	}

	#[test]
	fn test_force_flag() {
		assert!(!RawLocation::from("/a").force());
		assert!(RawLocation::from(LocationParts::path("/a").forced()).force());
	}
}
