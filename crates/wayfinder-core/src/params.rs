//! Extracted path parameters and the per-record metadata bag.

use serde::Serialize;
use std::collections::HashMap;

/// Open key-value metadata attached to a route record.
///
/// The core only merges and forwards it; plugins define their own keys
/// (`requiresAuth`, `cache`, ...) and read them off the resolved location.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// A single extracted parameter value.
///
/// Named parameters capture one path segment; wildcards capture the ordered
/// list of remaining segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
	/// One path segment.
	Single(String),
	/// The segments consumed by a wildcard, in path order.
	Multi(Vec<String>),
}

impl ParamValue {
	/// Returns the value as a single segment, if it is one.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Single(value) => Some(value),
			Self::Multi(_) => None,
		}
	}

	/// Returns the captured segments of a wildcard value.
	pub fn segments(&self) -> Option<&[String]> {
		match self {
			Self::Single(_) => None,
			Self::Multi(values) => Some(values),
		}
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Single(value.to_string())
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Single(value)
	}
}

impl From<Vec<String>> for ParamValue {
	fn from(values: Vec<String>) -> Self {
		Self::Multi(values)
	}
}

/// Parameter map extracted by a match or supplied to a named-route target.
pub type Params = HashMap<String, ParamValue>;
