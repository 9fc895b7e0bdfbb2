//! The canonical, immutable navigation location.

use crate::params::{Meta, Params};
use crate::query::Query;
use serde::Serialize;

/// A fully resolved navigation target.
///
/// Locations are value objects: the pipeline builds a fresh one per
/// resolution and swaps the current location atomically at commit time.
/// `full_path` is the canonical string identity — path plus serialized
/// query plus hash — and is what duplicate detection compares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
	/// Normalized path component (always begins with `/`).
	pub path: String,
	/// `path` + `?query` + `#hash`, the canonical identity of the location.
	pub full_path: String,
	/// Parsed query map.
	pub query: Query,
	/// Fragment without the leading `#`; empty when absent.
	pub hash: String,
	/// Name of the matched leaf record, if it has one.
	pub name: Option<String>,
	/// Parameters extracted by the match.
	pub params: Params,
	/// Union of all matched records' meta, child entries overriding parents.
	pub meta: Meta,
}

impl Location {
	/// The location a router starts at before any navigation commits.
	pub fn start() -> Self {
		Self {
			path: "/".to_string(),
			full_path: "/".to_string(),
			query: Query::new(),
			hash: String::new(),
			name: None,
			params: Params::new(),
			meta: Meta::new(),
		}
	}

	/// Builds the canonical full path for the given parts.
	pub fn build_full_path(path: &str, query: &Query, hash: &str) -> String {
		let mut full = String::from(path);
		if !query.is_empty() {
			full.push('?');
			full.push_str(&query.to_query_string());
		}
		if !hash.is_empty() {
			full.push('#');
			full.push_str(hash);
		}
		full
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_start_location() {
		let start = Location::start();
		assert_eq!(start.path, "/");
		assert_eq!(start.full_path, "/");
		assert!(start.name.is_none());
		assert!(start.params.is_empty());
	}

	#[test]
	fn test_full_path_composition() {
		let query = Query::parse("a=1");
		assert_eq!(Location::build_full_path("/foo", &query, ""), "/foo?a=1");
		assert_eq!(
			Location::build_full_path("/foo", &query, "top"),
			"/foo?a=1#top"
		);
		assert_eq!(Location::build_full_path("/foo", &Query::new(), ""), "/foo");
	}
}
