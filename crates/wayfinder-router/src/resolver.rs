//! Location resolution.
//!
//! The resolver is pure: given a route-table snapshot, a raw target and the
//! current location, it produces a canonical [`Location`] plus the matched
//! chain, or a recoverable [`ResolveError`]. It never mutates router state.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use wayfinder_core::{Location, LocationParts, Meta, Params, Query, RawLocation};
use wayfinder_urls::{MatchedChain, PathPattern, PatternError, RouteRecord, Trie};

/// Recoverable resolution errors; callers typically fall back to a
/// registered catch-all route or surface a 404-equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
	#[error("no route matches path '{path}'")]
	NoMatch { path: String },

	#[error("no route registered under name '{name}'")]
	UnknownRouteName { name: String },

	#[error("invalid params for route '{name}': missing ':{missing}'")]
	InvalidParams { name: String, missing: String },
}

/// A resolved location together with its matched chain.
#[derive(Debug, Clone)]
pub struct Resolution {
	pub location: Location,
	pub matched: Vec<Arc<RouteRecord>>,
}

pub(crate) struct NamedRoute {
	/// The flattened pattern (ancestor segments included) used to
	/// synthesize paths for this name.
	pub(crate) full_pattern: PathPattern,
}

/// An immutable compiled snapshot of the registered routes. Route-table
/// edits build a fresh snapshot behind an `Arc` so in-flight matches keep
/// reading a consistent tree.
pub(crate) struct RouteTable {
	pub(crate) records: Vec<Arc<RouteRecord>>,
	pub(crate) trie: Trie,
	pub(crate) names: HashMap<String, NamedRoute>,
}

impl RouteTable {
	pub(crate) fn build(records: Vec<Arc<RouteRecord>>) -> Result<Self, PatternError> {
		let trie = Trie::compile(&records)?;
		let mut names = HashMap::new();
		for record in &records {
			index_names(record, "", &mut names)?;
		}
		Ok(Self {
			records,
			trie,
			names,
		})
	}

	pub(crate) fn empty() -> Self {
		Self {
			records: Vec::new(),
			trie: Trie::compile(&[]).unwrap_or_else(|_| unreachable!("empty route set always compiles")),
			names: HashMap::new(),
		}
	}
}

fn index_names(
	record: &Arc<RouteRecord>,
	parent_raw: &str,
	names: &mut HashMap<String, NamedRoute>,
) -> Result<(), PatternError> {
	let raw = PathPattern::join_raw(parent_raw, record.pattern().raw());
	if let Some(name) = record.name() {
		let full_pattern = PathPattern::parse(&raw)?;
		names.insert(name.to_string(), NamedRoute { full_pattern });
	}
	for child in record.children() {
		index_names(child, &raw, names)?;
	}
	Ok(())
}

/// Resolves a raw target against the current location.
pub(crate) fn resolve(
	table: &RouteTable,
	raw: &RawLocation,
	current: &Location,
) -> Result<Resolution, ResolveError> {
	match raw {
		RawLocation::Path(raw_path) => {
			let (path, query, hash) = split_full_path(raw_path);
			let path = normalize_path(&path, current);
			resolve_path(table, &path, Query::parse(&query), hash)
		}
		RawLocation::Parts(parts) => resolve_parts(table, parts, current),
	}
}

fn resolve_parts(
	table: &RouteTable,
	parts: &LocationParts,
	current: &Location,
) -> Result<Resolution, ResolveError> {
	let hash = parts.hash.clone().unwrap_or_default();

	if let Some(raw_path) = parts.path.as_deref() {
		// Tolerate a path that embeds `?query#hash`; explicit parts win.
		let (path, embedded_query, embedded_hash) = split_full_path(raw_path);
		let path = normalize_path(&path, current);
		let query = if parts.query.is_empty() {
			Query::parse(&embedded_query)
		} else {
			parts.query.clone()
		};
		let hash = if hash.is_empty() { embedded_hash } else { hash };
		return resolve_path(table, &path, query, hash);
	}

	if let Some(name) = parts.name.as_deref() {
		let named = table
			.names
			.get(name)
			.ok_or_else(|| ResolveError::UnknownRouteName {
				name: name.to_string(),
			})?;
		let path = named
			.full_pattern
			.interpolate(&parts.params)
			.map_err(|e| ResolveError::InvalidParams {
				name: name.to_string(),
				missing: e.name,
			})?;
		// Re-validate the synthesized path through the matcher; a param that
		// fails its constraint surfaces here rather than at commit time.
		return resolve_path(table, &path, parts.query.clone(), hash);
	}

	// Neither path nor name: a query/hash-only navigation relative to the
	// current location.
	resolve_path(table, &current.path, parts.query.clone(), hash)
}

fn resolve_path(
	table: &RouteTable,
	path: &str,
	query: Query,
	hash: String,
) -> Result<Resolution, ResolveError> {
	let chain: MatchedChain = table
		.trie
		.match_path(path)
		.ok_or_else(|| ResolveError::NoMatch {
			path: path.to_string(),
		})?;

	let name = chain.leaf().and_then(|leaf| leaf.name()).map(String::from);
	let meta: Meta = chain.merged_meta();
	let full_path = Location::build_full_path(path, &query, &hash);
	let params: Params = chain.params.clone();

	Ok(Resolution {
		location: Location {
			path: path.to_string(),
			full_path,
			query,
			hash,
			name,
			params,
			meta,
		},
		matched: chain.records,
	})
}

/// Splits a URL-like string into path, query and hash parts.
fn split_full_path(raw: &str) -> (String, String, String) {
	let (before_hash, hash) = match raw.split_once('#') {
		Some((before, hash)) => (before, hash.to_string()),
		None => (raw, String::new()),
	};
	let (path, query) = match before_hash.split_once('?') {
		Some((path, query)) => (path.to_string(), query.to_string()),
		None => (before_hash.to_string(), String::new()),
	};
	(path, query, hash)
}

/// Normalizes a path to canonical absolute form: resolves `.`/`..` and a
/// relative prefix against the current location, drops empty segments and
/// any trailing slash.
fn normalize_path(path: &str, current: &Location) -> String {
	let mut segments: Vec<String> = Vec::new();

	if !path.starts_with('/') {
		// Relative targets resolve against the current path's directory.
		segments.extend(
			current
				.path
				.split('/')
				.filter(|s| !s.is_empty())
				.map(String::from),
		);
		segments.pop();
	}

	for segment in path.split('/') {
		match segment {
			"" | "." => {}
			".." => {
				segments.pop();
			}
			other => segments.push(other.to_string()),
		}
	}

	if segments.is_empty() {
		"/".to_string()
	} else {
		format!("/{}", segments.join("/"))
	}
}
