//! Multi-valued query-string map.
//!
//! Keys are stored sorted so that the serialized form is canonical: two
//! locations with the same query produce byte-identical full paths, which is
//! what duplicate-navigation detection compares.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A string-keyed, multi-valued query map with canonical serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query {
	entries: BTreeMap<String, Vec<String>>,
}

impl Query {
	/// Creates an empty query map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a raw query string (without the leading `?`).
	///
	/// Parsing is lenient: a query that fails to url-decode yields an empty
	/// map rather than failing the whole navigation.
	pub fn parse(raw: &str) -> Self {
		if raw.is_empty() {
			return Self::new();
		}
		match serde_urlencoded::from_str::<Vec<(String, String)>>(raw) {
			Ok(pairs) => Self::from_pairs(pairs),
			Err(_) => Self::new(),
		}
	}

	/// Builds a query map from key/value pairs, preserving repeated keys as
	/// multiple values.
	pub fn from_pairs<I>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();
		for (key, value) in pairs {
			entries.entry(key).or_default().push(value);
		}
		Self { entries }
	}

	/// Appends a value under `key`.
	pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.entries.entry(key.into()).or_default().push(value.into());
	}

	/// Returns the first value under `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries
			.get(key)
			.and_then(|values| values.first())
			.map(String::as_str)
	}

	/// Returns every value under `key`.
	pub fn get_all(&self, key: &str) -> Option<&[String]> {
		self.entries.get(key).map(Vec::as_slice)
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Iterates `(key, values)` in sorted key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.entries
			.iter()
			.map(|(key, values)| (key.as_str(), values.as_slice()))
	}

	/// Serializes to the canonical query string (no leading `?`).
	pub fn to_query_string(&self) -> String {
		let pairs: Vec<(&str, &str)> = self
			.entries
			.iter()
			.flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str())))
			.collect();
		serde_urlencoded::to_string(pairs).unwrap_or_default()
	}
}

impl fmt::Display for Query {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_query_string())
	}
}

impl FromIterator<(String, String)> for Query {
	fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
		Self::from_pairs(pairs)
	}
}
