//! Priority-ordered backtracking path matcher.
//!
//! At every branch point the matcher tries, in order: the exact
//! compressed-static child, the parameter child, then the wildcard child. A
//! lower-priority branch runs only after the higher-priority subtree has
//! failed for the remaining path — a static prefix may consume more of the
//! path than is ultimately matchable at depth while the parameter branch
//! would have succeeded, so the first lexical match must not be committed.

use crate::record::RouteRecord;
use crate::trie::{Node, Terminal, Trie};
use std::sync::Arc;
use wayfinder_core::{Meta, ParamValue, Params};

/// The result of a successful match: the record chain from root ancestor to
/// matched leaf, the extracted parameters and the matched path.
#[derive(Debug, Clone)]
pub struct MatchedChain {
	pub records: Vec<Arc<RouteRecord>>,
	pub params: Params,
	pub path: String,
}

impl MatchedChain {
	/// The matched leaf record.
	pub fn leaf(&self) -> Option<&Arc<RouteRecord>> {
		self.records.last()
	}

	/// Folds the chain's meta bags root to leaf, child entries overriding
	/// parent entries.
	pub fn merged_meta(&self) -> Meta {
		let mut meta = Meta::new();
		for record in &self.records {
			for (key, value) in record.meta() {
				meta.insert(key.clone(), value.clone());
			}
		}
		meta
	}
}

impl Trie {
	/// Matches a runtime path against the compiled tree.
	///
	/// When several records terminate at the same node (aliasing), the first
	/// registered wins.
	pub fn match_path(&self, path: &str) -> Option<MatchedChain> {
		let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
		let mut params = Params::new();
		let terminal = descend(self.root(), &segments, &mut params)?;
		Some(MatchedChain {
			records: terminal.chain.clone(),
			params,
			path: path.to_string(),
		})
	}
}

/// Recursive descent over one node. The node's own compressed key is
/// consumed on entry; children are then tried in priority order with
/// parameter bindings undone on backtrack.
fn descend<'t>(node: &'t Node, remaining: &[&str], params: &mut Params) -> Option<&'t Terminal> {
	let key_len = node.key.len();
	if remaining.len() < key_len {
		return None;
	}
	if !node
		.key
		.iter()
		.zip(remaining.iter())
		.all(|(expected, actual)| expected == actual)
	{
		return None;
	}
	let remaining = &remaining[key_len..];

	if remaining.is_empty() {
		if let Some(terminal) = node.terminals.first() {
			return Some(terminal);
		}
		// An optional trailing parameter is matchable on an empty remainder;
		// the parameter is simply absent from the map.
		if let Some(param) = node.param.as_deref() {
			if param.optional {
				if let Some(terminal) = descend(&param.node, remaining, params) {
					return Some(terminal);
				}
			}
		}
		// A wildcard may capture zero segments.
		if let Some(wildcard) = node.wildcard.as_ref() {
			if let Some(terminal) = wildcard.terminals.first() {
				params.insert(wildcard.name.clone(), ParamValue::Multi(Vec::new()));
				return Some(terminal);
			}
		}
		return None;
	}

	// (1) exact compressed-static match
	if let Some(child) = node.statics.get(remaining[0]) {
		if let Some(terminal) = descend(child, remaining, params) {
			return Some(terminal);
		}
	}

	// (2) parameter child
	if let Some(param) = node.param.as_deref() {
		let value = remaining[0];
		let admissible = param
			.constraint
			.as_ref()
			.is_none_or(|constraint| constraint.is_match(value));
		if admissible {
			let previous = params.insert(param.name.clone(), ParamValue::Single(value.to_string()));
			if let Some(terminal) = descend(&param.node, &remaining[1..], params) {
				return Some(terminal);
			}
			match previous {
				Some(value) => {
					params.insert(param.name.clone(), value);
				}
				None => {
					params.remove(&param.name);
				}
			}
		}
	}

	// (3) wildcard child
	if let Some(wildcard) = node.wildcard.as_ref() {
		if let Some(terminal) = wildcard.terminals.first() {
			params.insert(
				wildcard.name.clone(),
				ParamValue::Multi(remaining.iter().map(|s| s.to_string()).collect()),
			);
			return Some(terminal);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn compile(patterns: &[&str]) -> Trie {
		let records: Vec<Arc<RouteRecord>> = patterns
			.iter()
			.map(|p| Arc::new(RouteRecord::new(p).unwrap()))
			.collect();
		Trie::compile(&records).unwrap()
	}

	fn single_param<'a>(chain: &'a MatchedChain, name: &str) -> Option<&'a str> {
		chain.params.get(name).and_then(ParamValue::as_str)
	}

	#[test]
	fn test_static_siblings() {
		let trie = compile(&["/a/b/c", "/a/b/d"]);

		let c = trie.match_path("/a/b/c").unwrap();
		let d = trie.match_path("/a/b/d").unwrap();
		assert!(!Arc::ptr_eq(&c.records[0], &d.records[0]));
		assert!(trie.match_path("/a/b/x").is_none());
	}

	#[test]
	fn test_param_extraction() {
		let trie = compile(&["/users/:id", "/users/:id/posts/:post_id"]);

		let chain = trie.match_path("/users/42/posts/7").unwrap();
		assert_eq!(single_param(&chain, "id"), Some("42"));
		assert_eq!(single_param(&chain, "post_id"), Some("7"));
	}

	#[test]
	fn test_wildcard_capture() {
		let trie = compile(&["/files/*rest"]);

		let chain = trie.match_path("/files/a/b/c").unwrap();
		assert_eq!(
			chain.params.get("rest").and_then(ParamValue::segments),
			Some(&["a".to_string(), "b".to_string(), "c".to_string()][..])
		);
	}

	#[test]
	fn test_wildcard_may_capture_nothing() {
		let trie = compile(&["/files/*rest"]);

		let chain = trie.match_path("/files").unwrap();
		assert_eq!(
			chain.params.get("rest").and_then(ParamValue::segments),
			Some(&[][..])
		);
	}

	#[test]
	fn test_static_beats_param() {
		let trie = compile(&["/users/new", "/users/:id"]);

		let fixed = trie.match_path("/users/new").unwrap();
		assert!(fixed.params.is_empty());

		let dynamic = trie.match_path("/users/42").unwrap();
		assert_eq!(single_param(&dynamic, "id"), Some("42"));
	}

	#[test]
	fn test_backtracks_from_static_dead_end() {
		// "/static/deep/end" exists as a static chain, but "/static/other"
		// only matches through the parameter branch at the same node.
		let trie = compile(&["/static/deep/end", "/:section/other"]);

		let chain = trie.match_path("/static/other").unwrap();
		assert_eq!(single_param(&chain, "section"), Some("static"));
	}

	#[test]
	fn test_backtracking_undoes_param_bindings() {
		// The param branch at depth 1 dead-ends for this path; the wildcard
		// fallback must not see a stale `section` binding.
		let trie = compile(&["/:section/detail", "/*rest"]);

		let chain = trie.match_path("/a/b/c").unwrap();
		assert!(chain.params.get("section").is_none());
		assert_eq!(
			chain.params.get("rest").and_then(ParamValue::segments),
			Some(&["a".to_string(), "b".to_string(), "c".to_string()][..])
		);
	}

	#[test]
	fn test_optional_param_matches_with_and_without_value() {
		let trie = compile(&["/users/:id/:tab?"]);

		let with = trie.match_path("/users/42/posts").unwrap();
		assert_eq!(single_param(&with, "tab"), Some("posts"));

		let without = trie.match_path("/users/42").unwrap();
		assert_eq!(single_param(&without, "id"), Some("42"));
		assert!(without.params.get("tab").is_none());
	}

	#[test]
	fn test_constraint_filters_segments() {
		let trie = compile(&["/users/:id(\\d+)", "/users/*rest"]);

		let numeric = trie.match_path("/users/42").unwrap();
		assert_eq!(single_param(&numeric, "id"), Some("42"));

		// Non-numeric falls through to the wildcard sibling.
		let fallback = trie.match_path("/users/abc").unwrap();
		assert!(fallback.params.get("id").is_none());
	}

	#[test]
	fn test_alias_tie_break_prefers_first_registered() {
		let first = Arc::new(RouteRecord::new("/about").unwrap().named("about"));
		let second = Arc::new(RouteRecord::new("/about").unwrap().named("about-alias"));
		let trie = Trie::compile(&[Arc::clone(&first), second]).unwrap();

		let chain = trie.match_path("/about").unwrap();
		assert!(Arc::ptr_eq(&chain.records[0], &first));
	}

	#[test]
	fn test_nested_chain_order_is_root_to_leaf() {
		let parent = Arc::new(
			RouteRecord::new("/users/:id")
				.unwrap()
				.named("user")
				.with_child(RouteRecord::new("/posts/:post_id").unwrap().named("user-post")),
		);
		let trie = Trie::compile(&[parent]).unwrap();

		let chain = trie.match_path("/users/42/posts/7").unwrap();
		assert_eq!(chain.records.len(), 2);
		assert_eq!(chain.records[0].name(), Some("user"));
		assert_eq!(chain.records[1].name(), Some("user-post"));
	}

	#[test]
	fn test_merged_meta_child_overrides_parent() {
		let parent = Arc::new(
			RouteRecord::new("/app")
				.unwrap()
				.with_meta_entry("layout", "wide")
				.with_meta_entry("requiresAuth", true)
				.with_child(
					RouteRecord::new("/settings")
						.unwrap()
						.with_meta_entry("layout", "narrow"),
				),
		);
		let trie = Trie::compile(&[parent]).unwrap();

		let meta = trie.match_path("/app/settings").unwrap().merged_meta();
		assert_eq!(meta.get("layout"), Some(&serde_json::json!("narrow")));
		assert_eq!(meta.get("requiresAuth"), Some(&serde_json::json!(true)));
	}

	#[rstest]
	#[case(&["/a/b/c"], "/a/b")]
	#[case(&["/a/b/c"], "/a/b/c/d")]
	#[case(&["/users/:id"], "/users")]
	fn test_non_matches(#[case] patterns: &[&str], #[case] path: &str) {
		assert!(compile(patterns).match_path(path).is_none());
	}

	#[test]
	fn test_compressed_and_uncompressed_agree() {
		let patterns = [
			"/",
			"/about",
			"/api/v1/users",
			"/api/v1/users/active",
			"/api/v2/health/live",
			"/docs/guide/intro",
		];
		let records: Vec<Arc<RouteRecord>> = patterns
			.iter()
			.map(|p| Arc::new(RouteRecord::new(p).unwrap()))
			.collect();
		let compressed = Trie::compile(&records).unwrap();
		let plain = Trie::compile_with(&records, false).unwrap();

		let probes = [
			"/", "/about", "/api", "/api/v1/users", "/api/v1/users/active",
			"/api/v2/health/live", "/api/v2/health", "/docs/guide/intro", "/docs/guide",
			"/missing",
		];
		for probe in probes {
			let a = compressed.match_path(probe);
			let b = plain.match_path(probe);
			match (&a, &b) {
				(Some(left), Some(right)) => {
					assert!(
						Arc::ptr_eq(
							&left.records[left.records.len() - 1],
							&right.records[right.records.len() - 1]
						),
						"diverged on {probe}"
					);
				}
				(None, None) => {}
				_ => panic!("compressed and uncompressed disagree on {probe}"),
			}
		}
	}
}
