//! Compressed prefix-tree route compiler.
//!
//! Records are flattened depth-first (a nested child's effective pattern is
//! its ancestors' segments followed by its own) and inserted into a trie
//! whose nodes carry a static-child map, at most one parameter child and at
//! most one wildcard child. A compression pass then merges single-child
//! static chains so matcher recursion depth is bounded by the compressed
//! tree, not the raw segment count.

use crate::error::PatternError;
use crate::pattern::{self, Constraint, PathPattern, PathSegment};
use crate::record::RouteRecord;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A record chain terminating at a trie node: the matched record plus its
/// ancestors, root first.
#[derive(Debug, Clone)]
pub(crate) struct Terminal {
	pub(crate) chain: Vec<Arc<RouteRecord>>,
}

#[derive(Debug, Default)]
pub(crate) struct Node {
	/// Compressed run of literal segments consumed on entry to this node.
	pub(crate) key: Vec<String>,
	/// Static children, keyed by the first literal segment of each child's
	/// compressed key. First segments stay unique under compression because
	/// merging never changes a node's leading segment.
	pub(crate) statics: HashMap<String, Node>,
	/// At most one live parameter child.
	pub(crate) param: Option<Box<ParamChild>>,
	/// At most one wildcard child.
	pub(crate) wildcard: Option<WildcardChild>,
	/// Record chains terminating here, in registration order.
	pub(crate) terminals: Vec<Terminal>,
}

#[derive(Debug)]
pub(crate) struct ParamChild {
	pub(crate) name: String,
	pub(crate) optional: bool,
	pub(crate) constraint: Option<Constraint>,
	pub(crate) node: Node,
}

#[derive(Debug)]
pub(crate) struct WildcardChild {
	pub(crate) name: String,
	pub(crate) terminals: Vec<Terminal>,
}

impl Node {
	fn with_key(segment: String) -> Self {
		Self {
			key: vec![segment],
			..Self::default()
		}
	}
}

/// The compiled route tree.
#[derive(Debug)]
pub struct Trie {
	root: Node,
}

impl Trie {
	/// Compiles a record set into a compressed trie.
	pub fn compile(records: &[Arc<RouteRecord>]) -> Result<Self, PatternError> {
		Self::compile_with(records, true)
	}

	/// Compiles with an explicit compression switch. Matching behavior is
	/// identical either way; tests use the uncompressed form to cross-check
	/// the compressed one.
	pub fn compile_with(records: &[Arc<RouteRecord>], compress: bool) -> Result<Self, PatternError> {
		let mut root = Node::default();
		for record in records {
			insert_record(&mut root, record, &[], &[])?;
		}

		let before = count_nodes(&root);
		if compress {
			compress_node(&mut root);
		}
		let after = count_nodes(&root);
		debug!(
			nodes_before = before,
			nodes_after = after,
			compressed = compress,
			"route trie compiled"
		);

		Ok(Self { root })
	}

	pub(crate) fn root(&self) -> &Node {
		&self.root
	}

	/// Number of nodes in the compiled tree.
	pub fn node_count(&self) -> usize {
		count_nodes(&self.root)
	}
}

fn insert_record(
	root: &mut Node,
	record: &Arc<RouteRecord>,
	parent_segments: &[PathSegment],
	parent_chain: &[Arc<RouteRecord>],
) -> Result<(), PatternError> {
	let mut segments: Vec<PathSegment> = parent_segments.to_vec();
	segments.extend(record.pattern().segments().iter().cloned());

	// A nested record's effective pattern is the flattened sequence, so
	// ordering and uniqueness are re-validated over the whole of it.
	let effective = effective_raw(parent_chain, record);
	pattern::validate_sequence(&effective, &segments)?;

	let mut chain: Vec<Arc<RouteRecord>> = parent_chain.to_vec();
	chain.push(Arc::clone(record));

	insert_segments(root, &segments, Terminal { chain: chain.clone() })?;

	for child in record.children() {
		insert_record(root, child, &segments, &chain)?;
	}
	Ok(())
}

fn effective_raw(parent_chain: &[Arc<RouteRecord>], record: &Arc<RouteRecord>) -> String {
	let mut raw = String::new();
	for ancestor in parent_chain {
		raw = PathPattern::join_raw(&raw, ancestor.pattern().raw());
	}
	PathPattern::join_raw(&raw, record.pattern().raw())
}

fn insert_segments(
	root: &mut Node,
	segments: &[PathSegment],
	terminal: Terminal,
) -> Result<(), PatternError> {
	let mut node = root;
	let mut consumed: Vec<&str> = Vec::new();

	for segment in segments {
		match segment {
			PathSegment::Literal(text) => {
				consumed.push(text);
				node = node
					.statics
					.entry(text.clone())
					.or_insert_with(|| Node::with_key(text.clone()));
			}
			PathSegment::Param {
				name,
				optional,
				constraint,
			} => {
				if let Some(existing) = node.param.as_deref() {
					let same_shape = existing.name == *name
						&& existing.optional == *optional
						&& existing.constraint == *constraint;
					if !same_shape {
						return Err(PatternError::ConflictingParameter {
							at: position(&consumed),
							existing: existing.name.clone(),
							conflicting: name.clone(),
						});
					}
				}
				consumed.push(name);
				let child = node.param.get_or_insert_with(|| {
					Box::new(ParamChild {
						name: name.clone(),
						optional: *optional,
						constraint: constraint.clone(),
						node: Node::default(),
					})
				});
				node = &mut child.node;
			}
			PathSegment::Wildcard { name } => {
				if let Some(existing) = node.wildcard.as_ref() {
					if existing.name != *name {
						return Err(PatternError::ConflictingParameter {
							at: position(&consumed),
							existing: existing.name.clone(),
							conflicting: name.clone(),
						});
					}
				}
				let wildcard = node.wildcard.get_or_insert_with(|| WildcardChild {
					name: name.clone(),
					terminals: Vec::new(),
				});
				wildcard.terminals.push(terminal);
				return Ok(());
			}
		}
	}

	node.terminals.push(terminal);
	Ok(())
}

fn position(consumed: &[&str]) -> String {
	if consumed.is_empty() {
		"/".to_string()
	} else {
		format!("/{}", consumed.join("/"))
	}
}

/// Bottom-up compression. A node absorbs its sole static child only when it
/// has no terminating records, no parameter or wildcard child, and the child
/// terminates nothing itself — record-bearing nodes stay independently
/// addressable, and merges never cross a parameter or wildcard boundary.
fn compress_node(node: &mut Node) {
	loop {
		let mergeable = node.terminals.is_empty()
			&& node.param.is_none()
			&& node.wildcard.is_none()
			&& node.statics.len() == 1
			&& node
				.statics
				.values()
				.next()
				.is_some_and(|child| child.terminals.is_empty());
		if !mergeable {
			break;
		}

		let first_key = match node.statics.keys().next() {
			Some(key) => key.clone(),
			None => break,
		};
		let mut child = match node.statics.remove(&first_key) {
			Some(child) => child,
			None => break,
		};

		node.key.append(&mut child.key);
		node.statics = std::mem::take(&mut child.statics);
		node.param = child.param.take();
		node.wildcard = child.wildcard.take();
	}

	for child in node.statics.values_mut() {
		compress_node(child);
	}
	if let Some(param) = node.param.as_deref_mut() {
		compress_node(&mut param.node);
	}
}

fn count_nodes(node: &Node) -> usize {
	let mut count = 1;
	for child in node.statics.values() {
		count += count_nodes(child);
	}
	if let Some(param) = node.param.as_deref() {
		count += count_nodes(&param.node);
	}
	if node.wildcard.is_some() {
		count += 1;
	}
	count
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(pattern: &str) -> Arc<RouteRecord> {
		Arc::new(RouteRecord::new(pattern).unwrap())
	}

	#[test]
	fn test_compression_merges_static_chains() {
		let records = vec![record("/api/v1/users/list")];
		let compressed = Trie::compile(&records).unwrap();
		let plain = Trie::compile_with(&records, false).unwrap();

		// root -> api -> v1 -> users -> list collapses to a root keyed
		// api/v1/users with a single record-bearing child.
		assert_eq!(plain.node_count(), 5);
		assert_eq!(compressed.node_count(), 2);
	}

	#[test]
	fn test_compression_keeps_record_nodes_addressable() {
		let records = vec![record("/a/b"), record("/a/b/c/d")];
		let trie = Trie::compile(&records).unwrap();

		// The nodes for /a/b and /a/b/c/d terminate records and stay
		// independently addressable; only the record-free /a collapses.
		assert_eq!(Trie::compile_with(&records, false).unwrap().node_count(), 5);
		assert_eq!(trie.node_count(), 4);
		assert!(trie.root().statics.contains_key("b"));
	}

	#[test]
	fn test_conflicting_parameter_names() {
		let records = vec![record("/users/:id"), record("/users/:name/posts")];
		let err = Trie::compile(&records).unwrap_err();
		assert!(matches!(
			err,
			PatternError::ConflictingParameter { existing, conflicting, .. }
				if existing == "id" && conflicting == "name"
		));
	}

	#[test]
	fn test_conflicting_wildcard_names() {
		let records = vec![record("/files/*rest"), record("/files/*other")];
		assert!(matches!(
			Trie::compile(&records).unwrap_err(),
			PatternError::ConflictingParameter { .. }
		));
	}

	#[test]
	fn test_same_parameter_is_reused() {
		let records = vec![record("/users/:id"), record("/users/:id/posts")];
		assert!(Trie::compile(&records).is_ok());
	}

	#[test]
	fn test_nested_records_flatten() {
		let parent = Arc::new(
			RouteRecord::new("/users/:id")
				.unwrap()
				.with_child(RouteRecord::new("/posts").unwrap()),
		);
		let trie = Trie::compile(&[parent]).unwrap();
		assert!(trie.node_count() > 1);
	}

	#[test]
	fn test_nested_optional_ordering_is_validated() {
		let parent = Arc::new(
			RouteRecord::new("/users/:tab?")
				.unwrap()
				.with_child(RouteRecord::new("/posts").unwrap()),
		);
		assert!(matches!(
			Trie::compile(&[parent]).unwrap_err(),
			PatternError::MalformedPattern { .. }
		));
	}
}
