//! Route definitions.

use crate::error::PatternError;
use crate::pattern::PathPattern;
use std::fmt;
use std::sync::Arc;
use wayfinder_core::{Guard, Meta, ViewRef};

/// A registered route: a path pattern plus metadata, per-record guards, an
/// opaque component reference and nested child records.
///
/// Records are immutable once registered; the router holds them behind
/// `Arc` for its lifetime and identifies them by pointer when diffing
/// matched chains.
pub struct RouteRecord {
	pattern: PathPattern,
	name: Option<String>,
	meta: Meta,
	views: Option<ViewRef>,
	children: Vec<Arc<RouteRecord>>,
	enter_guards: Vec<Arc<dyn Guard>>,
	update_guards: Vec<Arc<dyn Guard>>,
	leave_guards: Vec<Arc<dyn Guard>>,
}

impl RouteRecord {
	/// Creates a record for a path pattern.
	///
	/// The pattern is parsed eagerly so grammar violations surface at
	/// registration time, not at first match.
	pub fn new(pattern: &str) -> Result<Self, PatternError> {
		Ok(Self {
			pattern: PathPattern::parse(pattern)?,
			name: None,
			meta: Meta::new(),
			views: None,
			children: Vec::new(),
			enter_guards: Vec::new(),
			update_guards: Vec::new(),
			leave_guards: Vec::new(),
		})
	}

	/// Names the record for reverse lookups.
	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Replaces the whole meta bag.
	pub fn with_meta(mut self, meta: Meta) -> Self {
		self.meta = meta;
		self
	}

	/// Inserts one meta entry.
	pub fn with_meta_entry(
		mut self,
		key: impl Into<String>,
		value: impl Into<serde_json::Value>,
	) -> Self {
		self.meta.insert(key.into(), value.into());
		self
	}

	/// Attaches the component reference.
	pub fn with_views(mut self, views: ViewRef) -> Self {
		self.views = Some(views);
		self
	}

	/// Nests a child record. The child's pattern is relative to this
	/// record's pattern.
	pub fn with_child(mut self, child: RouteRecord) -> Self {
		self.children.push(Arc::new(child));
		self
	}

	/// Replaces the whole child list. Used when dynamic registration
	/// rebuilds a record subtree.
	pub fn with_children(mut self, children: Vec<Arc<RouteRecord>>) -> Self {
		self.children = children;
		self
	}

	/// Adds a guard run when this record is entered.
	pub fn before_enter<G: Guard + 'static>(mut self, guard: G) -> Self {
		self.enter_guards.push(Arc::new(guard));
		self
	}

	/// Adds a guard run when this record stays matched with changed params.
	pub fn before_update<G: Guard + 'static>(mut self, guard: G) -> Self {
		self.update_guards.push(Arc::new(guard));
		self
	}

	/// Adds a guard run when this record is left.
	pub fn before_leave<G: Guard + 'static>(mut self, guard: G) -> Self {
		self.leave_guards.push(Arc::new(guard));
		self
	}

	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn meta(&self) -> &Meta {
		&self.meta
	}

	pub fn views(&self) -> Option<&ViewRef> {
		self.views.as_ref()
	}

	pub fn children(&self) -> &[Arc<RouteRecord>] {
		&self.children
	}

	pub fn enter_guards(&self) -> &[Arc<dyn Guard>] {
		&self.enter_guards
	}

	pub fn update_guards(&self) -> &[Arc<dyn Guard>] {
		&self.update_guards
	}

	pub fn leave_guards(&self) -> &[Arc<dyn Guard>] {
		&self.leave_guards
	}
}

impl Clone for RouteRecord {
	fn clone(&self) -> Self {
		Self {
			pattern: self.pattern.clone(),
			name: self.name.clone(),
			meta: self.meta.clone(),
			views: self.views.clone(),
			children: self.children.clone(),
			enter_guards: self.enter_guards.clone(),
			update_guards: self.update_guards.clone(),
			leave_guards: self.leave_guards.clone(),
		}
	}
}

impl fmt::Debug for RouteRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteRecord")
			.field("pattern", &self.pattern.raw())
			.field("name", &self.name)
			.field("children", &self.children.len())
			.field("enter_guards", &self.enter_guards.len())
			.finish()
	}
}
