//! Opaque component references attached to route records.
//!
//! The navigation core never renders anything; a matched record only carries
//! a handle that the rendering collaborator downcasts back to whatever view
//! type it registered. `ViewRef` is the tagged variant over the single-view,
//! named-slot and capability-resolver forms.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name of the view slot used when a record registers a single component.
pub const DEFAULT_SLOT: &str = "default";

/// An opaque, cheaply cloneable handle to a view component.
///
/// The core treats the payload as a black box; only the collaborator that
/// created it knows the concrete type.
#[derive(Clone)]
pub struct Component(Arc<dyn Any + Send + Sync>);

impl Component {
	/// Wraps an arbitrary value as a component handle.
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self(Arc::new(value))
	}

	/// Attempts to downcast the handle back to its concrete type.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.0.downcast_ref::<T>()
	}
}

impl fmt::Debug for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Component(..)")
	}
}

/// Resolver form of a view reference: picks a component per slot name,
/// typically keyed off device capabilities or template variants.
pub type ViewResolver = Arc<dyn Fn(&str) -> Option<Component> + Send + Sync>;

/// The component reference carried by a route record.
#[derive(Clone)]
pub enum ViewRef {
	/// One component, served under [`DEFAULT_SLOT`].
	Single(Component),
	/// A map of named view slots.
	Named(HashMap<String, Component>),
	/// Lazily resolved per slot by the rendering collaborator.
	Resolver(ViewResolver),
}

impl ViewRef {
	/// Creates a single-component reference.
	pub fn single<T: Any + Send + Sync>(value: T) -> Self {
		Self::Single(Component::new(value))
	}

	/// Resolves the component for a view slot, if any.
	pub fn resolve(&self, slot: &str) -> Option<Component> {
		match self {
			Self::Single(component) => (slot == DEFAULT_SLOT).then(|| component.clone()),
			Self::Named(slots) => slots.get(slot).cloned(),
			Self::Resolver(resolver) => resolver(slot),
		}
	}
}

impl fmt::Debug for ViewRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Single(_) => f.write_str("ViewRef::Single(..)"),
			Self::Named(slots) => f
				.debug_struct("ViewRef::Named")
				.field("slots", &slots.keys().collect::<Vec<_>>())
				.finish(),
			Self::Resolver(_) => f.write_str("ViewRef::Resolver(..)"),
		}
	}
}
