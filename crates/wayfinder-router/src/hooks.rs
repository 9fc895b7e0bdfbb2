//! Global hook registries with id-based unsubscription.

use crate::failure::NavigationFailure;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use wayfinder_core::Location;

/// Hook run after a navigation commits. Side-effect only: it cannot block
/// or abort the already-committed navigation.
pub type AfterEachHook = Arc<dyn Fn(&Location, &Location) + Send + Sync>;

/// Handler receiving broadcast navigation errors.
pub type ErrorHook = Arc<dyn Fn(&NavigationFailure) + Send + Sync>;

/// Token returned from hook registration; pass it back to the matching
/// `remove_*` method to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookToken {
	id: u64,
}

/// An ordered hook list supporting removal by token.
pub(crate) struct HookRegistry<T> {
	entries: RwLock<Vec<(u64, T)>>,
	next_id: AtomicU64,
}

impl<T: Clone> HookRegistry<T> {
	pub(crate) fn new() -> Self {
		Self {
			entries: RwLock::new(Vec::new()),
			next_id: AtomicU64::new(1),
		}
	}

	pub(crate) fn add(&self, hook: T) -> HookToken {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		self.entries.write().push((id, hook));
		HookToken { id }
	}

	/// Removes the hook registered under `token`; returns whether anything
	/// was removed.
	pub(crate) fn remove(&self, token: HookToken) -> bool {
		let mut entries = self.entries.write();
		let before = entries.len();
		entries.retain(|(id, _)| *id != token.id);
		entries.len() < before
	}

	/// Snapshot of the hooks in registration order. Taken before each use so
	/// a hook unsubscribing mid-navigation cannot skew iteration.
	pub(crate) fn snapshot(&self) -> Vec<T> {
		self.entries.read().iter().map(|(_, hook)| hook.clone()).collect()
	}
}
