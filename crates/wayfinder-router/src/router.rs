//! The router facade.
//!
//! Owns the compiled route table (behind a copy-on-write snapshot), the
//! current location, the global hook registries and the navigation sequence
//! counter. All navigation flows through the pipeline in
//! [`crate::pipeline`]; everything here is registration, lookup and
//! observation.

use crate::failure::NavigationFailure;
use crate::history::{History, HistoryMode};
use crate::hooks::{AfterEachHook, ErrorHook, HookRegistry, HookToken};
use crate::resolver::{self, ResolveError, Resolution, RouteTable};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::sync::watch;
use tracing::{trace, warn};
use wayfinder_core::{Guard, Location, RawLocation};
use wayfinder_urls::{PatternError, RouteRecord};

/// Router tuning knobs.
#[derive(Debug, Clone)]
pub struct RouterConfig {
	/// Maximum redirect hops a single navigation may take before failing
	/// with a redirect-loop error.
	pub max_redirects: u32,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self { max_redirects: 10 }
	}
}

pub(crate) struct CurrentState {
	pub(crate) location: Arc<Location>,
	pub(crate) matched: Vec<Arc<RouteRecord>>,
}

pub(crate) struct RouterInner {
	pub(crate) table: RwLock<Arc<RouteTable>>,
	pub(crate) current: RwLock<CurrentState>,
	pub(crate) watch_tx: watch::Sender<Arc<Location>>,
	pub(crate) seq: AtomicU64,
	pub(crate) history: Arc<dyn History>,
	pub(crate) config: RouterConfig,
	pub(crate) before_each: HookRegistry<Arc<dyn Guard>>,
	pub(crate) before_resolve: HookRegistry<Arc<dyn Guard>>,
	pub(crate) after_each: HookRegistry<AfterEachHook>,
	pub(crate) on_error: HookRegistry<ErrorHook>,
}

/// The navigation core's public entry point.
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Router {
	pub(crate) inner: Arc<RouterInner>,
}

impl Router {
	/// Creates a router over the given history collaborator with default
	/// configuration.
	pub fn new(history: Arc<dyn History>) -> Self {
		Self::with_config(history, RouterConfig::default())
	}

	/// Creates a router with explicit configuration.
	pub fn with_config(history: Arc<dyn History>, config: RouterConfig) -> Self {
		let start = Arc::new(Location::start());
		let (watch_tx, _watch_rx) = watch::channel(Arc::clone(&start));
		Self {
			inner: Arc::new(RouterInner {
				table: RwLock::new(Arc::new(RouteTable::empty())),
				current: RwLock::new(CurrentState {
					location: start,
					matched: Vec::new(),
				}),
				watch_tx,
				seq: AtomicU64::new(0),
				history,
				config,
				before_each: HookRegistry::new(),
				before_resolve: HookRegistry::new(),
				after_each: HookRegistry::new(),
				on_error: HookRegistry::new(),
			}),
		}
	}

	/// Registers a top-level route. A record carrying an already-registered
	/// name replaces the previous record under that name.
	pub fn add_route(&self, record: RouteRecord) -> Result<(), PatternError> {
		let mut table = self.inner.table.write();
		let mut records = table.records.clone();
		if let Some(name) = record.name() {
			records.retain(|existing| existing.name() != Some(name));
		}
		records.push(Arc::new(record));
		*table = Arc::new(RouteTable::build(records)?);
		Ok(())
	}

	/// Registers a route nested under the named parent. Returns `Ok(false)`
	/// when no route carries the parent name.
	pub fn add_child_route(&self, parent: &str, record: RouteRecord) -> Result<bool, PatternError> {
		let mut table = self.inner.table.write();
		let mut records = table.records.clone();
		let mut attached = false;
		for slot in records.iter_mut() {
			if let Some(updated) = attach_child(slot, parent, &record) {
				*slot = Arc::new(updated);
				attached = true;
				break;
			}
		}
		if attached {
			*table = Arc::new(RouteTable::build(records)?);
		}
		Ok(attached)
	}

	/// Removes the route (top-level or nested) registered under `name`,
	/// along with its children. Returns whether anything was removed.
	pub fn remove_route(&self, name: &str) -> bool {
		let mut table = self.inner.table.write();
		let mut removed = false;
		let mut records: Vec<Arc<RouteRecord>> = Vec::with_capacity(table.records.len());
		for record in &table.records {
			match remove_named(record, name) {
				RemoveOutcome::Dropped => removed = true,
				RemoveOutcome::Kept(kept) => records.push(kept),
				RemoveOutcome::Rebuilt(rebuilt) => {
					removed = true;
					records.push(Arc::new(rebuilt));
				}
			}
		}
		if !removed {
			return false;
		}
		match RouteTable::build(records) {
			Ok(rebuilt) => {
				*table = Arc::new(rebuilt);
				true
			}
			Err(error) => {
				// A subset of previously valid routes stays valid; reaching
				// this arm means a bug upstream, so keep the old table.
				warn!(%error, "route removal produced an uncompilable table; keeping previous routes");
				false
			}
		}
	}

	/// Snapshot of the registered top-level records.
	pub fn get_routes(&self) -> Vec<Arc<RouteRecord>> {
		self.inner.table.read().records.clone()
	}

	/// Whether a route (at any nesting depth) carries `name`.
	pub fn has_route(&self, name: &str) -> bool {
		self.inner.table.read().names.contains_key(name)
	}

	/// Resolves a raw target against the current location without
	/// navigating. Pure: no router state changes.
	pub fn resolve(&self, raw: impl Into<RawLocation>) -> Result<Location, ResolveError> {
		let raw = raw.into();
		let table = self.table_snapshot();
		let current = self.current();
		resolver::resolve(&table, &raw, &current).map(|resolution| resolution.location)
	}

	/// Navigates by appending a history entry.
	pub async fn push(&self, raw: impl Into<RawLocation>) -> Result<Arc<Location>, NavigationFailure> {
		self.navigate(raw.into(), HistoryMode::Push).await
	}

	/// Navigates by replacing the current history entry.
	pub async fn replace(
		&self,
		raw: impl Into<RawLocation>,
	) -> Result<Arc<Location>, NavigationFailure> {
		self.navigate(raw.into(), HistoryMode::Replace).await
	}

	/// Moves through the history stack. The collaborator reports the
	/// resulting location through its listener, which re-enters the
	/// pipeline via [`Router::handle_history_change`].
	pub async fn go(&self, delta: i64) {
		self.inner.history.go(delta).await;
	}

	/// Re-enters the pipeline for externally driven history movement
	/// (back/forward). Runs the full guard sequence in replace mode.
	pub async fn handle_history_change(
		&self,
		full_path: &str,
	) -> Result<Arc<Location>, NavigationFailure> {
		self.navigate(RawLocation::from(full_path), HistoryMode::Replace)
			.await
	}

	/// Subscribes to the history collaborator so back/forward movement
	/// re-enters the pipeline automatically. Requires a tokio runtime; the
	/// listener holds only a weak reference, so it does not keep a dropped
	/// router alive.
	pub fn setup_history_listener(&self) {
		let weak = Arc::downgrade(&self.inner);
		self.inner.history.listen(Arc::new(move |full_path: &str| {
			let Some(inner) = weak.upgrade() else {
				return;
			};
			let router = Router { inner };
			let full_path = full_path.to_string();
			tokio::spawn(async move {
				if let Err(failure) = router.handle_history_change(&full_path).await {
					trace!(%failure, "history-driven navigation did not commit");
				}
			});
		}));
	}

	/// The current committed location.
	pub fn current(&self) -> Arc<Location> {
		Arc::clone(&self.inner.current.read().location)
	}

	/// A read-only observer of the current location. Receivers see every
	/// committed navigation in order.
	pub fn watch_current(&self) -> watch::Receiver<Arc<Location>> {
		self.inner.watch_tx.subscribe()
	}

	pub(crate) fn current_matched(&self) -> Vec<Arc<RouteRecord>> {
		self.inner.current.read().matched.clone()
	}

	pub(crate) fn table_snapshot(&self) -> Arc<RouteTable> {
		Arc::clone(&self.inner.table.read())
	}

	pub(crate) fn resolve_against_current(
		&self,
		raw: &RawLocation,
	) -> Result<Resolution, ResolveError> {
		let table = self.table_snapshot();
		let current = self.current();
		resolver::resolve(&table, raw, &current)
	}

	/// Registers a guard run before every navigation. Returns a token for
	/// [`Router::remove_before_each`].
	pub fn before_each<G: Guard + 'static>(&self, guard: G) -> HookToken {
		self.inner.before_each.add(Arc::new(guard))
	}

	pub fn remove_before_each(&self, token: HookToken) -> bool {
		self.inner.before_each.remove(token)
	}

	/// Registers a guard run after per-record guards, immediately before
	/// commit.
	pub fn before_resolve<G: Guard + 'static>(&self, guard: G) -> HookToken {
		self.inner.before_resolve.add(Arc::new(guard))
	}

	pub fn remove_before_resolve(&self, token: HookToken) -> bool {
		self.inner.before_resolve.remove(token)
	}

	/// Registers a hook run after every committed navigation.
	pub fn after_each<F>(&self, hook: F) -> HookToken
	where
		F: Fn(&Location, &Location) + Send + Sync + 'static,
	{
		self.inner.after_each.add(Arc::new(hook))
	}

	pub fn remove_after_each(&self, token: HookToken) -> bool {
		self.inner.after_each.remove(token)
	}

	/// Registers a handler for broadcast navigation errors.
	pub fn on_error<F>(&self, handler: F) -> HookToken
	where
		F: Fn(&NavigationFailure) + Send + Sync + 'static,
	{
		self.inner.on_error.add(Arc::new(handler))
	}

	pub fn remove_on_error(&self, token: HookToken) -> bool {
		self.inner.on_error.remove(token)
	}
}

/// Rebuilds `record` with `child` attached under the record named `parent`,
/// or returns `None` when the name is absent from this subtree.
fn attach_child(record: &Arc<RouteRecord>, parent: &str, child: &RouteRecord) -> Option<RouteRecord> {
	if record.name() == Some(parent) {
		return Some(record.as_ref().clone().with_child(child.clone()));
	}
	for (index, nested) in record.children().iter().enumerate() {
		if let Some(updated) = attach_child(nested, parent, child) {
			let mut children = record.children().to_vec();
			children[index] = Arc::new(updated);
			return Some(record.as_ref().clone().with_children(children));
		}
	}
	None
}

enum RemoveOutcome {
	/// The record itself carried the name and is dropped with its subtree.
	Dropped,
	/// Untouched.
	Kept(Arc<RouteRecord>),
	/// A nested descendant was removed; the record was rebuilt.
	Rebuilt(RouteRecord),
}

fn remove_named(record: &Arc<RouteRecord>, name: &str) -> RemoveOutcome {
	if record.name() == Some(name) {
		return RemoveOutcome::Dropped;
	}
	let mut changed = false;
	let mut children: Vec<Arc<RouteRecord>> = Vec::with_capacity(record.children().len());
	for child in record.children() {
		match remove_named(child, name) {
			RemoveOutcome::Dropped => changed = true,
			RemoveOutcome::Kept(kept) => children.push(kept),
			RemoveOutcome::Rebuilt(rebuilt) => {
				changed = true;
				children.push(Arc::new(rebuilt));
			}
		}
	}
	if changed {
		RemoveOutcome::Rebuilt(record.as_ref().clone().with_children(children))
	} else {
		RemoveOutcome::Kept(Arc::clone(record))
	}
}
