//! History collaborator interface.
//!
//! The router never persists URLs itself: it calls `push`/`replace` on this
//! trait exactly once per committed navigation and re-enters the pipeline
//! when the collaborator reports externally driven movement (back/forward).
//! [`MemoryHistory`] is the in-process implementation used by tests and
//! non-browser hosts.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use wayfinder_core::Location;

/// How a committed navigation is written to history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
	/// Append a new entry.
	Push,
	/// Overwrite the current entry.
	Replace,
}

/// Callback invoked with the new full path after externally driven movement.
pub type HistoryListener = Arc<dyn Fn(&str) + Send + Sync>;

/// The external history/storage abstraction.
#[async_trait]
pub trait History: Send + Sync {
	/// Full path of the entry the history currently points at.
	fn location(&self) -> String;

	/// Appends `to` as a new entry. Called by the pipeline only at commit.
	async fn push(&self, to: &Location);

	/// Overwrites the current entry with `to`. Called only at commit.
	async fn replace(&self, to: &Location);

	/// Moves `delta` entries through the stack and notifies listeners.
	async fn go(&self, delta: i64);

	/// Registers a listener for externally driven movement. `push` and
	/// `replace` do not notify; only `go` (and host-driven equivalents) do.
	fn listen(&self, listener: HistoryListener);
}

struct MemoryHistoryState {
	entries: Vec<String>,
	index: usize,
}

/// In-memory history stack.
pub struct MemoryHistory {
	state: Mutex<MemoryHistoryState>,
	listeners: Mutex<Vec<HistoryListener>>,
}

impl MemoryHistory {
	/// Creates a history positioned at `/`.
	pub fn new() -> Self {
		Self::with_initial("/")
	}

	/// Creates a history positioned at an arbitrary full path.
	pub fn with_initial(full_path: &str) -> Self {
		Self {
			state: Mutex::new(MemoryHistoryState {
				entries: vec![full_path.to_string()],
				index: 0,
			}),
			listeners: Mutex::new(Vec::new()),
		}
	}

	/// Snapshot of the entry stack, oldest first.
	pub fn entries(&self) -> Vec<String> {
		self.state.lock().entries.clone()
	}

	fn notify(&self, full_path: &str) {
		let listeners = self.listeners.lock().clone();
		for listener in listeners {
			listener(full_path);
		}
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl History for MemoryHistory {
	fn location(&self) -> String {
		let state = self.state.lock();
		state.entries[state.index].clone()
	}

	async fn push(&self, to: &Location) {
		let mut state = self.state.lock();
		let index = state.index;
		// Pushing from the middle of the stack drops the forward entries,
		// the way a browser does.
		state.entries.truncate(index + 1);
		state.entries.push(to.full_path.clone());
		state.index += 1;
	}

	async fn replace(&self, to: &Location) {
		let mut state = self.state.lock();
		let index = state.index;
		state.entries[index] = to.full_path.clone();
	}

	async fn go(&self, delta: i64) {
		let full_path = {
			let mut state = self.state.lock();
			let target = state.index as i64 + delta;
			if target < 0 || target >= state.entries.len() as i64 {
				return;
			}
			state.index = target as usize;
			state.entries[state.index].clone()
		};
		self.notify(&full_path);
	}

	fn listen(&self, listener: HistoryListener) {
		self.listeners.lock().push(listener);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn location(path: &str) -> Location {
		Location {
			path: path.to_string(),
			full_path: path.to_string(),
			..Location::start()
		}
	}

	#[tokio::test]
	async fn test_push_and_location() {
		let history = MemoryHistory::new();
		history.push(&location("/a")).await;
		history.push(&location("/b")).await;

		assert_eq!(history.location(), "/b");
		assert_eq!(history.entries(), vec!["/", "/a", "/b"]);
	}

	#[tokio::test]
	async fn test_replace_overwrites_current_entry() {
		let history = MemoryHistory::new();
		history.push(&location("/a")).await;
		history.replace(&location("/b")).await;

		assert_eq!(history.entries(), vec!["/", "/b"]);
	}

	#[tokio::test]
	async fn test_go_notifies_listeners() {
		let history = MemoryHistory::new();
		history.push(&location("/a")).await;

		let hits = Arc::new(AtomicUsize::new(0));
		let seen = Arc::new(Mutex::new(String::new()));
		{
			let hits = Arc::clone(&hits);
			let seen = Arc::clone(&seen);
			history.listen(Arc::new(move |path| {
				hits.fetch_add(1, Ordering::SeqCst);
				*seen.lock() = path.to_string();
			}));
		}

		history.go(-1).await;
		assert_eq!(hits.load(Ordering::SeqCst), 1);
		assert_eq!(*seen.lock(), "/");

		// Out-of-range movement is ignored.
		history.go(-5).await;
		assert_eq!(hits.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_push_from_middle_drops_forward_entries() {
		let history = MemoryHistory::new();
		history.push(&location("/a")).await;
		history.push(&location("/b")).await;
		history.go(-1).await;
		history.push(&location("/c")).await;

		assert_eq!(history.entries(), vec!["/", "/a", "/c"]);
	}
}
