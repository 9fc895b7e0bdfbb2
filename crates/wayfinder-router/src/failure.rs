//! Structured navigation outcomes.

use crate::resolver::ResolveError;
use thiserror::Error;
use wayfinder_core::GuardError;

/// A non-exceptional navigation outcome.
///
/// Failures are the `Err` arm of the navigation result and are expected in
/// normal operation (duplicate suppression, guard aborts, superseded
/// navigations); none of them leaves the router in an inconsistent state,
/// and the current location stays whatever it was before the attempt.
#[derive(Debug, Error)]
pub enum NavigationFailure {
	/// The resolved target equals the current location and the navigation
	/// was not forced. No guard ran.
	#[error("duplicated navigation: already at '{full_path}'")]
	Duplicated { full_path: String },

	/// A newer navigation was issued while this one was in flight.
	#[error("navigation from '{from}' to '{to}' cancelled by a newer navigation")]
	Cancelled { from: String, to: String },

	/// A guard resolved to an abort.
	#[error("navigation from '{from}' to '{to}' aborted by a guard")]
	Aborted { from: String, to: String },

	/// A guard raised an error; also broadcast to `on_error` handlers.
	#[error("guard error while navigating to '{to}': {source}")]
	GuardError {
		to: String,
		#[source]
		source: GuardError,
	},

	/// Redirect hops exceeded the configured limit.
	#[error("redirect limit ({limit}) exceeded while navigating to '{to}'")]
	RedirectLoop { limit: u32, to: String },

	/// The target did not resolve to any registered route.
	#[error(transparent)]
	Resolve(#[from] ResolveError),
}

impl NavigationFailure {
	pub fn is_duplicated(&self) -> bool {
		matches!(self, Self::Duplicated { .. })
	}

	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled { .. })
	}

	pub fn is_aborted(&self) -> bool {
		matches!(self, Self::Aborted { .. })
	}

	pub fn is_redirect_loop(&self) -> bool {
		matches!(self, Self::RedirectLoop { .. })
	}
}
