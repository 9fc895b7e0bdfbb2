//! Navigation guards and their calling-convention adapters.
//!
//! Guards come in two calling styles: returned-value (the guard's future
//! resolves to an outcome) and callback-`next` (the guard receives a handle
//! it resolves exactly once). Both are normalized into [`GuardOutcome`] at
//! registration time, so the pipeline only ever deals with one shape.

use crate::location::Location;
use crate::target::RawLocation;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Error raised by a guard; wrapped as a `guard-error` navigation failure.
pub type GuardError = Box<dyn std::error::Error + Send + Sync>;

/// The normalized outcome of one guard invocation.
#[derive(Debug, Clone)]
pub enum GuardOutcome {
	/// Let the navigation proceed to the next guard.
	Continue,
	/// Abort the navigation; the current location stays unchanged.
	Abort,
	/// Restart resolution at a new target, reusing the same navigation.
	Redirect(RawLocation),
}

pub type GuardResult = Result<GuardOutcome, GuardError>;

/// An interceptor run during navigation.
///
/// Guards are awaited strictly in sequence; the pipeline never invokes two
/// guards of one navigation concurrently.
#[async_trait]
pub trait Guard: Send + Sync {
	async fn check(&self, to: &Location, from: &Location) -> GuardResult;
}

/// Blanket implementation so `Arc<dyn Guard>` is itself a guard.
#[async_trait]
impl<T: Guard + ?Sized> Guard for Arc<T> {
	async fn check(&self, to: &Location, from: &Location) -> GuardResult {
		(**self).check(to, from).await
	}
}

/// Adapter for the returned-value style: an async closure resolving to a
/// [`GuardResult`].
pub struct FnGuard<F> {
	f: F,
}

impl<F, Fut> FnGuard<F>
where
	F: Fn(Location, Location) -> Fut + Send + Sync,
	Fut: Future<Output = GuardResult> + Send,
{
	pub fn new(f: F) -> Self {
		Self { f }
	}
}

#[async_trait]
impl<F, Fut> Guard for FnGuard<F>
where
	F: Fn(Location, Location) -> Fut + Send + Sync,
	Fut: Future<Output = GuardResult> + Send,
{
	async fn check(&self, to: &Location, from: &Location) -> GuardResult {
		(self.f)(to.clone(), from.clone()).await
	}
}

/// Adapter for plain boolean predicates: `true` continues, `false` aborts.
pub struct PredicateGuard<F> {
	f: F,
}

impl<F> PredicateGuard<F>
where
	F: Fn(&Location, &Location) -> bool + Send + Sync,
{
	pub fn new(f: F) -> Self {
		Self { f }
	}
}

#[async_trait]
impl<F> Guard for PredicateGuard<F>
where
	F: Fn(&Location, &Location) -> bool + Send + Sync,
{
	async fn check(&self, to: &Location, from: &Location) -> GuardResult {
		if (self.f)(to, from) {
			Ok(GuardOutcome::Continue)
		} else {
			Ok(GuardOutcome::Abort)
		}
	}
}

/// Resolution handle passed to callback-style guards.
///
/// The handle may be cloned and moved into spawned tasks; the first
/// resolution wins and every later call is a silent no-op. Dropping every
/// clone without resolving counts as an abort.
#[derive(Clone)]
pub struct Next {
	slot: Arc<Mutex<Option<oneshot::Sender<GuardOutcome>>>>,
}

impl Next {
	fn new() -> (Self, oneshot::Receiver<GuardOutcome>) {
		let (tx, rx) = oneshot::channel();
		(
			Self {
				slot: Arc::new(Mutex::new(Some(tx))),
			},
			rx,
		)
	}

	/// Lets the navigation continue.
	pub fn proceed(&self) {
		self.resolve(GuardOutcome::Continue);
	}

	/// Aborts the navigation.
	pub fn abort(&self) {
		self.resolve(GuardOutcome::Abort);
	}

	/// Redirects the navigation to a new target.
	pub fn redirect(&self, to: impl Into<RawLocation>) {
		self.resolve(GuardOutcome::Redirect(to.into()));
	}

	fn resolve(&self, outcome: GuardOutcome) {
		if let Some(tx) = self.slot.lock().take() {
			// The receiver disappears when the navigation was superseded;
			// resolving then is the mandated silent no-op.
			let _ = tx.send(outcome);
		}
	}
}

/// Adapter for the callback-`next` style.
pub struct CallbackGuard<F> {
	f: F,
}

impl<F> CallbackGuard<F>
where
	F: Fn(&Location, &Location, Next) + Send + Sync,
{
	pub fn new(f: F) -> Self {
		Self { f }
	}
}

#[async_trait]
impl<F> Guard for CallbackGuard<F>
where
	F: Fn(&Location, &Location, Next) + Send + Sync,
{
	async fn check(&self, to: &Location, from: &Location) -> GuardResult {
		let (next, rx) = Next::new();
		(self.f)(to, from, next);
		match rx.await {
			Ok(outcome) => Ok(outcome),
			// Every handle dropped without a call: treat as an abort rather
			// than stalling the navigation forever.
			Err(_) => Ok(GuardOutcome::Abort),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn to_from() -> (Location, Location) {
		(Location::start(), Location::start())
	}

	#[tokio::test]
	async fn test_fn_guard_outcome() {
		let guard = FnGuard::new(|_to, _from| async { Ok(GuardOutcome::Continue) });
		let (to, from) = to_from();
		assert!(matches!(
			guard.check(&to, &from).await,
			Ok(GuardOutcome::Continue)
		));
	}

	#[tokio::test]
	async fn test_predicate_guard_abort() {
		let guard = PredicateGuard::new(|_to, _from| false);
		let (to, from) = to_from();
		assert!(matches!(
			guard.check(&to, &from).await,
			Ok(GuardOutcome::Abort)
		));
	}

	#[tokio::test]
	async fn test_callback_guard_first_call_wins() {
		let guard = CallbackGuard::new(|_to: &Location, _from: &Location, next: Next| {
			next.proceed();
			// Second resolution must be a silent no-op.
			next.abort();
		});
		let (to, from) = to_from();
		assert!(matches!(
			guard.check(&to, &from).await,
			Ok(GuardOutcome::Continue)
		));
	}

	#[tokio::test]
	async fn test_callback_guard_dropped_next_aborts() {
		let guard = CallbackGuard::new(|_to: &Location, _from: &Location, _next: Next| {
			// Handle dropped without being called.
		});
		let (to, from) = to_from();
		assert!(matches!(
			guard.check(&to, &from).await,
			Ok(GuardOutcome::Abort)
		));
	}

	#[tokio::test]
	async fn test_callback_guard_deferred_resolution() {
		let guard = CallbackGuard::new(|_to: &Location, _from: &Location, next: Next| {
			tokio::spawn(async move {
				next.redirect("/login");
			});
		});
		let (to, from) = to_from();
		match guard.check(&to, &from).await {
			Ok(GuardOutcome::Redirect(RawLocation::Path(path))) => assert_eq!(path, "/login"),
			other => panic!("expected redirect, got {other:?}"),
		}
	}
}
