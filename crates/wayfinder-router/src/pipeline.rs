//! The guard-execution state machine.
//!
//! One navigation walks: resolve → leaving guards → `before_each` →
//! `before_enter` → update guards → `before_resolve` → commit →
//! `after_each`. Guards are awaited strictly in that order — later guards
//! may depend on earlier ones' side effects, so phases are never run
//! concurrently across records.
//!
//! Cancellation is implicit: every navigation carries a sequence id, and a
//! navigation that is no longer the latest issued id resolves `Cancelled`
//! at the next phase boundary. A redirect deliberately reuses its
//! navigation's sequence id — it is not a new user-initiated navigation,
//! and allocating a fresh id would let the redirected navigation cancel an
//! unrelated newer one.

use crate::failure::NavigationFailure;
use crate::history::HistoryMode;
use crate::router::Router;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{debug, trace, warn};
use wayfinder_core::{Guard, GuardOutcome, Location, RawLocation};
use wayfinder_urls::RouteRecord;

/// Lifecycle status of one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationStatus {
	Pending,
	Confirmed,
	Cancelled,
	Aborted,
	Failed,
}

/// Guard phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
	LeavingGuards,
	BeforeEach,
	BeforeEnter,
	UpdateGuards,
	BeforeResolve,
}

impl Phase {
	fn as_str(self) -> &'static str {
		match self {
			Self::LeavingGuards => "leaving-guards",
			Self::BeforeEach => "before-each",
			Self::BeforeEnter => "before-enter",
			Self::UpdateGuards => "update-guards",
			Self::BeforeResolve => "before-resolve",
		}
	}
}

/// One in-flight navigation attempt.
struct NavigationRecord {
	id: u64,
	from: Arc<Location>,
	raw: RawLocation,
	redirections: u32,
	status: NavigationStatus,
}

/// Records classified by diffing the active chain against the target chain.
struct ChainDiff {
	/// Present only in the old chain, deepest first.
	leaving: Vec<Arc<RouteRecord>>,
	/// Present in both chains while the params changed, root first.
	updating: Vec<Arc<RouteRecord>>,
	/// Present only in the new chain, root first.
	entering: Vec<Arc<RouteRecord>>,
}

impl Router {
	pub(crate) async fn navigate(
		&self,
		raw: RawLocation,
		mode: HistoryMode,
	) -> Result<Arc<Location>, NavigationFailure> {
		// Sequence ids strictly increase and are never reused; only the
		// navigation holding the current maximum may commit.
		let id = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
		let force = raw.force();
		let mut nav = NavigationRecord {
			id,
			from: self.current(),
			raw: raw.clone(),
			redirections: 0,
			status: NavigationStatus::Pending,
		};
		let mut target = raw;

		loop {
			let resolution = match self.resolve_against_current(&target) {
				Ok(resolution) => resolution,
				Err(error) => {
					nav.status = NavigationStatus::Failed;
					debug!(id, status = ?nav.status, %error, "navigation failed to resolve");
					return Err(NavigationFailure::Resolve(error));
				}
			};
			let to = Arc::new(resolution.location);
			let to_matched = resolution.matched;

			// Duplicate short-circuit: no guard runs, no state changes.
			let current = self.current();
			if to.full_path == current.full_path && !force {
				nav.status = NavigationStatus::Failed;
				trace!(id, full_path = %to.full_path, "duplicate navigation suppressed");
				return Err(NavigationFailure::Duplicated {
					full_path: to.full_path.clone(),
				});
			}

			trace!(id, raw = ?nav.raw, from = %nav.from.full_path, to = %to.full_path, "navigation resolved");

			let diff = diff_chains(&self.current_matched(), &to_matched, &nav.from, &to);

			match self.run_guard_phases(&nav, &diff, &to).await {
				Ok(None) => {}
				Ok(Some(redirect_target)) => {
					nav.redirections += 1;
					if nav.redirections > self.inner.config.max_redirects {
						nav.status = NavigationStatus::Failed;
						debug!(id, status = ?nav.status, hops = nav.redirections, "redirect loop detected");
						return Err(NavigationFailure::RedirectLoop {
							limit: self.inner.config.max_redirects,
							to: to.full_path.clone(),
						});
					}
					trace!(id, hop = nav.redirections, "navigation redirected");
					target = redirect_target;
					continue;
				}
				Err(failure) => {
					nav.status = terminal_status(&failure);
					debug!(id, status = ?nav.status, %failure, "navigation did not commit");
					return Err(failure);
				}
			}

			// Committing: only the navigation holding the newest sequence id
			// may reach the history side effect or touch the current
			// location.
			if let Err(failure) = self.ensure_latest(&nav, &to) {
				nav.status = NavigationStatus::Cancelled;
				debug!(id, status = ?nav.status, "navigation superseded before commit");
				return Err(failure);
			}

			match mode {
				HistoryMode::Push => self.inner.history.push(&to).await,
				HistoryMode::Replace => self.inner.history.replace(&to).await,
			}
			{
				let mut current = self.inner.current.write();
				current.location = Arc::clone(&to);
				current.matched = to_matched;
			}
			self.inner.watch_tx.send_replace(Arc::clone(&to));
			nav.status = NavigationStatus::Confirmed;
			debug!(id, status = ?nav.status, to = %to.full_path, ?mode, "navigation committed");

			// Side-effect only; an after-each hook cannot block or abort the
			// already-committed navigation.
			for hook in self.inner.after_each.snapshot() {
				hook(&to, &nav.from);
			}

			return Ok(to);
		}
	}

	async fn run_guard_phases(
		&self,
		nav: &NavigationRecord,
		diff: &ChainDiff,
		to: &Arc<Location>,
	) -> Result<Option<RawLocation>, NavigationFailure> {
		let phases: [(Phase, Vec<Arc<dyn Guard>>); 5] = [
			(
				Phase::LeavingGuards,
				collect_guards(&diff.leaving, RouteRecord::leave_guards),
			),
			(Phase::BeforeEach, self.inner.before_each.snapshot()),
			(
				Phase::BeforeEnter,
				collect_guards(&diff.entering, RouteRecord::enter_guards),
			),
			(
				Phase::UpdateGuards,
				collect_guards(&diff.updating, RouteRecord::update_guards),
			),
			(Phase::BeforeResolve, self.inner.before_resolve.snapshot()),
		];

		for (phase, guards) in phases {
			if guards.is_empty() {
				continue;
			}
			trace!(id = nav.id, phase = phase.as_str(), guards = guards.len(), "entering guard phase");
			self.ensure_latest(nav, to)?;

			for guard in guards {
				let outcome = guard.check(to.as_ref(), nav.from.as_ref()).await;
				// The await above is a suspension point: a newer navigation
				// may have been issued while this guard ran.
				self.ensure_latest(nav, to)?;

				match outcome {
					Ok(GuardOutcome::Continue) => {}
					Ok(GuardOutcome::Abort) => {
						return Err(NavigationFailure::Aborted {
							from: nav.from.full_path.clone(),
							to: to.full_path.clone(),
						});
					}
					Ok(GuardOutcome::Redirect(raw)) => return Ok(Some(raw)),
					Err(source) => {
						let failure = NavigationFailure::GuardError {
							to: to.full_path.clone(),
							source,
						};
						warn!(id = nav.id, phase = phase.as_str(), %failure, "guard raised an error");
						for handler in self.inner.on_error.snapshot() {
							handler(&failure);
						}
						return Err(failure);
					}
				}
			}
		}

		Ok(None)
	}

	/// Cancellation as a pure function of (this navigation's id, latest
	/// issued id): anything but the newest navigation is superseded.
	fn ensure_latest(
		&self,
		nav: &NavigationRecord,
		to: &Arc<Location>,
	) -> Result<(), NavigationFailure> {
		let latest = self.inner.seq.load(Ordering::SeqCst);
		if latest == nav.id {
			Ok(())
		} else {
			Err(NavigationFailure::Cancelled {
				from: nav.from.full_path.clone(),
				to: to.full_path.clone(),
			})
		}
	}
}

fn collect_guards(
	records: &[Arc<RouteRecord>],
	per_record: impl Fn(&RouteRecord) -> &[Arc<dyn Guard>],
) -> Vec<Arc<dyn Guard>> {
	records
		.iter()
		.flat_map(|record| per_record(record).iter().cloned())
		.collect()
}

fn terminal_status(failure: &NavigationFailure) -> NavigationStatus {
	match failure {
		NavigationFailure::Cancelled { .. } => NavigationStatus::Cancelled,
		NavigationFailure::Aborted { .. } => NavigationStatus::Aborted,
		_ => NavigationStatus::Failed,
	}
}

fn diff_chains(
	from_chain: &[Arc<RouteRecord>],
	to_chain: &[Arc<RouteRecord>],
	from: &Location,
	to: &Location,
) -> ChainDiff {
	let in_to = |record: &Arc<RouteRecord>| to_chain.iter().any(|t| Arc::ptr_eq(record, t));
	let in_from = |record: &Arc<RouteRecord>| from_chain.iter().any(|f| Arc::ptr_eq(record, f));

	let leaving = from_chain
		.iter()
		.rev()
		.filter(|record| !in_to(record))
		.cloned()
		.collect();
	let entering = to_chain
		.iter()
		.filter(|record| !in_from(record))
		.cloned()
		.collect();
	// Records kept across the navigation only count as updating when the
	// extracted params actually changed.
	let updating = if from.params == to.params {
		Vec::new()
	} else {
		to_chain.iter().filter(|record| in_from(record)).cloned().collect()
	};

	ChainDiff {
		leaving,
		updating,
		entering,
	}
}
