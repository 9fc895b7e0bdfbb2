//! # Wayfinder
//!
//! The matching-and-navigation core of a single-page-application routing
//! layer: a compressed prefix-tree path matcher plus a cancellable,
//! redirect-aware, asynchronous guard-execution pipeline.
//!
//! The core deliberately ends at its interfaces: history persistence is an
//! external collaborator behind the [`History`] trait, rendering receives
//! opaque [`Component`] handles it downcasts itself, and feature managers
//! (caching, analytics, permissions, ...) subscribe through
//! [`Router::before_each`] / [`Router::after_each`] rather than reaching
//! into the pipeline.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use wayfinder::{MemoryHistory, PredicateGuard, RouteRecord, Router};
//!
//! # tokio_test::block_on(async {
//! let router = Router::new(Arc::new(MemoryHistory::new()));
//! router
//!     .add_route(RouteRecord::new("/users/:id").unwrap().named("user"))
//!     .unwrap();
//! router.before_each(PredicateGuard::new(|_to, _from| true));
//!
//! let location = router.push("/users/42").await.unwrap();
//! assert_eq!(location.path, "/users/42");
//! # });
//! ```

pub use wayfinder_core::{
	CallbackGuard, Component, DEFAULT_SLOT, FnGuard, Guard, GuardError, GuardOutcome, GuardResult,
	Location, LocationParts, Meta, Next, ParamValue, Params, PredicateGuard, Query, RawLocation,
	ViewRef, ViewResolver,
};
pub use wayfinder_router::{
	AfterEachHook, ErrorHook, History, HistoryMode, HookToken, MemoryHistory, NavigationFailure,
	NavigationStatus, ResolveError, Resolution, Router, RouterConfig,
};
pub use wayfinder_urls::{
	Constraint, MatchedChain, MissingParam, PathPattern, PathSegment, PatternError, RouteRecord,
	Trie, WILDCARD_DEFAULT_NAME,
};
