//! Shared leaf types for the wayfinder navigation core.
//!
//! Everything here is dependency-light on purpose: the URL compiler and the
//! navigation pipeline both build on these types, so this crate must not know
//! about either of them. Consumers normally use the `wayfinder` facade crate
//! instead of depending on this one directly.

pub mod component;
pub mod guard;
pub mod location;
pub mod params;
pub mod query;
pub mod target;

pub use component::{Component, DEFAULT_SLOT, ViewRef, ViewResolver};
pub use guard::{CallbackGuard, FnGuard, Guard, GuardError, GuardOutcome, GuardResult, Next, PredicateGuard};
pub use location::Location;
pub use params::{Meta, ParamValue, Params};
pub use query::Query;
pub use target::{LocationParts, RawLocation};
