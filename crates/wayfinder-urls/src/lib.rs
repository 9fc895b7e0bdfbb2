//! Route pattern grammar, trie compilation and path matching.
//!
//! This crate owns everything between a route-pattern string and a matched
//! chain of records: the segment grammar ([`pattern`]), route definitions
//! ([`record`]), the compressed prefix tree ([`trie`]) and the
//! priority-ordered backtracking matcher ([`matcher`]).

pub mod error;
pub mod matcher;
pub mod pattern;
pub mod record;
pub mod trie;

pub use error::{MissingParam, PatternError};
pub use matcher::MatchedChain;
pub use pattern::{Constraint, PathPattern, PathSegment, WILDCARD_DEFAULT_NAME};
pub use record::RouteRecord;
pub use trie::Trie;
