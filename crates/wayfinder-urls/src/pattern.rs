//! Route pattern grammar.
//!
//! A pattern is an ordered list of segments:
//!
//! - `/users` — literal
//! - `/users/:id` — named parameter
//! - `/users/:id(\d+)` — named parameter with a regex constraint
//! - `/users/:tab?` — optional parameter (tail position only)
//! - `/files/*rest` — wildcard capturing the remaining segments
//!
//! Parameter names must be unique within a pattern; optional parameters may
//! be followed only by other optional parameters or a wildcard; a wildcard
//! must be the final segment.

use crate::error::{MissingParam, PatternError};
use regex::{Regex, RegexBuilder};
use wayfinder_core::{ParamValue, Params};

/// Capture name used by an anonymous `*` wildcard.
pub const WILDCARD_DEFAULT_NAME: &str = "pathMatch";

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a pattern.
const MAX_PATTERN_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled parameter constraint.
const MAX_CONSTRAINT_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// An anchored regex constraint on a single parameter segment.
#[derive(Debug, Clone)]
pub struct Constraint {
	source: String,
	regex: Regex,
}

impl Constraint {
	fn compile(pattern: &str, source: &str) -> Result<Self, PatternError> {
		let anchored = format!("^(?:{source})$");
		let regex = RegexBuilder::new(&anchored)
			.size_limit(MAX_CONSTRAINT_REGEX_SIZE)
			.build()
			.map_err(|e| PatternError::malformed(pattern, format!("invalid constraint regex: {e}")))?;
		Ok(Self {
			source: source.to_string(),
			regex,
		})
	}

	/// The constraint as written in the pattern.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Whether a path segment satisfies the constraint.
	pub fn is_match(&self, segment: &str) -> bool {
		self.regex.is_match(segment)
	}
}

impl PartialEq for Constraint {
	fn eq(&self, other: &Self) -> bool {
		self.source == other.source
	}
}

impl Eq for Constraint {}

/// One parsed pattern segment.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
	/// Literal text matched exactly.
	Literal(String),
	/// Named parameter capturing one segment.
	Param {
		name: String,
		optional: bool,
		constraint: Option<Constraint>,
	},
	/// Wildcard capturing every remaining segment.
	Wildcard { name: String },
}

impl PathSegment {
	/// The capture name of a parameter or wildcard segment.
	pub fn capture_name(&self) -> Option<&str> {
		match self {
			Self::Literal(_) => None,
			Self::Param { name, .. } | Self::Wildcard { name } => Some(name),
		}
	}
}

/// A parsed, immutable route pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPattern {
	raw: String,
	segments: Vec<PathSegment>,
}

impl PathPattern {
	/// Parses a pattern string, rejecting grammar violations.
	pub fn parse(pattern: &str) -> Result<Self, PatternError> {
		if !pattern.starts_with('/') {
			return Err(PatternError::malformed(pattern, "pattern must start with '/'"));
		}
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(PatternError::malformed(
				pattern,
				format!("pattern exceeds {MAX_PATTERN_LENGTH} bytes"),
			));
		}

		let mut segments = Vec::new();
		let trimmed = pattern.trim_end_matches('/');
		let mut raw_segments: Vec<&str> = Vec::new();
		if !trimmed.is_empty() {
			raw_segments.extend(trimmed[1..].split('/'));
		}
		if raw_segments.len() > MAX_PATTERN_SEGMENTS {
			return Err(PatternError::malformed(
				pattern,
				format!("pattern exceeds {MAX_PATTERN_SEGMENTS} segments"),
			));
		}

		for raw_segment in raw_segments {
			segments.push(Self::parse_segment(pattern, raw_segment)?);
		}

		validate_sequence(pattern, &segments)?;

		Ok(Self {
			raw: pattern.to_string(),
			segments,
		})
	}

	fn parse_segment(pattern: &str, raw: &str) -> Result<PathSegment, PatternError> {
		if raw.is_empty() {
			return Err(PatternError::malformed(pattern, "empty path segment"));
		}

		if let Some(rest) = raw.strip_prefix(':') {
			let (rest, optional) = match rest.strip_suffix('?') {
				Some(inner) => (inner, true),
				None => (rest, false),
			};
			let (name, constraint) = match rest.find('(') {
				Some(open) => {
					let source = rest[open..]
						.strip_prefix('(')
						.and_then(|s| s.strip_suffix(')'))
						.ok_or_else(|| {
							PatternError::malformed(pattern, "unclosed constraint parenthesis")
						})?;
					(&rest[..open], Some(Constraint::compile(pattern, source)?))
				}
				None => (rest, None),
			};
			validate_name(pattern, name)?;
			return Ok(PathSegment::Param {
				name: name.to_string(),
				optional,
				constraint,
			});
		}

		if let Some(rest) = raw.strip_prefix('*') {
			let name = if rest.is_empty() {
				WILDCARD_DEFAULT_NAME.to_string()
			} else {
				validate_name(pattern, rest)?;
				rest.to_string()
			};
			return Ok(PathSegment::Wildcard { name });
		}

		Ok(PathSegment::Literal(raw.to_string()))
	}

	/// The pattern as registered.
	pub fn raw(&self) -> &str {
		&self.raw
	}

	/// The parsed segments in order.
	pub fn segments(&self) -> &[PathSegment] {
		&self.segments
	}

	/// Joins a parent raw pattern with a child raw pattern.
	pub fn join_raw(parent: &str, child: &str) -> String {
		let base = parent.trim_end_matches('/');
		format!("{base}{child}")
	}

	/// Synthesizes a concrete path by substituting `params` into the
	/// pattern — the inverse of matching.
	///
	/// Missing optional parameters and wildcards are omitted; a missing
	/// required parameter is an error.
	pub fn interpolate(&self, params: &Params) -> Result<String, MissingParam> {
		let mut parts: Vec<String> = Vec::with_capacity(self.segments.len());

		for segment in &self.segments {
			match segment {
				PathSegment::Literal(text) => parts.push(text.clone()),
				PathSegment::Param { name, optional, .. } => match params.get(name) {
					Some(ParamValue::Single(value)) => parts.push(value.clone()),
					Some(ParamValue::Multi(values)) if !values.is_empty() => {
						parts.push(values[0].clone());
					}
					_ if *optional => {}
					_ => {
						return Err(MissingParam {
							pattern: self.raw.clone(),
							name: name.clone(),
						});
					}
				},
				PathSegment::Wildcard { name } => match params.get(name) {
					Some(ParamValue::Multi(values)) => parts.extend(values.iter().cloned()),
					Some(ParamValue::Single(value)) => parts.push(value.clone()),
					None => {}
				},
			}
		}

		if parts.is_empty() {
			Ok("/".to_string())
		} else {
			Ok(format!("/{}", parts.join("/")))
		}
	}
}

fn validate_name(pattern: &str, name: &str) -> Result<(), PatternError> {
	if name.is_empty() {
		return Err(PatternError::malformed(pattern, "parameter is missing a name"));
	}
	if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
		return Err(PatternError::malformed(
			pattern,
			format!("invalid parameter name '{name}'"),
		));
	}
	Ok(())
}

/// Validates segment ordering and name uniqueness over a full segment
/// sequence. Also used on the flattened parent-plus-child sequence when
/// compiling nested records.
pub(crate) fn validate_sequence(pattern: &str, segments: &[PathSegment]) -> Result<(), PatternError> {
	let mut seen_optional = false;
	let mut names: Vec<&str> = Vec::new();

	for (index, segment) in segments.iter().enumerate() {
		if let Some(name) = segment.capture_name() {
			if names.contains(&name) {
				return Err(PatternError::malformed(
					pattern,
					format!("duplicate parameter name ':{name}'"),
				));
			}
			names.push(name);
		}
		match segment {
			PathSegment::Literal(_) | PathSegment::Param { optional: false, .. } => {
				if seen_optional {
					return Err(PatternError::malformed(
						pattern,
						"optional parameters may only be followed by optional parameters or a wildcard",
					));
				}
			}
			PathSegment::Param { optional: true, .. } => {
				seen_optional = true;
			}
			PathSegment::Wildcard { .. } => {
				if index + 1 != segments.len() {
					return Err(PatternError::malformed(
						pattern,
						"wildcard must be the final segment",
					));
				}
			}
		}
	}
	Ok(())
}
