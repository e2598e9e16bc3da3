//! Path pattern compilation.
//!
//! A route pattern is split on `/` into segments:
//!
//! - `users` - literal, must match exactly
//! - `:id` - named parameter, matches one segment
//! - `:id?` - optional named parameter, matches zero or one segment
//! - `:rest*` - named wildcard, matches the remaining path
//! - `*` - unnamed wildcard, captured under the key `"0"`
//!
//! Wildcards only make sense at the end of a pattern; anything after one is
//! rejected.

use crate::error::{Result, RouterError};

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a pattern.
const MAX_PATH_SEGMENTS: usize = 32;

/// Key under which an unnamed `*` wildcard is captured.
pub const UNNAMED_WILDCARD_KEY: &str = "0";

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Matches this exact text.
	Literal(String),
	/// Binds one segment.
	Param {
		/// Parameter name.
		name: String,
		/// Whether the segment may be absent.
		optional: bool,
	},
	/// Binds every remaining segment, joined with `/`.
	Wildcard {
		/// Parameter name.
		name: String,
	},
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
	/// The original pattern string.
	pattern: String,
	/// Compiled segments.
	segments: Vec<Segment>,
	/// Whether the pattern ends with `/`.
	trailing_slash: bool,
}

impl PathPattern {
	/// Compiles `pattern`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`] if:
	/// - the pattern exceeds 1024 bytes
	/// - the pattern has more than 32 segments
	/// - a parameter has no name
	/// - a wildcard is followed by further segments
	pub fn new(pattern: &str) -> Result<Self> {
		let invalid = |reason: String| RouterError::InvalidPattern {
			pattern: pattern.to_string(),
			reason,
		};

		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(invalid(format!(
				"length {} exceeds maximum allowed length of {} bytes",
				pattern.len(),
				MAX_PATTERN_LENGTH
			)));
		}

		let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
		if raw.len() > MAX_PATH_SEGMENTS {
			return Err(invalid(format!(
				"{} path segments, exceeding maximum of {}",
				raw.len(),
				MAX_PATH_SEGMENTS
			)));
		}

		let mut segments = Vec::with_capacity(raw.len());
		for (index, part) in raw.iter().enumerate() {
			if let Some(Segment::Wildcard { .. }) = segments.last() {
				return Err(invalid(format!(
					"segment '{}' follows a wildcard",
					raw[index]
				)));
			}
			segments.push(Self::compile_segment(part).map_err(invalid)?);
		}

		Ok(Self {
			pattern: pattern.to_string(),
			segments,
			trailing_slash: pattern.len() > 1 && pattern.ends_with('/'),
		})
	}

	fn compile_segment(part: &str) -> std::result::Result<Segment, String> {
		if part == "*" {
			return Ok(Segment::Wildcard {
				name: UNNAMED_WILDCARD_KEY.to_string(),
			});
		}
		let Some(name) = part.strip_prefix(':') else {
			return Ok(Segment::Literal(part.to_string()));
		};
		let segment = if let Some(name) = name.strip_suffix('*') {
			Segment::Wildcard {
				name: name.to_string(),
			}
		} else if let Some(name) = name.strip_suffix('?') {
			Segment::Param {
				name: name.to_string(),
				optional: true,
			}
		} else {
			Segment::Param {
				name: name.to_string(),
				optional: false,
			}
		};
		match &segment {
			Segment::Param { name, .. } | Segment::Wildcard { name } if name.is_empty() => {
				Err(format!("parameter '{}' has no name", part))
			}
			_ => Ok(segment),
		}
	}

	/// Returns the original pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the compiled segments.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns whether the pattern ends with `/`.
	pub fn has_trailing_slash(&self) -> bool {
		self.trailing_slash
	}

	/// Returns the parameter names, in pattern order.
	pub fn param_names(&self) -> Vec<&str> {
		self.segments
			.iter()
			.filter_map(|segment| match segment {
				Segment::Param { name, .. } | Segment::Wildcard { name } => Some(name.as_str()),
				Segment::Literal(_) => None,
			})
			.collect()
	}

	/// Returns whether the pattern has no parameters or wildcards.
	pub fn is_static(&self) -> bool {
		self.segments
			.iter()
			.all(|segment| matches!(segment, Segment::Literal(_)))
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for PathPattern {}

impl std::fmt::Display for PathPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.pattern)
	}
}
