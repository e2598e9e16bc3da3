//! Matching locations against compiled patterns.
//!
//! Matching walks the pattern segments over the location's `path_parts`.
//! Literals compare case-sensitively, parameters bind one segment and
//! wildcards bind the rest. Empty segments are ignored on both sides, so
//! `/a/` and `/a` only differ under `strict` exactness.

use crate::location::LocationSegments;
use crate::pattern::{PathPattern, Segment};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Matching policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
	/// Only full matches count.
	pub exact: bool,
	/// Trailing slashes must agree for a match to be exact.
	pub strict: bool,
}

impl MatchOptions {
	/// Prefix matching, lenient about trailing slashes.
	pub fn prefix() -> Self {
		Self::default()
	}

	/// Full matching, lenient about trailing slashes.
	pub fn exact() -> Self {
		Self {
			exact: true,
			strict: false,
		}
	}

	/// Sets `strict`.
	pub fn with_strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}
}

/// Outcome of a successful match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResults {
	/// The pattern that matched.
	pub path: String,
	/// The matched prefix of the location.
	pub url: String,
	/// Whether the whole location was consumed.
	pub is_exact: bool,
	/// Captured parameters.
	pub params: HashMap<String, String>,
}

/// Matches `location` against `pattern`.
///
/// Returns `None` when a literal differs, when the location is shorter than
/// the required segments, or when `options.exact` is set and segments are
/// left over.
///
/// ```rust
/// use wayline_routing::location::LocationSegments;
/// use wayline_routing::matcher::{MatchOptions, match_path};
/// use wayline_routing::pattern::PathPattern;
///
/// let pattern = PathPattern::new("/users/:id").unwrap();
/// let location = LocationSegments::new("/users/42/posts");
///
/// let found = match_path(&location, &pattern, MatchOptions::prefix()).unwrap();
/// assert_eq!(found.url, "/users/42");
/// assert!(!found.is_exact);
/// assert_eq!(found.params["id"], "42");
///
/// assert!(match_path(&location, &pattern, MatchOptions::exact()).is_none());
/// ```
pub fn match_path(
	location: &LocationSegments,
	pattern: &PathPattern,
	options: MatchOptions,
) -> Option<MatchResults> {
	match_parts(
		&location.path_parts,
		location.pathname.len() > 1 && location.pathname.ends_with('/'),
		pattern,
		options,
	)
}

/// Matches a bare pathname against `pattern`.
pub fn match_pathname(
	pathname: &str,
	pattern: &PathPattern,
	options: MatchOptions,
) -> Option<MatchResults> {
	let parts: Vec<String> = pathname
		.split('/')
		.filter(|part| !part.is_empty())
		.map(str::to_string)
		.collect();
	match_parts(
		&parts,
		pathname.len() > 1 && pathname.ends_with('/'),
		pattern,
		options,
	)
}

fn match_parts(
	parts: &[String],
	trailing_slash: bool,
	pattern: &PathPattern,
	options: MatchOptions,
) -> Option<MatchResults> {
	let mut params = HashMap::new();
	let full = Consumer::new(pattern.segments(), parts, true).run(&mut params);
	let consumed = match full {
		Some(consumed) => consumed,
		None if options.exact => return None,
		None => {
			params.clear();
			Consumer::new(pattern.segments(), parts, false).run(&mut params)?
		}
	};

	let slashes_agree = !options.strict || pattern.has_trailing_slash() == trailing_slash;
	let is_exact = consumed == parts.len() && slashes_agree;
	if options.exact && !is_exact {
		return None;
	}

	let url = if consumed == 0 {
		"/".to_string()
	} else {
		format!("/{}", parts[..consumed].join("/"))
	};

	Some(MatchResults {
		path: pattern.pattern().to_string(),
		url,
		is_exact,
		params,
	})
}

/// Walks `segments` over `parts`.
///
/// Optional parameters try the binding branch first and fall back to
/// skipping. With `full`, only branches that consume every part succeed.
/// Whether a state succeeds does not depend on the parameters bound so far,
/// so every `(segment, part)` state that failed once is recorded and never
/// explored again. This bounds a run by `segments × parts` states.
struct Consumer<'a> {
	segments: &'a [Segment],
	parts: &'a [String],
	full: bool,
	dead: HashSet<(usize, usize)>,
}

impl<'a> Consumer<'a> {
	fn new(segments: &'a [Segment], parts: &'a [String], full: bool) -> Self {
		Self {
			segments,
			parts,
			full,
			dead: HashSet::new(),
		}
	}

	/// Returns the part index reached, binding into `params` on success.
	fn run(&mut self, params: &mut HashMap<String, String>) -> Option<usize> {
		self.consume(0, 0, params)
	}

	fn consume(
		&mut self,
		segment: usize,
		index: usize,
		params: &mut HashMap<String, String>,
	) -> Option<usize> {
		if self.dead.contains(&(segment, index)) {
			return None;
		}
		let reached = self.step(segment, index, params);
		if reached.is_none() {
			self.dead.insert((segment, index));
		}
		reached
	}

	fn step(
		&mut self,
		segment: usize,
		index: usize,
		params: &mut HashMap<String, String>,
	) -> Option<usize> {
		let parts = self.parts;
		let Some(current) = self.segments.get(segment) else {
			return (!self.full || index == parts.len()).then_some(index);
		};

		match current {
			Segment::Literal(text) => {
				if parts.get(index) == Some(text) {
					self.consume(segment + 1, index + 1, params)
				} else {
					None
				}
			}
			Segment::Param { name, optional } => {
				if let Some(value) = parts.get(index) {
					let previous = params.insert(name.clone(), value.clone());
					if let Some(reached) = self.consume(segment + 1, index + 1, params) {
						return Some(reached);
					}
					match previous {
						Some(previous) => params.insert(name.clone(), previous),
						None => params.remove(name),
					};
				}
				if *optional {
					self.consume(segment + 1, index, params)
				} else {
					None
				}
			}
			Segment::Wildcard { name } => {
				if index < parts.len() {
					params.insert(name.clone(), parts[index..].join("/"));
				}
				Some(parts.len())
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn run(path: &str, pattern: &str, options: MatchOptions) -> Option<MatchResults> {
		let pattern = PathPattern::new(pattern).unwrap();
		match_path(&LocationSegments::parse(path, "k"), &pattern, options)
	}

	#[rstest]
	#[case("/a/b/c", "/a/b/c")]
	#[case("/a/b/c/", "/a/b/c")]
	#[case("/a/b/c", "/a/b/c/")]
	#[case("/", "/")]
	fn test_literal_exact(#[case] path: &str, #[case] pattern: &str) {
		let found = run(path, pattern, MatchOptions::exact()).unwrap();
		assert!(found.is_exact);
		assert_eq!(found.path, pattern);
	}

	#[rstest]
	fn test_prefix_match_reports_url() {
		// Act
		let found = run("/docs/guide/intro", "/docs", MatchOptions::prefix()).unwrap();

		// Assert
		assert_eq!(found.url, "/docs");
		assert!(!found.is_exact);
		assert!(found.params.is_empty());
	}

	#[rstest]
	fn test_root_pattern_matches_everything_as_prefix() {
		let found = run("/anything/here", "/", MatchOptions::prefix()).unwrap();
		assert_eq!(found.url, "/");
		assert!(!found.is_exact);
	}

	#[rstest]
	#[case("/a/b", "/a/c")]
	#[case("/a", "/a/b")]
	#[case("/A", "/a")]
	fn test_mismatch(#[case] path: &str, #[case] pattern: &str) {
		assert!(run(path, pattern, MatchOptions::prefix()).is_none());
	}

	#[rstest]
	fn test_exact_rejects_leftover_segments() {
		assert!(run("/a/42", "/a", MatchOptions::exact()).is_none());
	}

	#[rstest]
	#[case("/users/42", "42")]
	#[case("/users/hello%20world", "hello%20world")]
	fn test_param_binds_segment(#[case] path: &str, #[case] expected: &str) {
		let found = run(path, "/users/:id", MatchOptions::exact()).unwrap();
		assert_eq!(found.params.get("id").map(String::as_str), Some(expected));
	}

	#[rstest]
	fn test_optional_param_present_and_absent() {
		let present = run("/posts/7", "/posts/:page?", MatchOptions::exact()).unwrap();
		assert_eq!(present.params.get("page").map(String::as_str), Some("7"));

		let absent = run("/posts", "/posts/:page?", MatchOptions::exact()).unwrap();
		assert!(absent.params.is_empty());
	}

	#[rstest]
	fn test_optional_param_backtracks_before_literal() {
		// Arrange: the only segment left must go to the literal
		let found = run("/a/edit", "/a/:id?/edit", MatchOptions::exact()).unwrap();

		// Assert
		assert!(found.is_exact);
		assert!(found.params.get("id").is_none());
	}

	#[rstest]
	fn test_prefix_prefers_full_consumption() {
		let found = run("/a/edit", "/a/:id?/edit", MatchOptions::prefix()).unwrap();
		assert!(found.is_exact);
	}

	#[rstest]
	#[case("/files/*", "/files/a/b.txt", "0", Some("a/b.txt"))]
	#[case("/files/:rest*", "/files/a/b.txt", "rest", Some("a/b.txt"))]
	#[case("/files/:rest*", "/files", "rest", None)]
	fn test_wildcards(
		#[case] pattern: &str,
		#[case] path: &str,
		#[case] key: &str,
		#[case] expected: Option<&str>,
	) {
		let found = run(path, pattern, MatchOptions::exact()).unwrap();
		assert!(found.is_exact);
		assert_eq!(found.params.get(key).map(String::as_str), expected);
		assert_eq!(found.url, crate::path::strip_trailing_slash(path));
	}

	#[rstest]
	fn test_strict_trailing_slash() {
		let strict = MatchOptions::exact().with_strict(true);
		assert!(run("/a/", "/a", strict).is_none());
		assert!(run("/a/", "/a/", strict).is_some());

		let found = run("/a/", "/a", MatchOptions::prefix().with_strict(true)).unwrap();
		assert!(!found.is_exact);
	}

	#[rstest]
	#[case(MatchOptions::prefix())]
	#[case(MatchOptions::exact())]
	fn test_many_optional_params_stay_fast(#[case] options: MatchOptions) {
		// Arrange
		let count = 24;
		let pattern: String = (0..count).map(|i| format!("/:p{}?", i)).collect::<String>() + "/end";
		let pattern = PathPattern::new(&pattern).unwrap();
		let unmatched = "/a".repeat(count);
		let matched = format!("{}/end", "/a".repeat(count - 1));
		let started = std::time::Instant::now();

		// Act
		let missing = match_pathname(&unmatched, &pattern, options);
		let found = match_pathname(&matched, &pattern, options).unwrap();

		// Assert
		assert!(started.elapsed() < std::time::Duration::from_secs(1));
		assert!(missing.is_none());
		assert!(found.is_exact);
		assert_eq!(found.params.len(), count - 1);
		assert_eq!(found.params["p0"], "a");
		assert!(found.params.get(&format!("p{}", count - 1)).is_none());
	}

	#[rstest]
	fn test_failed_optional_binding_is_undone() {
		let found = run("/x/end", "/:a?/:b/:a?/end", MatchOptions::exact()).unwrap();

		assert_eq!(found.params.get("b").map(String::as_str), Some("x"));
		assert!(found.params.get("a").is_none());
	}

	#[rstest]
	fn test_match_pathname() {
		let pattern = PathPattern::new("/a/:id").unwrap();
		let found = match_pathname("/a/9", &pattern, MatchOptions::exact()).unwrap();
		assert_eq!(found.params["id"], "9");
	}

	#[rstest]
	fn test_results_serialize_camel_case() {
		let found = run("/a", "/a", MatchOptions::exact()).unwrap();
		let json = serde_json::to_value(&found).unwrap();
		assert_eq!(json["isExact"], serde_json::Value::Bool(true));
		assert_eq!(json["url"], "/a");
	}
}
