//! Location snapshots.
//!
//! Every navigation produces a new [`LocationSegments`]: an immutable view of
//! the path, query string and fragment, keyed by an opaque id that correlates
//! the history entry with its captured scroll offset.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A captured `(x, y)` viewport offset. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct ScrollPosition {
	/// Horizontal offset.
	pub x: f64,
	/// Vertical offset.
	pub y: f64,
}

impl ScrollPosition {
	/// Creates a position.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

impl From<(f64, f64)> for ScrollPosition {
	fn from((x, y): (f64, f64)) -> Self {
		Self { x, y }
	}
}

impl From<ScrollPosition> for (f64, f64) {
	fn from(position: ScrollPosition) -> Self {
		(position.x, position.y)
	}
}

/// Generates a fresh opaque location key.
pub fn create_key() -> String {
	uuid::Uuid::new_v4().simple().to_string()
}

/// Immutable snapshot of the current location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSegments {
	/// Path without basename, query or fragment. Always starts with `/`.
	pub pathname: String,
	/// Raw query string including the leading `?`, or empty.
	pub search: String,
	/// Decoded query parameters.
	pub query: HashMap<String, String>,
	/// Fragment including the leading `#`, or empty.
	pub hash: String,
	/// Parameters captured by the route that matched this location.
	pub params: HashMap<String, String>,
	/// Non-empty segments of `pathname`, in order.
	pub path_parts: Vec<String>,
	/// Identity of the history entry.
	pub key: String,
	/// Offset captured when this entry was last left, if any.
	pub scroll_position: Option<ScrollPosition>,
}

impl LocationSegments {
	/// Parses `path` (`/a/b?x=1#top`) into a snapshot identified by `key`.
	pub fn parse(path: &str, key: impl Into<String>) -> Self {
		let (before_hash, hash) = match path.find('#') {
			Some(index) => (&path[..index], &path[index..]),
			None => (path, ""),
		};
		let (pathname, search) = match before_hash.find('?') {
			Some(index) => (&before_hash[..index], &before_hash[index..]),
			None => (before_hash, ""),
		};
		let pathname = if pathname.is_empty() {
			"/".to_string()
		} else {
			crate::path::add_leading_slash(pathname)
		};

		Self {
			path_parts: split_path_parts(&pathname),
			pathname,
			query: parse_query(search),
			search: if search == "?" { String::new() } else { search.to_string() },
			hash: if hash == "#" { String::new() } else { hash.to_string() },
			params: HashMap::new(),
			key: key.into(),
			scroll_position: None,
		}
	}

	/// Parses `path` under a freshly generated key.
	pub fn new(path: &str) -> Self {
		Self::parse(path, create_key())
	}

	/// Same entry, different pathname. Query, fragment and key are kept.
	pub fn with_pathname(&self, pathname: &str) -> Self {
		let pathname = crate::path::add_leading_slash(pathname);
		Self {
			path_parts: split_path_parts(&pathname),
			pathname,
			..self.clone()
		}
	}

	/// Same entry with route parameters attached.
	pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
		self.params = params;
		self
	}

	/// Same entry with a restored scroll offset.
	pub fn with_scroll_position(mut self, position: Option<ScrollPosition>) -> Self {
		self.scroll_position = position;
		self
	}

	/// Path, query and fragment joined back together.
	pub fn path(&self) -> String {
		format!("{}{}{}", self.pathname, self.search, self.hash)
	}

	/// Path of the parent location (`/a/b` → `/a`, `/a` → `/`), or `None` at
	/// the root.
	pub fn parent_path(&self) -> Option<String> {
		let (_, parents) = self.path_parts.split_last()?;
		Some(format!("/{}", parents.join("/")))
	}
}

fn split_path_parts(pathname: &str) -> Vec<String> {
	pathname
		.split('/')
		.filter(|part| !part.is_empty())
		.map(str::to_string)
		.collect()
}

fn parse_query(search: &str) -> HashMap<String, String> {
	let raw = search.strip_prefix('?').unwrap_or(search);
	if raw.is_empty() {
		return HashMap::new();
	}
	match serde_urlencoded::from_str::<Vec<(String, String)>>(raw) {
		Ok(pairs) => pairs.into_iter().collect(),
		Err(e) => {
			tracing::debug!(search, error = %e, "ignoring malformed query string");
			HashMap::new()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_full_path() {
		// Act
		let location = LocationSegments::parse("/users/42?tab=posts&q=a+b#top", "k1");

		// Assert
		assert_eq!(location.pathname, "/users/42");
		assert_eq!(location.search, "?tab=posts&q=a+b");
		assert_eq!(location.hash, "#top");
		assert_eq!(location.query.get("tab").map(String::as_str), Some("posts"));
		assert_eq!(location.query.get("q").map(String::as_str), Some("a b"));
		assert_eq!(location.path_parts, vec!["users", "42"]);
		assert_eq!(location.key, "k1");
		assert!(location.scroll_position.is_none());
		assert_eq!(location.path(), "/users/42?tab=posts&q=a+b#top");
	}

	#[rstest]
	#[case("", "/")]
	#[case("?x=1", "/")]
	#[case("users", "/users")]
	#[case("/users/", "/users/")]
	fn test_parse_pathname(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(LocationSegments::parse(input, "k").pathname, expected);
	}

	#[rstest]
	fn test_with_pathname_keeps_key() {
		let location = LocationSegments::parse("/a?x=1", "key");
		let moved = location.with_pathname("/b/c");
		assert_eq!(moved.pathname, "/b/c");
		assert_eq!(moved.path_parts, vec!["b", "c"]);
		assert_eq!(moved.key, "key");
		assert_eq!(moved.search, "?x=1");
	}

	#[rstest]
	#[case("/a/b/c", Some("/a/b"))]
	#[case("/a", Some("/"))]
	#[case("/", None)]
	fn test_parent_path(#[case] path: &str, #[case] expected: Option<&str>) {
		let location = LocationSegments::parse(path, "k");
		assert_eq!(location.parent_path().as_deref(), expected);
	}

	#[rstest]
	fn test_fresh_keys_differ() {
		assert_ne!(LocationSegments::new("/").key, LocationSegments::new("/").key);
	}

	#[rstest]
	fn test_scroll_position_serializes_as_pair() {
		let json = serde_json::to_string(&ScrollPosition::new(0.0, 20.0)).unwrap();
		assert_eq!(json, "[0.0,20.0]");
		let back: ScrollPosition = serde_json::from_str("[3,4]").unwrap();
		assert_eq!(back, ScrollPosition::new(3.0, 4.0));
	}
}
