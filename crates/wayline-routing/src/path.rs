//! Path string helpers.
//!
//! Basename handling, child path normalization and relative resolution. All
//! helpers are pure functions over `&str`.

/// Prefixes `path` with `/` unless it already starts with one.
pub fn add_leading_slash(path: &str) -> String {
	if path.starts_with('/') {
		path.to_string()
	} else {
		format!("/{}", path)
	}
}

/// Removes one leading `/`.
pub fn strip_leading_slash(path: &str) -> &str {
	path.strip_prefix('/').unwrap_or(path)
}

/// Removes one trailing `/`, keeping the root path `/` intact.
pub fn strip_trailing_slash(path: &str) -> &str {
	if path.len() > 1 {
		path.strip_suffix('/').unwrap_or(path)
	} else {
		path
	}
}

/// Returns `true` if `path` starts with `prefix` at a segment boundary.
///
/// The comparison ignores ASCII case. `/app` is a basename of `/app`,
/// `/app/x`, `/app?q` and `/app#h`, but not of `/apple`.
pub fn has_basename(path: &str, prefix: &str) -> bool {
	if prefix.is_empty() {
		return false;
	}
	if path.len() < prefix.len() || !path.is_char_boundary(prefix.len()) {
		return false;
	}
	let (head, rest) = path.split_at(prefix.len());
	head.eq_ignore_ascii_case(prefix) && matches!(rest.chars().next(), None | Some('/' | '?' | '#'))
}

/// Removes `prefix` from `path` when it is a basename of it.
pub fn strip_basename(path: &str, prefix: &str) -> String {
	if has_basename(path, prefix) {
		path[prefix.len()..].to_string()
	} else {
		path.to_string()
	}
}

/// Makes `path` live under `prefix`.
///
/// Paths already under the prefix are kept; others are appended to it.
/// Repeated slashes collapse and the result always has a leading slash.
pub fn ensure_basename(path: &str, prefix: &str) -> String {
	let joined = if has_basename(path, prefix) {
		path.to_string()
	} else {
		format!("{}/{}", prefix, path)
	};
	add_leading_slash(&collapse_slashes(&joined))
}

/// Collapses runs of `/` into one.
pub fn collapse_slashes(path: &str) -> String {
	let mut out = String::with_capacity(path.len());
	let mut previous_slash = false;
	for c in path.chars() {
		if c == '/' {
			if !previous_slash {
				out.push(c);
			}
			previous_slash = true;
		} else {
			out.push(c);
			previous_slash = false;
		}
	}
	out
}

/// Returns `true` if the last segment of `path` looks like a file name
/// (`/index.html`, `app.htm`).
pub fn is_filename(path: &str) -> bool {
	let last = path.rsplit('/').next().unwrap_or(path);
	match last.rfind('.') {
		Some(dot) => dot > 0 && dot + 1 < last.len(),
		None => false,
	}
}

/// Returns `true` for paths starting with `/`.
pub fn is_absolute(path: &str) -> bool {
	path.starts_with('/')
}

/// Resolves `to` against `from` the way a browser resolves a relative URL
/// path.
///
/// - absolute targets replace the base entirely;
/// - otherwise the last segment of `from` is dropped and `to` is appended;
/// - `.` segments vanish and `..` segments remove the segment before them;
/// - a trailing `.`, `..` or empty segment keeps a trailing slash.
///
/// ```rust
/// use wayline_routing::path::resolve_pathname;
///
/// assert_eq!(resolve_pathname("../sibling", "/a/b/c"), "/a/sibling");
/// assert_eq!(resolve_pathname("d", "/a/b/c"), "/a/b/d");
/// assert_eq!(resolve_pathname("/x", "/a/b/c"), "/x");
/// ```
pub fn resolve_pathname(to: &str, from: &str) -> String {
	let to_parts: Vec<&str> = if to.is_empty() {
		Vec::new()
	} else {
		to.split('/').collect()
	};
	let mut parts: Vec<&str> = if from.is_empty() {
		Vec::new()
	} else {
		from.split('/').collect()
	};

	let to_absolute = is_absolute(to);
	let must_end_absolute = to_absolute || is_absolute(from);

	if to_absolute {
		parts = to_parts;
	} else if !to_parts.is_empty() {
		parts.pop();
		parts.extend(to_parts);
	}

	if parts.is_empty() {
		return "/".to_string();
	}

	let has_trailing_slash = matches!(parts.last(), Some(&"." | &".." | &""));

	let mut up = 0usize;
	let mut index = parts.len();
	while index > 0 {
		index -= 1;
		match parts[index] {
			"." => {
				parts.remove(index);
			}
			".." => {
				parts.remove(index);
				up += 1;
			}
			_ if up > 0 => {
				parts.remove(index);
				up -= 1;
			}
			_ => {}
		}
	}

	if !must_end_absolute {
		for _ in 0..up {
			parts.insert(0, "..");
		}
	}

	if must_end_absolute && parts.first().is_none_or(|first| !first.is_empty()) {
		parts.insert(0, "");
	}

	let mut result = parts.join("/");
	if has_trailing_slash && !result.ends_with('/') {
		result.push('/');
	}
	result
}
