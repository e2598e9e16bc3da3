//! Navigation history.
//!
//! A [`HistoryBackend`] owns the stack of visited locations. The top entry is
//! the current location; the entry below it is the previous one. Every
//! navigating call builds a fresh [`LocationSegments`] and announces it to the
//! registered listeners, synchronously and in registration order.
//!
//! [`MemoryHistory`] keeps the stack in memory. A browser binding would
//! implement the same trait on top of `window.history`.

use crate::location::{LocationSegments, create_key};
use crate::path::{add_leading_slash, has_basename, is_filename, strip_basename};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wayline_core::{Disposer, EventChannel};

const HISTORY_CHANGED_TOPIC: &str = "history-changed";

/// How the current entry was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NavigationAction {
	/// A new entry was pushed.
	Push,
	/// The top entry was swapped.
	Replace,
	/// The top entry was popped.
	Pop,
}

/// Payload delivered to history listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryChange {
	/// The new current location.
	pub location: LocationSegments,
	/// How it was reached.
	pub action: NavigationAction,
}

/// Callback registered with [`HistoryBackend::listen`].
pub type HistoryListener = Box<dyn Fn(&HistoryChange) + Send + Sync>;

/// Stack of visited locations with change notifications.
pub trait HistoryBackend: Send + Sync {
	/// The current location.
	fn location(&self) -> LocationSegments;

	/// The entry below the current one, if any.
	fn previous_location(&self) -> Option<LocationSegments>;

	/// Pushes `path` under a fresh key.
	fn push(&self, path: &str);

	/// Swaps the current entry for `path` under a fresh key.
	fn replace(&self, path: &str);

	/// Pops back to the previous entry. Does nothing at the bottom of the stack.
	fn go_back(&self);

	/// Registers `listener` for every subsequent change.
	fn listen(&self, listener: HistoryListener) -> Disposer;

	/// Number of entries on the stack.
	fn len(&self) -> usize;

	/// Returns `true` when the stack is empty.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Renders an href for `location`, basename included.
	fn create_href(&self, location: &LocationSegments) -> String;

	/// Drops every listener.
	fn destroy(&self);
}

/// In-memory [`HistoryBackend`].
///
/// Paths passed to `push` and `replace` may carry the basename; it is
/// stripped before the location is built.
///
/// ```rust
/// use wayline_routing::history::{HistoryBackend, MemoryHistory};
///
/// let history = MemoryHistory::new("/app", "/app/home");
/// history.push("/app/about");
///
/// assert_eq!(history.location().pathname, "/about");
/// assert_eq!(history.previous_location().unwrap().pathname, "/home");
/// assert_eq!(history.create_href(&history.location()), "/app/about");
/// ```
#[derive(Clone)]
pub struct MemoryHistory {
	basename: String,
	entries: Arc<RwLock<Vec<LocationSegments>>>,
	listeners: EventChannel<HistoryChange>,
}

impl std::fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryHistory")
			.field("basename", &self.basename)
			.field("entries", &self.entries.read().len())
			.finish()
	}
}

impl MemoryHistory {
	/// Creates a history under `basename` with a single entry at `initial_path`.
	pub fn new(basename: impl Into<String>, initial_path: &str) -> Self {
		let basename = basename.into();
		let initial = Self::build_location(&basename, initial_path);
		Self {
			basename,
			entries: Arc::new(RwLock::new(vec![initial])),
			listeners: EventChannel::new(),
		}
	}

	/// The basename every path is hosted under.
	pub fn basename(&self) -> &str {
		&self.basename
	}

	/// Pathnames of every entry, oldest first.
	pub fn pathnames(&self) -> Vec<String> {
		self.entries
			.read()
			.iter()
			.map(|entry| entry.pathname.clone())
			.collect()
	}

	fn build_location(basename: &str, path: &str) -> LocationSegments {
		let path = if !basename.is_empty() && has_basename(path, basename) {
			strip_basename(path, basename)
		} else {
			path.to_string()
		};
		let path = path.strip_prefix('#').unwrap_or(&path);
		LocationSegments::parse(&add_leading_slash(path), create_key())
	}

	fn notify(&self, location: LocationSegments, action: NavigationAction) {
		tracing::debug!(pathname = %location.pathname, ?action, "history changed");
		self.listeners
			.emit(HISTORY_CHANGED_TOPIC, &HistoryChange { location, action });
	}
}

impl HistoryBackend for MemoryHistory {
	fn location(&self) -> LocationSegments {
		self.entries
			.read()
			.last()
			.cloned()
			.unwrap_or_else(|| LocationSegments::new("/"))
	}

	fn previous_location(&self) -> Option<LocationSegments> {
		let entries = self.entries.read();
		entries.len().checked_sub(2).map(|index| entries[index].clone())
	}

	fn push(&self, path: &str) {
		let location = Self::build_location(&self.basename, path);
		self.entries.write().push(location.clone());
		self.notify(location, NavigationAction::Push);
	}

	fn replace(&self, path: &str) {
		let location = Self::build_location(&self.basename, path);
		{
			let mut entries = self.entries.write();
			entries.pop();
			entries.push(location.clone());
		}
		self.notify(location, NavigationAction::Replace);
	}

	fn go_back(&self) {
		let location = {
			let mut entries = self.entries.write();
			if entries.len() < 2 {
				tracing::debug!("go_back at the start of history ignored");
				return;
			}
			entries.pop();
			entries.last().cloned()
		};
		if let Some(location) = location {
			self.notify(location, NavigationAction::Pop);
		}
	}

	fn listen(&self, listener: HistoryListener) -> Disposer {
		self.listeners.on(HISTORY_CHANGED_TOPIC, listener)
	}

	fn len(&self) -> usize {
		self.entries.read().len()
	}

	fn create_href(&self, location: &LocationSegments) -> String {
		let path = location.path();
		if is_filename(&self.basename) {
			format!("{}#{}", self.basename, path)
		} else {
			format!("{}{}", self.basename, path)
		}
	}

	fn destroy(&self) {
		self.listeners.remove_all_listeners();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use parking_lot::Mutex;
	use rstest::rstest;

	fn recorder(history: &MemoryHistory) -> (Arc<Mutex<Vec<HistoryChange>>>, Disposer) {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = Arc::clone(&seen);
		let disposer = history.listen(Box::new(move |change: &HistoryChange| {
			sink.lock().push(change.clone());
		}));
		(seen, disposer)
	}

	#[rstest]
	fn test_push_then_back() {
		// Arrange
		let history = MemoryHistory::new("", "/");
		history.push("/a");
		history.push("/b");
		assert_eq!(history.location().pathname, "/b");
		assert_eq!(history.previous_location().unwrap().pathname, "/a");

		// Act
		history.go_back();

		// Assert
		assert_eq!(history.location().pathname, "/a");
		assert_eq!(history.len(), 2);
	}

	#[rstest]
	fn test_go_back_at_bottom_is_noop() {
		let history = MemoryHistory::new("", "/a");
		let (seen, _subscription) = recorder(&history);

		history.go_back();

		assert_eq!(history.location().pathname, "/a");
		assert!(seen.lock().is_empty());
		assert!(history.previous_location().is_none());
	}

	#[rstest]
	fn test_go_back_keeps_entry_key() {
		let history = MemoryHistory::new("", "/");
		history.push("/a");
		let key_a = history.location().key;
		history.push("/b");

		history.go_back();

		assert_eq!(history.location().key, key_a);
	}

	#[rstest]
	fn test_replace_swaps_top_with_fresh_key() {
		let history = MemoryHistory::new("", "/");
		history.push("/a");
		let before = history.location().key;

		history.replace("/c");

		assert_eq!(history.pathnames(), vec!["/", "/c"]);
		assert_ne!(history.location().key, before);
	}

	#[rstest]
	fn test_listeners_receive_actions_in_order() {
		// Arrange
		let history = MemoryHistory::new("", "/");
		let (seen, subscription) = recorder(&history);

		// Act
		history.push("/a?x=1#h");
		history.replace("/b");
		history.go_back();
		subscription.dispose();
		history.push("/ignored");

		// Assert
		let seen = seen.lock();
		let actions: Vec<_> = seen.iter().map(|c| c.action).collect();
		assert_eq!(
			actions,
			vec![
				NavigationAction::Push,
				NavigationAction::Replace,
				NavigationAction::Pop
			]
		);
		assert_eq!(seen[0].location.query["x"], "1");
		assert_eq!(seen[0].location.hash, "#h");
		assert_eq!(seen[2].location.pathname, "/");
	}

	#[rstest]
	fn test_panicking_listener_does_not_stop_later_ones() {
		let history = MemoryHistory::new("", "/");
		let _bad = history.listen(Box::new(|_: &HistoryChange| panic!("listener failure")));
		let (seen, _good) = recorder(&history);

		history.push("/a");

		assert_eq!(seen.lock().len(), 1);
	}

	#[rstest]
	#[case("/app", "/app/users", "/users")]
	#[case("/app", "/users", "/users")]
	#[case("/index.html", "/index.html#/users", "/users")]
	#[case("", "users", "/users")]
	fn test_basename_is_stripped(
		#[case] basename: &str,
		#[case] path: &str,
		#[case] expected: &str,
	) {
		let history = MemoryHistory::new(basename, "/");
		history.push(path);
		assert_eq!(history.location().pathname, expected);
	}

	#[rstest]
	#[case("/app", "/app/users?x=1")]
	#[case("/index.html", "/index.html#/users?x=1")]
	#[case("", "/users?x=1")]
	fn test_create_href(#[case] basename: &str, #[case] expected: &str) {
		let history = MemoryHistory::new(basename, "/");
		let location = LocationSegments::parse("/users?x=1", "k");
		assert_eq!(history.create_href(&location), expected);
	}

	#[rstest]
	fn test_destroy_drops_listeners() {
		let history = MemoryHistory::new("", "/");
		let (seen, _subscription) = recorder(&history);

		history.destroy();
		history.push("/a");

		assert!(seen.lock().is_empty());
	}
}
