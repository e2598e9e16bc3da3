//! Scroll position cache.
//!
//! Maps a location key to the viewport offset captured when that location was
//! left. The router captures before every navigation and restores on `Pop`.
//!
//! The cache can be seeded from and flushed to a [`KeyValueProvider`] under
//! [`SCROLL_POSITIONS_KEY`]. The payload is a JSON array of `[key, [x, y]]`
//! pairs with double quotes swapped for single quotes, so that it can sit
//! inside a double-quoted template attribute.

use crate::error::Result;
use crate::location::ScrollPosition;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use wayline_core::{KeyValueProvider, StorageError, Viewport, with_timeout};

/// Provider key holding the persisted snapshot.
pub const SCROLL_POSITIONS_KEY: &str = "scrollPositions";

/// Location key → captured offset.
pub struct ScrollCache {
	positions: RwLock<BTreeMap<String, ScrollPosition>>,
	viewport: Arc<dyn Viewport>,
	provider: RwLock<Option<Arc<dyn KeyValueProvider>>>,
	timeout: Duration,
}

impl std::fmt::Debug for ScrollCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ScrollCache")
			.field("positions", &self.positions.read().len())
			.field("persistent", &self.provider.read().is_some())
			.field("timeout", &self.timeout)
			.finish()
	}
}

impl ScrollCache {
	/// Creates an empty cache reading offsets from `viewport`.
	pub fn new(viewport: Arc<dyn Viewport>, timeout: Duration) -> Self {
		Self {
			positions: RwLock::new(BTreeMap::new()),
			viewport,
			provider: RwLock::new(None),
			timeout,
		}
	}

	/// Records `position` for `key`.
	pub fn set(&self, key: &str, position: ScrollPosition) {
		self.positions.write().insert(key.to_string(), position);
	}

	/// The offset recorded for `key`. Unset keys yield `None`, never `(0, 0)`.
	pub fn get(&self, key: &str) -> Option<ScrollPosition> {
		self.positions.read().get(key).copied()
	}

	/// Returns `true` if an offset was recorded for `key`.
	pub fn has(&self, key: &str) -> bool {
		self.positions.read().contains_key(key)
	}

	/// Records the live viewport offset for `key`.
	pub fn capture(&self, key: &str) {
		let (x, y) = self.viewport.scroll_offset();
		self.set(key, ScrollPosition::new(x, y));
	}

	/// Number of recorded offsets.
	pub fn len(&self) -> usize {
		self.positions.read().len()
	}

	/// Returns `true` when nothing is recorded.
	pub fn is_empty(&self) -> bool {
		self.positions.read().is_empty()
	}

	/// Seeds the cache from `provider` and keeps it for [`flush`](Self::flush).
	///
	/// A missing, unreadable or malformed snapshot leaves the cache empty.
	/// Returns the number of offsets loaded.
	pub async fn load(&self, provider: Arc<dyn KeyValueProvider>) -> usize {
		*self.provider.write() = Some(Arc::clone(&provider));

		let raw = match with_timeout(self.timeout, provider.get(SCROLL_POSITIONS_KEY)).await {
			Ok(Some(raw)) => raw,
			Ok(None) => return 0,
			Err(e) => {
				tracing::warn!(error = %e, "scroll positions unavailable");
				return 0;
			}
		};

		match decode_snapshot(&raw) {
			Ok(entries) => {
				let mut positions = self.positions.write();
				positions.clear();
				positions.extend(entries);
				positions.len()
			}
			Err(e) => {
				tracing::warn!(error = %e, "malformed scroll position snapshot ignored");
				self.positions.write().clear();
				0
			}
		}
	}

	/// Writes the cache back to the provider given to [`load`](Self::load).
	///
	/// # Errors
	///
	/// Returns [`RouterError::Storage`](crate::RouterError::Storage) wrapping
	/// [`StorageError::Unavailable`] when no provider was loaded, or whatever
	/// the provider reports.
	pub async fn flush(&self) -> Result<()> {
		let provider = self
			.provider
			.read()
			.clone()
			.ok_or_else(|| StorageError::Unavailable("scroll cache has no provider".to_string()))?;
		let payload = encode_snapshot(&self.positions.read());
		with_timeout(self.timeout, provider.set(SCROLL_POSITIONS_KEY, &payload)).await?;
		Ok(())
	}
}

fn decode_snapshot(raw: &str) -> serde_json::Result<Vec<(String, ScrollPosition)>> {
	serde_json::from_str(&raw.replace('\'', "\""))
}

fn encode_snapshot(positions: &BTreeMap<String, ScrollPosition>) -> String {
	let pairs: Vec<(&String, &ScrollPosition)> = positions.iter().collect();
	serde_json::to_string(&pairs)
		.unwrap_or_else(|_| "[]".to_string())
		.replace('"', "'")
}
