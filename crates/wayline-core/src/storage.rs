//! Asynchronous key/value providers.
//!
//! The navigation engine does not persist anything by itself. Scroll positions
//! and visited paths are handed to a [`KeyValueProvider`] (session storage,
//! local storage, a remote store...). Providers are asynchronous and may be
//! slow; [`with_timeout`] bounds how long a caller waits for one.

use crate::exception::{Result, StorageError};
use crate::signals::EventChannel;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Topic on which providers announce changed keys.
pub const DATA_CHANGED_TOPIC: &str = "data-changed";

/// Payload of a provider change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChanged {
	/// Name of the provider or keys that changed.
	pub changed: Vec<String>,
}

/// A string key/value store with change notifications.
///
/// # Examples
///
/// ```rust
/// use wayline_core::storage::{InMemoryProvider, KeyValueProvider};
///
/// # async fn example() -> wayline_core::Result<()> {
/// let provider = InMemoryProvider::new();
/// provider.set("visits", "[]").await?;
/// assert_eq!(provider.get("visits").await?, Some("[]".to_string()));
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait KeyValueProvider: Send + Sync {
	/// Reads `key`. Unset keys yield `Ok(None)`.
	async fn get(&self, key: &str) -> Result<Option<String>>;

	/// Writes `value` under `key` and announces the change.
	async fn set(&self, key: &str, value: &str) -> Result<()>;

	/// Channel on which the provider emits [`DATA_CHANGED_TOPIC`].
	fn changed(&self) -> &EventChannel<DataChanged>;
}

/// Process-local provider backed by a hash map.
#[derive(Clone, Default)]
pub struct InMemoryProvider {
	store: Arc<RwLock<HashMap<String, String>>>,
	changed: EventChannel<DataChanged>,
}

impl std::fmt::Debug for InMemoryProvider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InMemoryProvider")
			.field("keys", &self.store.read().len())
			.finish()
	}
}

impl InMemoryProvider {
	/// Creates an empty provider.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the number of stored keys.
	pub fn len(&self) -> usize {
		self.store.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.store.read().is_empty()
	}
}

#[async_trait]
impl KeyValueProvider for InMemoryProvider {
	async fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.store.read().get(key).cloned())
	}

	async fn set(&self, key: &str, value: &str) -> Result<()> {
		self.store.write().insert(key.to_string(), value.to_string());
		self.changed.emit(
			DATA_CHANGED_TOPIC,
			&DataChanged {
				changed: vec![key.to_string()],
			},
		);
		Ok(())
	}

	fn changed(&self) -> &EventChannel<DataChanged> {
		&self.changed
	}
}

/// Awaits `future` for at most `timeout`.
///
/// The future is polled once before the deadline is checked, so a provider
/// that answers immediately succeeds even with a zero timeout.
pub async fn with_timeout<T, F>(timeout: Duration, future: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	match tokio::time::timeout(timeout, future).await {
		Ok(result) => result,
		Err(_) => Err(StorageError::Timeout(timeout)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[rstest]
	#[tokio::test]
	async fn test_get_unset_key_is_none() {
		let provider = InMemoryProvider::new();
		assert_eq!(provider.get("missing").await.unwrap(), None);
	}

	#[rstest]
	#[tokio::test]
	async fn test_set_emits_change() {
		// Arrange
		let provider = InMemoryProvider::new();
		let count = Arc::new(AtomicUsize::new(0));
		let count_clone = Arc::clone(&count);
		let _ = provider.changed().on(DATA_CHANGED_TOPIC, move |event: &DataChanged| {
			assert_eq!(event.changed, vec!["key".to_string()]);
			count_clone.fetch_add(1, Ordering::SeqCst);
		});

		// Act
		provider.set("key", "value").await.unwrap();

		// Assert
		assert_eq!(count.load(Ordering::SeqCst), 1);
		assert_eq!(provider.get("key").await.unwrap(), Some("value".to_string()));
		assert_eq!(provider.len(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_with_timeout_ready_future_zero_timeout() {
		let provider = InMemoryProvider::new();
		provider.set("k", "v").await.unwrap();
		let value = with_timeout(Duration::ZERO, provider.get("k")).await.unwrap();
		assert_eq!(value, Some("v".to_string()));
	}

	#[rstest]
	#[tokio::test]
	async fn test_with_timeout_pending_future() {
		let result: Result<()> =
			with_timeout(Duration::from_millis(5), std::future::pending()).await;
		assert_eq!(result, Err(StorageError::Timeout(Duration::from_millis(5))));
	}
}
