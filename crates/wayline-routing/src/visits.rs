//! Visited-path tracking.
//!
//! Paths are recorded in one of two providers: a session provider that lives
//! as long as the browsing session, and a stored provider that survives
//! restarts. Both hold a JSON array of paths under [`VISITS_KEY`].
//!
//! Reads are bounded by a timeout. A slow or failing provider reads as "no
//! visits"; nothing here returns an error.

use crate::error::RouterError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use wayline_core::{KeyValueProvider, with_timeout};

/// Provider key holding the visited paths.
pub const VISITS_KEY: &str = "visits";

/// Retention policy for [`VisitTracker::record_visit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitStrategy {
	/// Persist the visit, once.
	Once,
	/// Record the visit for this session.
	Always,
}

impl std::str::FromStr for VisitStrategy {
	type Err = RouterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"once" => Ok(Self::Once),
			"always" => Ok(Self::Always),
			other => Err(RouterError::UnknownVisitStrategy(other.to_string())),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Retention {
	Session,
	Stored,
}

/// Records and answers "has this path been visited" queries.
pub struct VisitTracker {
	session: Arc<dyn KeyValueProvider>,
	stored: Arc<dyn KeyValueProvider>,
	timeout: Duration,
	// Serializes read-modify-write cycles on the providers.
	write_lock: tokio::sync::Mutex<()>,
	last_error: Mutex<Option<String>>,
}

impl std::fmt::Debug for VisitTracker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("VisitTracker")
			.field("timeout", &self.timeout)
			.finish()
	}
}

impl VisitTracker {
	/// Creates a tracker over a session and a stored provider.
	pub fn new(
		session: Arc<dyn KeyValueProvider>,
		stored: Arc<dyn KeyValueProvider>,
		timeout: Duration,
	) -> Self {
		Self {
			session,
			stored,
			timeout,
			write_lock: tokio::sync::Mutex::new(()),
			last_error: Mutex::new(None),
		}
	}

	/// Records `path` for this session.
	pub async fn mark_visit(&self, path: &str) {
		self.append(Retention::Session, path).await;
	}

	/// Records `path` persistently.
	pub async fn store_visit(&self, path: &str) {
		self.append(Retention::Stored, path).await;
	}

	/// Records `path` according to `strategy`.
	///
	/// [`VisitStrategy::Once`] leaves an already stored path untouched.
	pub async fn record_visit(&self, strategy: VisitStrategy, path: &str) {
		match strategy {
			VisitStrategy::Always => self.mark_visit(path).await,
			VisitStrategy::Once => self.store_visit(path).await,
		}
	}

	/// Returns `true` if `path` was recorded under either retention.
	pub async fn has_visited(&self, path: &str) -> bool {
		self.get_visits().await.iter().any(|visited| visited == path)
	}

	/// Paths recorded for this session, oldest first.
	pub async fn get_session_visits(&self) -> Vec<String> {
		self.read(Retention::Session).await
	}

	/// Paths recorded persistently, oldest first.
	pub async fn get_stored_visits(&self) -> Vec<String> {
		self.read(Retention::Stored).await
	}

	/// Session visits followed by stored visits, without duplicates.
	pub async fn get_visits(&self) -> Vec<String> {
		let mut visits = self.get_session_visits().await;
		for path in self.get_stored_visits().await {
			if !visits.contains(&path) {
				visits.push(path);
			}
		}
		visits
	}

	/// Empties both retentions.
	pub async fn clear_visits(&self) {
		let _guard = self.write_lock.lock().await;
		self.write(Retention::Session, &[]).await;
		self.write(Retention::Stored, &[]).await;
	}

	/// The last provider failure, if any.
	pub fn last_error(&self) -> Option<String> {
		self.last_error.lock().clone()
	}

	fn provider(&self, retention: Retention) -> &Arc<dyn KeyValueProvider> {
		match retention {
			Retention::Session => &self.session,
			Retention::Stored => &self.stored,
		}
	}

	/// Adds `path` to the list. An unreadable list is left untouched.
	async fn append(&self, retention: Retention, path: &str) {
		let _guard = self.write_lock.lock().await;
		let mut visits = match self.try_read(retention).await {
			Ok(visits) => visits,
			Err(message) => {
				self.record_failure(retention, message);
				tracing::warn!(?retention, path = %path, "visit not recorded");
				return;
			}
		};
		if visits.iter().any(|visited| visited == path) {
			return;
		}
		visits.push(path.to_string());
		self.write(retention, &visits).await;
	}

	async fn read(&self, retention: Retention) -> Vec<String> {
		self.try_read(retention).await.unwrap_or_else(|message| {
			self.record_failure(retention, message);
			Vec::new()
		})
	}

	async fn try_read(&self, retention: Retention) -> Result<Vec<String>, String> {
		let provider = self.provider(retention);
		match with_timeout(self.timeout, provider.get(VISITS_KEY)).await {
			Ok(Some(raw)) => serde_json::from_str(&raw).map_err(|e| e.to_string()),
			Ok(None) => Ok(Vec::new()),
			Err(e) => Err(e.to_string()),
		}
	}

	async fn write(&self, retention: Retention, visits: &[String]) {
		let payload = match serde_json::to_string(visits) {
			Ok(payload) => payload,
			Err(e) => {
				self.record_failure(retention, e.to_string());
				return;
			}
		};
		let provider = self.provider(retention);
		if let Err(e) = with_timeout(self.timeout, provider.set(VISITS_KEY, &payload)).await {
			self.record_failure(retention, e.to_string());
		}
	}

	fn record_failure(&self, retention: Retention, message: String) {
		tracing::warn!(?retention, error = %message, "visit provider failure");
		*self.last_error.lock() = Some(message);
	}
}
