//! Route data exposed to the data-provider layer.
//!
//! Expressions elsewhere in the application read `{{route:id}}`,
//! `{{query:tab}}` or `{{visits:all}}`. Each namespace is a read-only
//! [`KeyValueProvider`] registered in a [`ProviderRegistry`] under its name.

use crate::location::LocationSegments;
use crate::visits::VisitTracker;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use wayline_core::{DATA_CHANGED_TOPIC, DataChanged, EventChannel, KeyValueProvider, StorageError};

/// Named data providers.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
	providers: Arc<RwLock<BTreeMap<String, Arc<dyn KeyValueProvider>>>>,
}

impl std::fmt::Debug for ProviderRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProviderRegistry")
			.field("names", &self.names())
			.finish()
	}
}

impl ProviderRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `provider` under `name`, replacing any previous one.
	pub fn add_data_provider(&self, name: impl Into<String>, provider: Arc<dyn KeyValueProvider>) {
		let name = name.into();
		if self
			.providers
			.write()
			.insert(name.clone(), provider)
			.is_some()
		{
			tracing::debug!(name = %name, "data provider replaced");
		}
	}

	/// The provider registered under `name`.
	pub fn get(&self, name: &str) -> Option<Arc<dyn KeyValueProvider>> {
		self.providers.read().get(name).cloned()
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<String> {
		self.providers.read().keys().cloned().collect()
	}
}

/// Reads the router's current location.
pub type LocationSource = Arc<dyn Fn() -> LocationSegments + Send + Sync>;

/// The namespace a [`RouteDataProvider`] answers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDataKind {
	/// Parameters captured by the exact route.
	Route,
	/// Query string values.
	Query,
	/// Visited paths: `all`, `stored` or `session`.
	Visits,
}

impl RouteDataKind {
	/// Registry name of the namespace.
	pub fn name(self) -> &'static str {
		match self {
			Self::Route => "route",
			Self::Query => "query",
			Self::Visits => "visits",
		}
	}
}

/// Read-only provider over the router's location or visit history.
pub struct RouteDataProvider {
	kind: RouteDataKind,
	location: LocationSource,
	visits: Arc<VisitTracker>,
	changed: EventChannel<DataChanged>,
}

impl std::fmt::Debug for RouteDataProvider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteDataProvider")
			.field("kind", &self.kind)
			.finish()
	}
}

impl RouteDataProvider {
	/// Creates a provider for `kind`.
	pub fn new(kind: RouteDataKind, location: LocationSource, visits: Arc<VisitTracker>) -> Self {
		Self {
			kind,
			location,
			visits,
			changed: EventChannel::new(),
		}
	}

	/// The namespace this provider answers for.
	pub fn kind(&self) -> RouteDataKind {
		self.kind
	}

	/// Announces that the namespace may have new values.
	pub fn notify_changed(&self) {
		self.changed.emit(
			DATA_CHANGED_TOPIC,
			&DataChanged {
				changed: vec![self.kind.name().to_string()],
			},
		);
	}
}

fn single_quoted(visits: &[String]) -> String {
	serde_json::to_string(visits)
		.unwrap_or_else(|_| "[]".to_string())
		.replace('"', "'")
}

#[async_trait]
impl KeyValueProvider for RouteDataProvider {
	async fn get(&self, key: &str) -> wayline_core::Result<Option<String>> {
		let value = match self.kind {
			RouteDataKind::Route => (self.location)().params.get(key).cloned(),
			RouteDataKind::Query => (self.location)().query.get(key).cloned(),
			RouteDataKind::Visits => match key {
				"all" => Some(single_quoted(&self.visits.get_visits().await)),
				"stored" => Some(single_quoted(&self.visits.get_stored_visits().await)),
				"session" => Some(single_quoted(&self.visits.get_session_visits().await)),
				_ => None,
			},
		};
		Ok(value)
	}

	async fn set(&self, key: &str, _value: &str) -> wayline_core::Result<()> {
		Err(StorageError::Backend {
			key: key.to_string(),
			message: format!("the '{}' provider is read-only", self.kind.name()),
		})
	}

	fn changed(&self) -> &EventChannel<DataChanged> {
		&self.changed
	}
}
