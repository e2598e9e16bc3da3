//! Notifications and commands exchanged over event channels.

use crate::location::LocationSegments;
use crate::matcher::MatchResults;
use crate::route::Route;
use serde::{Deserialize, Serialize};

/// Topic of [`RouteEvent::RouteChanged`].
pub const ROUTE_CHANGED_TOPIC: &str = "route-changed";
/// Topic of [`RouteEvent::RouteFinalized`].
pub const ROUTE_FINALIZED_TOPIC: &str = "route-finalized";
/// Topic of [`RouteEvent::RouteMatched`].
pub const ROUTE_MATCHED_TOPIC: &str = "route-matched";
/// Topic of [`RouteEvent::RouteMatchedExact`].
pub const ROUTE_MATCHED_EXACT_TOPIC: &str = "route-matched-exact";
/// Topic of [`RouteEvent::Initialized`].
pub const INITIALIZED_TOPIC: &str = "initialized";

/// Topics forwarded from the router onto the shared notification channel.
pub const FORWARDED_TOPICS: [&str; 4] = [
	ROUTE_CHANGED_TOPIC,
	ROUTE_FINALIZED_TOPIC,
	ROUTE_MATCHED_TOPIC,
	ROUTE_MATCHED_EXACT_TOPIC,
];

/// A route together with the match it just received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMatch {
	/// Snapshot of the route.
	pub route: Route,
	/// The match.
	#[serde(rename = "match")]
	pub matched: MatchResults,
}

/// Route lifecycle notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "kebab-case")]
pub enum RouteEvent {
	/// The location changed.
	RouteChanged(LocationSegments),
	/// Every route-changed subscriber has run.
	RouteFinalized(LocationSegments),
	/// A route matched the location, exactly or as a prefix.
	RouteMatched(RouteMatch),
	/// A route matched the location exactly.
	RouteMatchedExact(RouteMatch),
	/// The first finalize completed without a start-path redirect.
	Initialized,
}

impl RouteEvent {
	/// Topic this event is emitted on.
	pub fn topic(&self) -> &'static str {
		match self {
			Self::RouteChanged(_) => ROUTE_CHANGED_TOPIC,
			Self::RouteFinalized(_) => ROUTE_FINALIZED_TOPIC,
			Self::RouteMatched(_) => ROUTE_MATCHED_TOPIC,
			Self::RouteMatchedExact(_) => ROUTE_MATCHED_EXACT_TOPIC,
			Self::Initialized => INITIALIZED_TOPIC,
		}
	}

	/// The location carried by change notifications.
	pub fn location(&self) -> Option<&LocationSegments> {
		match self {
			Self::RouteChanged(location) | Self::RouteFinalized(location) => Some(location),
			_ => None,
		}
	}

	/// The route match carried by match notifications.
	pub fn route_match(&self) -> Option<&RouteMatch> {
		match self {
			Self::RouteMatched(found) | Self::RouteMatchedExact(found) => Some(found),
			_ => None,
		}
	}
}

/// A command sent over the shared command channel.
///
/// ```rust
/// use wayline_routing::events::EventAction;
///
/// let action: EventAction = serde_json::from_str(
///     r#"{"topic":"navigation","command":"goTo","data":{"path":"/home"}}"#,
/// )
/// .unwrap();
/// assert_eq!(action.command, "goTo");
/// assert_eq!(action.data["path"], "/home");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAction {
	/// Channel topic the command belongs to.
	pub topic: String,
	/// Command name.
	pub command: String,
	/// Command arguments.
	#[serde(default)]
	pub data: serde_json::Value,
}

impl EventAction {
	/// Creates a command without arguments.
	pub fn new(topic: impl Into<String>, command: impl Into<String>) -> Self {
		Self {
			topic: topic.into(),
			command: command.into(),
			data: serde_json::Value::Null,
		}
	}

	/// Attaches arguments.
	pub fn with_data(mut self, data: serde_json::Value) -> Self {
		self.data = data;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_topics() {
		let location = LocationSegments::parse("/a", "k");
		assert_eq!(
			RouteEvent::RouteChanged(location.clone()).topic(),
			"route-changed"
		);
		assert_eq!(
			RouteEvent::RouteFinalized(location).topic(),
			"route-finalized"
		);
		assert_eq!(RouteEvent::Initialized.topic(), "initialized");
	}

	#[rstest]
	fn test_event_serializes_with_type_tag() {
		let json = serde_json::to_value(RouteEvent::Initialized).unwrap();
		assert_eq!(json["type"], "initialized");

		let location = LocationSegments::parse("/a", "k");
		let json = serde_json::to_value(RouteEvent::RouteChanged(location)).unwrap();
		assert_eq!(json["type"], "route-changed");
		assert_eq!(json["detail"]["pathname"], "/a");
	}

	#[rstest]
	fn test_action_without_data() {
		let action: EventAction =
			serde_json::from_str(r#"{"topic":"navigation","command":"goBack"}"#).unwrap();
		assert_eq!(action, EventAction::new("navigation", "goBack"));
	}
}
