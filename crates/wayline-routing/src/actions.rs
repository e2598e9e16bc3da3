//! Bridge between the shared command/notification channels and the router.
//!
//! Commands on [`NAVIGATION_TOPIC`]:
//!
//! | command  | data               | router call              |
//! |----------|--------------------|--------------------------|
//! | `goTo`   | `{"path": "/x"}`   | `go_to_route("/x")`      |
//! | `goBack` |                    | `go_back()`              |
//! | `goNext` |                    | `go_to_parent_route()`   |
//!
//! Anything else is ignored. The listener also forwards the router's
//! route-changed, route-finalized and match notifications onto the shared
//! notification channel.

use crate::events::{EventAction, FORWARDED_TOPICS, RouteEvent};
use crate::router::{Router, WeakRouter};
use parking_lot::Mutex;
use serde::Deserialize;
use wayline_core::{Disposer, EventChannel};

/// Command channel topic handled by [`NavigationActionListener`].
pub const NAVIGATION_TOPIC: &str = "navigation";

/// A decoded navigation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationCommand {
	/// Navigate to a path, relative paths resolved against the location.
	GoTo {
		/// Target path.
		path: String,
	},
	/// Return to the previous entry.
	GoBack,
	/// Move to the parent of the current location.
	GoNext,
}

#[derive(Deserialize)]
struct GoToData {
	path: String,
}

impl NavigationCommand {
	/// Decodes `action`. Unknown commands and `goTo` without a path yield `None`.
	pub fn from_action(action: &EventAction) -> Option<Self> {
		match action.command.as_str() {
			"goTo" => serde_json::from_value::<GoToData>(action.data.clone())
				.map(|data| Self::GoTo { path: data.path })
				.map_err(|e| tracing::warn!(error = %e, "goTo command without a path ignored"))
				.ok(),
			"goBack" => Some(Self::GoBack),
			"goNext" => Some(Self::GoNext),
			_ => None,
		}
	}
}

/// Subscribes a router to the shared channels.
pub struct NavigationActionListener {
	subscriptions: Mutex<Vec<Disposer>>,
}

impl std::fmt::Debug for NavigationActionListener {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NavigationActionListener")
			.field("subscriptions", &self.subscriptions.lock().len())
			.finish()
	}
}

impl NavigationActionListener {
	/// Starts listening on `actions` and forwarding onto `events`.
	pub fn new(
		router: &Router,
		events: EventChannel<RouteEvent>,
		actions: &EventChannel<EventAction>,
	) -> Self {
		let mut subscriptions = Vec::with_capacity(FORWARDED_TOPICS.len() + 1);

		let weak: WeakRouter = router.downgrade();
		subscriptions.push(actions.on(NAVIGATION_TOPIC, move |action: &EventAction| {
			let Some(router) = weak.upgrade() else {
				return;
			};
			Self::dispatch(&router, action);
		}));

		for topic in FORWARDED_TOPICS {
			let events = events.clone();
			subscriptions.push(
				router
					.notifications()
					.on(topic, move |event: &RouteEvent| {
						events.emit(topic, event);
					}),
			);
		}

		Self {
			subscriptions: Mutex::new(subscriptions),
		}
	}

	fn dispatch(router: &Router, action: &EventAction) {
		let Some(command) = NavigationCommand::from_action(action) else {
			tracing::debug!(command = %action.command, "unknown navigation command ignored");
			return;
		};
		tracing::debug!(?command, "navigation command received");
		match command {
			NavigationCommand::GoTo { path } => router.go_to_route(&path),
			NavigationCommand::GoBack => router.go_back(),
			NavigationCommand::GoNext => router.go_to_parent_route(),
		}
	}

	/// Returns `true` until [`destroy`](Self::destroy) has run.
	pub fn is_active(&self) -> bool {
		!self.subscriptions.lock().is_empty()
	}

	/// Unsubscribes from both channels.
	pub fn destroy(&self) {
		let subscriptions: Vec<Disposer> = self.subscriptions.lock().drain(..).collect();
		for subscription in subscriptions {
			subscription.dispose();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(EventAction::new(NAVIGATION_TOPIC, "goTo").with_data(json!({"path": "/x"})), Some(NavigationCommand::GoTo { path: "/x".to_string() }))]
	#[case(EventAction::new(NAVIGATION_TOPIC, "goBack"), Some(NavigationCommand::GoBack))]
	#[case(EventAction::new(NAVIGATION_TOPIC, "goNext"), Some(NavigationCommand::GoNext))]
	#[case(EventAction::new(NAVIGATION_TOPIC, "goTo"), None)]
	#[case(EventAction::new(NAVIGATION_TOPIC, "reload"), None)]
	fn test_from_action(#[case] action: EventAction, #[case] expected: Option<NavigationCommand>) {
		assert_eq!(NavigationCommand::from_action(&action), expected);
	}
}
