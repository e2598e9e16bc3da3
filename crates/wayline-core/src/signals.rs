//! Typed publish/subscribe channels.
//!
//! An [`EventChannel`] maps a topic string to an ordered list of subscriber
//! callbacks. Emitting on a topic invokes every subscriber synchronously, in
//! registration order. A subscriber that panics is logged and skipped; the
//! remaining subscribers still run.
//!
//! Subscribing returns a [`Disposer`]. Dropping the disposer does *not*
//! unsubscribe; call [`Disposer::dispose`] explicitly, the way an `off`
//! function returned by an event emitter would be called.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

/// Subscriber callback type.
pub type SubscriberFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Subscriber<T> {
	id: u64,
	callback: SubscriberFn<T>,
}

struct ChannelState<T> {
	next_id: u64,
	topics: HashMap<String, Vec<Subscriber<T>>>,
}

/// A topic-keyed channel of synchronous subscribers.
pub struct EventChannel<T> {
	state: Arc<RwLock<ChannelState<T>>>,
}

impl<T> Clone for EventChannel<T> {
	fn clone(&self) -> Self {
		Self {
			state: Arc::clone(&self.state),
		}
	}
}

impl<T> std::fmt::Debug for EventChannel<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.read();
		f.debug_struct("EventChannel")
			.field("topics", &state.topics.keys().collect::<Vec<_>>())
			.field("next_id", &state.next_id)
			.finish()
	}
}

impl<T: 'static> Default for EventChannel<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: 'static> EventChannel<T> {
	/// Creates an empty channel.
	pub fn new() -> Self {
		Self {
			state: Arc::new(RwLock::new(ChannelState {
				next_id: 0,
				topics: HashMap::new(),
			})),
		}
	}

	/// Subscribes `callback` to `topic`.
	pub fn on<F>(&self, topic: impl Into<String>, callback: F) -> Disposer
	where
		F: Fn(&T) + Send + Sync + 'static,
	{
		let topic = topic.into();
		let id = {
			let mut state = self.state.write();
			let id = state.next_id;
			state.next_id += 1;
			state
				.topics
				.entry(topic.clone())
				.or_default()
				.push(Subscriber {
					id,
					callback: Arc::new(callback),
				});
			id
		};

		let weak: Weak<RwLock<ChannelState<T>>> = Arc::downgrade(&self.state);
		Disposer::new(move || {
			if let Some(state) = weak.upgrade() {
				let mut state = state.write();
				if let Some(subscribers) = state.topics.get_mut(&topic) {
					subscribers.retain(|s| s.id != id);
					if subscribers.is_empty() {
						state.topics.remove(&topic);
					}
				}
			}
		})
	}

	/// Emits `payload` on `topic` and returns the number of subscribers invoked.
	///
	/// Subscribers are snapshotted before the first one runs, so a subscriber
	/// may subscribe, unsubscribe or emit again without deadlocking.
	pub fn emit(&self, topic: &str, payload: &T) -> usize {
		let callbacks: Vec<SubscriberFn<T>> = {
			let state = self.state.read();
			match state.topics.get(topic) {
				Some(subscribers) => subscribers
					.iter()
					.map(|s| Arc::clone(&s.callback))
					.collect(),
				None => return 0,
			}
		};

		for callback in &callbacks {
			let outcome = catch_unwind(AssertUnwindSafe(|| callback(payload)));
			if outcome.is_err() {
				tracing::error!(topic, "subscriber panicked; continuing with the next one");
			}
		}

		callbacks.len()
	}

	/// Returns the number of subscribers on `topic`.
	pub fn listener_count(&self, topic: &str) -> usize {
		self.state
			.read()
			.topics
			.get(topic)
			.map(Vec::len)
			.unwrap_or(0)
	}

	/// Returns `true` if `topic` has at least one subscriber.
	pub fn has_listeners(&self, topic: &str) -> bool {
		self.listener_count(topic) > 0
	}

	/// Removes every subscriber from every topic.
	pub fn remove_all_listeners(&self) {
		self.state.write().topics.clear();
	}
}

/// Handle that undoes a registration when disposed.
pub struct Disposer {
	action: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl std::fmt::Debug for Disposer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Disposer")
			.field("active", &self.action.is_some())
			.finish()
	}
}

impl Disposer {
	/// Wraps `action` so that it runs once, on [`dispose`](Self::dispose).
	pub fn new<F>(action: F) -> Self
	where
		F: FnOnce() + Send + Sync + 'static,
	{
		Self {
			action: Some(Box::new(action)),
		}
	}

	/// A disposer that does nothing.
	pub fn noop() -> Self {
		Self { action: None }
	}

	/// Returns `true` until the disposer has run.
	pub fn is_active(&self) -> bool {
		self.action.is_some()
	}

	/// Runs the wrapped action.
	pub fn dispose(mut self) {
		self.run();
	}

	/// Runs the wrapped action in place, leaving an inactive disposer behind.
	pub fn run(&mut self) {
		if let Some(action) = self.action.take() {
			action();
		}
	}
}
