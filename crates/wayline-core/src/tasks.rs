//! Deferred task sinks.
//!
//! Some work must wait until the host has laid out the new view (applying a
//! scroll offset, for instance). The router hands that work to a
//! [`DeferredTasks`] sink instead of running it inline. A browser binding
//! forwards tasks to `requestAnimationFrame`; [`TaskQueue`] keeps them until
//! the host drains the queue.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Scheduler for work that runs after the next layout pass.
pub trait DeferredTasks: Send + Sync {
	/// Queues `task`.
	fn defer(&self, task: Task);
}

/// Queue of tasks drained explicitly by the host (once per frame).
#[derive(Clone, Default)]
pub struct TaskQueue {
	queue: Arc<Mutex<VecDeque<Task>>>,
}

impl std::fmt::Debug for TaskQueue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TaskQueue")
			.field("pending", &self.pending())
			.finish()
	}
}

impl TaskQueue {
	/// Creates an empty queue.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of tasks waiting.
	pub fn pending(&self) -> usize {
		self.queue.lock().len()
	}

	/// Runs every task queued so far and returns how many ran.
	///
	/// Tasks queued while draining wait for the next call.
	pub fn run_pending(&self) -> usize {
		let tasks: Vec<Task> = self.queue.lock().drain(..).collect();
		let count = tasks.len();
		for task in tasks {
			task();
		}
		count
	}
}

impl DeferredTasks for TaskQueue {
	fn defer(&self, task: Task) {
		self.queue.lock().push_back(task);
	}
}

/// Sink that runs tasks as soon as they are deferred.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateTasks;

impl DeferredTasks for ImmediateTasks {
	fn defer(&self, task: Task) {
		task();
	}
}
