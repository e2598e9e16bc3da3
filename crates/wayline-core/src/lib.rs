//! # wayline-core
//!
//! Host capabilities and shared plumbing for the Wayline navigation engine.
//!
//! The routing engine never talks to a browser directly. Everything it needs
//! from its environment is expressed as a capability trait in this crate, and
//! every capability ships with an in-memory implementation so that the engine
//! can run (and be tested) outside a browser.
//!
//! ## Modules
//!
//! - [`signals`]: typed publish/subscribe channels keyed by topic
//! - [`storage`]: asynchronous key/value providers used for persistence
//! - [`dom`]: element queries, click interception and viewport scrolling
//! - [`tasks`]: "run after layout" deferred task sinks
//! - [`exception`]: error types shared by the capabilities
//!
//! ## Example
//!
//! ```rust
//! use wayline_core::signals::EventChannel;
//!
//! let channel: EventChannel<String> = EventChannel::new();
//! let subscription = channel.on("greeting", |message: &String| {
//!     assert_eq!(message, "hello");
//! });
//!
//! assert_eq!(channel.emit("greeting", &"hello".to_string()), 1);
//! subscription.dispose();
//! assert_eq!(channel.listener_count("greeting"), 0);
//! ```

pub mod dom;
pub mod exception;
pub mod signals;
pub mod storage;
pub mod tasks;

pub use dom::{
	ClickDisposition, ClickEvent, ElementHandler, ElementId, ElementQueryProvider, MemoryViewport,
	ScrollBehavior, Viewport, VirtualDocument,
};
pub use exception::{Result, StorageError};
pub use signals::{Disposer, EventChannel};
pub use storage::{
	DATA_CHANGED_TOPIC, DataChanged, InMemoryProvider, KeyValueProvider, with_timeout,
};
pub use tasks::{DeferredTasks, ImmediateTasks, Task, TaskQueue};
