//! # Wayline
//!
//! A client-side navigation engine for declarative, no-code applications.
//!
//! Wayline keeps the current location, decides which declared routes (view
//! regions) match it, drives browser-style history, intercepts in-page links,
//! restores scroll offsets on back navigation and records visited pages.
//!
//! ## Feature Flags
//!
//! - `core` - host capabilities: event channels, key/value storage, document
//!   and viewport access, deferred tasks
//! - `routing` - the route resolution and history engine
//! - `full` (default) - everything
//!
//! ## Quick Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wayline::prelude::*;
//!
//! let document = VirtualDocument::new("https://example.com");
//! let context = RouterContext::new(Arc::new(document.clone()), Arc::new(MemoryViewport::new()));
//! let router = Router::new(RouterConfig::default(), context);
//!
//! router
//!     .create_route(
//!         RouteDescriptor::new("/articles/:slug").exact(true),
//!         None,
//!         Arc::new(|_: Option<&MatchResults>| {}),
//!     )
//!     .unwrap();
//!
//! let link = document.append(ElementId(0), "a", &[("href", "/articles/hello")]);
//! router.finalize();
//!
//! assert_eq!(document.click(link, ClickEvent::plain()), ClickDisposition::PreventDefault);
//! assert_eq!(router.location().params["slug"], "hello");
//! ```

#[cfg(feature = "core")]
pub mod core;
#[cfg(feature = "routing")]
pub mod routing;

// Re-export host capabilities
#[cfg(feature = "core")]
pub use wayline_core::{
	ClickDisposition, ClickEvent, DeferredTasks, Disposer, ElementId, ElementQueryProvider,
	EventChannel, InMemoryProvider, KeyValueProvider, MemoryViewport, StorageError, TaskQueue,
	Viewport, VirtualDocument,
};

// Re-export the engine
#[cfg(feature = "routing")]
pub use wayline_routing::{
	HistoryBackend, LocationSegments, MatchResults, MemoryHistory, RouteDescriptor, RouteEvent,
	Router, RouterConfig, RouterContext, RouterError, VisitStrategy,
};

/// Commonly used types.
pub mod prelude {
	#[cfg(feature = "core")]
	pub use crate::{
		ClickDisposition, ClickEvent, DeferredTasks, Disposer, ElementId, ElementQueryProvider,
		EventChannel, InMemoryProvider, KeyValueProvider, MemoryViewport, StorageError, TaskQueue,
		Viewport, VirtualDocument,
	};

	#[cfg(feature = "routing")]
	pub use crate::{
		HistoryBackend, LocationSegments, MatchResults, MemoryHistory, RouteDescriptor, RouteEvent,
		Router, RouterConfig, RouterContext, RouterError, VisitStrategy,
	};
	#[cfg(feature = "routing")]
	pub use wayline_routing::{EventAction, NAVIGATION_TOPIC, ViewUpdateOptions};
}
