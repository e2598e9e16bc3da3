//! # wayline-routing
//!
//! Client-side route resolution and history engine.
//!
//! A [`Router`] keeps the current location, matches every registered route
//! against it on each navigation, intercepts in-page links, restores scroll
//! offsets on back navigation and tracks visited paths. Host capabilities
//! (document, viewport, storage, deferred tasks) come from `wayline-core`.
//!
//! ## Modules
//!
//! - [`location`]: immutable location snapshots
//! - [`path`]: basename handling and relative resolution
//! - [`pattern`] / [`matcher`]: route patterns and matching
//! - [`history`]: the navigation stack
//! - [`scroll`]: captured scroll offsets
//! - [`visits`]: visited-path tracking
//! - [`route`] / [`router`]: the route registry
//! - [`actions`]: the navigation command bridge
//! - [`events`]: notification and command payloads
//! - [`data`]: route data providers
//! - [`config`] / [`error`]: configuration and errors
//!
//! ## Notification order
//!
//! For one navigation: `route-changed`, `route-finalized`, then for every
//! route in registration order its match setter, `route-matched` and, for
//! exact matches, `route-matched-exact`.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wayline_core::{MemoryViewport, VirtualDocument};
//! use wayline_routing::events::{EventAction, ROUTE_MATCHED_EXACT_TOPIC, RouteEvent};
//! use wayline_routing::{NAVIGATION_TOPIC, MatchResults, RouteDescriptor, Router, RouterConfig, RouterContext};
//!
//! let context = RouterContext::new(
//!     Arc::new(VirtualDocument::new("https://example.com")),
//!     Arc::new(MemoryViewport::new()),
//! );
//! let router = Router::new(RouterConfig::default(), context);
//! router
//!     .create_route(
//!         RouteDescriptor::new("/settings").exact(true),
//!         None,
//!         Arc::new(|_: Option<&MatchResults>| {}),
//!     )
//!     .unwrap();
//!
//! let _subscription = router.events().on(ROUTE_MATCHED_EXACT_TOPIC, |event: &RouteEvent| {
//!     println!("showing {}", event.route_match().unwrap().route.path);
//! });
//!
//! router.actions().emit(
//!     NAVIGATION_TOPIC,
//!     &EventAction::new(NAVIGATION_TOPIC, "goTo")
//!         .with_data(serde_json::json!({ "path": "/settings" })),
//! );
//! assert_eq!(router.location().pathname, "/settings");
//! ```

pub mod actions;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod history;
pub mod location;
pub mod matcher;
pub mod path;
pub mod pattern;
pub mod route;
pub mod router;
pub mod scroll;
pub mod visits;

pub use actions::{NAVIGATION_TOPIC, NavigationActionListener, NavigationCommand};
pub use config::RouterConfig;
pub use data::{ProviderRegistry, RouteDataKind, RouteDataProvider};
pub use error::{Result, RouterError};
pub use events::{EventAction, RouteEvent, RouteMatch};
pub use history::{HistoryBackend, HistoryChange, MemoryHistory, NavigationAction};
pub use location::{LocationSegments, ScrollPosition};
pub use matcher::{MatchOptions, MatchResults, match_path, match_pathname};
pub use pattern::PathPattern;
pub use route::{MatchSetter, Route, RouteDescriptor, RouteId, RouteRegistration};
pub use router::{ElementLoadHook, Router, RouterContext, ViewUpdateOptions};
pub use scroll::ScrollCache;
pub use visits::{VisitStrategy, VisitTracker};
