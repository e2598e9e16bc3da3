//! Declared routes.
//!
//! A view region declares itself with a [`RouteDescriptor`]. The router
//! normalizes the path, fills inherited metadata and stores the resulting
//! [`Route`]. The region learns about matches through its [`MatchSetter`].

use crate::matcher::MatchResults;
use crate::pattern::PathPattern;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wayline_core::Disposer;

/// Receives the route's match after every matching pass.
pub type MatchSetter = Arc<dyn Fn(Option<&MatchResults>) + Send + Sync>;

/// Identity of a registered route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub u64);

impl std::fmt::Display for RouteId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "route-{}", self.0)
	}
}

/// What a view region declares about itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteDescriptor {
	/// Path pattern, relative to the parent route when one is given.
	pub path: String,
	/// Only exact matches count.
	pub exact: bool,
	/// Title applied when the route matches exactly.
	pub page_title: Option<String>,
	/// Transition name.
	pub transition: Option<String>,
	/// Scroll offset applied once the route's view has loaded.
	pub scroll_top_offset: Option<f64>,
}

impl RouteDescriptor {
	/// Declares a prefix-matching route at `path`.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			..Self::default()
		}
	}

	/// Sets `exact`.
	pub fn exact(mut self, exact: bool) -> Self {
		self.exact = exact;
		self
	}

	/// Sets the page title.
	pub fn with_page_title(mut self, title: impl Into<String>) -> Self {
		self.page_title = Some(title.into());
		self
	}

	/// Sets the transition.
	pub fn with_transition(mut self, transition: impl Into<String>) -> Self {
		self.transition = Some(transition.into());
		self
	}

	/// Sets the scroll offset.
	pub fn with_scroll_top_offset(mut self, offset: f64) -> Self {
		self.scroll_top_offset = Some(offset);
		self
	}
}

/// A registered route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
	/// Registry identity.
	pub id: RouteId,
	/// Normalized path.
	pub path: String,
	/// Compiled pattern used for matching.
	#[serde(skip)]
	pub pattern: PathPattern,
	/// Only exact matches count.
	pub exact: bool,
	/// Own or inherited page title.
	pub page_title: Option<String>,
	/// Own, inherited or default transition.
	pub transition: String,
	/// Scroll offset applied once the view has loaded.
	pub scroll_top_offset: f64,
	/// Normalized path of the parent route.
	pub parent_path: Option<String>,
	/// Result of the latest matching pass.
	#[serde(rename = "match")]
	pub matched: Option<MatchResults>,
}

impl Route {
	/// Returns `true` if the latest pass matched this route.
	pub fn is_matched(&self) -> bool {
		self.matched.is_some()
	}

	/// Returns `true` if the latest pass matched this route exactly.
	pub fn is_exact_match(&self) -> bool {
		self.matched.as_ref().is_some_and(|found| found.is_exact)
	}
}

/// Handle returned by route creation. Disposing it removes the route.
#[derive(Debug)]
pub struct RouteRegistration {
	id: RouteId,
	path: String,
	disposer: Disposer,
}

impl RouteRegistration {
	pub(crate) fn new(id: RouteId, path: String, disposer: Disposer) -> Self {
		Self { id, path, disposer }
	}

	/// Identity of the registered route.
	pub fn id(&self) -> RouteId {
		self.id
	}

	/// Normalized path of the registered route.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Removes the route from the router.
	pub fn dispose(self) {
		self.disposer.dispose();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_descriptor_builder() {
		let descriptor = RouteDescriptor::new("/docs")
			.exact(true)
			.with_page_title("Docs")
			.with_transition("fade")
			.with_scroll_top_offset(40.0);

		assert_eq!(descriptor.path, "/docs");
		assert!(descriptor.exact);
		assert_eq!(descriptor.page_title.as_deref(), Some("Docs"));
		assert_eq!(descriptor.transition.as_deref(), Some("fade"));
		assert_eq!(descriptor.scroll_top_offset, Some(40.0));
	}

	#[rstest]
	fn test_descriptor_from_json() {
		let descriptor: RouteDescriptor =
			serde_json::from_str(r#"{"path":"/a","exact":true,"pageTitle":"A"}"#).unwrap();
		assert_eq!(descriptor, RouteDescriptor::new("/a").exact(true).with_page_title("A"));
	}

	#[rstest]
	fn test_route_serializes_match_field() {
		let route = Route {
			id: RouteId(3),
			path: "/a".to_string(),
			pattern: PathPattern::new("/a").unwrap(),
			exact: false,
			page_title: None,
			transition: String::new(),
			scroll_top_offset: 0.0,
			parent_path: None,
			matched: None,
		};

		let json = serde_json::to_value(&route).unwrap();

		assert_eq!(json["id"], 3);
		assert!(json["match"].is_null());
		assert!(json.get("pattern").is_none());
		assert!(!route.is_matched());
		assert!(!route.is_exact_match());
	}
}
