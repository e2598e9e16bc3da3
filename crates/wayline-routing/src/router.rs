//! The route registry.
//!
//! [`Router`] owns the registered routes and the current location. Every
//! history change runs one pass:
//!
//! 1. each route is matched against the new location, in registration order;
//! 2. `route-changed`, then `route-finalized` are emitted;
//! 3. each route's [`MatchSetter`] runs, followed by `route-matched` and,
//!    for exact matches, `route-matched-exact`.
//!
//! The router is cheap to clone; clones share one registry. Locks are never
//! held while host callbacks run, so setters and subscribers may call back
//! into the router.

use crate::actions::NavigationActionListener;
use crate::config::RouterConfig;
use crate::data::{ProviderRegistry, RouteDataKind, RouteDataProvider};
use crate::error::Result;
use crate::events::{
	EventAction, INITIALIZED_TOPIC, ROUTE_CHANGED_TOPIC, ROUTE_FINALIZED_TOPIC,
	ROUTE_MATCHED_EXACT_TOPIC, ROUTE_MATCHED_TOPIC, RouteEvent, RouteMatch,
};
use crate::history::{HistoryBackend, HistoryChange, MemoryHistory, NavigationAction};
use crate::location::LocationSegments;
use crate::matcher::{MatchOptions, match_path};
use crate::path::{
	add_leading_slash, ensure_basename, has_basename, is_absolute, is_filename, resolve_pathname,
	strip_basename, strip_trailing_slash,
};
use crate::pattern::PathPattern;
use crate::route::{MatchSetter, Route, RouteDescriptor, RouteId, RouteRegistration};
use crate::scroll::ScrollCache;
use crate::visits::VisitTracker;
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};
use wayline_core::{
	ClickDisposition, ClickEvent, DeferredTasks, Disposer, ElementId, ElementQueryProvider,
	EventChannel, ImmediateTasks, InMemoryProvider, KeyValueProvider, ScrollBehavior, Viewport,
};

/// Attribute marking anchors that already carry the router's click handler.
pub const LINK_CAPTURED_ATTRIBUTE: &str = "data-wayline-link";

/// Selector for anchors the router intercepts.
const LINK_SELECTOR: &str = "a[href]";

/// Hook run on the document body by the first finalize, when element
/// manipulation is enabled.
pub type ElementLoadHook = Arc<dyn Fn(ElementId) + Send + Sync>;

/// Collaborators a router is constructed with.
#[derive(Clone)]
pub struct RouterContext {
	/// Shared notification channel.
	pub events: EventChannel<RouteEvent>,
	/// Shared command channel.
	pub actions: EventChannel<EventAction>,
	/// Element queries, click interception and document title.
	pub document: Arc<dyn ElementQueryProvider>,
	/// Scroll offset access.
	pub viewport: Arc<dyn Viewport>,
	/// Sink for work that must wait for layout.
	pub tasks: Arc<dyn DeferredTasks>,
	/// Session-lifetime storage (visits, scroll positions).
	pub session: Arc<dyn KeyValueProvider>,
	/// Persistent storage (visits).
	pub stored: Arc<dyn KeyValueProvider>,
	/// Registry the route data providers are added to.
	pub providers: ProviderRegistry,
	/// Element load hook.
	pub load_hook: Option<ElementLoadHook>,
}

impl std::fmt::Debug for RouterContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouterContext")
			.field("events", &self.events)
			.field("actions", &self.actions)
			.field("providers", &self.providers)
			.field("load_hook", &self.load_hook.is_some())
			.finish_non_exhaustive()
	}
}

impl RouterContext {
	/// Context over `document` and `viewport`, with fresh channels, in-memory
	/// storage and inline deferred tasks.
	pub fn new(document: Arc<dyn ElementQueryProvider>, viewport: Arc<dyn Viewport>) -> Self {
		Self {
			events: EventChannel::new(),
			actions: EventChannel::new(),
			document,
			viewport,
			tasks: Arc::new(ImmediateTasks),
			session: Arc::new(InMemoryProvider::new()),
			stored: Arc::new(InMemoryProvider::new()),
			providers: ProviderRegistry::new(),
			load_hook: None,
		}
	}

	/// Uses `events` as the shared notification channel.
	pub fn with_events(mut self, events: EventChannel<RouteEvent>) -> Self {
		self.events = events;
		self
	}

	/// Uses `actions` as the shared command channel.
	pub fn with_actions(mut self, actions: EventChannel<EventAction>) -> Self {
		self.actions = actions;
		self
	}

	/// Uses `tasks` for deferred work.
	pub fn with_tasks(mut self, tasks: Arc<dyn DeferredTasks>) -> Self {
		self.tasks = tasks;
		self
	}

	/// Uses `session` as session storage.
	pub fn with_session_provider(mut self, session: Arc<dyn KeyValueProvider>) -> Self {
		self.session = session;
		self
	}

	/// Uses `stored` as persistent storage.
	pub fn with_stored_provider(mut self, stored: Arc<dyn KeyValueProvider>) -> Self {
		self.stored = stored;
		self
	}

	/// Registers route data providers in `providers`.
	pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
		self.providers = providers;
		self
	}

	/// Sets the element load hook.
	pub fn with_load_hook(mut self, hook: ElementLoadHook) -> Self {
		self.load_hook = Some(hook);
		self
	}
}

/// Options for [`Router::views_updated`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewUpdateOptions {
	/// Element id to bring into view instead of scrolling to an offset.
	pub scroll_to_id: Option<String>,
	/// Offset overriding the configured default. Zero means "use the default".
	pub scroll_top_offset: Option<f64>,
}

struct RouteEntry {
	route: Route,
	declared_path: String,
	setter: MatchSetter,
}

struct RouterState {
	location: LocationSegments,
	routes: Vec<RouteEntry>,
	next_route_id: u64,
	finalized: bool,
}

struct MatchOutcome {
	route: Route,
	setter: MatchSetter,
}

struct RouterInner {
	config: RouterConfig,
	context: RouterContext,
	history: Arc<dyn HistoryBackend>,
	scroll: ScrollCache,
	visits: Arc<VisitTracker>,
	notifications: EventChannel<RouteEvent>,
	state: RwLock<RouterState>,
	history_subscription: Mutex<Disposer>,
	listener: Mutex<Option<NavigationActionListener>>,
	data_providers: RwLock<Vec<Arc<RouteDataProvider>>>,
}

/// Non-owning handle to a [`Router`].
#[derive(Clone)]
pub(crate) struct WeakRouter(Weak<RouterInner>);

impl WeakRouter {
	pub(crate) fn upgrade(&self) -> Option<Router> {
		self.0.upgrade().map(|inner| Router { inner })
	}
}

/// Client-side route registry and navigation driver.
///
/// ```rust
/// use std::sync::Arc;
/// use wayline_core::{MemoryViewport, VirtualDocument};
/// use wayline_routing::{MatchResults, RouteDescriptor, Router, RouterConfig, RouterContext};
///
/// let context = RouterContext::new(
///     Arc::new(VirtualDocument::new("https://example.com")),
///     Arc::new(MemoryViewport::new()),
/// );
/// let router = Router::new(RouterConfig::default(), context);
///
/// let registration = router
///     .create_route(
///         RouteDescriptor::new("/users/:id").exact(true),
///         None,
///         Arc::new(|_: Option<&MatchResults>| {}),
///     )
///     .unwrap();
///
/// router.go_to_route("/users/42");
///
/// let route = router.exact_route().unwrap();
/// assert_eq!(route.id, registration.id());
/// assert_eq!(router.location().params["id"], "42");
/// ```
#[derive(Clone)]
pub struct Router {
	inner: Arc<RouterInner>,
}

impl std::fmt::Debug for Router {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.state.read();
		f.debug_struct("Router")
			.field("location", &state.location.pathname)
			.field("routes", &state.routes.len())
			.field("finalized", &state.finalized)
			.finish()
	}
}

impl Router {
	/// Creates a router over an in-memory history starting at `/`.
	pub fn new(config: RouterConfig, context: RouterContext) -> Self {
		let history = Arc::new(MemoryHistory::new(config.root.clone(), "/"));
		Self::with_history(config, context, history)
	}

	/// Creates a router over `history`.
	pub fn with_history(
		config: RouterConfig,
		context: RouterContext,
		history: Arc<dyn HistoryBackend>,
	) -> Self {
		let timeout = config.provider_timeout();
		let location = history.location();
		let inner = Arc::new(RouterInner {
			scroll: ScrollCache::new(Arc::clone(&context.viewport), timeout),
			visits: Arc::new(VisitTracker::new(
				Arc::clone(&context.session),
				Arc::clone(&context.stored),
				timeout,
			)),
			notifications: EventChannel::new(),
			state: RwLock::new(RouterState {
				location: location.clone(),
				routes: Vec::new(),
				next_route_id: 0,
				finalized: false,
			}),
			history_subscription: Mutex::new(Disposer::noop()),
			listener: Mutex::new(None),
			data_providers: RwLock::new(Vec::new()),
			history,
			config,
			context,
		});

		let weak = Arc::downgrade(&inner);
		let subscription = inner
			.history
			.listen(Box::new(move |change: &HistoryChange| {
				if let Some(inner) = weak.upgrade() {
					Router { inner }.handle_history_change(change);
				}
			}));
		*inner.history_subscription.lock() = subscription;

		let router = Self { inner };
		if router.inner.config.actions_enabled {
			router.enable_action_listener();
		}
		router.enable_data_providers();
		router.send_location_notifications(&location);
		router
	}

	pub(crate) fn downgrade(&self) -> WeakRouter {
		WeakRouter(Arc::downgrade(&self.inner))
	}

	/// Construction-time settings.
	pub fn config(&self) -> &RouterConfig {
		&self.inner.config
	}

	/// The router's own notification channel.
	///
	/// Every notification is emitted here first; the navigation action
	/// listener forwards them to the shared channel.
	pub fn notifications(&self) -> &EventChannel<RouteEvent> {
		&self.inner.notifications
	}

	/// The shared notification channel.
	pub fn events(&self) -> &EventChannel<RouteEvent> {
		&self.inner.context.events
	}

	/// The shared command channel.
	pub fn actions(&self) -> &EventChannel<EventAction> {
		&self.inner.context.actions
	}

	/// The history backend.
	pub fn history(&self) -> Arc<dyn HistoryBackend> {
		Arc::clone(&self.inner.history)
	}

	/// The scroll position cache.
	pub fn scroll(&self) -> &ScrollCache {
		&self.inner.scroll
	}

	/// The visit tracker.
	pub fn visits(&self) -> Arc<VisitTracker> {
		Arc::clone(&self.inner.visits)
	}

	/// The current location.
	pub fn location(&self) -> LocationSegments {
		self.inner.state.read().location.clone()
	}

	/// The location below the current one in history.
	pub fn previous_location(&self) -> Option<LocationSegments> {
		self.inner.history.previous_location()
	}

	/// Creates the navigation action listener unless it already exists.
	pub fn enable_action_listener(&self) {
		let mut listener = self.inner.listener.lock();
		if listener.is_none() {
			*listener = Some(NavigationActionListener::new(
				self,
				self.inner.context.events.clone(),
				&self.inner.context.actions,
			));
		}
	}

	/// Returns `true` while the navigation action listener is active.
	pub fn is_action_listener_enabled(&self) -> bool {
		self.inner
			.listener
			.lock()
			.as_ref()
			.is_some_and(NavigationActionListener::is_active)
	}

	/// Registers the `route`, `query` and `visits` data providers, once.
	pub fn enable_data_providers(&self) {
		let mut data_providers = self.inner.data_providers.write();
		if !data_providers.is_empty() {
			return;
		}
		for kind in [RouteDataKind::Route, RouteDataKind::Query, RouteDataKind::Visits] {
			let weak = Arc::downgrade(&self.inner);
			let provider = Arc::new(RouteDataProvider::new(
				kind,
				Arc::new(move || {
					weak.upgrade()
						.map(|inner| inner.state.read().location.clone())
						.unwrap_or_else(|| LocationSegments::new("/"))
				}),
				Arc::clone(&self.inner.visits),
			));
			self.inner
				.context
				.providers
				.add_data_provider(kind.name(), Arc::clone(&provider) as Arc<dyn KeyValueProvider>);
			data_providers.push(provider);
		}
	}

	/// Seeds the scroll cache from the session provider.
	pub async fn load_scroll_positions(&self) -> usize {
		self.inner
			.scroll
			.load(Arc::clone(&self.inner.context.session))
			.await
	}

	fn handle_history_change(&self, change: &HistoryChange) {
		let mut location = change.location.clone();
		if change.action == NavigationAction::Pop {
			location.scroll_position = self.inner.scroll.get(&location.key);
		}
		self.inner.state.write().location = location;

		let outcomes = self.compute_matches();
		let location = self.location();
		self.send_location_notifications(&location);
		self.dispatch_matches(outcomes);
	}

	fn send_location_notifications(&self, location: &LocationSegments) {
		let data_providers: Vec<Arc<RouteDataProvider>> =
			self.inner.data_providers.read().iter().cloned().collect();
		for provider in data_providers
			.iter()
			.filter(|p| p.kind() != RouteDataKind::Visits)
		{
			provider.notify_changed();
		}

		let notifications = &self.inner.notifications;
		notifications.emit(
			ROUTE_CHANGED_TOPIC,
			&RouteEvent::RouteChanged(location.clone()),
		);
		notifications.emit(
			ROUTE_FINALIZED_TOPIC,
			&RouteEvent::RouteFinalized(location.clone()),
		);
	}

	/// Re-matches every route and records the results. The location takes the
	/// parameters of the first exact match.
	fn compute_matches(&self) -> Vec<MatchOutcome> {
		let mut state = self.inner.state.write();
		let location = state.location.clone();
		let mut exact_params = None;
		let mut outcomes = Vec::with_capacity(state.routes.len());

		for entry in state.routes.iter_mut() {
			let options = MatchOptions {
				exact: entry.route.exact,
				strict: false,
			};
			let found = match_path(&location, &entry.route.pattern, options);
			if exact_params.is_none()
				&& let Some(found) = &found
				&& found.is_exact
			{
				exact_params = Some(found.params.clone());
			}
			entry.route.matched = found;
			outcomes.push(MatchOutcome {
				route: entry.route.clone(),
				setter: Arc::clone(&entry.setter),
			});
		}

		state.location.params = exact_params.unwrap_or_default();
		outcomes
	}

	fn dispatch_matches(&self, outcomes: Vec<MatchOutcome>) {
		let notifications = &self.inner.notifications;
		for outcome in outcomes {
			(outcome.setter)(outcome.route.matched.as_ref());
			let Some(matched) = outcome.route.matched.clone() else {
				continue;
			};
			let is_exact = matched.is_exact;
			let found = RouteMatch {
				route: outcome.route,
				matched,
			};
			if is_exact {
				notifications.emit(ROUTE_MATCHED_TOPIC, &RouteEvent::RouteMatched(found.clone()));
				notifications.emit(ROUTE_MATCHED_EXACT_TOPIC, &RouteEvent::RouteMatchedExact(found));
			} else {
				notifications.emit(ROUTE_MATCHED_TOPIC, &RouteEvent::RouteMatched(found));
			}
		}
	}

	/// Registers a route and matches it against the current location.
	///
	/// `parent` is looked up among the registered routes, first by normalized
	/// path and then by declared path. A child path is normalized under the
	/// parent's path and inherits its page title and transition; a route
	/// without a parent is normalized under the configured root. The returned
	/// registration removes the route when disposed.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`](crate::RouterError::InvalidPattern)
	/// if the normalized path does not compile.
	pub fn create_route(
		&self,
		descriptor: RouteDescriptor,
		parent: Option<&RouteDescriptor>,
		setter: MatchSetter,
	) -> Result<RouteRegistration> {
		let config = &self.inner.config;
		let (id, path) = {
			let mut state = self.inner.state.write();
			let parent_route = parent
				.filter(|p| !p.path.is_empty())
				.and_then(|p| Self::find_parent(&state.routes, &p.path));
			if parent.is_some() && parent_route.is_none() {
				tracing::debug!(path = %descriptor.path, "parent route not registered; treating route as a root route");
			}

			let path = match &parent_route {
				Some(parent) => self.normalize_child_url(&descriptor.path, &parent.path),
				None => self.adjust_root_view_urls(&descriptor.path),
			};
			let pattern = PathPattern::new(path.strip_prefix('#').unwrap_or(&path))?;

			if state.routes.iter().any(|entry| entry.route.path == path) {
				tracing::warn!(path = %path, "route: duplicate route detected");
			}

			let transition = descriptor
				.transition
				.clone()
				.filter(|t| !t.is_empty())
				.or_else(|| {
					parent_route
						.as_ref()
						.map(|p| p.transition.clone())
						.filter(|t| !t.is_empty())
				})
				.unwrap_or_else(|| config.transition.clone());
			let page_title = descriptor
				.page_title
				.clone()
				.or_else(|| parent_route.as_ref().and_then(|p| p.page_title.clone()));

			let id = RouteId(state.next_route_id);
			state.next_route_id += 1;
			state.routes.push(RouteEntry {
				route: Route {
					id,
					path: path.clone(),
					pattern,
					exact: descriptor.exact,
					page_title,
					transition,
					scroll_top_offset: descriptor
						.scroll_top_offset
						.unwrap_or(config.scroll_top_offset),
					parent_path: parent_route.map(|p| p.path),
					matched: None,
				},
				declared_path: descriptor.path,
				setter,
			});
			(id, path)
		};

		let outcomes = self
			.compute_matches()
			.into_iter()
			.filter(|outcome| outcome.route.id == id)
			.collect();
		self.dispatch_matches(outcomes);

		let weak = Arc::downgrade(&self.inner);
		let disposer = Disposer::new(move || {
			if let Some(inner) = weak.upgrade() {
				inner.state.write().routes.retain(|entry| entry.route.id != id);
			}
		});
		Ok(RouteRegistration::new(id, path, disposer))
	}

	fn find_parent(routes: &[RouteEntry], path: &str) -> Option<Route> {
		routes
			.iter()
			.find(|entry| entry.route.path == path)
			.or_else(|| routes.iter().find(|entry| entry.declared_path == path))
			.map(|entry| entry.route.clone())
	}

	/// Snapshot of every registered route, in registration order.
	pub fn routes(&self) -> Vec<Route> {
		self.inner
			.state
			.read()
			.routes
			.iter()
			.map(|entry| entry.route.clone())
			.collect()
	}

	/// The registered route with `id`.
	pub fn route(&self, id: RouteId) -> Option<Route> {
		self.inner
			.state
			.read()
			.routes
			.iter()
			.find(|entry| entry.route.id == id)
			.map(|entry| entry.route.clone())
	}

	/// Routes whose latest match is exact.
	pub fn exact_routes(&self) -> Vec<Route> {
		self.routes()
			.into_iter()
			.filter(Route::is_exact_match)
			.collect()
	}

	/// Routes with any match.
	pub fn matched_routes(&self) -> Vec<Route> {
		self.routes().into_iter().filter(Route::is_matched).collect()
	}

	/// Returns `true` if any route is registered.
	pub fn has_routes(&self) -> bool {
		!self.inner.state.read().routes.is_empty()
	}

	/// Returns `true` if any route matches exactly.
	pub fn has_exact_route(&self) -> bool {
		self.inner
			.state
			.read()
			.routes
			.iter()
			.any(|entry| entry.route.is_exact_match())
	}

	/// The first route that matches exactly.
	pub fn exact_route(&self) -> Option<Route> {
		self.exact_routes().into_iter().next()
	}

	/// Normalizes `child_url` under `parent_url`.
	pub fn normalize_child_url(&self, child_url: &str, parent_url: &str) -> String {
		match parent_url.strip_prefix('#') {
			Some(parent) => format!("#{}", ensure_basename(child_url, parent)),
			None => ensure_basename(child_url, parent_url),
		}
	}

	/// Strips the root from `path`; under a filename root the result is a
	/// hash URL (`#/path`).
	pub fn adjust_root_view_urls(&self, path: &str) -> String {
		let root = &self.inner.config.root;
		let stripped = if !root.is_empty() && has_basename(path, root) {
			&path[root.len()..]
		} else {
			path
		};
		if is_filename(root) {
			format!("#{}", add_leading_slash(stripped))
		} else {
			add_leading_slash(stripped)
		}
	}

	/// Resolves `url` against `parent_url`, or the current pathname.
	pub fn resolve_pathname(&self, url: &str, parent_url: Option<&str>) -> String {
		match parent_url.filter(|p| !p.is_empty()) {
			Some(parent) => resolve_pathname(url, parent),
			None => resolve_pathname(url, &self.location().pathname),
		}
	}

	/// Renders the href for an application path, basename included.
	pub fn create_href(&self, path: &str) -> String {
		self.inner
			.history
			.create_href(&LocationSegments::parse(path, String::new()))
	}

	/// Pushes `path`, resolved against the current location.
	pub fn go_to_route(&self, path: &str) {
		let pathname = self.set_pending_location(path);
		self.capture_scroll();
		tracing::debug!(pathname = %pathname, "navigating");
		self.inner.history.push(&pathname);
	}

	/// Replaces the current entry with `path`, resolved against the current
	/// location.
	pub fn replace_with_route(&self, path: &str) {
		let pathname = self.set_pending_location(path);
		self.capture_scroll();
		tracing::debug!(pathname = %pathname, "replacing");
		self.inner.history.replace(&pathname);
	}

	fn set_pending_location(&self, path: &str) -> String {
		let mut state = self.inner.state.write();
		let pathname = resolve_pathname(path, &state.location.pathname);
		let key = state.location.key.clone();
		state.location = LocationSegments::parse(&pathname, key);
		pathname
	}

	fn capture_scroll(&self) {
		let key = self.inner.history.location().key;
		self.inner.scroll.capture(&key);
	}

	/// Returns to the previous entry. Does nothing at the start of history.
	pub fn go_back(&self) {
		let Some(previous) = self.inner.history.previous_location() else {
			tracing::debug!("go_back at the start of history ignored");
			return;
		};
		self.inner.state.write().location = previous;
		self.capture_scroll();
		self.inner.history.go_back();
	}

	/// Navigates to the parent of the current location, or back when the
	/// location has no parent.
	pub fn go_to_parent_route(&self) {
		match self.location().parent_path() {
			Some(parent) => self.go_to_route(&parent),
			None => self.go_back(),
		}
	}

	/// Attaches the link interceptor to every `a[href]` under `root` (the body
	/// when `None`) that does not have it yet.
	///
	/// Relative hrefs resolve against `from_path`, or the location's pathname
	/// at click time.
	pub fn capture_inner_links(&self, root: Option<ElementId>, from_path: Option<&str>) {
		let document = &self.inner.context.document;
		let root = root.or_else(|| document.body());
		let anchors = document.query_all(root, LINK_SELECTOR);
		if anchors.is_empty() {
			tracing::warn!(?root, "no links found to capture");
			return;
		}

		for anchor in anchors {
			if document.attribute(anchor, LINK_CAPTURED_ATTRIBUTE).is_some() {
				continue;
			}
			document.set_attribute(anchor, LINK_CAPTURED_ATTRIBUTE, "");

			let weak = self.downgrade();
			let from_path = from_path.map(str::to_string);
			document.add_event_listener(
				anchor,
				"click",
				Arc::new(move |element: ElementId, event: &ClickEvent| match weak.upgrade() {
					Some(router) => router.handle_anchor_click(element, event, from_path.as_deref()),
					None => ClickDisposition::Default,
				}),
			);
		}
	}

	fn handle_anchor_click(
		&self,
		element: ElementId,
		event: &ClickEvent,
		from_path: Option<&str>,
	) -> ClickDisposition {
		if event.is_modified() {
			return ClickDisposition::Default;
		}
		let document = &self.inner.context.document;
		if document.attribute(element, "target").is_some() {
			return ClickDisposition::Default;
		}
		let Some(href) = document.attribute(element, "href") else {
			return ClickDisposition::Default;
		};
		let Some(path) = self.app_path(&href) else {
			return ClickDisposition::Default;
		};

		let from = match from_path {
			Some(from) => from.to_string(),
			None => self.location().pathname,
		};
		self.handle_route_link_click(&path, Some(&from));
		ClickDisposition::PreventDefault
	}

	/// The application path `href` points to, or `None` for other origins and
	/// non-HTTP schemes.
	fn app_path(&self, href: &str) -> Option<String> {
		let origin = self.inner.context.document.origin();
		if !origin.is_empty()
			&& let Some(rest) = href.strip_prefix(origin.as_str())
		{
			return Some(if rest.is_empty() {
				"/".to_string()
			} else {
				rest.to_string()
			});
		}
		let head = href.split(['/', '?', '#']).next().unwrap_or_default();
		if href.starts_with("//") || head.contains(':') {
			return None;
		}
		Some(href.to_string())
	}

	/// Follows a link to `to_path` clicked on a view for `from_path`.
	///
	/// A link to a fragment of the page being shown scrolls that element
	/// into view instead of navigating.
	pub fn handle_route_link_click(&self, to_path: &str, from_path: Option<&str>) {
		let route = if is_absolute(to_path) {
			to_path.to_string()
		} else {
			self.normalize_child_url(to_path, from_path.unwrap_or("/"))
		};

		if let Some(from) = from_path
			&& let Some((page, _)) = route.split_once('#')
			&& strip_trailing_slash(page) == strip_trailing_slash(from)
		{
			let selector = to_path
				.find('#')
				.map(|index| &to_path[index..])
				.unwrap_or_default();
			let document = &self.inner.context.document;
			match document.query(selector) {
				Some(element) => document.scroll_into_view(element, ScrollBehavior::Smooth),
				None => tracing::debug!(selector, "fragment target not found"),
			}
			return;
		}

		self.go_to_route(&route);
	}

	/// Completes start-up. Runs once; later calls return `false`.
	///
	/// Captures the document's links and runs the element load hook when
	/// enabled. At `/` with a start path configured, replaces in the start
	/// path; otherwise emits `initialized`.
	pub fn finalize(&self) -> bool {
		{
			let mut state = self.inner.state.write();
			if state.finalized {
				return false;
			}
			state.finalized = true;
		}

		let context = &self.inner.context;
		let config = &self.inner.config;
		let body = context.document.body();
		self.capture_inner_links(body, None);
		if config.elements_enabled
			&& let (Some(hook), Some(body)) = (&context.load_hook, body)
		{
			hook(body);
		}

		let start_path = config.start_path.as_deref().unwrap_or_default();
		if start_path.len() > 1 && self.location().pathname == "/" {
			self.replace_with_route(&strip_basename(start_path, &config.root));
		} else {
			self.inner
				.notifications
				.emit(INITIALIZED_TOPIC, &RouteEvent::Initialized);
			context
				.events
				.emit(INITIALIZED_TOPIC, &RouteEvent::Initialized);
		}
		true
	}

	/// Scrolls after views have rendered.
	///
	/// An element named by `scroll_to_id` wins when it exists. Otherwise a
	/// location restored from history returns to its captured offset, and
	/// any other location scrolls to the requested or configured offset
	/// after layout.
	pub fn views_updated(&self, options: ViewUpdateOptions) {
		let document = &self.inner.context.document;
		if let Some(id) = options.scroll_to_id.as_deref()
			&& let Some(element) = document.query(&format!("#{}", id))
		{
			document.scroll_into_view(element, ScrollBehavior::Auto);
			return;
		}
		let offset = options
			.scroll_top_offset
			.filter(|offset| *offset != 0.0)
			.unwrap_or(self.inner.config.scroll_top_offset);
		self.scroll_to(offset);
	}

	/// Restores the location's captured offset, or defers a scroll to `offset`.
	pub fn scroll_to(&self, offset: f64) {
		let viewport = Arc::clone(&self.inner.context.viewport);
		if let Some(position) = self.inner.state.read().location.scroll_position {
			tracing::debug!(x = position.x, y = position.y, "restoring scroll position");
			viewport.scroll_to(position.x, position.y);
			return;
		}
		self.inner
			.context
			.tasks
			.defer(Box::new(move || viewport.scroll_to(0.0, offset)));
	}

	/// Writes the document title for a page.
	pub fn adjust_title(&self, page_title: Option<&str>) {
		let document = &self.inner.context.document;
		let app_title = &self.inner.config.app_title;
		match page_title.filter(|title| !title.is_empty()) {
			Some(title) => {
				let suffix = if app_title.is_empty() {
					document.title()
				} else {
					app_title.clone()
				};
				document.set_title(&format!("{} | {}", title, suffix));
			}
			None if !app_title.is_empty() => document.set_title(app_title),
			None => {}
		}
	}

	/// Finishes loading the view of route `id`, rendered at `element`.
	///
	/// Only exact routes act: the title is set, the view scroll runs with
	/// the route's offset and the view's links are captured relative to the
	/// matched URL.
	pub fn route_loaded(&self, id: RouteId, element: ElementId) {
		let Some(route) = self.route(id) else {
			tracing::debug!(%id, "route_loaded for an unknown route");
			return;
		};
		let Some(found) = route.matched.as_ref().filter(|found| found.is_exact) else {
			return;
		};
		self.adjust_title(route.page_title.as_deref());
		self.views_updated(ViewUpdateOptions {
			scroll_to_id: None,
			scroll_top_offset: Some(route.scroll_top_offset),
		});
		self.capture_inner_links(Some(element), Some(&found.url));
	}

	/// Detaches from history and the shared channels.
	pub fn destroy(&self) {
		self.inner.history_subscription.lock().run();
		let listener = self.inner.listener.lock().take();
		if let Some(listener) = listener {
			listener.destroy();
		}
		self.inner.history.destroy();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::location::ScrollPosition;
	use crate::matcher::MatchResults;
	use rstest::{fixture, rstest};
	use wayline_core::{MemoryViewport, TaskQueue, VirtualDocument};

	struct Harness {
		router: Router,
		document: VirtualDocument,
		viewport: MemoryViewport,
		tasks: TaskQueue,
	}

	fn harness_with(config: RouterConfig) -> Harness {
		let document = VirtualDocument::new("https://example.com");
		let viewport = MemoryViewport::new();
		let tasks = TaskQueue::new();
		let context = RouterContext::new(Arc::new(document.clone()), Arc::new(viewport.clone()))
			.with_tasks(Arc::new(tasks.clone()));
		Harness {
			router: Router::new(config, context),
			document,
			viewport,
			tasks,
		}
	}

	#[fixture]
	fn harness() -> Harness {
		harness_with(RouterConfig::default())
	}

	fn noop_setter() -> MatchSetter {
		Arc::new(|_: Option<&MatchResults>| {})
	}

	#[rstest]
	fn test_child_route_normalized_under_parent(harness: Harness) {
		// Arrange
		let parent = RouteDescriptor::new("/docs")
			.with_page_title("Docs")
			.with_transition("fade");
		harness
			.router
			.create_route(parent.clone(), None, noop_setter())
			.unwrap();

		// Act
		let child = harness
			.router
			.create_route(RouteDescriptor::new("intro"), Some(&parent), noop_setter())
			.unwrap();

		// Assert
		let route = harness.router.route(child.id()).unwrap();
		assert_eq!(route.path, "/docs/intro");
		assert_eq!(route.page_title.as_deref(), Some("Docs"));
		assert_eq!(route.transition, "fade");
		assert_eq!(route.parent_path.as_deref(), Some("/docs"));
	}

	#[rstest]
	fn test_transition_falls_back_to_config() {
		let harness = harness_with(RouterConfig::new().with_transition("slide"));
		let registration = harness
			.router
			.create_route(RouteDescriptor::new("/a"), None, noop_setter())
			.unwrap();
		assert_eq!(harness.router.route(registration.id()).unwrap().transition, "slide");
	}

	#[rstest]
	#[case("", "/users", "/users")]
	#[case("/app", "/app/users", "/users")]
	#[case("/index.html", "/users", "#/users")]
	#[case("/index.html", "/index.html/users", "#/users")]
	fn test_adjust_root_view_urls(#[case] root: &str, #[case] path: &str, #[case] expected: &str) {
		let harness = harness_with(RouterConfig::new().with_root(root));
		assert_eq!(harness.router.adjust_root_view_urls(path), expected);
	}

	#[rstest]
	fn test_hash_root_routes_still_match() {
		// Arrange
		let harness = harness_with(RouterConfig::new().with_root("/index.html"));
		let parent = RouteDescriptor::new("/docs");
		harness
			.router
			.create_route(parent.clone(), None, noop_setter())
			.unwrap();
		let child = harness
			.router
			.create_route(RouteDescriptor::new("intro").exact(true), Some(&parent), noop_setter())
			.unwrap();

		// Act
		harness.router.go_to_route("/docs/intro");

		// Assert
		assert_eq!(child.path(), "#/docs/intro");
		assert_eq!(harness.router.exact_route().unwrap().id, child.id());
	}

	#[rstest]
	fn test_dispose_removes_only_that_route(harness: Harness) {
		let first = harness
			.router
			.create_route(RouteDescriptor::new("/a"), None, noop_setter())
			.unwrap();
		let second = harness
			.router
			.create_route(RouteDescriptor::new("/b"), None, noop_setter())
			.unwrap();

		first.dispose();

		let routes = harness.router.routes();
		assert_eq!(routes.len(), 1);
		assert_eq!(routes[0].id, second.id());
	}

	#[rstest]
	fn test_invalid_pattern_is_reported(harness: Harness) {
		let result = harness
			.router
			.create_route(RouteDescriptor::new("/files/*/x"), None, noop_setter());
		assert!(result.is_err());
		assert!(!harness.router.has_routes());
	}

	#[rstest]
	fn test_route_queries(harness: Harness) {
		// Arrange
		let router = &harness.router;
		router
			.create_route(RouteDescriptor::new("/"), None, noop_setter())
			.unwrap();
		router
			.create_route(RouteDescriptor::new("/shop").exact(true), None, noop_setter())
			.unwrap();
		router
			.create_route(RouteDescriptor::new("/blog"), None, noop_setter())
			.unwrap();

		// Act
		router.go_to_route("/shop");

		// Assert
		assert!(router.has_routes());
		assert!(router.has_exact_route());
		assert_eq!(router.matched_routes().len(), 2);
		assert_eq!(router.exact_routes().len(), 1);
		assert_eq!(router.exact_route().unwrap().path, "/shop");
	}

	#[rstest]
	fn test_go_to_route_resolves_relative(harness: Harness) {
		harness.router.go_to_route("/a/b/c");

		harness.router.go_to_route("../sibling");

		assert_eq!(harness.router.location().pathname, "/a/sibling");
		assert_eq!(harness.router.previous_location().unwrap().pathname, "/a/b/c");
	}

	#[rstest]
	fn test_go_back_at_start_is_noop(harness: Harness) {
		harness.router.go_back();
		assert_eq!(harness.router.location().pathname, "/");
		assert_eq!(harness.router.history().len(), 1);
	}

	#[rstest]
	#[case("/a/b", "/a")]
	#[case("/a", "/")]
	fn test_go_to_parent_route(harness: Harness, #[case] start: &str, #[case] expected: &str) {
		harness.router.go_to_route(start);

		harness.router.go_to_parent_route();

		assert_eq!(harness.router.location().pathname, expected);
	}

	#[rstest]
	fn test_go_to_parent_route_at_root_goes_back(harness: Harness) {
		harness.router.go_to_route("/a");
		harness.router.go_to_route("/");

		harness.router.go_to_parent_route();

		assert_eq!(harness.router.location().pathname, "/a");
	}

	#[rstest]
	fn test_back_restores_captured_scroll(harness: Harness) {
		// Arrange
		harness.router.go_to_route("/list");
		harness.viewport.set_offset(0.0, 480.0);
		harness.router.go_to_route("/detail");
		harness.viewport.set_offset(0.0, 0.0);

		// Act
		harness.router.go_back();
		harness.router.views_updated(ViewUpdateOptions::default());

		// Assert
		assert_eq!(
			harness.router.location().scroll_position,
			Some(ScrollPosition::new(0.0, 480.0))
		);
		assert_eq!(harness.viewport.scroll_calls(), vec![(0.0, 480.0)]);
		assert_eq!(harness.tasks.pending(), 0);
	}

	#[rstest]
	fn test_views_updated_defers_offset_scroll() {
		// Arrange
		let harness = harness_with(RouterConfig::new().with_scroll_top_offset(64.0));
		harness.router.go_to_route("/page");

		// Act
		harness.router.views_updated(ViewUpdateOptions::default());

		// Assert
		assert!(harness.viewport.scroll_calls().is_empty());
		assert_eq!(harness.tasks.run_pending(), 1);
		assert_eq!(harness.viewport.scroll_calls(), vec![(0.0, 64.0)]);
	}

	#[rstest]
	fn test_views_updated_prefers_element(harness: Harness) {
		let body = ElementId(0);
		let target = harness.document.append(body, "section", &[("id", "faq")]);

		harness.router.views_updated(ViewUpdateOptions {
			scroll_to_id: Some("faq".to_string()),
			scroll_top_offset: None,
		});

		assert_eq!(
			harness.document.scrolled_into_view(),
			vec![(target, ScrollBehavior::Auto)]
		);
		assert_eq!(harness.tasks.pending(), 0);
	}

	#[rstest]
	fn test_views_updated_missing_element_falls_back(harness: Harness) {
		harness.router.views_updated(ViewUpdateOptions {
			scroll_to_id: Some("missing".to_string()),
			scroll_top_offset: Some(12.0),
		});

		harness.tasks.run_pending();
		assert_eq!(harness.viewport.scroll_calls(), vec![(0.0, 12.0)]);
	}

	#[rstest]
	#[case("Docs", Some("Guide"), "Original", "Guide | Docs")]
	#[case("", Some("Guide"), "Original", "Guide | Original")]
	#[case("Docs", None, "Original", "Docs")]
	#[case("", None, "Original", "Original")]
	fn test_adjust_title(
		#[case] app_title: &str,
		#[case] page_title: Option<&str>,
		#[case] current: &str,
		#[case] expected: &str,
	) {
		let harness = harness_with(RouterConfig::new().with_app_title(app_title));
		harness.document.set_title(current);

		harness.router.adjust_title(page_title);

		assert_eq!(harness.document.title(), expected);
	}

	#[rstest]
	fn test_route_loaded_applies_title_and_captures_links() {
		// Arrange
		let harness = harness_with(RouterConfig::new().with_app_title("Site"));
		let registration = harness
			.router
			.create_route(
				RouteDescriptor::new("/docs").with_page_title("Docs"),
				None,
				noop_setter(),
			)
			.unwrap();
		harness.router.go_to_route("/docs");
		let view = harness.document.append(ElementId(0), "div", &[]);
		let link = harness.document.append(view, "a", &[("href", "intro")]);

		// Act
		harness.router.route_loaded(registration.id(), view);
		let disposition = harness.document.click(link, ClickEvent::plain());

		// Assert
		assert_eq!(harness.document.title(), "Docs | Site");
		assert_eq!(disposition, ClickDisposition::PreventDefault);
		assert_eq!(harness.router.location().pathname, "/docs/intro");
	}

	#[rstest]
	fn test_route_loaded_resolves_links_against_matched_url(harness: Harness) {
		// Arrange
		let registration = harness
			.router
			.create_route(RouteDescriptor::new("/users/:id").exact(true), None, noop_setter())
			.unwrap();
		harness.router.go_to_route("/users/42");
		let view = harness.document.append(ElementId(0), "section", &[]);
		let link = harness.document.append(view, "a", &[("href", "edit")]);

		// Act
		harness.router.route_loaded(registration.id(), view);
		harness.document.click(link, ClickEvent::plain());

		// Assert
		assert_eq!(harness.router.location().pathname, "/users/42/edit");
	}

	#[rstest]
	fn test_finalize_runs_once_and_emits_initialized(harness: Harness) {
		let seen = Arc::new(Mutex::new(0usize));
		let sink = Arc::clone(&seen);
		let _subscription = harness
			.router
			.events()
			.on(INITIALIZED_TOPIC, move |_: &RouteEvent| *sink.lock() += 1);

		assert!(harness.router.finalize());
		assert!(!harness.router.finalize());

		assert_eq!(*seen.lock(), 1);
	}

	#[rstest]
	fn test_finalize_replaces_in_start_path() {
		// Arrange
		let harness = harness_with(
			RouterConfig::new()
				.with_root("/app")
				.with_start_path("/app/welcome"),
		);
		let seen = Arc::new(Mutex::new(0usize));
		let sink = Arc::clone(&seen);
		let _subscription = harness
			.router
			.events()
			.on(INITIALIZED_TOPIC, move |_: &RouteEvent| *sink.lock() += 1);

		// Act
		harness.router.finalize();

		// Assert
		assert_eq!(harness.router.location().pathname, "/welcome");
		assert_eq!(harness.router.history().len(), 1);
		assert_eq!(*seen.lock(), 0);
	}

	#[rstest]
	fn test_finalize_runs_load_hook_when_enabled() {
		let document = VirtualDocument::new("https://example.com");
		let hooked = Arc::new(Mutex::new(Vec::new()));
		let sink = Arc::clone(&hooked);
		let context = RouterContext::new(Arc::new(document), Arc::new(MemoryViewport::new()))
			.with_load_hook(Arc::new(move |element: ElementId| sink.lock().push(element)));
		let router = Router::new(RouterConfig::new().with_elements_enabled(true), context);

		router.finalize();

		assert_eq!(*hooked.lock(), vec![ElementId(0)]);
	}

	#[rstest]
	fn test_create_href_includes_basename() {
		let harness = harness_with(RouterConfig::new().with_root("/app"));
		assert_eq!(harness.router.create_href("/users?x=1"), "/app/users?x=1");
	}

	#[rstest]
	fn test_data_providers_registered_once(harness: Harness) {
		harness.router.enable_data_providers();

		let names = harness.router.inner.context.providers.names();
		assert_eq!(names, vec!["query", "route", "visits"]);
		assert_eq!(harness.router.inner.data_providers.read().len(), 3);
	}

	#[rstest]
	fn test_destroy_stops_tracking_history(harness: Harness) {
		let history = harness.router.history();

		harness.router.destroy();
		history.push("/elsewhere");

		assert_eq!(harness.router.location().pathname, "/");
		assert!(!harness.router.is_action_listener_enabled());
	}
}
