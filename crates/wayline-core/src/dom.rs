//! Document and viewport capabilities.
//!
//! The router discovers links, attaches click interceptors, scrolls elements
//! into view and edits the document title. Those operations go through
//! [`ElementQueryProvider`]; reading and writing the scroll offset goes
//! through [`Viewport`]. A browser binding implements both on top of the real
//! DOM. [`VirtualDocument`] and [`MemoryViewport`] implement them in memory.
//!
//! Elements are addressed by opaque [`ElementId`] handles.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Opaque handle to an element owned by an [`ElementQueryProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Modifier state of a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickEvent {
	/// Meta (command) key held.
	pub meta_key: bool,
	/// Alt (option) key held.
	pub alt_key: bool,
	/// Control key held.
	pub ctrl_key: bool,
	/// Shift key held.
	pub shift_key: bool,
}

impl ClickEvent {
	/// A click without modifiers.
	pub fn plain() -> Self {
		Self::default()
	}

	/// Returns `true` if any modifier is held (new tab / new window intent).
	pub fn is_modified(&self) -> bool {
		self.meta_key || self.alt_key || self.ctrl_key || self.shift_key
	}
}

/// What an event handler decided about the browser's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDisposition {
	/// Let the default action proceed.
	Default,
	/// The handler took over; suppress the default action.
	PreventDefault,
}

/// How an element is brought into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
	/// Jump immediately.
	Auto,
	/// Animate the scroll.
	Smooth,
}

/// Event handler attached to an element.
pub type ElementHandler = Arc<dyn Fn(ElementId, &ClickEvent) -> ClickDisposition + Send + Sync>;

/// Element discovery and manipulation.
pub trait ElementQueryProvider: Send + Sync {
	/// Origin of the document, e.g. `https://example.com`.
	fn origin(&self) -> String;

	/// The document body, if the document has one.
	fn body(&self) -> Option<ElementId>;

	/// All elements under `root` (or the whole document) matching `selector`,
	/// in document order.
	fn query_all(&self, root: Option<ElementId>, selector: &str) -> Vec<ElementId>;

	/// The first element in the document matching `selector`.
	fn query(&self, selector: &str) -> Option<ElementId> {
		self.query_all(None, selector).into_iter().next()
	}

	/// Reads an attribute.
	fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

	/// Writes an attribute.
	fn set_attribute(&self, element: ElementId, name: &str, value: &str);

	/// Attaches `handler` for `event` on `element`.
	fn add_event_listener(&self, element: ElementId, event: &str, handler: ElementHandler);

	/// Scrolls `element` into view.
	fn scroll_into_view(&self, element: ElementId, behavior: ScrollBehavior);

	/// Current document title.
	fn title(&self) -> String;

	/// Replaces the document title.
	fn set_title(&self, title: &str);
}

/// Window scroll offset.
pub trait Viewport: Send + Sync {
	/// Current `(x, y)` scroll offset.
	fn scroll_offset(&self) -> (f64, f64);

	/// Scrolls the window to `(x, y)`.
	fn scroll_to(&self, x: f64, y: f64);
}

struct VirtualElement {
	tag: String,
	attributes: BTreeMap<String, String>,
	children: Vec<ElementId>,
	listeners: Vec<(String, ElementHandler)>,
}

struct DocumentState {
	origin: String,
	title: String,
	elements: Vec<VirtualElement>,
	scrolled_into_view: Vec<(ElementId, ScrollBehavior)>,
}

impl DocumentState {
	fn element(&self, id: ElementId) -> Option<&VirtualElement> {
		usize::try_from(id.0)
			.ok()
			.and_then(|index| self.elements.get(index))
	}

	fn element_mut(&mut self, id: ElementId) -> Option<&mut VirtualElement> {
		usize::try_from(id.0)
			.ok()
			.and_then(|index| self.elements.get_mut(index))
	}

	fn descendants(&self, root: ElementId, out: &mut Vec<ElementId>) {
		if let Some(element) = self.element(root) {
			for child in &element.children {
				out.push(*child);
				self.descendants(*child, out);
			}
		}
	}
}

/// One compound selector: `tag`, `#id`, `tag[attr]`, `[attr]` or `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SimpleSelector {
	tag: Option<String>,
	id: Option<String>,
	attribute: Option<String>,
}

impl SimpleSelector {
	fn parse(selector: &str) -> Option<Self> {
		let selector = selector.trim();
		if selector.is_empty() {
			return None;
		}
		if let Some(id) = selector.strip_prefix('#') {
			return Some(Self {
				tag: None,
				id: Some(id.to_string()),
				attribute: None,
			});
		}
		let (tag, attribute) = match selector.find('[') {
			Some(start) => {
				let end = selector[start..].find(']')? + start;
				(&selector[..start], Some(selector[start + 1..end].trim().to_string()))
			}
			None => (selector, None),
		};
		let tag = match tag {
			"" | "*" => None,
			tag => Some(tag.to_ascii_lowercase()),
		};
		Some(Self {
			tag,
			id: None,
			attribute,
		})
	}

	fn matches(&self, element: &VirtualElement) -> bool {
		if let Some(tag) = &self.tag
			&& &element.tag != tag
		{
			return false;
		}
		if let Some(id) = &self.id
			&& element.attributes.get("id") != Some(id)
		{
			return false;
		}
		if let Some(attribute) = &self.attribute
			&& !element.attributes.contains_key(attribute)
		{
			return false;
		}
		true
	}
}

/// In-memory element tree implementing [`ElementQueryProvider`].
///
/// The tree starts with a single `body` element. Clicks are dispatched with
/// [`VirtualDocument::click`], which reports whether any handler prevented
/// the default action.
#[derive(Clone)]
pub struct VirtualDocument {
	state: Arc<RwLock<DocumentState>>,
}

impl std::fmt::Debug for VirtualDocument {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.read();
		f.debug_struct("VirtualDocument")
			.field("origin", &state.origin)
			.field("title", &state.title)
			.field("elements", &state.elements.len())
			.finish()
	}
}

impl VirtualDocument {
	/// Creates a document with an empty body.
	pub fn new(origin: impl Into<String>) -> Self {
		let body = VirtualElement {
			tag: "body".to_string(),
			attributes: BTreeMap::new(),
			children: Vec::new(),
			listeners: Vec::new(),
		};
		Self {
			state: Arc::new(RwLock::new(DocumentState {
				origin: origin.into(),
				title: String::new(),
				elements: vec![body],
				scrolled_into_view: Vec::new(),
			})),
		}
	}

	/// Appends a new `tag` element with `attributes` under `parent`.
	pub fn append(&self, parent: ElementId, tag: &str, attributes: &[(&str, &str)]) -> ElementId {
		let mut state = self.state.write();
		let id = ElementId(state.elements.len() as u64);
		state.elements.push(VirtualElement {
			tag: tag.to_ascii_lowercase(),
			attributes: attributes
				.iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
			children: Vec::new(),
			listeners: Vec::new(),
		});
		if let Some(parent) = state.element_mut(parent) {
			parent.children.push(id);
		}
		id
	}

	/// Dispatches a click on `element`.
	///
	/// Every handler runs; the result is [`ClickDisposition::PreventDefault`]
	/// if at least one of them asked for it.
	pub fn click(&self, element: ElementId, event: ClickEvent) -> ClickDisposition {
		let handlers: Vec<ElementHandler> = {
			let state = self.state.read();
			match state.element(element) {
				Some(el) => el
					.listeners
					.iter()
					.filter(|(name, _)| name == "click")
					.map(|(_, handler)| Arc::clone(handler))
					.collect(),
				None => return ClickDisposition::Default,
			}
		};

		let mut disposition = ClickDisposition::Default;
		for handler in handlers {
			if handler(element, &event) == ClickDisposition::PreventDefault {
				disposition = ClickDisposition::PreventDefault;
			}
		}
		disposition
	}

	/// Number of handlers attached to `element` for `event`.
	pub fn listener_count(&self, element: ElementId, event: &str) -> usize {
		self.state
			.read()
			.element(element)
			.map(|el| el.listeners.iter().filter(|(name, _)| name == event).count())
			.unwrap_or(0)
	}

	/// Elements scrolled into view so far, oldest first.
	pub fn scrolled_into_view(&self) -> Vec<(ElementId, ScrollBehavior)> {
		self.state.read().scrolled_into_view.clone()
	}
}

impl ElementQueryProvider for VirtualDocument {
	fn origin(&self) -> String {
		self.state.read().origin.clone()
	}

	fn body(&self) -> Option<ElementId> {
		Some(ElementId(0))
	}

	fn query_all(&self, root: Option<ElementId>, selector: &str) -> Vec<ElementId> {
		let selectors: Vec<SimpleSelector> = selector
			.split(',')
			.filter_map(SimpleSelector::parse)
			.collect();
		if selectors.is_empty() {
			return Vec::new();
		}

		let state = self.state.read();
		let mut candidates = Vec::new();
		state.descendants(root.unwrap_or(ElementId(0)), &mut candidates);
		candidates
			.into_iter()
			.filter(|id| {
				state
					.element(*id)
					.is_some_and(|el| selectors.iter().any(|s| s.matches(el)))
			})
			.collect()
	}

	fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
		self.state
			.read()
			.element(element)
			.and_then(|el| el.attributes.get(name).cloned())
	}

	fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
		if let Some(el) = self.state.write().element_mut(element) {
			el.attributes.insert(name.to_string(), value.to_string());
		}
	}

	fn add_event_listener(&self, element: ElementId, event: &str, handler: ElementHandler) {
		if let Some(el) = self.state.write().element_mut(element) {
			el.listeners.push((event.to_string(), handler));
		}
	}

	fn scroll_into_view(&self, element: ElementId, behavior: ScrollBehavior) {
		self.state
			.write()
			.scrolled_into_view
			.push((element, behavior));
	}

	fn title(&self) -> String {
		self.state.read().title.clone()
	}

	fn set_title(&self, title: &str) {
		self.state.write().title = title.to_string();
	}
}

/// In-memory [`Viewport`] that records every `scroll_to` call.
#[derive(Debug, Clone, Default)]
pub struct MemoryViewport {
	offset: Arc<RwLock<(f64, f64)>>,
	scroll_calls: Arc<RwLock<Vec<(f64, f64)>>>,
}

impl MemoryViewport {
	/// Creates a viewport scrolled to the origin.
	pub fn new() -> Self {
		Self::default()
	}

	/// Simulates the user scrolling to `(x, y)`.
	pub fn set_offset(&self, x: f64, y: f64) {
		*self.offset.write() = (x, y);
	}

	/// Every programmatic `scroll_to`, oldest first.
	pub fn scroll_calls(&self) -> Vec<(f64, f64)> {
		self.scroll_calls.read().clone()
	}
}

impl Viewport for MemoryViewport {
	fn scroll_offset(&self) -> (f64, f64) {
		*self.offset.read()
	}

	fn scroll_to(&self, x: f64, y: f64) {
		*self.offset.write() = (x, y);
		self.scroll_calls.write().push((x, y));
	}
}
