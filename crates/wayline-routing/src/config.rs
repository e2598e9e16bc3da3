//! Router configuration.
//!
//! Configuration is fixed at construction. It can be built in code with the
//! `with_*` methods or read from TOML:
//!
//! ```rust
//! use wayline_routing::RouterConfig;
//!
//! let config = RouterConfig::from_toml_str(
//!     r#"
//!     root = "/app"
//!     app_title = "Docs"
//!     start_path = "/app/welcome"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.root, "/app");
//! assert_eq!(config.scroll_top_offset, 0.0);
//! ```

use crate::error::{Result, RouterError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for storage-backed queries, in milliseconds.
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 200;

/// Construction-time router settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
	/// Basename every application path is hosted under.
	///
	/// When the basename names a file (`/index.html`), root routes use hash
	/// URLs (`#/path`).
	pub root: String,
	/// Suffix appended to page titles.
	pub app_title: String,
	/// Transition inherited by routes that do not declare one.
	pub transition: String,
	/// Scroll offset applied after a view update when the route has none.
	pub scroll_top_offset: f64,
	/// Path to replace in when the first finalize happens at `/`.
	pub start_path: Option<String>,
	/// Create the navigation action listener at construction.
	pub actions_enabled: bool,
	/// Run the element load hook on the first finalize.
	pub elements_enabled: bool,
	/// Timeout for storage-backed queries, in milliseconds.
	pub provider_timeout_ms: u64,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			root: String::new(),
			app_title: String::new(),
			transition: String::new(),
			scroll_top_offset: 0.0,
			start_path: None,
			actions_enabled: true,
			elements_enabled: false,
			provider_timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
		}
	}
}

impl RouterConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a TOML document.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidConfig`] if the document is not valid TOML
	/// or a field has the wrong type.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		toml::from_str(source).map_err(|e| RouterError::InvalidConfig(e.to_string()))
	}

	/// Sets the basename.
	pub fn with_root(mut self, root: impl Into<String>) -> Self {
		self.root = root.into();
		self
	}

	/// Sets the application title suffix.
	pub fn with_app_title(mut self, app_title: impl Into<String>) -> Self {
		self.app_title = app_title.into();
		self
	}

	/// Sets the default transition.
	pub fn with_transition(mut self, transition: impl Into<String>) -> Self {
		self.transition = transition.into();
		self
	}

	/// Sets the default scroll offset.
	pub fn with_scroll_top_offset(mut self, offset: f64) -> Self {
		self.scroll_top_offset = offset;
		self
	}

	/// Sets the start path.
	pub fn with_start_path(mut self, start_path: impl Into<String>) -> Self {
		self.start_path = Some(start_path.into());
		self
	}

	/// Enables or disables the navigation action listener.
	pub fn with_actions_enabled(mut self, enabled: bool) -> Self {
		self.actions_enabled = enabled;
		self
	}

	/// Enables or disables the element load hook.
	pub fn with_elements_enabled(mut self, enabled: bool) -> Self {
		self.elements_enabled = enabled;
		self
	}

	/// Sets the storage timeout.
	pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
		self.provider_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
		self
	}

	/// Storage timeout as a [`Duration`].
	pub fn provider_timeout(&self) -> Duration {
		Duration::from_millis(self.provider_timeout_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let config = RouterConfig::default();
		assert_eq!(config.root, "");
		assert!(config.actions_enabled);
		assert!(!config.elements_enabled);
		assert_eq!(config.provider_timeout(), Duration::from_millis(200));
	}

	#[rstest]
	fn test_from_toml_partial_keeps_defaults() {
		// Arrange
		let source = r#"
			app_title = "Docs"
			scroll_top_offset = 42.5
			actions_enabled = false
		"#;

		// Act
		let config = RouterConfig::from_toml_str(source).unwrap();

		// Assert
		assert_eq!(config.app_title, "Docs");
		assert_eq!(config.scroll_top_offset, 42.5);
		assert!(!config.actions_enabled);
		assert_eq!(config.provider_timeout_ms, DEFAULT_PROVIDER_TIMEOUT_MS);
		assert_eq!(config.start_path, None);
	}

	#[rstest]
	fn test_from_toml_rejects_wrong_type() {
		let result = RouterConfig::from_toml_str("scroll_top_offset = \"far\"");
		assert!(matches!(result, Err(RouterError::InvalidConfig(_))));
	}

	#[rstest]
	fn test_builder_methods() {
		let config = RouterConfig::new()
			.with_root("/app")
			.with_transition("fade")
			.with_start_path("/app/home")
			.with_provider_timeout(Duration::from_millis(5));

		assert_eq!(config.root, "/app");
		assert_eq!(config.transition, "fade");
		assert_eq!(config.start_path.as_deref(), Some("/app/home"));
		assert_eq!(config.provider_timeout_ms, 5);
	}
}
