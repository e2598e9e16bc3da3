//! Error types for host capabilities.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by key/value providers.
///
/// The routing engine treats every variant as "no data"; the error exists so
/// that providers can report what went wrong and callers can log it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
	/// The provider did not answer within the configured timeout.
	#[error("provider timed out after {0:?}")]
	Timeout(Duration),

	/// The provider is not available (disabled, detached or never registered).
	#[error("provider unavailable: {0}")]
	Unavailable(String),

	/// The provider failed while reading or writing a key.
	#[error("provider failure for key '{key}': {message}")]
	Backend {
		/// Key being read or written.
		key: String,
		/// Provider specific failure message.
		message: String,
	},
}

/// Result alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_timeout_display() {
		let err = StorageError::Timeout(Duration::from_millis(200));
		assert_eq!(err.to_string(), "provider timed out after 200ms");
	}

	#[rstest]
	fn test_backend_display() {
		let err = StorageError::Backend {
			key: "visits".to_string(),
			message: "quota exceeded".to_string(),
		};
		assert!(err.to_string().contains("'visits'"));
		assert!(err.to_string().contains("quota exceeded"));
	}
}
