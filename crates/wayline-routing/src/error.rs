//! Error types for routing.

use thiserror::Error;
use wayline_core::StorageError;

/// Error type for router operations.
///
/// Navigation itself never fails: duplicate routes, missing elements and
/// storage trouble are logged and skipped. Only construction-time work
/// (compiling a route pattern, reading configuration) and explicit
/// persistence calls report errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
	/// A route pattern was rejected.
	#[error("Invalid route pattern '{pattern}': {reason}")]
	InvalidPattern {
		/// The rejected pattern.
		pattern: String,
		/// Why it was rejected.
		reason: String,
	},

	/// Router configuration could not be read.
	#[error("Invalid router configuration: {0}")]
	InvalidConfig(String),

	/// A visit strategy name was not recognised.
	#[error("Unknown visit strategy '{0}'")]
	UnknownVisitStrategy(String),

	/// A storage provider failed.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
}

/// Result alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::time::Duration;

	#[rstest]
	fn test_invalid_pattern_display() {
		let err = RouterError::InvalidPattern {
			pattern: "/users/:id".to_string(),
			reason: "too long".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"Invalid route pattern '/users/:id': too long"
		);
	}

	#[rstest]
	fn test_unknown_visit_strategy_display() {
		let err = RouterError::UnknownVisitStrategy("never".to_string());
		assert_eq!(err.to_string(), "Unknown visit strategy 'never'");
	}

	#[rstest]
	fn test_storage_error_converts() {
		let err: RouterError = StorageError::Timeout(Duration::from_millis(10)).into();
		assert!(matches!(err, RouterError::Storage(StorageError::Timeout(_))));
		assert!(err.to_string().starts_with("Storage error:"));
	}
}
