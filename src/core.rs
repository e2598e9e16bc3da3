//! Host capabilities.
//!
//! # Examples
//!
//! ```rust
//! use wayline::core::signals::EventChannel;
//! use wayline::core::storage::InMemoryProvider;
//! ```

pub use wayline_core::*;
