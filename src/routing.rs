//! The route resolution and history engine.
//!
//! # Examples
//!
//! ```rust
//! use wayline::routing::matcher::{MatchOptions, match_pathname};
//! use wayline::routing::pattern::PathPattern;
//!
//! let pattern = PathPattern::new("/users/:id").unwrap();
//! let found = match_pathname("/users/7", &pattern, MatchOptions::exact()).unwrap();
//! assert_eq!(found.params["id"], "7");
//! ```

pub use wayline_routing::*;
