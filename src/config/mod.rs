//! Layout constants and their compile-time consistency checks.
//!
//! Import geometry from here rather than redefining it locally:
//!
//! ```ignore
//! use crate::config::{PAGE_SIZE, LEAF_NODE_MAX_CELLS};
//! ```

mod constants;

pub use constants::*;
