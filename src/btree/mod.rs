//! # B+Tree Index
//!
//! A disk-resident B+tree over 4096-byte pages, one node per page. Leaf
//! nodes hold the rows in fixed-width cells; interior nodes hold separator
//! keys and child page numbers. The root is pinned to page 0 for the life
//! of the file: splits that outgrow the root move its contents aside
//! rather than relocating the root itself.
//!
//! ## Node Types
//!
//! - **Leaf** (`leaf`): up to 13 cells of `{key, serialized row}`, sorted by
//!   key, chained left-to-right through a next-sibling pointer.
//! - **Interior** (`interior`): up to 3 cells of `{child page, separator}`
//!   plus a rightmost child. The separator for a child is the maximum key
//!   of its subtree.
//!
//! ## Module Organization
//!
//! - `node`: node kinds and the 6-byte common header
//! - `leaf` / `interior`: typed read and write views over raw pages
//! - `cursor`: a `(page, cell)` position with an end-of-table flag
//! - `tree`: search, insertion, splits, scans, rendering

mod cursor;
mod interior;
mod leaf;
mod node;
mod tree;

pub use cursor::Cursor;
pub use tree::{BTree, InsertOutcome};
