//! # Cursor
//!
//! A cursor is a plain position (page number, cell index, end-of-table
//! flag) produced by `find` or `scan_start` and advanced by the tree. It
//! owns nothing: any insert that splits a leaf invalidates outstanding
//! cursors, so callers re-seek rather than hold one across mutations.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub page_num: u32,
    pub cell_num: u32,
    /// Set once the cursor has moved past the last cell of the last leaf.
    pub end_of_table: bool,
}
