//! # Page and Row Geometry
//!
//! This module centralizes the on-disk layout constants. Values that derive
//! from each other are co-located so a change in one place cannot silently
//! break a dependent value; the struct definitions in `btree` and `records`
//! carry compile-time assertions back against these numbers.
//!
//! ## Dependency Graph
//!
//! ```text
//! PAGE_SIZE (4096 bytes)
//!       │
//!       ├─> LEAF_NODE_SPACE_FOR_CELLS (PAGE_SIZE - LEAF_NODE_METADATA_SIZE)
//!       │         │
//!       │         └─> LEAF_NODE_MAX_CELLS (space / cell size)
//!       │                   │
//!       │                   └─> LEAF_NODE_{LEFT,RIGHT}_SPLIT_COUNT
//!       │
//!       └─> TABLE_MAX_PAGES bounds the whole file at 100 pages
//!
//! ROW_SIZE (293 bytes)
//!       │
//!       └─> LEAF_NODE_CELL_SIZE (key + row)
//! ```
//!
//! ## Node Header Layouts
//!
//! Every node starts with a 6-byte common header:
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----------------------------------------
//! 0       1     node kind (0x01 interior, 0x02 leaf)
//! 1       1     is_root flag
//! 2       4     parent page number (ignored on the root)
//! ```
//!
//! Leaf nodes extend it to 14 bytes with `num_cells` and the next-sibling
//! page number; interior nodes extend it to 14 bytes with `num_keys` and the
//! rightmost child page number.

/// Size of each database page in bytes. The fundamental unit of I/O.
pub const PAGE_SIZE: usize = 4096;

/// Upper bound on pages per file; the pager refuses page numbers past this.
pub const TABLE_MAX_PAGES: usize = 100;

/// The tree root always lives in page 0.
pub const ROOT_PAGE_NUM: u32 = 0;

// ============================================================================
// ROW LAYOUT
// Strings live in fixed-width, NUL-terminated slots so every row serializes
// to the same number of bytes.
// ============================================================================

/// Longest accepted username, in bytes.
pub const USERNAME_MAX_LEN: usize = 32;

/// Longest accepted email, in bytes.
pub const EMAIL_MAX_LEN: usize = 255;

/// On-page username slot: the maximum length plus a terminating NUL.
pub const USERNAME_SLOT_SIZE: usize = USERNAME_MAX_LEN + 1;

/// On-page email slot: the maximum length plus a terminating NUL.
pub const EMAIL_SLOT_SIZE: usize = EMAIL_MAX_LEN + 1;

/// Serialized row id width.
pub const ID_SIZE: usize = 4;

/// Serialized size of one row: id + username slot + email slot.
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SLOT_SIZE + EMAIL_SLOT_SIZE;

// ============================================================================
// NODE HEADER SIZES
// ============================================================================

/// Common header shared by both node kinds: kind byte, root flag, parent.
pub const COMMON_NODE_METADATA_SIZE: usize = 1 + 1 + 4;

/// Leaf header: common header + num_cells + next-leaf page number.
pub const LEAF_NODE_METADATA_SIZE: usize = COMMON_NODE_METADATA_SIZE + 4 + 4;

/// Interior header: common header + num_keys + right-child page number.
pub const INTERIOR_NODE_METADATA_SIZE: usize = COMMON_NODE_METADATA_SIZE + 4 + 4;

// ============================================================================
// LEAF CAPACITY
// ============================================================================

/// Width of a cell key.
pub const LEAF_NODE_KEY_SIZE: usize = 4;

/// One leaf cell: key followed by a serialized row.
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + ROW_SIZE;

/// Bytes available for cells after the leaf header.
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_METADATA_SIZE;

/// Cells that fit in one leaf.
pub const LEAF_NODE_MAX_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;

/// Cells the new (right) sibling receives in a leaf split.
pub const LEAF_NODE_RIGHT_SPLIT_COUNT: usize = (LEAF_NODE_MAX_CELLS + 1) / 2;

/// Cells the original (left) leaf keeps in a split.
pub const LEAF_NODE_LEFT_SPLIT_COUNT: usize =
    (LEAF_NODE_MAX_CELLS + 1) - LEAF_NODE_RIGHT_SPLIT_COUNT;

// ============================================================================
// INTERIOR CAPACITY
// ============================================================================

/// One interior cell: child page number followed by its separator key.
pub const INTERIOR_NODE_CELL_SIZE: usize = 4 + 4;

/// Interior cell limit. Deliberately far below what a page could hold so
/// multi-level behavior shows up after a handful of splits; tests depend on
/// this value.
pub const INTERIOR_NODE_MAX_CELLS: usize = 3;

const _: () = assert!(
    LEAF_NODE_LEFT_SPLIT_COUNT + LEAF_NODE_RIGHT_SPLIT_COUNT == LEAF_NODE_MAX_CELLS + 1,
    "split counts must redistribute every cell plus the new one"
);

const _: () = assert!(
    LEAF_NODE_LEFT_SPLIT_COUNT >= 1 && LEAF_NODE_RIGHT_SPLIT_COUNT >= 1,
    "a split must leave both siblings non-empty"
);

const _: () = assert!(
    INTERIOR_NODE_METADATA_SIZE + (INTERIOR_NODE_MAX_CELLS + 1) * INTERIOR_NODE_CELL_SIZE
        <= PAGE_SIZE,
    "interior cells must fit in a page even mid-overflow"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_size_is_293_bytes() {
        assert_eq!(ROW_SIZE, 293);
    }

    #[test]
    fn header_sizes_match_layout() {
        assert_eq!(COMMON_NODE_METADATA_SIZE, 6);
        assert_eq!(LEAF_NODE_METADATA_SIZE, 14);
        assert_eq!(INTERIOR_NODE_METADATA_SIZE, 14);
    }

    #[test]
    fn leaf_holds_thirteen_cells() {
        assert_eq!(LEAF_NODE_CELL_SIZE, 297);
        assert_eq!(LEAF_NODE_SPACE_FOR_CELLS, 4082);
        assert_eq!(LEAF_NODE_MAX_CELLS, 13);
    }

    #[test]
    fn split_counts_cover_fourteen_cells() {
        assert_eq!(LEAF_NODE_LEFT_SPLIT_COUNT, 7);
        assert_eq!(LEAF_NODE_RIGHT_SPLIT_COUNT, 7);
    }
}
