//! # Leaf Nodes
//!
//! Leaf nodes hold the table's actual rows. Cells are fixed-width, a 4-byte
//! key followed by a 293-byte serialized row, stored contiguously after the
//! header in ascending key order, so the address of cell *i* is pure offset
//! arithmetic and search is a binary search over keys.
//!
//! ## Page Layout
//!
//! ```text
//! +---------------------------+
//! | NodeHeader (6 bytes)      |  kind / is_root / parent
//! +---------------------------+
//! | num_cells (4 bytes)       |
//! | next_leaf (4 bytes)       |  0 = no right sibling
//! +---------------------------+
//! | Cell 0: key | row         |  297 bytes each
//! | Cell 1: key | row         |
//! | ...                       |
//! | (up to 13 cells)          |
//! +---------------------------+
//! | unused tail (23 bytes)    |
//! +---------------------------+
//! ```
//!
//! Leaves form a singly linked list in ascending key order through
//! `next_leaf`; page 0 never appears as a sibling because the root cannot be
//! anyone's right neighbor, which is what lets 0 double as "none".
//!
//! ## Read vs. Write Views
//!
//! [`LeafNode`] borrows a page immutably and serves lookups; [`LeafNodeMut`]
//! borrows it mutably and adds initialization and cell insertion. Both
//! validate the kind byte on construction, so reads never reinterpret an
//! interior page or an uninitialized one.

use eyre::{ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::{
    LEAF_NODE_CELL_SIZE, LEAF_NODE_KEY_SIZE, LEAF_NODE_MAX_CELLS, LEAF_NODE_METADATA_SIZE,
    PAGE_SIZE, ROW_SIZE,
};

use super::node::{NodeHeader, NodeKind};

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
struct LeafHeader {
    kind: u8,
    is_root: u8,
    parent: U32,
    num_cells: U32,
    next_leaf: U32,
}

const _: () = assert!(size_of::<LeafHeader>() == LEAF_NODE_METADATA_SIZE);

/// Outcome of a key search inside one node: the exact cell, or the
/// lower-bound index where the key would be inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    Found(usize),
    NotFound(usize),
}

#[derive(Debug)]
pub struct LeafNode<'a> {
    data: &'a [u8],
}

pub struct LeafNodeMut<'a> {
    data: &'a mut [u8],
}

fn cell_offset(index: usize) -> usize {
    LEAF_NODE_METADATA_SIZE + index * LEAF_NODE_CELL_SIZE
}

impl<'a> LeafNode<'a> {
    pub fn from_page(data: &'a [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = NodeHeader::from_bytes(data)?;
        ensure!(
            header.kind() == NodeKind::Leaf,
            "expected leaf node, got {:?}",
            header.kind()
        );
        Ok(Self { data })
    }

    fn header(&self) -> &LeafHeader {
        // INVARIANT: size and kind validated in from_page
        LeafHeader::ref_from_bytes(&self.data[..LEAF_NODE_METADATA_SIZE]).unwrap()
    }

    pub fn num_cells(&self) -> u32 {
        self.header().num_cells.get()
    }

    pub fn next_leaf(&self) -> u32 {
        self.header().next_leaf.get()
    }

    pub fn is_root(&self) -> bool {
        self.header().is_root != 0
    }

    pub fn parent(&self) -> u32 {
        self.header().parent.get()
    }

    pub fn key_at(&self, index: usize) -> Result<u32> {
        ensure!(
            index < self.num_cells() as usize,
            "cell index {} out of bounds (num_cells={})",
            index,
            self.num_cells()
        );
        let offset = cell_offset(index);
        let key = U32::ref_from_bytes(&self.data[offset..offset + LEAF_NODE_KEY_SIZE])
            .map_err(|e| eyre::eyre!("failed to read cell key at index {}: {:?}", index, e))?;
        Ok(key.get())
    }

    pub fn value_at(&self, index: usize) -> Result<&'a [u8]> {
        ensure!(
            index < self.num_cells() as usize,
            "cell index {} out of bounds (num_cells={})",
            index,
            self.num_cells()
        );
        let start = cell_offset(index) + LEAF_NODE_KEY_SIZE;
        Ok(&self.data[start..start + ROW_SIZE])
    }

    /// Binary search over the cell keys.
    pub fn find_key(&self, key: u32) -> SearchResult {
        let mut min_index = 0usize;
        let mut one_past_max = self.num_cells() as usize;

        while min_index != one_past_max {
            let index = (min_index + one_past_max) / 2;
            // INVARIANT: index < num_cells, so key_at cannot fail
            let key_at_index = self.key_at(index).unwrap();
            if key == key_at_index {
                return SearchResult::Found(index);
            }
            if key < key_at_index {
                one_past_max = index;
            } else {
                min_index = index + 1;
            }
        }

        SearchResult::NotFound(min_index)
    }

    pub fn max_key(&self) -> Result<u32> {
        ensure!(self.num_cells() > 0, "empty leaf has no max key");
        self.key_at(self.num_cells() as usize - 1)
    }
}

impl<'a> LeafNodeMut<'a> {
    pub fn from_page(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = NodeHeader::from_bytes(data)?;
        ensure!(
            header.kind() == NodeKind::Leaf,
            "expected leaf node, got {:?}",
            header.kind()
        );
        Ok(Self { data })
    }

    /// Stamps an empty, non-root leaf over the page.
    pub fn init(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );

        let header = LeafHeader::mut_from_bytes(&mut data[..LEAF_NODE_METADATA_SIZE])
            .map_err(|e| eyre::eyre!("failed to write leaf header: {:?}", e))?;
        header.kind = NodeKind::Leaf as u8;
        header.is_root = 0;
        header.parent = U32::new(0);
        header.num_cells = U32::new(0);
        header.next_leaf = U32::new(0);

        Ok(Self { data })
    }

    fn header_mut(&mut self) -> &mut LeafHeader {
        // INVARIANT: size and kind validated in from_page/init
        LeafHeader::mut_from_bytes(&mut self.data[..LEAF_NODE_METADATA_SIZE]).unwrap()
    }

    pub fn as_ref(&self) -> LeafNode<'_> {
        LeafNode { data: self.data }
    }

    pub fn num_cells(&self) -> u32 {
        self.as_ref().num_cells()
    }

    pub fn key_at(&self, index: usize) -> Result<u32> {
        self.as_ref().key_at(index)
    }

    pub fn find_key(&self, key: u32) -> SearchResult {
        self.as_ref().find_key(key)
    }

    pub fn set_num_cells(&mut self, count: u32) {
        self.header_mut().num_cells = U32::new(count);
    }

    pub fn set_next_leaf(&mut self, page_num: u32) {
        self.header_mut().next_leaf = U32::new(page_num);
    }

    pub fn set_parent(&mut self, page_num: u32) {
        self.header_mut().parent = U32::new(page_num);
    }

    pub fn set_root(&mut self, is_root: bool) {
        self.header_mut().is_root = is_root as u8;
    }

    /// Writes a cell image without touching `num_cells`. Split
    /// redistribution uses this to lay cells down before publishing the
    /// final count.
    pub fn write_cell(&mut self, index: usize, key: u32, value: &[u8]) -> Result<()> {
        ensure!(
            index < LEAF_NODE_MAX_CELLS,
            "cell index {} exceeds leaf capacity {}",
            index,
            LEAF_NODE_MAX_CELLS
        );
        ensure!(
            value.len() == ROW_SIZE,
            "cell value must be {} bytes, got {}",
            ROW_SIZE,
            value.len()
        );

        let offset = cell_offset(index);
        self.data[offset..offset + LEAF_NODE_KEY_SIZE].copy_from_slice(&key.to_le_bytes());
        self.data[offset + LEAF_NODE_KEY_SIZE..offset + LEAF_NODE_CELL_SIZE]
            .copy_from_slice(value);
        Ok(())
    }

    /// Shifts cells `[index..num_cells)` right by one and writes the new
    /// cell at `index`. The caller guarantees there is room.
    pub fn insert_cell_at(&mut self, index: usize, key: u32, value: &[u8]) -> Result<()> {
        let num_cells = self.num_cells() as usize;
        ensure!(
            num_cells < LEAF_NODE_MAX_CELLS,
            "leaf is full ({} cells)",
            num_cells
        );
        ensure!(
            index <= num_cells,
            "insert index {} out of bounds (num_cells={})",
            index,
            num_cells
        );

        for i in (index..num_cells).rev() {
            let src = cell_offset(i);
            self.data.copy_within(src..src + LEAF_NODE_CELL_SIZE, cell_offset(i + 1));
        }

        self.write_cell(index, key, value)?;
        self.set_num_cells(num_cells as u32 + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Row;

    fn make_page() -> Vec<u8> {
        vec![0u8; PAGE_SIZE]
    }

    fn row_bytes(id: u32) -> [u8; ROW_SIZE] {
        Row::new(id, format!("user{}", id), format!("person{}@example.com", id))
            .unwrap()
            .to_bytes()
            .unwrap()
    }

    #[test]
    fn leaf_header_is_14_bytes() {
        assert_eq!(size_of::<LeafHeader>(), 14);
    }

    #[test]
    fn init_sets_empty_leaf_header() {
        let mut page = make_page();
        let node = LeafNodeMut::init(&mut page).unwrap();

        assert_eq!(node.num_cells(), 0);
        assert_eq!(node.as_ref().next_leaf(), 0);
        assert!(!node.as_ref().is_root());
    }

    #[test]
    fn from_page_rejects_uninitialized_page() {
        let page = make_page();
        assert!(LeafNode::from_page(&page).is_err());
    }

    #[test]
    fn insert_and_read_single_cell() {
        let mut page = make_page();
        let mut node = LeafNodeMut::init(&mut page).unwrap();

        node.insert_cell_at(0, 5, &row_bytes(5)).unwrap();

        assert_eq!(node.num_cells(), 1);
        assert_eq!(node.key_at(0).unwrap(), 5);
        let row = Row::from_bytes(node.as_ref().value_at(0).unwrap()).unwrap();
        assert_eq!(row.id, 5);
        assert_eq!(row.username, "user5");
    }

    #[test]
    fn insert_shifts_existing_cells_right() {
        let mut page = make_page();
        let mut node = LeafNodeMut::init(&mut page).unwrap();

        node.insert_cell_at(0, 10, &row_bytes(10)).unwrap();
        node.insert_cell_at(0, 3, &row_bytes(3)).unwrap();
        node.insert_cell_at(1, 7, &row_bytes(7)).unwrap();

        assert_eq!(node.key_at(0).unwrap(), 3);
        assert_eq!(node.key_at(1).unwrap(), 7);
        assert_eq!(node.key_at(2).unwrap(), 10);
    }

    #[test]
    fn find_key_locates_existing_and_insertion_points() {
        let mut page = make_page();
        let mut node = LeafNodeMut::init(&mut page).unwrap();

        for (i, key) in [2u32, 4, 6].iter().enumerate() {
            node.insert_cell_at(i, *key, &row_bytes(*key)).unwrap();
        }

        assert_eq!(node.find_key(2), SearchResult::Found(0));
        assert_eq!(node.find_key(4), SearchResult::Found(1));
        assert_eq!(node.find_key(6), SearchResult::Found(2));
        assert_eq!(node.find_key(1), SearchResult::NotFound(0));
        assert_eq!(node.find_key(3), SearchResult::NotFound(1));
        assert_eq!(node.find_key(9), SearchResult::NotFound(3));
    }

    #[test]
    fn leaf_accepts_exactly_max_cells() {
        let mut page = make_page();
        let mut node = LeafNodeMut::init(&mut page).unwrap();

        for i in 0..LEAF_NODE_MAX_CELLS {
            node.insert_cell_at(i, i as u32, &row_bytes(i as u32)).unwrap();
        }

        assert_eq!(node.num_cells() as usize, LEAF_NODE_MAX_CELLS);
        assert!(node
            .insert_cell_at(LEAF_NODE_MAX_CELLS, 99, &row_bytes(99))
            .is_err());
    }

    #[test]
    fn max_key_is_last_cell() {
        let mut page = make_page();
        let mut node = LeafNodeMut::init(&mut page).unwrap();

        node.insert_cell_at(0, 11, &row_bytes(11)).unwrap();
        node.insert_cell_at(1, 30, &row_bytes(30)).unwrap();

        assert_eq!(node.as_ref().max_key().unwrap(), 30);
    }

    #[test]
    fn max_key_of_empty_leaf_is_an_error() {
        let mut page = make_page();
        let node = LeafNodeMut::init(&mut page).unwrap();

        assert!(node.as_ref().max_key().is_err());
    }

    #[test]
    fn next_leaf_round_trips() {
        let mut page = make_page();
        let mut node = LeafNodeMut::init(&mut page).unwrap();

        node.set_next_leaf(42);

        assert_eq!(node.as_ref().next_leaf(), 42);
    }
}
