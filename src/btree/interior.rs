//! # Interior Nodes
//!
//! Interior nodes route searches. Each cell pairs a child page number with
//! that child's maximum key; one extra `right_child` pointer in the header
//! covers everything greater than the last separator.
//!
//! ## Page Layout
//!
//! ```text
//! +---------------------------+
//! | NodeHeader (6 bytes)      |  kind / is_root / parent
//! +---------------------------+
//! | num_keys (4 bytes)        |
//! | right_child (4 bytes)     |
//! +---------------------------+
//! | Cell 0: child | key       |  8 bytes each
//! | Cell 1: child | key       |
//! | ...                       |
//! +---------------------------+
//! ```
//!
//! ## Routing Semantics
//!
//! For a search key K and cells `(child[i], key[i])`:
//! - keys in the subtree at `child[i]` are `<= key[i]`
//! - the smallest `i` with `key[i] >= K` routes K to `child[i]`
//! - if no separator qualifies, K routes to `right_child`
//!
//! `child_at(num_keys)` resolves to `right_child`, mirroring the routing
//! rule; anything past that is a hard error.

use eyre::{bail, ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::{INTERIOR_NODE_CELL_SIZE, INTERIOR_NODE_METADATA_SIZE, PAGE_SIZE};

use super::node::{NodeHeader, NodeKind};

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
struct InteriorHeader {
    kind: u8,
    is_root: u8,
    parent: U32,
    num_keys: U32,
    right_child: U32,
}

const _: () = assert!(size_of::<InteriorHeader>() == INTERIOR_NODE_METADATA_SIZE);

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, PartialEq, Eq)]
pub struct InteriorCell {
    child: U32,
    key: U32,
}

const _: () = assert!(size_of::<InteriorCell>() == INTERIOR_NODE_CELL_SIZE);

impl InteriorCell {
    pub fn new(child: u32, key: u32) -> Self {
        Self {
            child: U32::new(child),
            key: U32::new(key),
        }
    }

    pub fn child(&self) -> u32 {
        self.child.get()
    }

    pub fn key(&self) -> u32 {
        self.key.get()
    }
}

/// Physical ceiling on cells per page; the tree enforces the much smaller
/// logical limit from `config`.
const INTERIOR_NODE_CELL_CAPACITY: usize =
    (PAGE_SIZE - INTERIOR_NODE_METADATA_SIZE) / INTERIOR_NODE_CELL_SIZE;

#[derive(Debug)]
pub struct InteriorNode<'a> {
    data: &'a [u8],
}

pub struct InteriorNodeMut<'a> {
    data: &'a mut [u8],
}

fn cell_offset(index: usize) -> usize {
    INTERIOR_NODE_METADATA_SIZE + index * INTERIOR_NODE_CELL_SIZE
}

impl<'a> InteriorNode<'a> {
    pub fn from_page(data: &'a [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = NodeHeader::from_bytes(data)?;
        ensure!(
            header.kind() == NodeKind::Interior,
            "expected interior node, got {:?}",
            header.kind()
        );
        Ok(Self { data })
    }

    fn header(&self) -> &InteriorHeader {
        // INVARIANT: size and kind validated in from_page
        InteriorHeader::ref_from_bytes(&self.data[..INTERIOR_NODE_METADATA_SIZE]).unwrap()
    }

    pub fn num_keys(&self) -> u32 {
        self.header().num_keys.get()
    }

    pub fn right_child(&self) -> u32 {
        self.header().right_child.get()
    }

    pub fn is_root(&self) -> bool {
        self.header().is_root != 0
    }

    pub fn parent(&self) -> u32 {
        self.header().parent.get()
    }

    pub fn cell_at(&self, index: usize) -> Result<&InteriorCell> {
        ensure!(
            index < self.num_keys() as usize,
            "cell index {} out of bounds (num_keys={})",
            index,
            self.num_keys()
        );
        let offset = cell_offset(index);
        InteriorCell::ref_from_bytes(&self.data[offset..offset + INTERIOR_NODE_CELL_SIZE])
            .map_err(|e| eyre::eyre!("failed to read interior cell at index {}: {:?}", index, e))
    }

    pub fn key_at(&self, index: usize) -> Result<u32> {
        Ok(self.cell_at(index)?.key())
    }

    /// Child page for slot `index`; `index == num_keys` resolves to the
    /// right child.
    pub fn child_at(&self, index: usize) -> Result<u32> {
        let num_keys = self.num_keys() as usize;
        if index > num_keys {
            bail!("child index {} > num_keys {}", index, num_keys);
        }
        if index == num_keys {
            Ok(self.right_child())
        } else {
            Ok(self.cell_at(index)?.child())
        }
    }

    /// Smallest cell index whose separator is `>= key`; `num_keys` when the
    /// key belongs under the right child.
    pub fn find_child_index(&self, key: u32) -> Result<usize> {
        let mut min_index = 0usize;
        let mut max_index = self.num_keys() as usize;

        while min_index != max_index {
            let index = (min_index + max_index) / 2;
            if self.key_at(index)? >= key {
                max_index = index;
            } else {
                min_index = index + 1;
            }
        }

        Ok(min_index)
    }

    pub fn max_key(&self) -> Result<u32> {
        ensure!(self.num_keys() > 0, "interior node with no keys has no max");
        self.key_at(self.num_keys() as usize - 1)
    }
}

impl<'a> InteriorNodeMut<'a> {
    pub fn from_page(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );
        let header = NodeHeader::from_bytes(data)?;
        ensure!(
            header.kind() == NodeKind::Interior,
            "expected interior node, got {:?}",
            header.kind()
        );
        Ok(Self { data })
    }

    /// Stamps an empty, non-root interior node over the page.
    pub fn init(data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == PAGE_SIZE,
            "invalid page size: {} != {}",
            data.len(),
            PAGE_SIZE
        );

        let header = InteriorHeader::mut_from_bytes(&mut data[..INTERIOR_NODE_METADATA_SIZE])
            .map_err(|e| eyre::eyre!("failed to write interior header: {:?}", e))?;
        header.kind = NodeKind::Interior as u8;
        header.is_root = 0;
        header.parent = U32::new(0);
        header.num_keys = U32::new(0);
        header.right_child = U32::new(0);

        Ok(Self { data })
    }

    fn header_mut(&mut self) -> &mut InteriorHeader {
        // INVARIANT: size and kind validated in from_page/init
        InteriorHeader::mut_from_bytes(&mut self.data[..INTERIOR_NODE_METADATA_SIZE]).unwrap()
    }

    pub fn as_ref(&self) -> InteriorNode<'_> {
        InteriorNode { data: self.data }
    }

    pub fn num_keys(&self) -> u32 {
        self.as_ref().num_keys()
    }

    pub fn right_child(&self) -> u32 {
        self.as_ref().right_child()
    }

    pub fn key_at(&self, index: usize) -> Result<u32> {
        self.as_ref().key_at(index)
    }

    pub fn child_at(&self, index: usize) -> Result<u32> {
        self.as_ref().child_at(index)
    }

    pub fn find_child_index(&self, key: u32) -> Result<usize> {
        self.as_ref().find_child_index(key)
    }

    pub fn set_num_keys(&mut self, count: u32) {
        self.header_mut().num_keys = U32::new(count);
    }

    pub fn set_right_child(&mut self, page_num: u32) {
        self.header_mut().right_child = U32::new(page_num);
    }

    pub fn set_parent(&mut self, page_num: u32) {
        self.header_mut().parent = U32::new(page_num);
    }

    pub fn set_root(&mut self, is_root: bool) {
        self.header_mut().is_root = is_root as u8;
    }

    /// Writes a cell image without touching `num_keys`.
    pub fn write_cell(&mut self, index: usize, cell: InteriorCell) -> Result<()> {
        ensure!(
            index < INTERIOR_NODE_CELL_CAPACITY,
            "cell index {} exceeds interior capacity {}",
            index,
            INTERIOR_NODE_CELL_CAPACITY
        );
        let offset = cell_offset(index);
        self.data[offset..offset + INTERIOR_NODE_CELL_SIZE].copy_from_slice(cell.as_bytes());
        Ok(())
    }

    /// Shifts cells `[index..num_keys)` right by one and inserts the new
    /// cell at `index`. Overflow policy is the caller's concern.
    pub fn insert_cell_at(&mut self, index: usize, cell: InteriorCell) -> Result<()> {
        let num_keys = self.num_keys() as usize;
        ensure!(
            num_keys < INTERIOR_NODE_CELL_CAPACITY,
            "interior node page capacity exceeded"
        );
        ensure!(
            index <= num_keys,
            "insert index {} out of bounds (num_keys={})",
            index,
            num_keys
        );

        for i in (index..num_keys).rev() {
            let src = cell_offset(i);
            self.data
                .copy_within(src..src + INTERIOR_NODE_CELL_SIZE, cell_offset(i + 1));
        }

        self.write_cell(index, cell)?;
        self.set_num_keys(num_keys as u32 + 1);
        Ok(())
    }

    /// Rewrites the separator that currently reads `old_key`. A no-op when
    /// `old_key` belongs to the right child, which carries no separator.
    pub fn update_key(&mut self, old_key: u32, new_key: u32) -> Result<()> {
        let index = self.find_child_index(old_key)?;
        if index == self.num_keys() as usize {
            return Ok(());
        }

        let child = self.child_at(index)?;
        self.write_cell(index, InteriorCell::new(child, new_key))
    }
}
