//! # B+Tree Operations
//!
//! This module implements the tree algorithms over pages served by the
//! pager: descent, insertion with duplicate detection, leaf splits, root
//! re-anchoring, interior cell maintenance, the ordered full-table scan,
//! and the debug rendering behind `.btree`.
//!
//! ## Shape Invariants
//!
//! - Exactly one node has the root flag and it always lives in page 0, so a
//!   growing tree never changes its entry point on disk.
//! - Leaf keys are strictly ascending; no key appears twice anywhere.
//! - An interior cell's key equals the maximum key in its child's subtree;
//!   the right child holds everything greater than the last separator.
//! - Leaves chain left-to-right through `next_leaf`, terminated by 0.
//! - Every non-root node's `parent` names its current parent page.
//!
//! ## Split Algorithm
//!
//! Inserting into a full leaf redistributes its 13 cells plus the incoming
//! one across the old (left) and a freshly allocated (right) page, seven
//! and seven, splicing the sibling chain in between. If the old leaf was
//! the root, a new interior root is built *in page 0*: the old root's bytes
//! move wholesale to a fresh page, which becomes the left child. Otherwise
//! the parent's separator for the left page is refreshed and the right page
//! is inserted as a new parent cell.
//!
//! An interior node that already holds `INTERIOR_NODE_MAX_CELLS` cells
//! cannot take another: by default that is a hard error (the historical
//! behavior this format grew up with), while the `interior-split` feature
//! replaces the error with a real interior split that can cascade up to the
//! root.
//!
//! ## Borrowing
//!
//! The tree borrows the pager mutably for its lifetime, which makes page
//! access race-free by construction. Split bodies gather cells into owned
//! buffers before rewriting pages, since two pages cannot be borrowed from
//! the pager at once.

use eyre::{bail, ensure, Result};

use crate::config::{
    INTERIOR_NODE_MAX_CELLS, LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_RIGHT_SPLIT_COUNT, ROOT_PAGE_NUM,
};
use crate::records::Row;
use crate::storage::Pager;

use super::cursor::Cursor;
use super::interior::{InteriorCell, InteriorNode, InteriorNodeMut};
use super::leaf::{LeafNode, LeafNodeMut, SearchResult};
use super::node::{node_kind, NodeHeader, NodeKind};

/// Result of an insert attempt. Duplicates are reported, not errors: the
/// tree is untouched and the caller decides what to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    DuplicateKey,
}

pub struct BTree<'a> {
    pager: &'a mut Pager,
}

impl<'a> BTree<'a> {
    pub fn new(pager: &'a mut Pager) -> Self {
        Self { pager }
    }

    /// Bootstraps an empty file: page 0 becomes an empty root leaf.
    pub fn ensure_initialized(&mut self) -> Result<()> {
        if self.pager.num_pages() == 0 {
            let page = self.pager.get_page(ROOT_PAGE_NUM)?;
            let mut root = LeafNodeMut::init(page)?;
            root.set_root(true);
        }
        Ok(())
    }

    /// Descends to the leaf that holds `key` (or would hold it). The
    /// cursor lands on the matching cell or on the lower-bound insertion
    /// slot.
    pub fn find(&mut self, key: u32) -> Result<Cursor> {
        let mut page_num = ROOT_PAGE_NUM;

        loop {
            let page = self.pager.page(page_num)?;
            match node_kind(page)? {
                NodeKind::Leaf => return self.leaf_find(page_num, key),
                NodeKind::Interior => {
                    let node = InteriorNode::from_page(page)?;
                    let child_index = node.find_child_index(key)?;
                    page_num = node.child_at(child_index)?;
                }
                NodeKind::Unknown => {
                    bail!("page {} holds no initialized node", page_num)
                }
            }
        }
    }

    fn leaf_find(&mut self, page_num: u32, key: u32) -> Result<Cursor> {
        let page = self.pager.page(page_num)?;
        let leaf = LeafNode::from_page(page)?;

        let cell_num = match leaf.find_key(key) {
            SearchResult::Found(index) | SearchResult::NotFound(index) => index as u32,
        };

        Ok(Cursor {
            page_num,
            cell_num,
            end_of_table: false,
        })
    }

    /// Positions a cursor on the first cell of the leftmost leaf. Key 0
    /// sorts at or before everything the table can hold.
    pub fn scan_start(&mut self) -> Result<Cursor> {
        let mut cursor = self.find(0)?;

        let page = self.pager.page(cursor.page_num)?;
        let leaf = LeafNode::from_page(page)?;
        cursor.end_of_table = leaf.num_cells() == 0;

        Ok(cursor)
    }

    /// Key under the cursor, or `None` when the cursor sits past the last
    /// cell of its leaf.
    pub fn cursor_key(&mut self, cursor: &Cursor) -> Result<Option<u32>> {
        let page = self.pager.page(cursor.page_num)?;
        let leaf = LeafNode::from_page(page)?;
        if cursor.cell_num < leaf.num_cells() {
            Ok(Some(leaf.key_at(cursor.cell_num as usize)?))
        } else {
            Ok(None)
        }
    }

    /// Reads the row under the cursor.
    pub fn cursor_row(&mut self, cursor: &Cursor) -> Result<Row> {
        let page = self.pager.page(cursor.page_num)?;
        let leaf = LeafNode::from_page(page)?;
        Row::from_bytes(leaf.value_at(cursor.cell_num as usize)?)
    }

    /// Moves the cursor one cell forward, crossing into the next sibling
    /// leaf when the current one is exhausted. Sibling 0 ends the scan.
    pub fn advance(&mut self, cursor: &mut Cursor) -> Result<()> {
        let page = self.pager.page(cursor.page_num)?;
        let leaf = LeafNode::from_page(page)?;

        cursor.cell_num += 1;
        if cursor.cell_num >= leaf.num_cells() {
            let next = leaf.next_leaf();
            if next == 0 {
                cursor.end_of_table = true;
            } else {
                cursor.page_num = next;
                cursor.cell_num = 0;
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, key: u32, row: &Row) -> Result<InsertOutcome> {
        let cursor = self.find(key)?;
        let row_image = row.to_bytes()?;

        let has_room = {
            let page = self.pager.page(cursor.page_num)?;
            let leaf = LeafNode::from_page(page)?;

            if cursor.cell_num < leaf.num_cells()
                && leaf.key_at(cursor.cell_num as usize)? == key
            {
                return Ok(InsertOutcome::DuplicateKey);
            }

            (leaf.num_cells() as usize) < LEAF_NODE_MAX_CELLS
        };

        if has_room {
            let page = self.pager.get_page(cursor.page_num)?;
            let mut leaf = LeafNodeMut::from_page(page)?;
            leaf.insert_cell_at(cursor.cell_num as usize, key, &row_image)?;
        } else {
            self.split_leaf_and_insert(&cursor, key, &row_image)?;
        }

        Ok(InsertOutcome::Inserted)
    }

    /// Splits the full leaf under `cursor`, admitting the new cell during
    /// redistribution, then repairs the parent.
    fn split_leaf_and_insert(&mut self, cursor: &Cursor, key: u32, row_image: &[u8]) -> Result<()> {
        let (old_is_root, old_parent, old_next, old_max, mut cells) = {
            let page = self.pager.page(cursor.page_num)?;
            let leaf = LeafNode::from_page(page)?;

            let mut cells: Vec<(u32, Vec<u8>)> = Vec::with_capacity(LEAF_NODE_MAX_CELLS + 1);
            for i in 0..leaf.num_cells() as usize {
                cells.push((leaf.key_at(i)?, leaf.value_at(i)?.to_vec()));
            }

            (
                leaf.is_root(),
                leaf.parent(),
                leaf.next_leaf(),
                leaf.max_key()?,
                cells,
            )
        };

        cells.insert(cursor.cell_num as usize, (key, row_image.to_vec()));
        ensure!(
            cells.len() == LEAF_NODE_MAX_CELLS + 1,
            "leaf split expected {} cells, found {}",
            LEAF_NODE_MAX_CELLS + 1,
            cells.len()
        );

        let new_page_num = self.pager.unused_page_num();

        {
            let page = self.pager.get_page(new_page_num)?;
            let mut new_leaf = LeafNodeMut::init(page)?;
            new_leaf.set_parent(old_parent);
            new_leaf.set_next_leaf(old_next);
            for (slot, (cell_key, value)) in
                cells[LEAF_NODE_LEFT_SPLIT_COUNT..].iter().enumerate()
            {
                new_leaf.write_cell(slot, *cell_key, value)?;
            }
            new_leaf.set_num_cells(LEAF_NODE_RIGHT_SPLIT_COUNT as u32);
        }

        {
            let page = self.pager.get_page(cursor.page_num)?;
            let mut leaf = LeafNodeMut::from_page(page)?;
            for (slot, (cell_key, value)) in
                cells[..LEAF_NODE_LEFT_SPLIT_COUNT].iter().enumerate()
            {
                leaf.write_cell(slot, *cell_key, value)?;
            }
            leaf.set_num_cells(LEAF_NODE_LEFT_SPLIT_COUNT as u32);
            leaf.set_next_leaf(new_page_num);
        }

        if old_is_root {
            self.create_new_root(new_page_num)
        } else {
            let new_max = cells[LEAF_NODE_LEFT_SPLIT_COUNT - 1].0;
            {
                let page = self.pager.get_page(old_parent)?;
                let mut parent = InteriorNodeMut::from_page(page)?;
                parent.update_key(old_max, new_max)?;
            }
            self.insert_into_interior(old_parent, new_page_num)
        }
    }

    /// Rebuilds page 0 as an interior root over the split halves. The old
    /// root's bytes move wholesale to a fresh page, which becomes the left
    /// child; `right_child_page` was allocated by the split.
    fn create_new_root(&mut self, right_child_page: u32) -> Result<()> {
        let left_page_num = self.pager.unused_page_num();

        let root_image = self.pager.page(ROOT_PAGE_NUM)?.to_vec();
        {
            let page = self.pager.get_page(left_page_num)?;
            page.copy_from_slice(&root_image);
            let header = NodeHeader::from_bytes_mut(page)?;
            header.set_root(false);
        }

        // A relocated interior node's children must re-point at it.
        if node_kind(self.pager.page(left_page_num)?)? == NodeKind::Interior {
            let children: Vec<u32> = {
                let page = self.pager.page(left_page_num)?;
                let node = InteriorNode::from_page(page)?;
                (0..=node.num_keys() as usize)
                    .map(|i| node.child_at(i))
                    .collect::<Result<_>>()?
            };
            for child in children {
                self.set_parent_of(child, left_page_num)?;
            }
        }

        let left_max = self.subtree_max_key(left_page_num)?;
        {
            let page = self.pager.get_page(ROOT_PAGE_NUM)?;
            let mut root = InteriorNodeMut::init(page)?;
            root.set_root(true);
            root.write_cell(0, InteriorCell::new(left_page_num, left_max))?;
            root.set_num_keys(1);
            root.set_right_child(right_child_page);
        }

        self.set_parent_of(left_page_num, ROOT_PAGE_NUM)?;
        self.set_parent_of(right_child_page, ROOT_PAGE_NUM)?;
        Ok(())
    }

    /// Registers `child_page` under `parent_page`, keyed by the child's
    /// subtree maximum. A child beyond the current right child takes the
    /// right-child seat and demotes the old one into the cell array.
    fn insert_into_interior(&mut self, parent_page: u32, child_page: u32) -> Result<()> {
        let child_max = self.subtree_max_key(child_page)?;

        let (num_keys, right_child, index) = {
            let page = self.pager.page(parent_page)?;
            let node = InteriorNode::from_page(page)?;
            (
                node.num_keys() as usize,
                node.right_child(),
                node.find_child_index(child_max)?,
            )
        };

        if num_keys >= INTERIOR_NODE_MAX_CELLS {
            #[cfg(feature = "interior-split")]
            {
                return self.split_interior_and_insert(parent_page, child_page);
            }
            #[cfg(not(feature = "interior-split"))]
            {
                bail!(
                    "interior node {} is full ({} cells): splitting interior nodes is not supported",
                    parent_page,
                    num_keys
                );
            }
        }

        let right_max = self.subtree_max_key(right_child)?;

        let page = self.pager.get_page(parent_page)?;
        let mut node = InteriorNodeMut::from_page(page)?;
        if child_max > right_max {
            node.write_cell(num_keys, InteriorCell::new(right_child, right_max))?;
            node.set_num_keys(num_keys as u32 + 1);
            node.set_right_child(child_page);
        } else {
            node.insert_cell_at(index, InteriorCell::new(child_page, child_max))?;
        }
        Ok(())
    }

    /// Splits a full interior node and re-registers the halves one level
    /// up, cascading as far as the root.
    #[cfg(feature = "interior-split")]
    fn split_interior_and_insert(&mut self, page_num: u32, new_child: u32) -> Result<()> {
        let (is_root, parent_page, right_child) = {
            let page = self.pager.page(page_num)?;
            let node = InteriorNode::from_page(page)?;
            (node.is_root(), node.parent(), node.right_child())
        };
        let old_max = self.subtree_max_key(right_child)?;

        // Every child of this node, as (page, subtree max), in key order.
        let mut entries: Vec<(u32, u32)> = {
            let page = self.pager.page(page_num)?;
            let node = InteriorNode::from_page(page)?;
            let mut entries = Vec::with_capacity(node.num_keys() as usize + 2);
            for i in 0..node.num_keys() as usize {
                let cell = node.cell_at(i)?;
                entries.push((cell.child(), cell.key()));
            }
            entries
        };
        entries.push((right_child, old_max));

        let new_child_max = self.subtree_max_key(new_child)?;
        let position = entries.partition_point(|&(_, max)| max < new_child_max);
        entries.insert(position, (new_child, new_child_max));

        let left_count = (entries.len() + 1) / 2;

        {
            let page = self.pager.get_page(page_num)?;
            let mut node = InteriorNodeMut::from_page(page)?;
            for (i, &(child, max)) in entries[..left_count - 1].iter().enumerate() {
                node.write_cell(i, InteriorCell::new(child, max))?;
            }
            node.set_num_keys(left_count as u32 - 1);
            node.set_right_child(entries[left_count - 1].0);
        }

        let new_page_num = self.pager.unused_page_num();
        {
            let page = self.pager.get_page(new_page_num)?;
            let mut node = InteriorNodeMut::init(page)?;
            node.set_parent(parent_page);
            let moved = &entries[left_count..];
            for (i, &(child, max)) in moved[..moved.len() - 1].iter().enumerate() {
                node.write_cell(i, InteriorCell::new(child, max))?;
            }
            node.set_num_keys(moved.len() as u32 - 1);
            node.set_right_child(moved[moved.len() - 1].0);
        }

        for &(child, _) in &entries[left_count..] {
            self.set_parent_of(child, new_page_num)?;
        }

        if is_root {
            self.create_new_root(new_page_num)
        } else {
            let new_left_max = entries[left_count - 1].1;
            {
                let page = self.pager.get_page(parent_page)?;
                let mut parent = InteriorNodeMut::from_page(page)?;
                parent.update_key(old_max, new_left_max)?;
            }
            self.insert_into_interior(parent_page, new_page_num)
        }
    }

    /// Largest key stored anywhere under `page_num`. For interior nodes
    /// this follows right children down to a leaf, which is what the
    /// separator invariant is defined against.
    fn subtree_max_key(&mut self, page_num: u32) -> Result<u32> {
        let right_child = {
            let page = self.pager.page(page_num)?;
            match node_kind(page)? {
                NodeKind::Leaf => return LeafNode::from_page(page)?.max_key(),
                NodeKind::Interior => InteriorNode::from_page(page)?.right_child(),
                NodeKind::Unknown => bail!("page {} holds no initialized node", page_num),
            }
        };
        self.subtree_max_key(right_child)
    }

    fn set_parent_of(&mut self, page_num: u32, parent: u32) -> Result<()> {
        let page = self.pager.get_page(page_num)?;
        let header = NodeHeader::from_bytes_mut(page)?;
        header.set_parent(parent);
        Ok(())
    }

    /// Depth-first rendering used by `.btree`, one space of indentation per
    /// tree level.
    pub fn render(&mut self) -> Result<String> {
        let mut out = String::new();
        self.render_node(ROOT_PAGE_NUM, 0, &mut out)?;
        out.pop();
        Ok(out)
    }

    fn render_node(&mut self, page_num: u32, indent: usize, out: &mut String) -> Result<()> {
        let kind = node_kind(self.pager.page(page_num)?)?;
        match kind {
            NodeKind::Leaf => {
                let keys: Vec<u32> = {
                    let page = self.pager.page(page_num)?;
                    let leaf = LeafNode::from_page(page)?;
                    (0..leaf.num_cells() as usize)
                        .map(|i| leaf.key_at(i))
                        .collect::<Result<_>>()?
                };

                push_line(out, indent, &format!("- leaf (size {})", keys.len()));
                for key in keys {
                    push_line(out, indent + 1, &format!("- {}", key));
                }
            }
            NodeKind::Interior => {
                let (cells, right_child) = {
                    let page = self.pager.page(page_num)?;
                    let node = InteriorNode::from_page(page)?;
                    let mut cells = Vec::with_capacity(node.num_keys() as usize);
                    for i in 0..node.num_keys() as usize {
                        let cell = node.cell_at(i)?;
                        cells.push((cell.child(), cell.key()));
                    }
                    (cells, node.right_child())
                };

                push_line(out, indent, &format!("- internal (size {})", cells.len()));
                for (child, key) in cells {
                    self.render_node(child, indent + 1, out)?;
                    push_line(out, indent + 1, &format!("- key {}", key));
                }
                self.render_node(right_child, indent + 1, out)?;
            }
            NodeKind::Unknown => bail!("page {} holds no initialized node", page_num),
        }
        Ok(())
    }
}

fn push_line(out: &mut String, indent: usize, text: &str) {
    for _ in 0..indent {
        out.push(' ');
    }
    out.push_str(text);
    out.push('\n');
}
