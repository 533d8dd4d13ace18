//! # Table
//!
//! One `Table` is one database file: it owns the pager, bootstraps the root
//! node for a brand-new file, and is the surface an embedding program (or
//! the REPL) talks to. All tree operations run through a short-lived
//! [`BTree`] borrow so page access stays single-owner.
//!
//! Closing flushes every resident page and syncs the file; dropping an
//! unclosed table does the same on a best-effort basis.

use std::path::Path;

use eyre::Result;

use crate::btree::{BTree, InsertOutcome};
use crate::records::Row;
use crate::storage::Pager;

#[derive(Debug)]
pub struct Table {
    pager: Pager,
}

impl Table {
    /// Opens (or creates) the database file. An empty file gets page 0
    /// initialized as an empty root leaf.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut pager = Pager::open(path)?;
        BTree::new(&mut pager).ensure_initialized()?;
        Ok(Self { pager })
    }

    /// Inserts a row keyed by its id. Duplicates leave the table unchanged.
    pub fn insert(&mut self, row: &Row) -> Result<InsertOutcome> {
        BTree::new(&mut self.pager).insert(row.id, row)
    }

    /// Point lookup by id.
    pub fn find(&mut self, id: u32) -> Result<Option<Row>> {
        let mut tree = BTree::new(&mut self.pager);
        let cursor = tree.find(id)?;
        match tree.cursor_key(&cursor)? {
            Some(key) if key == id => Ok(Some(tree.cursor_row(&cursor)?)),
            _ => Ok(None),
        }
    }

    /// Every row in ascending id order.
    pub fn select(&mut self) -> Result<Vec<Row>> {
        let mut tree = BTree::new(&mut self.pager);
        let mut cursor = tree.scan_start()?;
        let mut rows = Vec::new();

        while !cursor.end_of_table {
            rows.push(tree.cursor_row(&cursor)?);
            tree.advance(&mut cursor)?;
        }

        Ok(rows)
    }

    /// Depth-first tree rendering for `.btree`.
    pub fn render_tree(&mut self) -> Result<String> {
        BTree::new(&mut self.pager).render()
    }

    /// Flushes and syncs. Safe to call more than once; `Drop` covers the
    /// paths that never get here.
    pub fn close(&mut self) -> Result<()> {
        self.pager.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(id: u32) -> Row {
        Row::new(id, format!("user{}", id), format!("person{}@example.com", id)).unwrap()
    }

    #[test]
    fn open_insert_select_round_trip() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        table.insert(&row(1)).unwrap();
        table.insert(&row(2)).unwrap();

        let rows = table.select().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], row(1));
        assert_eq!(rows[1], row(2));
    }

    #[test]
    fn find_misses_return_none() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();
        table.insert(&row(5)).unwrap();

        assert_eq!(table.find(5).unwrap(), Some(row(5)));
        assert_eq!(table.find(6).unwrap(), None);
    }

    #[test]
    fn empty_table_renders_an_empty_root_leaf() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(dir.path().join("test.db")).unwrap();

        assert_eq!(table.render_tree().unwrap(), "- leaf (size 0)");
    }
}
