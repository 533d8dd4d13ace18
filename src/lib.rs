//! # rookdb - Single-File Embedded Table Store
//!
//! rookdb persists one table of fixed-shape `(id, username, email)` records
//! in a disk-resident B+tree of 4096-byte pages, driven through a
//! line-oriented REPL or embedded through the [`Table`] API.
//!
//! ## Quick Start
//!
//! ```ignore
//! use rookdb::{Row, Table};
//!
//! let mut table = Table::open("./users.db")?;
//! table.insert(&Row::new(1, "alice", "alice@example.com")?)?;
//!
//! for row in table.select()? {
//!     println!("{}", row);   // (1, alice, alice@example.com)
//! }
//! table.close()?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        REPL (cli) / Table API       │
//! ├─────────────────────────────────────┤
//! │   Statement Layer (parse/execute)   │
//! ├─────────────────────────────────────┤
//! │      B+Tree (nodes, cursor)         │
//! ├─────────────────────────────────────┤
//! │     Row Serialization (records)     │
//! ├─────────────────────────────────────┤
//! │        Pager (storage)              │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## File Layout
//!
//! One flat file per table: page *n* lives at byte offset `n * 4096`, page
//! 0 is always the tree root, and the file length is always a whole number
//! of pages. No header, no magic. The whole file is bounded at 100 pages.
//!
//! ## Scope
//!
//! Single writer, synchronous, flush-on-close. There are no transactions,
//! no write-ahead log, no deletes and no secondary indexes; `select` is a
//! full ordered scan. Interior nodes refuse to split unless the
//! `interior-split` feature is enabled.
//!
//! ## Module Overview
//!
//! - [`storage`]: the pager with lazy page loads and flush-on-close
//! - [`btree`]: node layouts, search, splits, cursors, rendering
//! - [`records`]: the row type and its fixed 293-byte codec
//! - [`sql`]: statement parsing and execution
//! - [`cli`]: REPL, meta commands, history
//! - [`config`]: every layout constant and its derivation

pub mod btree;
pub mod cli;
pub mod config;
pub mod records;
pub mod sql;
pub mod storage;
pub mod table;

pub use records::Row;
pub use sql::{ExecuteResult, ParseError, Statement};
pub use table::Table;
