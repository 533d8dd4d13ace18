//! # Storage Layer
//!
//! A single flat file holds the whole table: page *n* at byte offset
//! `n * PAGE_SIZE`, no file header, no magic. The [`Pager`] is the only
//! component that touches the file; everything above it deals in page
//! numbers and borrowed page buffers.
//!
//! The cache is deliberately primitive: bounded at `TABLE_MAX_PAGES`
//! buffers, no eviction, because the file itself is bounded at 100 pages.
//! Durability is flush-on-close; there is no write-ahead log and no crash
//! atomicity.

mod pager;

pub use pager::Pager;
