//! # Pager
//!
//! The pager owns the database file and an array of in-memory page buffers.
//! It is a write-through cache with no eviction: at most `TABLE_MAX_PAGES`
//! buffers exist, a page loads lazily the first time it is touched, and
//! every resident page is written back when the file closes.
//!
//! ## Contract
//!
//! - Page *n* lives at byte offset `n * PAGE_SIZE`; the file length is
//!   always a whole multiple of `PAGE_SIZE`. A file that breaks this
//!   invariant is rejected as corrupt at open.
//! - `num_pages` is the exclusive upper bound of allocated page numbers.
//!   Touching a page past the current end advances it; allocation is
//!   append-only (`unused_page_num` hands out the next number, no free
//!   list).
//! - Buffers are mutated in place; nothing reaches disk before `flush` /
//!   `close`.
//!
//! ## Safety Model
//!
//! Each buffer is a `Box` owned by its slot, so it is released exactly once
//! no matter how the pager goes down. `Drop` performs a best-effort
//! flush-and-sync for unwind paths; the orderly path is an explicit
//! [`Pager::close`], which reports errors instead of swallowing them.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use eyre::{bail, ensure, Result, WrapErr};

use crate::config::{PAGE_SIZE, TABLE_MAX_PAGES};

#[derive(Debug)]
pub struct Pager {
    file: File,
    path: PathBuf,
    /// Pages that existed on disk at open; only these are ever read back.
    disk_pages: u32,
    /// Exclusive upper bound of allocated page numbers.
    num_pages: u32,
    slots: Vec<Option<Box<[u8; PAGE_SIZE]>>>,
    closed: bool,
}

impl Pager {
    /// Opens (or creates) the backing file and validates its length.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .wrap_err_with(|| format!("failed to open database file '{}'", path.display()))?;

        let file_length = file
            .metadata()
            .wrap_err("failed to read database file metadata")?
            .len();

        ensure!(
            file_length % PAGE_SIZE as u64 == 0,
            "database file '{}' is not a whole number of pages: corrupt file",
            path.display()
        );

        let num_pages = (file_length / PAGE_SIZE as u64) as u32;
        let mut slots = Vec::with_capacity(TABLE_MAX_PAGES);
        slots.resize_with(TABLE_MAX_PAGES, || None);

        Ok(Self {
            file,
            path,
            disk_pages: num_pages,
            num_pages,
            slots,
            closed: false,
        })
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Next free page number. Append-only: pages are never recycled.
    pub fn unused_page_num(&self) -> u32 {
        self.num_pages
    }

    /// Returns the buffer for page `page_num`, loading it from disk on the
    /// first touch. Touching a page past the end allocates it.
    pub fn get_page(&mut self, page_num: u32) -> Result<&mut [u8]> {
        ensure!(
            (page_num as usize) < TABLE_MAX_PAGES,
            "page number out of bounds: {} >= {}",
            page_num,
            TABLE_MAX_PAGES
        );

        if self.slots[page_num as usize].is_none() {
            let mut buffer = Box::new([0u8; PAGE_SIZE]);

            if page_num < self.disk_pages {
                self.file
                    .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))
                    .wrap_err_with(|| format!("failed to seek to page {}", page_num))?;
                self.file
                    .read_exact(buffer.as_mut_slice())
                    .wrap_err_with(|| format!("failed to read page {}", page_num))?;
            }

            self.slots[page_num as usize] = Some(buffer);

            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }
        }

        // INVARIANT: slot populated above
        Ok(self.slots[page_num as usize].as_mut().unwrap().as_mut_slice())
    }

    /// Read-only access; loads the page on first touch like `get_page`.
    pub fn page(&mut self, page_num: u32) -> Result<&[u8]> {
        Ok(self.get_page(page_num)?)
    }

    /// Writes one resident page back to disk.
    pub fn flush(&mut self, page_num: u32) -> Result<()> {
        ensure!(
            (page_num as usize) < TABLE_MAX_PAGES,
            "page number out of bounds: {} >= {}",
            page_num,
            TABLE_MAX_PAGES
        );

        let Some(buffer) = self.slots[page_num as usize].as_ref() else {
            bail!("tried to flush page {} which was never loaded", page_num);
        };

        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))
            .wrap_err_with(|| format!("failed to seek to page {}", page_num))?;
        self.file
            .write_all(buffer.as_slice())
            .wrap_err_with(|| format!("failed to write page {}", page_num))?;

        Ok(())
    }

    fn flush_all(&mut self) -> Result<()> {
        for page_num in 0..self.num_pages {
            if self.slots[page_num as usize].is_some() {
                self.flush(page_num)?;
            }
        }
        Ok(())
    }

    /// Flushes every resident page, syncs the file, and releases the
    /// buffers. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.flush_all()?;
        self.file
            .sync_all()
            .wrap_err_with(|| format!("failed to sync '{}'", self.path.display()))?;

        for slot in &mut self.slots {
            *slot = None;
        }
        self.closed = true;
        Ok(())
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.flush_all();
            let _ = self.file.sync_all();
        }
    }
}
