//! # Row Serialization
//!
//! One table row is `{ id, username, email }`. Rows serialize to a fixed
//! 293-byte image so every leaf cell has the same width and cell addresses
//! reduce to offset arithmetic.
//!
//! ## On-Page Layout
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  ---------------------------------------------
//! 0       4     id (little-endian u32, also the B+tree key)
//! 4       33    username slot (NUL-terminated, zero padded)
//! 37      256   email slot (NUL-terminated, zero padded)
//! ```
//!
//! String length limits are enforced upstream at parse time; the codec
//! refuses rather than truncates if an overlong value ever reaches it.
//!
//! ## Zerocopy Safety
//!
//! The on-page form is a `#[repr(C)]` struct read and written through
//! zerocopy's derived traits, so (de)serialization is a bounds-checked
//! reinterpretation of the cell's value area rather than a field-by-field
//! copy loop.

use std::fmt;

use eyre::{ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::{EMAIL_MAX_LEN, EMAIL_SLOT_SIZE, ROW_SIZE, USERNAME_MAX_LEN, USERNAME_SLOT_SIZE};

/// One record of the table. `id` is the primary key and the tree's ordering
/// key; both strings are UTF-8 and bounded (32 / 255 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
struct RawRow {
    id: U32,
    username: [u8; USERNAME_SLOT_SIZE],
    email: [u8; EMAIL_SLOT_SIZE],
}

const _: () = assert!(size_of::<RawRow>() == ROW_SIZE);

impl Row {
    /// Builds a row, rejecting over-limit strings. The REPL parser applies
    /// the same limits first; this guards every other entry point.
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let email = email.into();

        ensure!(
            username.len() <= USERNAME_MAX_LEN,
            "username exceeds {} bytes",
            USERNAME_MAX_LEN
        );
        ensure!(
            email.len() <= EMAIL_MAX_LEN,
            "email exceeds {} bytes",
            EMAIL_MAX_LEN
        );

        Ok(Self {
            id,
            username,
            email,
        })
    }

    /// Serializes into the fixed 293-byte on-page image.
    pub fn to_bytes(&self) -> Result<[u8; ROW_SIZE]> {
        ensure!(
            self.username.len() <= USERNAME_MAX_LEN,
            "username exceeds {} bytes",
            USERNAME_MAX_LEN
        );
        ensure!(
            self.email.len() <= EMAIL_MAX_LEN,
            "email exceeds {} bytes",
            EMAIL_MAX_LEN
        );

        let mut raw = RawRow {
            id: U32::new(self.id),
            username: [0u8; USERNAME_SLOT_SIZE],
            email: [0u8; EMAIL_SLOT_SIZE],
        };
        raw.username[..self.username.len()].copy_from_slice(self.username.as_bytes());
        raw.email[..self.email.len()].copy_from_slice(self.email.as_bytes());

        let mut out = [0u8; ROW_SIZE];
        out.copy_from_slice(raw.as_bytes());
        Ok(out)
    }

    /// Deserializes a row from a cell's value area.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ensure!(
            bytes.len() >= ROW_SIZE,
            "buffer too small for row: {} < {}",
            bytes.len(),
            ROW_SIZE
        );

        let raw = RawRow::ref_from_bytes(&bytes[..ROW_SIZE])
            .map_err(|e| eyre::eyre!("failed to read row: {:?}", e))?;

        Ok(Self {
            id: raw.id.get(),
            username: slot_to_string(&raw.username)?,
            email: slot_to_string(&raw.email)?,
        })
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

fn slot_to_string(slot: &[u8]) -> Result<String> {
    let len = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    let s = std::str::from_utf8(&slot[..len])
        .map_err(|e| eyre::eyre!("stored string is not valid UTF-8: {}", e))?;
    Ok(s.to_string())
}
