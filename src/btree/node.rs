//! # Node Kinds and the Common Header
//!
//! Every page is one B+tree node and begins with the same 6-byte header:
//!
//! ```text
//! Offset  Size  Field        Description
//! ------  ----  -----------  ----------------------------------------
//! 0       1     kind         0x01 interior, 0x02 leaf
//! 1       1     is_root      1 on the unique root node (page 0)
//! 2       4     parent       parent page number (ignored on the root)
//! ```
//!
//! The typed views in `leaf` and `interior` validate the kind byte before
//! lending any field access, so a page that was never initialized (kind
//! 0x00) is rejected instead of being misread.

use eyre::{ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::COMMON_NODE_METADATA_SIZE;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Unknown = 0x00,
    Interior = 0x01,
    Leaf = 0x02,
}

impl NodeKind {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0x01 => NodeKind::Interior,
            0x02 => NodeKind::Leaf,
            _ => NodeKind::Unknown,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct NodeHeader {
    kind: u8,
    is_root: u8,
    parent: U32,
}

const _: () = assert!(size_of::<NodeHeader>() == COMMON_NODE_METADATA_SIZE);

impl NodeHeader {
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        ensure!(
            data.len() >= size_of::<Self>(),
            "buffer too small for NodeHeader: {} < {}",
            data.len(),
            size_of::<Self>()
        );

        Self::ref_from_bytes(&data[..size_of::<Self>()])
            .map_err(|e| eyre::eyre!("failed to read NodeHeader: {:?}", e))
    }

    pub fn from_bytes_mut(data: &mut [u8]) -> Result<&mut Self> {
        ensure!(
            data.len() >= size_of::<Self>(),
            "buffer too small for NodeHeader: {} < {}",
            data.len(),
            size_of::<Self>()
        );

        Self::mut_from_bytes(&mut data[..size_of::<Self>()])
            .map_err(|e| eyre::eyre!("failed to read NodeHeader: {:?}", e))
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_byte(self.kind)
    }

    pub fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind as u8;
    }

    pub fn is_root(&self) -> bool {
        self.is_root != 0
    }

    pub fn set_root(&mut self, is_root: bool) {
        self.is_root = is_root as u8;
    }

    pub fn parent(&self) -> u32 {
        self.parent.get()
    }

    pub fn set_parent(&mut self, page_num: u32) {
        self.parent = U32::new(page_num);
    }
}

/// Reads the kind byte of a raw page.
pub fn node_kind(page: &[u8]) -> Result<NodeKind> {
    Ok(NodeHeader::from_bytes(page)?.kind())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_from_byte() {
        assert_eq!(NodeKind::from_byte(0x00), NodeKind::Unknown);
        assert_eq!(NodeKind::from_byte(0x01), NodeKind::Interior);
        assert_eq!(NodeKind::from_byte(0x02), NodeKind::Leaf);
        assert_eq!(NodeKind::from_byte(0xFF), NodeKind::Unknown);
    }

    #[test]
    fn header_size_is_6_bytes() {
        assert_eq!(size_of::<NodeHeader>(), 6);
    }

    #[test]
    fn header_round_trips_through_bytes() {
        let mut data = [0u8; 16];

        {
            let header = NodeHeader::from_bytes_mut(&mut data).unwrap();
            header.set_kind(NodeKind::Leaf);
            header.set_root(true);
            header.set_parent(9);
        }

        let header = NodeHeader::from_bytes(&data).unwrap();
        assert_eq!(header.kind(), NodeKind::Leaf);
        assert!(header.is_root());
        assert_eq!(header.parent(), 9);
        assert_eq!(data[0], 0x02);
        assert_eq!(data[1], 1);
        assert_eq!(&data[2..6], &9u32.to_le_bytes());
    }

    #[test]
    fn zeroed_page_reads_as_unknown() {
        let data = [0u8; 6];
        assert_eq!(NodeHeader::from_bytes(&data).unwrap().kind(), NodeKind::Unknown);
    }

    #[test]
    fn from_bytes_rejects_short_buffer() {
        assert!(NodeHeader::from_bytes(&[0u8; 3]).is_err());
    }
}
