// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! The block offset table of a blocked image.

use byteorder::{BigEndian, ByteOrder};

use crate::{
    byte_reader::ByteReader,
    error::{Error, Result},
    util::tracing_wrappers::*,
};

/// Table value marking a block that has no data.
pub const ABSENT_BLOCK: u32 = u32::MAX;

/// A single entry of the block offset table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Start of the block's JPEG stream, relative to the compressed data region.
    pub stream_offset: u32,
    /// Row-major position of the block in the grid.
    pub block_position: u32,
}

impl IndexEntry {
    pub fn new(stream_offset: u32, block_position: u32) -> IndexEntry {
        IndexEntry {
            stream_offset,
            block_position,
        }
    }

    pub fn offset(&self) -> usize {
        self.stream_offset as usize
    }
}

/// Block offset table entries, sorted by block position.
///
/// Positions of absent or unrecoverable blocks are missing, so positions
/// are not necessarily contiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTable {
    pub entries: Vec<IndexEntry>,
}

impl IndexTable {
    /// Reads `num_blocks` big-endian offsets starting at `start`.
    ///
    /// Entries equal to [`ABSENT_BLOCK`] are skipped; the remaining entries
    /// keep the position they had in the on-disk table.
    pub fn read(data: &[u8], start: usize, num_blocks: usize) -> Result<IndexTable> {
        let table_len = num_blocks.checked_mul(4).ok_or(Error::ArithmeticOverflow)?;
        let table = ByteReader::new(data).bytes(start, table_len)?;
        let mut entries = Vec::new();
        entries.try_reserve(num_blocks)?;
        for (position, raw) in table.chunks_exact(4).enumerate() {
            let stream_offset = BigEndian::read_u32(raw);
            if stream_offset == ABSENT_BLOCK {
                trace!(position, "block marked absent");
                continue;
            }
            entries.push(IndexEntry::new(stream_offset, position as u32));
        }
        debug!(num_blocks, present = entries.len(), "read block offset table");
        Ok(IndexTable { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Stream offsets in table order.
    pub fn offsets(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.stream_offset).collect()
    }

    /// Block positions in table order.
    pub fn positions(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.block_position).collect()
    }
}

impl From<Vec<IndexEntry>> for IndexTable {
    fn from(entries: Vec<IndexEntry>) -> Self {
        IndexTable { entries }
    }
}

impl FromIterator<IndexEntry> for IndexTable {
    fn from_iter<I: IntoIterator<Item = IndexEntry>>(iter: I) -> Self {
        IndexTable {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    fn table_bytes(offsets: &[u32]) -> Vec<u8> {
        offsets.iter().flat_map(|o| o.to_be_bytes()).collect()
    }

    #[test]
    fn reads_big_endian_offsets() -> Result<()> {
        let mut data = vec![0xaa; 3];
        data.extend(table_bytes(&[0, 0x100, 0x01_0000, 0x0102_0304]));
        let table = IndexTable::read(&data, 3, 4)?;
        assert_eq!(table.offsets(), vec![0, 0x100, 0x01_0000, 0x0102_0304]);
        assert_eq!(table.positions(), vec![0, 1, 2, 3]);
        Ok(())
    }

    #[test]
    fn absent_entries_are_skipped_without_renumbering() -> Result<()> {
        let data = table_bytes(&[10, ABSENT_BLOCK, 30, ABSENT_BLOCK, 50]);
        let table = IndexTable::read(&data, 0, 5)?;
        assert_eq!(table.offsets(), vec![10, 30, 50]);
        assert_eq!(table.positions(), vec![0, 2, 4]);
        Ok(())
    }

    #[test]
    fn all_absent() -> Result<()> {
        let data = table_bytes(&[ABSENT_BLOCK; 4]);
        assert!(IndexTable::read(&data, 0, 4)?.is_empty());
        Ok(())
    }

    #[test]
    fn no_validation_on_read() -> Result<()> {
        let data = table_bytes(&[300, 200, 100]);
        let table = IndexTable::read(&data, 0, 3)?;
        assert_eq!(table.offsets(), vec![300, 200, 100]);
        Ok(())
    }

    #[test]
    fn table_past_end() {
        let data = table_bytes(&[1, 2, 3]);
        assert!(matches!(
            IndexTable::read(&data, 0, 4),
            Err(Error::OutOfBounds(16, 0, 12))
        ));
    }
}
