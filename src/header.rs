// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Fixed-offset fields of the NITF file header and the first image subheader.
//!
//! Only the fields needed to locate the blocked JPEG data are read, at the byte
//! positions of the single-band, blocked, JPEG-compressed layout.

use crate::{
    byte_reader::ByteReader,
    error::{Error, Result},
};

/// Smallest file that contains every header field read here.
pub const MIN_FILE_SIZE: usize = 1697;

/// Location of an ASCII decimal field: `len` bytes at `offset`.
#[derive(Debug, Clone, Copy)]
struct AsciiField {
    name: &'static str,
    offset: usize,
    len: usize,
}

const fn field(name: &'static str, len: usize, offset: usize) -> AsciiField {
    AsciiField { name, offset, len }
}

const HL: AsciiField = field("HL", 6, 354);
const LISH: AsciiField = field("LISH", 6, 363);
const LI: AsciiField = field("LI", 10, 369);
const NBPR: AsciiField = field("NBPR", 4, 859);
const NBPC: AsciiField = field("NBPC", 4, 863);
const NPPBH: AsciiField = field("NPPBH", 4, 867);
const NPPBV: AsciiField = field("NPPBV", 4, 871);
const IXSHDL: AsciiField = field("IXSHDL", 5, 902);

// Relative to the end of the extended subheader data length field.
const BLOCKED_DATA_OFFSET_BASE: usize = 907;
// The blocked-image-data offset, a 2-byte mask record length and two 2-byte
// pad/transparency fields precede the block offset table.
const BLOCK_TABLE_BASE: usize = BLOCKED_DATA_OFFSET_BASE + 4 + 2 * 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    pub file_header_len: usize,
    pub subheader_len: usize,
    /// Length of the image segment as recorded; informational only.
    pub image_data_len: i64,
    pub blocks_per_row: u32,
    pub blocks_per_column: u32,
    /// Horizontal and vertical pixels per block.
    pub block_size: (usize, usize),
    pub extended_subheader_len: usize,
    pub blocked_image_data_offset: u32,
}

fn read_nonnegative(br: &ByteReader, f: AsciiField) -> Result<u64> {
    let value = br.read_ascii_int(f.offset, f.len)?;
    u64::try_from(value).map_err(|_| Error::InvalidHeaderField(f.name, value))
}

fn read_positive(br: &ByteReader, f: AsciiField) -> Result<u32> {
    let value = br.read_ascii_int(f.offset, f.len)?;
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::InvalidHeaderField(f.name, value)),
    }
}

fn to_usize(value: u64) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::ArithmeticOverflow)
}

impl HeaderFields {
    /// Reads the header fields from the start of a file.
    pub fn read(data: &[u8]) -> Result<HeaderFields> {
        if data.len() < MIN_FILE_SIZE {
            return Err(Error::TruncatedInput(data.len()));
        }
        let br = ByteReader::new(data);
        let file_header_len = to_usize(read_nonnegative(&br, HL)?)?;
        let subheader_len = to_usize(read_nonnegative(&br, LISH)?)?;
        let image_data_len = br.read_ascii_int(LI.offset, LI.len)?;
        let blocks_per_row = read_positive(&br, NBPR)?;
        let blocks_per_column = read_positive(&br, NBPC)?;
        let block_size = (
            read_positive(&br, NPPBH)? as usize,
            read_positive(&br, NPPBV)? as usize,
        );
        let extended_subheader_len = to_usize(read_nonnegative(&br, IXSHDL)?)?;
        let blocked_image_data_offset =
            br.read_u32_be(BLOCKED_DATA_OFFSET_BASE + extended_subheader_len)?;
        Ok(HeaderFields {
            file_header_len,
            subheader_len,
            image_data_len,
            blocks_per_row,
            blocks_per_column,
            block_size,
            extended_subheader_len,
            blocked_image_data_offset,
        })
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks_per_row as usize * self.blocks_per_column as usize
    }

    /// Position of the raw big-endian blocked-image-data offset.
    pub fn blocked_image_data_offset_position(&self) -> usize {
        BLOCKED_DATA_OFFSET_BASE + self.extended_subheader_len
    }

    /// Position of the first entry of the block offset table.
    pub fn block_table_offset(&self) -> usize {
        BLOCK_TABLE_BASE + self.extended_subheader_len
    }

    /// Start of the compressed block data, relative to the start of the file.
    pub fn compressed_data_offset(&self) -> Result<usize> {
        self.subheader_len
            .checked_add(self.file_header_len)
            .and_then(|v| v.checked_add(self.blocked_image_data_offset as usize))
            .ok_or(Error::ArithmeticOverflow)
    }

    /// Width and height of the reassembled image.
    pub fn image_size(&self) -> Result<(usize, usize)> {
        let xsize = self
            .block_size
            .0
            .checked_mul(self.blocks_per_row as usize)
            .ok_or(Error::ArithmeticOverflow)?;
        let ysize = self
            .block_size
            .1
            .checked_mul(self.blocks_per_column as usize)
            .ok_or(Error::ArithmeticOverflow)?;
        Ok((xsize, ysize))
    }

    /// Top-left pixel of the block at row-major `position`.
    pub fn block_origin(&self, position: u32) -> (usize, usize) {
        let bpr = self.blocks_per_row as usize;
        let position = position as usize;
        (
            self.block_size.0 * (position % bpr),
            self.block_size.1 * (position / bpr),
        )
    }
}

#[cfg(test)]
mod test {
    use nitf_test_utils::SyntheticNitf;
    use test_log::test;

    use super::*;

    fn put(data: &mut [u8], offset: usize, text: &[u8]) {
        data[offset..offset + text.len()].copy_from_slice(text);
    }

    #[test]
    fn reads_synthetic_header() -> Result<()> {
        let nitf = SyntheticNitf::new((3, 2), (64, 32)).with_extended_subheader_len(12);
        let data = nitf.build(&vec![vec![0xff, 0xd8]; 6]);
        let header = HeaderFields::read(&data)?;
        assert_eq!(header.blocks_per_row, 3);
        assert_eq!(header.blocks_per_column, 2);
        assert_eq!(header.block_size, (64, 32));
        assert_eq!(header.extended_subheader_len, 12);
        assert_eq!(header.num_blocks(), 6);
        assert_eq!(header.block_table_offset(), 917 + 12);
        assert_eq!(header.blocked_image_data_offset_position(), 907 + 12);
        assert_eq!(header.image_size()?, (192, 64));
        assert_eq!(header.compressed_data_offset()?, nitf.compressed_data_offset());
        Ok(())
    }

    #[test]
    fn rejects_truncated_input() {
        let data = vec![b'0'; MIN_FILE_SIZE - 1];
        assert!(matches!(
            HeaderFields::read(&data),
            Err(Error::TruncatedInput(1696))
        ));
    }

    #[test]
    fn extended_subheader_past_end() {
        let mut data = vec![b'0'; MIN_FILE_SIZE];
        put(&mut data, NBPR.offset, b"0001");
        put(&mut data, NBPC.offset, b"0001");
        put(&mut data, NPPBH.offset, b"0008");
        put(&mut data, NPPBV.offset, b"0008");
        put(&mut data, IXSHDL.offset, b"99999");
        assert!(matches!(
            HeaderFields::read(&data),
            Err(Error::OutOfBounds(4, 100906, 1697))
        ));
    }

    #[test]
    fn rejects_empty_grid() {
        let mut data = vec![b'0'; MIN_FILE_SIZE];
        put(&mut data, NBPR.offset, b"0002");
        put(&mut data, NBPC.offset, b"NONE");
        put(&mut data, NPPBH.offset, b"0008");
        put(&mut data, NPPBV.offset, b"0008");
        assert!(matches!(
            HeaderFields::read(&data),
            Err(Error::InvalidHeaderField("NBPC", 0))
        ));
    }

    #[test]
    fn rejects_negative_length() {
        let mut data = vec![b'0'; MIN_FILE_SIZE];
        put(&mut data, HL.offset, b"-00001");
        assert!(matches!(
            HeaderFields::read(&data),
            Err(Error::InvalidHeaderField("HL", -1))
        ));
    }

    #[test]
    fn image_data_length_is_not_validated() -> Result<()> {
        let mut data = SyntheticNitf::new((2, 1), (8, 8)).build(&vec![vec![0xff, 0xd8]; 2]);
        put(&mut data, LI.offset, b"-000000007");
        let header = HeaderFields::read(&data)?;
        assert_eq!(header.image_data_len, -7);
        assert_eq!(header.num_blocks(), 2);
        Ok(())
    }

    #[test]
    fn block_origins_are_row_major() -> Result<()> {
        let data = SyntheticNitf::new((3, 2), (10, 20)).build(&vec![vec![0xff, 0xd8]; 6]);
        let header = HeaderFields::read(&data)?;
        assert_eq!(header.block_origin(0), (0, 0));
        assert_eq!(header.block_origin(2), (20, 0));
        assert_eq!(header.block_origin(3), (0, 20));
        assert_eq!(header.block_origin(5), (20, 20));
        Ok(())
    }

    #[test]
    fn decoding_is_pure() -> Result<()> {
        let data = SyntheticNitf::new((4, 4), (16, 16)).build(&vec![vec![0xff, 0xd8]; 16]);
        assert_eq!(HeaderFields::read(&data)?, HeaderFields::read(&data)?);
        Ok(())
    }
}
