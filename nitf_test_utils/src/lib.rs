// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use image::{codecs::jpeg::JpegEncoder, ExtendedColorType};

#[macro_export]
macro_rules! assert_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let diff = if *left_val > *right_val {
                    *left_val - *right_val
                } else {
                    *right_val - *left_val
                };
                if !(diff <= $max_error) {
                    panic!(
                        "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n max_error: `{:?}`",
                        left_val, right_val, $max_error
                    );
                }
            }
        }
    };
}

/// Smallest file the header reader accepts.
pub const MIN_FILE_SIZE: usize = 1697;

const FILE_HEADER_LEN: usize = 388;
// The image segment starts with the blocked-image-data offset.
const IMAGE_SEGMENT_BASE: usize = 907;
const BLOCK_TABLE_BASE: usize = 917;

/// A stream that starts with a JPEG SOI marker, ends with EOI and is filled
/// with `tag` in between. `tag` must not be 0xff.
pub fn fake_stream(tag: u8, len: usize) -> Vec<u8> {
    assert!(len >= 4, "stream needs room for SOI and EOI");
    assert_ne!(tag, 0xff);
    let mut stream = vec![tag; len];
    stream[..2].copy_from_slice(&[0xff, 0xd8]);
    stream[len - 2..].copy_from_slice(&[0xff, 0xd9]);
    stream
}

/// A real baseline JPEG of a uniform gray block.
pub fn jpeg_block(size: (usize, usize), value: u8) -> Vec<u8> {
    let pixels = vec![value; size.0 * size.1];
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 95)
        .encode(&pixels, size.0 as u32, size.1 as u32, ExtendedColorType::L8)
        .unwrap();
    out
}

/// Builder for minimal blocked NITF files.
///
/// The layout puts the file header and image subheader in front of the
/// image segment, which starts with the blocked-image-data offset, then the
/// block offset table, padding up to [`MIN_FILE_SIZE`] if needed, and the
/// concatenated block streams.
#[derive(Debug, Clone)]
pub struct SyntheticNitf {
    grid: (u32, u32),
    block_size: (usize, usize),
    extended_subheader_len: usize,
}

fn put_field(data: &mut [u8], offset: usize, len: usize, value: usize) {
    let text = format!("{value:0len$}");
    assert_eq!(text.len(), len, "{value} does not fit in {len} digits");
    data[offset..offset + len].copy_from_slice(text.as_bytes());
}

impl SyntheticNitf {
    /// `grid` is blocks per row and per column, `block_size` pixels per block.
    pub fn new(grid: (u32, u32), block_size: (usize, usize)) -> SyntheticNitf {
        SyntheticNitf {
            grid,
            block_size,
            extended_subheader_len: 0,
        }
    }

    pub fn with_extended_subheader_len(mut self, len: usize) -> SyntheticNitf {
        self.extended_subheader_len = len;
        self
    }

    pub fn num_blocks(&self) -> usize {
        self.grid.0 as usize * self.grid.1 as usize
    }

    pub fn block_table_offset(&self) -> usize {
        BLOCK_TABLE_BASE + self.extended_subheader_len
    }

    fn image_segment_offset(&self) -> usize {
        IMAGE_SEGMENT_BASE + self.extended_subheader_len
    }

    /// Absolute position of the first block stream.
    pub fn compressed_data_offset(&self) -> usize {
        (self.block_table_offset() + 4 * self.num_blocks()).max(MIN_FILE_SIZE)
    }

    /// Offsets of `streams` when stored back to back.
    pub fn stream_offsets(streams: &[Vec<u8>]) -> Vec<u32> {
        streams
            .iter()
            .scan(0u32, |next, stream| {
                let offset = *next;
                *next += stream.len() as u32;
                Some(offset)
            })
            .collect()
    }

    /// Builds a file with a correct table for `streams`; blocks without a
    /// stream are marked absent.
    pub fn build(&self, streams: &[Vec<u8>]) -> Vec<u8> {
        let mut table = Self::stream_offsets(streams);
        table.resize(self.num_blocks(), u32::MAX);
        self.build_with_table(streams, &table)
    }

    /// Builds a file storing `streams` back to back, with `table` as the
    /// block offset table.
    pub fn build_with_table(&self, streams: &[Vec<u8>], table: &[u32]) -> Vec<u8> {
        assert_eq!(table.len(), self.num_blocks());
        let start = self.compressed_data_offset();
        let image_segment = self.image_segment_offset();
        let mut data = vec![b' '; start];
        data[..9].copy_from_slice(b"NITF02.10");
        put_field(&mut data, 354, 6, FILE_HEADER_LEN);
        put_field(&mut data, 363, 6, image_segment - FILE_HEADER_LEN);
        put_field(&mut data, 859, 4, self.grid.0 as usize);
        put_field(&mut data, 863, 4, self.grid.1 as usize);
        put_field(&mut data, 867, 4, self.block_size.0);
        put_field(&mut data, 871, 4, self.block_size.1);
        put_field(&mut data, 902, 5, self.extended_subheader_len);
        let blocked_offset = (start - image_segment) as u32;
        data[image_segment..image_segment + 4].copy_from_slice(&blocked_offset.to_be_bytes());
        data[image_segment + 4..image_segment + 10].fill(0);
        for (k, offset) in table.iter().enumerate() {
            let pos = self.block_table_offset() + 4 * k;
            data[pos..pos + 4].copy_from_slice(&offset.to_be_bytes());
        }
        for stream in streams {
            data.extend_from_slice(stream);
        }
        let image_len = data.len() - image_segment;
        put_field(&mut data, 369, 10, image_len);
        data
    }
}
