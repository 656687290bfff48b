// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    canvas::Canvas,
    codec::BlockCodec,
    error::{Error, Result},
    header::HeaderFields,
    index::IndexTable,
    util::tracing_wrappers::*,
};

/// Byte ranges of the block streams in `region`, in table order.
///
/// Each stream ends where the next entry's stream starts; the last one runs
/// to the end of the region.
pub fn stream_ranges(
    table: &IndexTable,
    region_len: usize,
) -> impl Iterator<Item = (u32, std::ops::Range<usize>)> + '_ {
    let ends = table
        .iter()
        .skip(1)
        .map(|e| e.offset())
        .chain(std::iter::once(region_len));
    table
        .iter()
        .zip(ends)
        .map(|(entry, end)| (entry.block_position, entry.offset()..end))
}

/// Decodes every block of `table` and places it on a new canvas.
///
/// Positions missing from the table stay black. Any decoding failure aborts
/// the whole assembly.
pub fn assemble(
    header: &HeaderFields,
    table: &IndexTable,
    region: &[u8],
    codec: &impl BlockCodec,
) -> Result<Canvas> {
    let mut canvas = Canvas::new(header.image_size()?)?;
    for (position, range) in stream_ranges(table, region.len()) {
        let (start, end) = (range.start, range.end);
        let stream = region
            .get(range)
            .ok_or(Error::OutOfBounds(end.saturating_sub(start), start, region.len()))?;
        trace!(position, start, len = stream.len(), "decoding block");
        let block = codec
            .decode_block(stream)
            .map_err(|err| Error::CodecDecode {
                position,
                message: err.to_string(),
            })?;
        if block.size() != header.block_size {
            return Err(Error::BlockSizeMismatch {
                position,
                expected: header.block_size,
                found: block.size(),
            });
        }
        canvas.copy_from(&block, header.block_origin(position))?;
    }
    Ok(canvas)
}
