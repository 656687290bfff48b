// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    assemble::assemble,
    byte_reader::ByteReader,
    canvas::Canvas,
    codec::BlockCodec,
    error::Result,
    header::HeaderFields,
    index::IndexTable,
    repair::{repair, RepairSummary},
    util::tracing_wrappers::*,
};

/// Result of reassembling one file.
#[derive(Debug)]
pub struct Unblocked {
    pub header: HeaderFields,
    /// Offset table after repair.
    pub table: IndexTable,
    pub summary: RepairSummary,
    pub canvas: Canvas,
}

/// Reads the headers and block table of a NITF file, repairs the table and
/// reassembles the image from its blocks.
pub fn unblock(data: &[u8], codec: &impl BlockCodec) -> Result<Unblocked> {
    let header = HeaderFields::read(data)?;
    info!(
        blocks_per_row = header.blocks_per_row,
        blocks_per_column = header.blocks_per_column,
        block_xsize = header.block_size.0,
        block_ysize = header.block_size.1,
        "read image header"
    );
    let region = ByteReader::new(data).tail(header.compressed_data_offset()?)?;
    debug!(
        start = header.compressed_data_offset()?,
        len = region.len(),
        "compressed block data"
    );
    let raw_table = IndexTable::read(data, header.block_table_offset(), header.num_blocks())?;
    let (table, summary) = repair(&raw_table, region);
    info!(
        entries = summary.entries,
        replaced = summary.replaced(),
        dropped = summary.dropped(),
        "repaired block offset table"
    );
    let canvas = assemble(&header, &table, region, codec)?;
    Ok(Unblocked {
        header,
        table,
        summary,
        canvas,
    })
}
