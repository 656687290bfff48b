// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use nitf_cli::{convert, format_index, output_path};
use nitf_unblock::codec::JpegCodec;

#[derive(Parser)]
#[command(about = "Reassembles a blocked JPEG NITF image into a single JPEG")]
struct Opt {
    /// Input NITF file
    input: PathBuf,

    /// Output JPEG file; `.jpg` is appended when missing
    output: Option<PathBuf>,

    /// Quality of the output JPEG
    #[clap(long, default_value_t = JpegCodec::DEFAULT_QUALITY,
           value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Prints the repaired block offset table
    #[clap(long)]
    print_index: bool,
}

fn main() -> Result<()> {
    #[cfg(feature = "tracing-subscriber")]
    {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(EnvFilter::from_default_env())
            .init();
    }

    let opt = Opt::parse();
    let output = output_path(&opt.input, opt.output.as_deref());
    let unblocked = convert(&opt.input, &output, opt.quality)?;

    let header = &unblocked.header;
    println!(
        "Blocks: {} x {} of {} x {} pixels",
        header.blocks_per_row, header.blocks_per_column, header.block_size.0, header.block_size.1
    );
    let (xsize, ysize) = unblocked.canvas.size();
    println!("Image size: {xsize} x {ysize}");
    println!(
        "Index entries: {} kept, {} replaced, {} dropped",
        unblocked.summary.kept(),
        unblocked.summary.replaced(),
        unblocked.summary.dropped()
    );
    if opt.print_index {
        print!("{}", format_index(&unblocked.table));
    }
    println!("Wrote {}", output.display());
    Ok(())
}
