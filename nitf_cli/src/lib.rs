// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use nitf_unblock::{
    codec::{BlockCodec, JpegCodec},
    decode::{unblock, Unblocked},
    index::IndexTable,
};

/// Where the JPEG for `input` is written.
///
/// Without an explicit output, `.jpg` is appended to the input file name.
/// An explicit output keeps its name if it ends in `.jpg` or `.JPG` and is
/// longer than the bare suffix; otherwise `.jpg` is appended.
pub fn output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    let with_suffix = |path: &Path| {
        let mut name = OsString::from(path.as_os_str());
        name.push(".jpg");
        PathBuf::from(name)
    };
    match output {
        None => with_suffix(input),
        Some(output) => {
            let name = output.to_string_lossy();
            if name.len() < 5 || !(name.ends_with(".jpg") || name.ends_with(".JPG")) {
                with_suffix(output)
            } else {
                output.to_path_buf()
            }
        }
    }
}

/// Reads `input`, repairs its block table, reassembles the image and writes
/// it to `output` as a JPEG of the given quality.
///
/// Nothing is written unless every step before the final write succeeded.
pub fn convert(input: &Path, output: &Path, quality: u8) -> Result<Unblocked> {
    let codec = JpegCodec::new(quality)?;
    let data = std::fs::read(input).wrap_err_with(|| format!("Cannot open file {input:?}"))?;
    let unblocked =
        unblock(&data, &codec).wrap_err_with(|| format!("Failed to reassemble {input:?}"))?;
    let bytes = codec
        .encode_canvas(&unblocked.canvas)
        .wrap_err("Failed to encode output image")?;
    std::fs::write(output, bytes)
        .wrap_err_with(|| format!("Failed to write output file {output:?}"))?;
    Ok(unblocked)
}

/// One line per table entry: block position and stream offset.
pub fn format_index(table: &IndexTable) -> String {
    table
        .iter()
        .map(|entry| {
            format!(
                "block {:>5} at offset {:>10}\n",
                entry.block_position, entry.stream_offset
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nitf_test_utils::{jpeg_block, SyntheticNitf};
    use nitf_unblock::index::IndexEntry;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nitf_cli_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_output_path_default() {
        assert_eq!(
            output_path(Path::new("/data/scene.ntf"), None),
            PathBuf::from("/data/scene.ntf.jpg")
        );
    }

    #[test]
    fn test_output_path_appends_suffix() {
        assert_eq!(
            output_path(Path::new("in.ntf"), Some(Path::new("result"))),
            PathBuf::from("result.jpg")
        );
        assert_eq!(
            output_path(Path::new("in.ntf"), Some(Path::new("out.png"))),
            PathBuf::from("out.png.jpg")
        );
        assert_eq!(
            output_path(Path::new("in.ntf"), Some(Path::new(".jpg"))),
            PathBuf::from(".jpg.jpg")
        );
    }

    #[test]
    fn test_output_path_keeps_jpg() {
        for name in ["a.jpg", "out/result.JPG"] {
            assert_eq!(
                output_path(Path::new("in.ntf"), Some(Path::new(name))),
                PathBuf::from(name)
            );
        }
    }

    #[test]
    fn test_format_index() {
        let table = IndexTable::from(vec![IndexEntry::new(0, 0), IndexEntry::new(1234, 3)]);
        assert_eq!(
            format_index(&table),
            "block     0 at offset          0\nblock     3 at offset       1234\n"
        );
    }

    #[test]
    fn test_truncated_input_writes_nothing() {
        let input = scratch_path("truncated.ntf");
        let output = scratch_path("truncated.jpg");
        std::fs::write(&input, vec![b'0'; 1696]).unwrap();
        let _ = std::fs::remove_file(&output);
        assert!(convert(&input, &output, 95).is_err());
        assert!(!output.exists());
        std::fs::remove_file(&input).unwrap();
    }

    #[test]
    fn test_missing_input() {
        let input = scratch_path("does_not_exist.ntf");
        let output = scratch_path("does_not_exist.jpg");
        let err = convert(&input, &output, 95).unwrap_err();
        assert!(format!("{err:?}").contains("Cannot open file"));
        assert!(!output.exists());
    }

    #[test]
    fn test_convert_writes_jpeg() {
        let input = scratch_path("grid.ntf");
        let output = scratch_path("grid.jpg");
        let streams: Vec<_> = [30u8, 90, 150, 210]
            .iter()
            .map(|&value| jpeg_block((16, 16), value))
            .collect();
        std::fs::write(&input, SyntheticNitf::new((2, 2), (16, 16)).build(&streams)).unwrap();
        let unblocked = convert(&input, &output, 90).unwrap();
        assert_eq!(unblocked.canvas.size(), (32, 32));
        let written = std::fs::read(&output).unwrap();
        assert_eq!(&written[..2], &[0xff, 0xd8]);
        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&output).unwrap();
    }
}
