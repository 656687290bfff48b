// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use image::{codecs::jpeg::JpegEncoder, ExtendedColorType, ImageFormat};

use crate::{
    canvas::Canvas,
    error::{Error, Result},
};

/// Decoder for individual block streams and encoder for the final image.
pub trait BlockCodec {
    /// Decodes one compressed block stream to 8-bit grayscale.
    fn decode_block(&self, stream: &[u8]) -> Result<Canvas>;

    /// Encodes a grayscale canvas to the bytes of an output file.
    fn encode_canvas(&self, canvas: &Canvas) -> Result<Vec<u8>>;
}

/// Baseline JPEG through the `image` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegCodec {
    quality: u8,
}

impl JpegCodec {
    pub const DEFAULT_QUALITY: u8 = 95;

    pub fn new(quality: u8) -> Result<JpegCodec> {
        if !(1..=100).contains(&quality) {
            return Err(Error::InvalidQuality(quality));
        }
        Ok(JpegCodec { quality })
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegCodec {
    fn default() -> Self {
        JpegCodec {
            quality: Self::DEFAULT_QUALITY,
        }
    }
}

impl BlockCodec for JpegCodec {
    fn decode_block(&self, stream: &[u8]) -> Result<Canvas> {
        let image = image::load_from_memory_with_format(stream, ImageFormat::Jpeg)
            .map_err(|err| Error::Codec(err.to_string()))?;
        let gray = image.into_luma8();
        let size = (gray.width() as usize, gray.height() as usize);
        Canvas::from_raw(size, gray.into_raw())
    }

    fn encode_canvas(&self, canvas: &Canvas) -> Result<Vec<u8>> {
        let (xsize, ysize) = canvas.size();
        let too_large = || Error::ImageSizeTooLarge(xsize, ysize);
        let width = u32::try_from(xsize).map_err(|_| too_large())?;
        let height = u32::try_from(ysize).map_err(|_| too_large())?;
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality)
            .encode(canvas.as_bytes(), width, height, ExtendedColorType::L8)
            .map_err(|err| Error::Codec(err.to_string()))?;
        Ok(out)
    }
}
