// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::header::MIN_FILE_SIZE;

#[derive(Error, Debug)]
pub enum Error {
    #[error("File truncated: {0} bytes, at least {} needed to reach the header fields", MIN_FILE_SIZE)]
    TruncatedInput(usize),
    #[error("Read out of bounds: {0} bytes at offset {1}, buffer is {2} bytes")]
    OutOfBounds(usize, usize, usize),
    #[error("Invalid value {1} for header field {0}")]
    InvalidHeaderField(&'static str, i64),
    // Generic arithmetic overflow. Prefer using other errors if possible.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    #[error("Image size too large: {0}x{1}")]
    ImageSizeTooLarge(usize, usize),
    #[error("Rect out of bounds: {0}x{1}+{2}+{3} rect in {4}x{5} canvas")]
    RectOutOfBounds(usize, usize, usize, usize, usize, usize),
    #[error("Pixel buffer of {0} bytes does not match a {1}x{2} image")]
    PixelBufferSize(usize, usize, usize),
    #[error("Block {position} decoded to {found:?}, expected {expected:?}")]
    BlockSizeMismatch {
        position: u32,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Failed to decode block {position}: {message}")]
    CodecDecode { position: u32, message: String },
    #[error("Codec error: {0}")]
    Codec(String),
    #[error("Invalid JPEG quality {0}, expected 1..=100")]
    InvalidQuality(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
