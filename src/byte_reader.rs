// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

/// Bounds-checked random access to fixed-offset fields of a byte buffer.
#[derive(Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    /// Constructs a ByteReader over the whole buffer.
    pub fn new(data: &'a [u8]) -> ByteReader<'a> {
        ByteReader { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `count` bytes starting at `start`.
    /// ```
    /// # use nitf_unblock::byte_reader::ByteReader;
    /// let br = ByteReader::new(&[1, 2, 3]);
    /// assert_eq!(br.bytes(1, 2)?, &[2, 3]);
    /// assert!(br.bytes(2, 2).is_err());
    /// # Ok::<(), nitf_unblock::error::Error>(())
    /// ```
    pub fn bytes(&self, start: usize, count: usize) -> Result<&'a [u8]> {
        start
            .checked_add(count)
            .and_then(|end| self.data.get(start..end))
            .ok_or(Error::OutOfBounds(count, start, self.data.len()))
    }

    /// Returns everything from `start` to the end of the buffer.
    pub fn tail(&self, start: usize) -> Result<&'a [u8]> {
        self.data
            .get(start..)
            .ok_or(Error::OutOfBounds(0, start, self.data.len()))
    }

    /// Reads a `count`-byte ASCII decimal field, see [`parse_ascii_int`].
    /// ```
    /// # use nitf_unblock::byte_reader::ByteReader;
    /// let br = ByteReader::new(b"xx0042yy");
    /// assert_eq!(br.read_ascii_int(2, 4)?, 42);
    /// assert_eq!(br.read_ascii_int(4, 3)?, 42);
    /// # Ok::<(), nitf_unblock::error::Error>(())
    /// ```
    pub fn read_ascii_int(&self, start: usize, count: usize) -> Result<i64> {
        Ok(parse_ascii_int(self.bytes(start, count)?))
    }

    /// Reads a 4-byte big-endian unsigned integer.
    /// ```
    /// # use nitf_unblock::byte_reader::ByteReader;
    /// let br = ByteReader::new(&[0, 0x12, 0x34, 0x56, 0x78]);
    /// assert_eq!(br.read_u32_be(1)?, 0x12345678);
    /// assert!(br.read_u32_be(2).is_err());
    /// # Ok::<(), nitf_unblock::error::Error>(())
    /// ```
    pub fn read_u32_be(&self, start: usize) -> Result<u32> {
        Ok(BigEndian::read_u32(self.bytes(start, 4)?))
    }
}

/// Parses a decimal integer the way C's `atoi` does, limited to `field`.
///
/// Leading ASCII whitespace is skipped and one sign character is accepted.
/// Parsing stops at the first non-digit; a field without digits is 0.
/// Values that do not fit saturate at the `i64` limits.
pub fn parse_ascii_int(field: &[u8]) -> i64 {
    let mut rest = field;
    while let [first, tail @ ..] = rest {
        if !first.is_ascii_whitespace() {
            break;
        }
        rest = tail;
    }
    let negative = match rest.first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };
    let mut value: i64 = 0;
    for digit in rest.iter().take_while(|b| b.is_ascii_digit()) {
        let digit = (digit - b'0') as i64;
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}
