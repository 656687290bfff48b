// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::{Error, Result};

// Largest canvas we are willing to allocate, in bytes.
const MAX_CANVAS_BYTES: usize = 1 << 31;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub origin: (usize, usize),
    // width, height
    pub size: (usize, usize),
}

impl Rect {
    pub fn is_within(&self, size: (usize, usize)) -> Result<()> {
        if self
            .origin
            .0
            .checked_add(self.size.0)
            .ok_or(Error::ArithmeticOverflow)?
            > size.0
            || self
                .origin
                .1
                .checked_add(self.size.1)
                .ok_or(Error::ArithmeticOverflow)?
                > size.1
        {
            Err(Error::RectOutOfBounds(
                self.size.0,
                self.size.1,
                self.origin.0,
                self.origin.1,
                size.0,
                size.1,
            ))
        } else {
            Ok(())
        }
    }
}

/// 8-bit single-channel image stored row by row.
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    // width, height
    size: (usize, usize),
    data: Vec<u8>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Canvas {}x{}", self.size.0, self.size.1)
    }
}

fn byte_len(size: (usize, usize)) -> Result<usize> {
    match size.0.checked_mul(size.1) {
        Some(len) if len <= MAX_CANVAS_BYTES => Ok(len),
        _ => Err(Error::ImageSizeTooLarge(size.0, size.1)),
    }
}

impl Canvas {
    /// Allocates a zero-filled canvas.
    pub fn new(size: (usize, usize)) -> Result<Canvas> {
        let len = byte_len(size)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        Ok(Canvas { size, data })
    }

    /// Wraps row-major pixel data.
    pub fn from_raw(size: (usize, usize), data: Vec<u8>) -> Result<Canvas> {
        if byte_len(size)? != data.len() {
            return Err(Error::PixelBufferSize(data.len(), size.0, size.1));
        }
        Ok(Canvas { size, data })
    }

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn row(&self, y: usize) -> &[u8] {
        let w = self.size.0;
        &self.data[y * w..(y + 1) * w]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let w = self.size.0;
        &mut self.data[y * w..(y + 1) * w]
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.row(y)[x]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copies all of `block` into this canvas with its top-left corner at
    /// `origin`.
    pub fn copy_from(&mut self, block: &Canvas, origin: (usize, usize)) -> Result<()> {
        let rect = Rect {
            origin,
            size: block.size,
        };
        rect.is_within(self.size)?;
        for y in 0..block.size.1 {
            self.row_mut(origin.1 + y)[origin.0..origin.0 + block.size.0]
                .copy_from_slice(block.row(y));
        }
        Ok(())
    }

    /// Mean pixel value inside `rect`.
    pub fn mean(&self, rect: Rect) -> Result<f64> {
        rect.is_within(self.size)?;
        let count = rect.size.0 * rect.size.1;
        if count == 0 {
            return Ok(0.0);
        }
        let sum: u64 = (rect.origin.1..rect.origin.1 + rect.size.1)
            .map(|y| {
                self.row(y)[rect.origin.0..rect.origin.0 + rect.size.0]
                    .iter()
                    .map(|&v| v as u64)
                    .sum::<u64>()
            })
            .sum();
        Ok(sum as f64 / count as f64)
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn huge_canvas() {
        assert!(matches!(
            Canvas::new((1 << 28, 1 << 28)),
            Err(Error::ImageSizeTooLarge(..))
        ));
        assert!(Canvas::new((usize::MAX, 2)).is_err());
    }

    #[test]
    fn new_is_zeroed() -> Result<()> {
        let canvas = Canvas::new((7, 3))?;
        assert_eq!(canvas.size(), (7, 3));
        assert!(canvas.as_bytes().iter().all(|&v| v == 0));
        Ok(())
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(Canvas::from_raw((2, 2), vec![1, 2, 3, 4]).is_ok());
        assert!(matches!(
            Canvas::from_raw((2, 2), vec![1, 2, 3]),
            Err(Error::PixelBufferSize(3, 2, 2))
        ));
    }

    #[test]
    fn rect_basic() -> Result<()> {
        let size = (32, 42);
        Rect {
            origin: (31, 41),
            size: (1, 1),
        }
        .is_within(size)?;
        Rect {
            origin: (0, 0),
            size,
        }
        .is_within(size)?;
        assert!(Rect {
            origin: (30, 30),
            size: (3, 3)
        }
        .is_within(size)
        .is_err());
        assert!(matches!(
            Rect {
                origin: (usize::MAX, 0),
                size: (1, 1)
            }
            .is_within(size),
            Err(Error::ArithmeticOverflow)
        ));
        Ok(())
    }

    #[test]
    fn copy_into_corner() -> Result<()> {
        let mut canvas = Canvas::new((4, 4))?;
        let block = Canvas::from_raw((2, 2), vec![1, 2, 3, 4])?;
        canvas.copy_from(&block, (2, 2))?;
        assert_eq!(canvas.row(0), &[0, 0, 0, 0]);
        assert_eq!(canvas.row(2), &[0, 0, 1, 2]);
        assert_eq!(canvas.row(3), &[0, 0, 3, 4]);
        assert_eq!(
            canvas.mean(Rect {
                origin: (2, 2),
                size: (2, 2)
            })?,
            2.5
        );
        assert!(matches!(
            canvas.copy_from(&block, (3, 0)),
            Err(Error::RectOutOfBounds(2, 2, 3, 0, 4, 4))
        ));
        Ok(())
    }
}
