// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Recovery of blocked, JPEG-compressed NITF imagery whose block offset table
//! is corrupted.
//!
//! [`decode::unblock`] reads the header fields, extracts and repairs the block
//! offset table and reassembles the blocks into a single grayscale canvas.

#![deny(unsafe_code)]
pub mod assemble;
pub mod byte_reader;
pub mod canvas;
pub mod codec;
pub mod decode;
pub mod error;
pub mod header;
pub mod index;
pub mod repair;
pub mod util;
