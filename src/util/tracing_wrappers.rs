// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! `tracing` macros when the `tracing` feature is enabled, no-ops otherwise.

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub use tracing::{debug, error, info, trace};

#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
mod noop {
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }
    macro_rules! error {
        ($($arg:tt)*) => {};
    }
    macro_rules! info {
        ($($arg:tt)*) => {};
    }
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }
    #[allow(unused_imports)]
    pub(crate) use {debug, error, info, trace};
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use noop::*;

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn macros_accept_fields() {
        let position = 3u32;
        let lower: Option<usize> = None;
        trace!(position, "trace");
        debug!(position, lower = ?lower, "debug");
        info!(entries = 4, "info");
        error!(position, "error");
        let _ = (position, lower);
    }
}
