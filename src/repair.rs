// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Recovery of corrupted block offset tables.
//!
//! Blocks are stored one after the other, so genuine offsets grow with the
//! block position and each one points at a JPEG start-of-image marker. The
//! table carries no checksum; a suspicious entry can only be judged against
//! its neighbors and relocated to the first marker found between the offsets
//! of trusted neighbors.
//!
//! Repair runs as two passes. The ordering pass fixes entries that break the
//! increasing order, the marker pass fixes entries that keep the order but do
//! not point at a marker. Each pass builds a new table; an entry whose search
//! finds nothing is dropped and its block stays blank in the output image.

use crate::{
    index::{IndexEntry, IndexTable},
    util::tracing_wrappers::*,
};

/// JPEG start-of-image marker.
pub const SOI: [u8; 2] = [0xff, 0xd8];

/// Returns whether a start-of-image marker begins at `offset`.
pub fn has_marker(region: &[u8], offset: usize) -> bool {
    region
        .get(offset..)
        .is_some_and(|stream| stream.starts_with(&SOI))
}

/// Finds the first marker strictly after `after` and strictly before `before`.
///
/// Without a lower bound the search starts at the beginning of `region`.
/// Both marker bytes must lie within `region`.
/// ```
/// # use nitf_unblock::repair::find_marker;
/// let region = [0xff, 0xd8, 0, 0xff, 0xd8, 0, 0xff, 0xd8];
/// assert_eq!(find_marker(&region, None, 8), Some(0));
/// assert_eq!(find_marker(&region, Some(0), 8), Some(3));
/// assert_eq!(find_marker(&region, Some(3), 6), None);
/// assert_eq!(find_marker(&region, Some(3), 100), Some(6));
/// ```
pub fn find_marker(region: &[u8], after: Option<usize>, before: usize) -> Option<usize> {
    let start = match after {
        Some(after) => after.checked_add(1)?,
        None => 0,
    };
    let end = before.min(region.len());
    if start >= end {
        return None;
    }
    let window = &region[start..(end + 1).min(region.len())];
    window
        .windows(2)
        .position(|pair| *pair == SOI)
        .map(|pos| start + pos)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Entries whose offset was changed.
    pub replaced: usize,
    /// Entries removed because no marker was found for them.
    pub dropped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Entries in the table before repair.
    pub entries: usize,
    pub ordering: PassSummary,
    pub markers: PassSummary,
}

impl RepairSummary {
    pub fn replaced(&self) -> usize {
        self.ordering.replaced + self.markers.replaced
    }

    pub fn dropped(&self) -> usize {
        self.ordering.dropped + self.markers.dropped
    }

    /// Entries left after repair.
    pub fn kept(&self) -> usize {
        self.entries - self.dropped()
    }
}

/// Output table of a single pass.
struct Pass<'a> {
    region: &'a [u8],
    out: Vec<IndexEntry>,
    summary: PassSummary,
}

impl<'a> Pass<'a> {
    fn new(region: &'a [u8], capacity: usize) -> Pass<'a> {
        Pass {
            region,
            out: Vec::with_capacity(capacity),
            summary: PassSummary::default(),
        }
    }

    /// Offset of the last resolved entry.
    fn lower(&self) -> Option<usize> {
        self.out.last().map(IndexEntry::offset)
    }

    fn keep(&mut self, entry: IndexEntry) {
        self.out.push(entry);
    }

    /// Moves `entry` to the first marker between the last resolved entry and
    /// `before`, or drops it.
    fn relocate(&mut self, entry: IndexEntry, before: usize) {
        let found = find_marker(self.region, self.lower(), before)
            .and_then(|offset| u32::try_from(offset).ok());
        match found {
            Some(offset) => {
                if offset != entry.stream_offset {
                    debug!(
                        position = entry.block_position,
                        from = entry.stream_offset,
                        to = offset,
                        "relocated block stream"
                    );
                    self.summary.replaced += 1;
                }
                self.out.push(IndexEntry::new(offset, entry.block_position));
            }
            None => {
                debug!(
                    position = entry.block_position,
                    offset = entry.stream_offset,
                    lower = ?self.lower(),
                    before,
                    "no stream start found, dropping block"
                );
                self.summary.dropped += 1;
            }
        }
    }

    /// Relocates consecutive entries one after the other, so that each one
    /// takes the first marker following the previous one.
    fn rederive(&mut self, run: &[IndexEntry], before: usize) {
        trace!(len = run.len(), before, "re-deriving run of entries");
        for entry in run {
            self.relocate(*entry, before);
        }
    }

    fn finish(self) -> (Vec<IndexEntry>, PassSummary) {
        (self.out, self.summary)
    }
}

/// Restores increasing offsets.
///
/// When entry `i` is not below entry `i + 1`, the entries around the pair
/// decide which one is wrong:
/// - `i` above `i + 2` while `i + 1` fits after the resolved predecessor:
///   `i` is too high.
/// - `i` below `i + 2` while `i + 1` does not fit after the predecessor:
///   `i + 1` is too low.
/// - both fit: the pair is swapped or duplicated, and both entries are
///   re-derived before `i + 2`.
/// - neither fits: the corruption spans three or more entries, which are
///   re-derived up to the next entry that is in order again.
///
/// The last pair has no right context. The second-to-last entry is kept and
/// the last one is searched for between it and the end of the region.
pub fn repair_ordering(entries: &[IndexEntry], region: &[u8]) -> (Vec<IndexEntry>, PassSummary) {
    let n = entries.len();
    let offset = |k: usize| entries[k].offset();
    let mut pass = Pass::new(region, n);
    let mut i = 0;
    // Every branch bounds its output by the offset of the next entry to
    // visit, so `offset(i) > pass.lower()` holds at the top of the loop.
    while i < n {
        if i + 1 == n || offset(i) < offset(i + 1) {
            pass.keep(entries[i]);
            i += 1;
            continue;
        }
        let low_ok = pass.lower().map_or(true, |lower| offset(i + 1) > lower);
        if i + 2 == n {
            pass.keep(entries[i]);
            pass.relocate(entries[i + 1], region.len());
            break;
        }
        let high_ok = offset(i) < offset(i + 2);
        match (high_ok, low_ok) {
            (false, true) => {
                pass.relocate(entries[i], offset(i + 1));
                i += 1;
            }
            (true, false) => {
                pass.keep(entries[i]);
                pass.relocate(entries[i + 1], offset(i + 2));
                i += 2;
            }
            (true, true) => {
                pass.rederive(&entries[i..i + 2], offset(i + 2));
                i += 2;
            }
            (false, false) => {
                let lower = pass.lower();
                let resume = (i + 2..n).find(|&j| {
                    lower.map_or(true, |lower| offset(j) > lower)
                        && (j + 1 == n || offset(j) < offset(j + 1))
                });
                match resume {
                    Some(j) => {
                        pass.rederive(&entries[i..j], offset(j));
                        i = j;
                    }
                    None => {
                        pass.rederive(&entries[i..], region.len());
                        i = n;
                    }
                }
            }
        }
    }
    pass.finish()
}

/// Relocates every entry that does not point at a marker, searching between
/// its resolved predecessor and its successor.
pub fn repair_markers(entries: &[IndexEntry], region: &[u8]) -> (Vec<IndexEntry>, PassSummary) {
    let mut pass = Pass::new(region, entries.len());
    for (k, entry) in entries.iter().enumerate() {
        if has_marker(region, entry.offset()) {
            pass.keep(*entry);
        } else {
            let before = entries
                .get(k + 1)
                .map_or(region.len(), IndexEntry::offset);
            pass.relocate(*entry, before);
        }
    }
    pass.finish()
}

/// Runs the ordering pass and then the marker pass over `table`.
///
/// `region` is the compressed data the offsets point into. The result has
/// strictly increasing offsets that all point at a marker; block positions
/// are never renumbered.
pub fn repair(table: &IndexTable, region: &[u8]) -> (IndexTable, RepairSummary) {
    let (ordered, ordering) = repair_ordering(&table.entries, region);
    let (entries, markers) = repair_markers(&ordered, region);
    let summary = RepairSummary {
        entries: table.len(),
        ordering,
        markers,
    };
    (IndexTable { entries }, summary)
}
