// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// The maximum cache line size across all known hardware.
///
/// WARNING: changing this constitutes an ABI break; the layout of
/// [`PaddedFlagHolder`](crate::transaction::PaddedFlagHolder) depends on it.
pub const MAX_CACHE_LINE_SIZE: usize = 128;

/// Runtime accessor for [`MAX_CACHE_LINE_SIZE`], for callers holding the
/// value across a linkage boundary.
pub fn max_cache_line_size() -> usize {
    MAX_CACHE_LINE_SIZE
}

/// Alignments required for atomic operations on an object to be valid.
///
/// `recommended` is the alignment required by the language and is always
/// valid. `minimum` is the alignment required by the architecture and is
/// conditionally valid: when `size_within` is 0 it is valid outright,
/// otherwise it is valid only while the object resides entirely inside an
/// aligned buffer of `size_within` bytes. The conditional form communicates
/// on x86 that an operation is atomic as long as the object does not cross a
/// cache-line boundary.
///
/// `recommended` and `minimum` are always powers of two and
/// `minimum <= recommended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    pub recommended: usize,
    pub minimum: usize,
    pub size_within: usize,
}

impl Alignment {
    /// An unconditional requirement: `recommended == minimum`, no buffer
    /// residency condition.
    pub const fn exact(align: usize) -> Alignment {
        Alignment {
            recommended: align,
            minimum: align,
            size_within: 0,
        }
    }

    /// Whether an object at `addr` meets the always-valid alignment.
    pub const fn meets_recommended(&self, addr: usize) -> bool {
        addr % self.recommended == 0
    }

    /// Whether an object of `size` bytes at `addr` meets the architectural
    /// minimum, including the buffer-residency condition when one applies.
    pub const fn meets_minimum(&self, addr: usize, size: usize) -> bool {
        if addr % self.minimum != 0 {
            return false;
        }
        if self.size_within == 0 {
            return true;
        }
        // The object must lie entirely inside one aligned buffer of
        // `size_within` bytes.
        (addr % self.size_within) + size <= self.size_within
    }
}

#[test]
fn exact_requirement_is_unconditional() {
    let align = Alignment::exact(4);
    assert!(align.meets_recommended(8));
    assert!(!align.meets_recommended(2));
    assert!(align.meets_minimum(8, 4));
    assert!(!align.meets_minimum(2, 4));
}

#[test]
fn minimum_respects_buffer_residency() {
    // A 16-byte object, 1-byte minimum alignment, valid only inside one
    // 64-byte line.
    let align = Alignment {
        recommended: 16,
        minimum: 1,
        size_within: 64,
    };
    assert!(align.meets_minimum(0, 16));
    assert!(align.meets_minimum(48, 16));
    // Crosses the line boundary at 64.
    assert!(!align.meets_minimum(49, 16));
    assert!(!align.meets_minimum(56, 16));
    assert!(align.meets_minimum(64, 16));
}

#[test]
fn max_cache_line_size_matches_constant() {
    assert_eq!(max_cache_line_size(), MAX_CACHE_LINE_SIZE);
}
