// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run-time dispatched tables of atomic operations over arbitrary integer
//! widths.
//!
//! Callers ask for a byte width and a memory-order strength and get back a
//! table of function pointers implementing exactly that contract, built by
//! the best backend the target offers. A width/order/backend combination
//! the target cannot satisfy yields the all-null table — never a panic —
//! so higher layers can probe cheaply; check every entry for `None` before
//! invoking it.
//!
//! ```
//! use atomic_ops::{Kind, MemoryOrder, create_ops};
//! use core::ptr::NonNull;
//!
//! let ops = create_ops(size_of::<u32>(), MemoryOrder::SeqCst, Kind::LOCK_FREE);
//! let mut value = 5u32;
//! let operand = 3u32;
//! if let Some(fetch_add) = ops.unsigned.fetch_add {
//!     let mut old = 0u32;
//!     // SAFETY: all three pointers reference live, aligned u32 locals.
//!     unsafe {
//!         fetch_add(
//!             NonNull::from(&mut value).cast(),
//!             NonNull::from(&operand).cast(),
//!             NonNull::from(&mut old).cast(),
//!         );
//!     }
//!     assert_eq!((old, value), (5, 8));
//! }
//! ```

pub mod align;
pub mod backend;
#[cfg(all(target_arch = "x86_64", target_feature = "rtm"))]
pub mod htm;
pub mod ops;
pub mod order;
pub mod registry;
pub mod transaction;

pub use align::{Alignment, MAX_CACHE_LINE_SIZE, max_cache_line_size};
pub use backend::{alignment_native, create_ops_explicit_native, create_ops_native};
pub use ops::{Ops, OpsExplicit};
pub use order::MemoryOrder;
pub use registry::{Id, Kind, get_ids, get_kind};

/// Builds the operation table for `width` bytes at `order`, using the
/// highest-priority registered backend whose kind intersects `kinds` and
/// which supports the request. Returns the all-null table if none does.
pub fn create_ops(width: usize, order: MemoryOrder, kinds: Kind) -> Ops {
    for entry in registry::REGISTRY {
        if !entry.kind.intersects(kinds) {
            continue;
        }
        let ops = (entry.create)(width, order);
        if !ops.is_null() {
            return ops;
        }
    }
    Ops::NULL
}

/// The explicit-order counterpart of [`create_ops`]: every returned
/// operation takes its memory order per call.
pub fn create_ops_explicit(width: usize, kinds: Kind) -> OpsExplicit {
    for entry in registry::REGISTRY {
        if !entry.kind.intersects(kinds) {
            continue;
        }
        let ops = (entry.create_explicit)(width);
        if !ops.is_null() {
            return ops;
        }
    }
    OpsExplicit::NULL
}

#[test]
fn dispatch_finds_the_native_backend() {
    let ops = create_ops(size_of::<u32>(), MemoryOrder::SeqCst, Kind::LOCK_FREE);
    assert!(!ops.is_null());
    let ops = create_ops_explicit(size_of::<u32>(), Kind::LOCK_FREE);
    assert!(!ops.is_null());
}

#[test]
fn dispatch_respects_the_kind_mask() {
    // No registered backend serves tables under LOCK_BASED.
    let ops = create_ops(size_of::<u32>(), MemoryOrder::SeqCst, Kind::LOCK_BASED);
    assert!(ops.is_null());
}
