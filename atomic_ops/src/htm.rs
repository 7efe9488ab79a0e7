// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hardware transactional memory over x86-64 RTM.
//!
//! Compiled only when the `rtm` target feature is enabled; on every other
//! target the registry simply has no HTM row and
//! [`get_kind`](crate::registry::get_kind) reports the unknown sentinel
//! for [`Id::HTM`](crate::registry::Id::HTM).
//!
//! Bodies run speculatively: a body must not panic, allocate, or enter the
//! kernel, and any memory it touches becomes part of the transaction's
//! read/write set.

use core::arch::asm;
use core::cell::Cell;
use core::sync::atomic::Ordering;

use crate::ops::{Ops, OpsExplicit};
use crate::order::MemoryOrder;
use crate::transaction::{
    AbortReason, TransactionCmpxchg, TransactionConfigWfb, TransactionFlag, TransactionResultWfb,
    TransactionStatus, execute_with_fallback,
};

/// EAX value observed when XBEGIN falls through into the transaction.
const XBEGIN_STARTED: u32 = !0;

// Abort-status bits, per the instruction set reference.
const XABORT_XABORT: u32 = 1 << 0;
const XABORT_CONFLICT: u32 = 1 << 2;
const XABORT_CAPACITY: u32 = 1 << 3;
const XABORT_DEBUG: u32 = 1 << 4;
const XABORT_NESTED: u32 = 1 << 5;

/// Begins a transaction. Returns [`XBEGIN_STARTED`] on entry; when the
/// transaction later aborts, control reappears here with the abort word.
#[inline(always)]
unsafe fn xbegin() -> u32 {
    let status: u32;
    // SAFETY: the module is only compiled with RTM available. An abort
    // rolls every register back to this point, so from the compiler's
    // view the block merely returns a different value.
    unsafe {
        asm!(
            "mov eax, 0xffffffff",
            "xbegin 2f",
            "2:",
            out("eax") status,
            options(nostack),
        );
    }
    status
}

/// Commits the current transaction.
#[inline(always)]
unsafe fn xend() {
    // SAFETY: caller is inside a transaction started with [`xbegin`].
    unsafe {
        asm!("xend", options(nostack));
    }
}

/// Aborts the current transaction with an 8-bit reason code, surfacing as
/// [`AbortReason::Explicit`] at the matching [`xbegin`].
///
/// # Safety
///
/// Must be executed inside a live transaction; outside one the instruction
/// falls through, contradicting the never-returns signature.
#[inline(always)]
pub unsafe fn abort_with<const CODE: u8>() -> ! {
    // SAFETY: caller is inside a transaction, so execution resumes at the
    // xbegin fallback and this block never returns.
    unsafe {
        asm!("xabort {code}", code = const CODE, options(nostack, noreturn));
    }
}

/// Maps an XBEGIN abort word onto the stable status encoding. A zero word
/// means the abort came from an asynchronous event.
fn decode(status: u32) -> TransactionStatus {
    debug_assert_ne!(status, XBEGIN_STARTED);
    let reason = if status & XABORT_XABORT != 0 {
        AbortReason::Explicit((status >> 24) as u8)
    } else if status & XABORT_CONFLICT != 0 {
        AbortReason::Conflict
    } else if status & XABORT_CAPACITY != 0 {
        AbortReason::Capacity
    } else if status & XABORT_NESTED != 0 {
        AbortReason::Nested
    } else if status & XABORT_DEBUG != 0 {
        AbortReason::Debug
    } else {
        AbortReason::Interrupt
    };
    TransactionStatus::Aborted(reason)
}

/// Runs `body` as one hardware attempt: begin, pull the guard flag into
/// the read set, run the body, commit. This is the attempt primitive to
/// pair with [`execute`](crate::transaction::execute) and
/// [`execute_with_fallback`].
///
/// # Safety
///
/// `body` must be transaction-safe: no panicking, no allocation, no
/// system calls, and every pointer it dereferences must be valid.
pub unsafe fn attempt_once(flag: &TransactionFlag, body: impl FnOnce()) -> TransactionStatus {
    // SAFETY: module cfg guarantees RTM.
    let status = unsafe { xbegin() };
    if status == XBEGIN_STARTED {
        // Any other thread writing the flag's cache line aborts us here.
        flag.load(Ordering::Relaxed);
        body();
        // SAFETY: still inside the transaction begun above.
        unsafe { xend() };
        TransactionStatus::Success
    } else {
        decode(status)
    }
}

/// Multi-location compare-exchange under one transaction.
///
/// If every descriptor's object equals its expected value, all desired
/// values are stored and the first returned value is `true`. Otherwise
/// the observed values are written back through the expected pointers and
/// the first returned value is `false`. Either outcome commits; the
/// fallback path only runs when the hardware keeps aborting.
///
/// # Safety
///
/// Every descriptor pointer must be valid for `width` bytes (writable for
/// `obj` and `expected`), and `config`'s flags follow the
/// [`execute_with_fallback`] contract.
pub unsafe fn cmpxchg_n(
    descs: &[TransactionCmpxchg],
    config: TransactionConfigWfb,
) -> (bool, TransactionResultWfb) {
    let swapped = Cell::new(false);
    let swapped_ref = &swapped;
    let one = move |flag: &TransactionFlag| -> TransactionStatus {
        // SAFETY: forwarded caller contract; the body is read/copy only.
        unsafe {
            attempt_once(flag, || {
                let mut all_match = true;
                for desc in descs {
                    let obj =
                        core::slice::from_raw_parts(desc.obj.as_ptr() as *const u8, desc.width);
                    let expected = core::slice::from_raw_parts(
                        desc.expected.as_ptr() as *const u8,
                        desc.width,
                    );
                    if obj != expected {
                        all_match = false;
                        break;
                    }
                }
                if all_match {
                    for desc in descs {
                        core::ptr::copy_nonoverlapping(
                            desc.desired.as_ptr() as *const u8,
                            desc.obj.as_ptr() as *mut u8,
                            desc.width,
                        );
                    }
                } else {
                    for desc in descs {
                        core::ptr::copy_nonoverlapping(
                            desc.obj.as_ptr() as *const u8,
                            desc.expected.as_ptr() as *mut u8,
                            desc.width,
                        );
                    }
                }
                swapped_ref.set(all_match);
            })
        }
    };
    // SAFETY: forwarded caller contract.
    let result = unsafe { execute_with_fallback(config, one, one) };
    // An abort rolls the cell write back with everything else, so the cell
    // is true only if a body observing a full match committed.
    (swapped.get(), result)
}

// This backend's capability is transactional execution; it serves no
// width/order operation tables.
pub(crate) fn create_ops_htm(_width: usize, _order: MemoryOrder) -> Ops {
    Ops::NULL
}

pub(crate) fn create_ops_explicit_htm(_width: usize) -> OpsExplicit {
    OpsExplicit::NULL
}

#[test]
fn single_location_cmpxchg_commits() {
    use core::ptr::NonNull;

    let mut obj = 41u64;
    let mut expected = 41u64;
    let desired = 42u64;
    let descs = [TransactionCmpxchg {
        width: size_of::<u64>(),
        obj: NonNull::from(&mut obj).cast(),
        expected: NonNull::from(&mut expected).cast(),
        desired: NonNull::from(&desired).cast(),
    }];
    let config = TransactionConfigWfb {
        width: size_of::<u64>(),
        attempts: 1000,
        fallback_attempts: 1000,
        flag: None,
        fallback_flag: None,
    };
    // SAFETY: all pointers are live locals of the right width.
    let (swapped, result) = unsafe { cmpxchg_n(&descs, config) };
    if result.status.is_success() || result.fallback_status.is_success() {
        assert!(swapped);
        assert_eq!(obj, 42);
    }
}
