// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The transactional-memory execution model.
//!
//! A transactional backend runs an operation as a sequence of hardware
//! attempts, each of which commits atomically or aborts with a status.
//! This module holds everything backend-independent: the abort-status
//! encoding, the guard-flag placement that avoids false-sharing aborts,
//! the attempt/fallback configuration and bookkeeping, and the retry
//! protocol that drives a backend's attempt primitive.

use core::mem::offset_of;
use core::ptr::NonNull;
use core::sync::atomic::AtomicU8;

use crate::align::MAX_CACHE_LINE_SIZE;

/// A guard byte read at the start of every transaction attempt, bringing
/// its cache line into the transaction's read set. Any write to that line
/// by another thread aborts the live transaction, so the flag doubles as a
/// cross-thread serialization point between transactional and
/// non-transactional code.
pub type TransactionFlag = AtomicU8;

/// Holds a [`TransactionFlag`] on a cache line of its own.
///
/// An unrelated write landing on the flag's cache line aborts any live
/// transaction that has read the flag; the padding guarantees the flag
/// shares its line with nothing. Layout is ABI-frozen against
/// [`MAX_CACHE_LINE_SIZE`].
#[repr(C)]
pub struct PaddedFlagHolder {
    _padding_pre: [u8; MAX_CACHE_LINE_SIZE - 1],
    pub flag: TransactionFlag,
    _padding_post: [u8; MAX_CACHE_LINE_SIZE],
}

const _: () = assert!(size_of::<PaddedFlagHolder>() >= 2 * MAX_CACHE_LINE_SIZE);
const _: () = assert!(offset_of!(PaddedFlagHolder, flag) == MAX_CACHE_LINE_SIZE - 1);

impl PaddedFlagHolder {
    pub const fn new() -> PaddedFlagHolder {
        PaddedFlagHolder {
            _padding_pre: [0; MAX_CACHE_LINE_SIZE - 1],
            flag: AtomicU8::new(0),
            _padding_post: [0; MAX_CACHE_LINE_SIZE],
        }
    }
}

impl Default for PaddedFlagHolder {
    fn default() -> PaddedFlagHolder {
        PaddedFlagHolder::new()
    }
}

/// Why a transaction attempt aborted. The reasons are mutually exclusive;
/// a well-behaved backend reports exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Aborted without a distinguishable cause.
    Unspecified,
    /// The transaction body aborted itself, with an 8-bit reason code.
    Explicit(u8),
    /// Memory conflict with another thread.
    Conflict,
    /// The transaction's read or write set outgrew hardware capacity.
    Capacity,
    /// An inner nested transaction aborted.
    Nested,
    /// A debug trap fired inside the transaction.
    Debug,
    /// An interrupt arrived during the transaction.
    Interrupt,
}

/// Outcome of the final attempt at a transactional operation.
///
/// The wire encoding is stable: bit 0 set means aborted, bits 1-6 carry
/// the exclusive abort reason, and bits 8-15 carry the user reason code of
/// an explicit abort. [`TransactionStatus::to_raw`] and
/// [`TransactionStatus::from_raw`] convert losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Success,
    Aborted(AbortReason),
}

const ABORTED: u32 = 1;
const ABORT_EXPLICIT: u32 = 0x2 | ABORTED;
const ABORT_CONFLICT: u32 = 0x4 | ABORTED;
const ABORT_CAPACITY: u32 = 0x8 | ABORTED;
const ABORT_NESTED: u32 = 0x10 | ABORTED;
const ABORT_DEBUG: u32 = 0x20 | ABORTED;
const ABORT_INT: u32 = 0x40 | ABORTED;

impl TransactionStatus {
    pub const fn is_success(self) -> bool {
        matches!(self, TransactionStatus::Success)
    }

    /// The stable bit encoding of this status.
    pub const fn to_raw(self) -> u32 {
        match self {
            TransactionStatus::Success => 0,
            TransactionStatus::Aborted(reason) => match reason {
                AbortReason::Unspecified => ABORTED,
                AbortReason::Explicit(code) => ABORT_EXPLICIT | ((code as u32) << 8),
                AbortReason::Conflict => ABORT_CONFLICT,
                AbortReason::Capacity => ABORT_CAPACITY,
                AbortReason::Nested => ABORT_NESTED,
                AbortReason::Debug => ABORT_DEBUG,
                AbortReason::Interrupt => ABORT_INT,
            },
        }
    }

    /// Decodes the stable bit encoding. Unknown reason bits decode as
    /// [`AbortReason::Unspecified`].
    pub const fn from_raw(raw: u32) -> TransactionStatus {
        if raw & ABORTED == 0 {
            return TransactionStatus::Success;
        }
        let reason = if raw & 0x2 != 0 {
            AbortReason::Explicit((raw >> 8) as u8)
        } else if raw & 0x4 != 0 {
            AbortReason::Conflict
        } else if raw & 0x8 != 0 {
            AbortReason::Capacity
        } else if raw & 0x10 != 0 {
            AbortReason::Nested
        } else if raw & 0x20 != 0 {
            AbortReason::Debug
        } else if raw & 0x40 != 0 {
            AbortReason::Interrupt
        } else {
            AbortReason::Unspecified
        };
        TransactionStatus::Aborted(reason)
    }
}

/// The user reason code embedded in `raw`, meaningful only for explicit
/// aborts; 0 for every other status.
pub const fn abort_reason(raw: u32) -> u8 {
    if raw & ABORT_EXPLICIT == ABORT_EXPLICIT {
        (raw >> 8) as u8
    } else {
        0
    }
}

/// Configuration for a transactional operation without a fallback path.
///
/// `flag` may be `None`, selecting an internally seeded flag that lives
/// for the duration of the operation.
#[derive(Debug, Clone, Copy)]
pub struct TransactionConfig {
    /// Size in bytes of the objects operated on.
    pub width: usize,
    /// Maximum number of attempts at committing the transaction.
    pub attempts: usize,
    pub flag: Option<NonNull<TransactionFlag>>,
}

/// Configuration with a fallback path. `flag` and `fallback_flag` may
/// alias the same flag, and either may be `None`.
#[derive(Debug, Clone, Copy)]
pub struct TransactionConfigWfb {
    pub width: usize,
    pub attempts: usize,
    pub fallback_attempts: usize,
    pub flag: Option<NonNull<TransactionFlag>>,
    pub fallback_flag: Option<NonNull<TransactionFlag>>,
}

/// Bookkeeping for a transactional operation without a fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionResult {
    /// Status of the final attempt.
    pub status: TransactionStatus,
    /// Attempts actually made; never exceeds the configured `attempts`.
    pub attempts_made: usize,
}

/// Bookkeeping for a transactional operation with a fallback path.
/// `fallback_status` stays [`TransactionStatus::Success`] and
/// `fallback_attempts_made` stays 0 whenever the primary path committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionResultWfb {
    pub status: TransactionStatus,
    pub fallback_status: TransactionStatus,
    pub attempts_made: usize,
    pub fallback_attempts_made: usize,
}

/// One entry of a multi-location compare-exchange: replace the `width`
/// bytes at `obj` with those at `desired` if they currently equal those at
/// `expected`.
#[derive(Debug, Clone, Copy)]
pub struct TransactionCmpxchg {
    pub width: usize,
    pub obj: NonNull<()>,
    pub expected: NonNull<()>,
    pub desired: NonNull<()>,
}

fn resolve_flag<'a>(
    configured: Option<NonNull<TransactionFlag>>,
    local: &'a PaddedFlagHolder,
) -> &'a TransactionFlag {
    match configured {
        // SAFETY: a configured flag points to caller-owned memory that the
        // caller keeps alive for the whole operation.
        Some(ptr) => unsafe { ptr.as_ref() },
        None => &local.flag,
    }
}

/// Drives `attempt` under the retry protocol: up to `config.attempts`
/// attempts, stopping at the first commit. Each call receives the guard
/// flag; the primitive must read it once the transaction has begun.
///
/// With `attempts == 0` no attempt is arbitrated and the result reports an
/// unspecified abort: the operation certainly did not commit.
///
/// # Safety
///
/// If `config.flag` is `Some`, it must point to a valid
/// [`TransactionFlag`] that outlives this call.
pub unsafe fn execute<F>(config: TransactionConfig, mut attempt: F) -> TransactionResult
where
    F: FnMut(&TransactionFlag) -> TransactionStatus,
{
    let local = PaddedFlagHolder::new();
    let flag = resolve_flag(config.flag, &local);

    let mut status = TransactionStatus::Aborted(AbortReason::Unspecified);
    let mut attempts_made = 0;
    while attempts_made < config.attempts {
        attempts_made += 1;
        status = attempt(flag);
        if status.is_success() {
            break;
        }
    }
    TransactionResult {
        status,
        attempts_made,
    }
}

/// Like [`execute`], but when every primary attempt aborts, drives
/// `fallback` for up to `config.fallback_attempts` further attempts. The
/// fallback never runs when the primary path commits.
///
/// # Safety
///
/// Any `Some` flag in `config` must point to a valid [`TransactionFlag`]
/// that outlives this call.
pub unsafe fn execute_with_fallback<F, G>(
    config: TransactionConfigWfb,
    attempt: F,
    mut fallback: G,
) -> TransactionResultWfb
where
    F: FnMut(&TransactionFlag) -> TransactionStatus,
    G: FnMut(&TransactionFlag) -> TransactionStatus,
{
    let local = PaddedFlagHolder::new();

    let primary = TransactionConfig {
        width: config.width,
        attempts: config.attempts,
        flag: config.flag,
    };
    // SAFETY: forwarded caller contract.
    let TransactionResult {
        status,
        attempts_made,
    } = unsafe { execute(primary, attempt) };

    if status.is_success() {
        return TransactionResultWfb {
            status,
            fallback_status: TransactionStatus::Success,
            attempts_made,
            fallback_attempts_made: 0,
        };
    }

    let flag = resolve_flag(config.fallback_flag, &local);
    let mut fallback_status = TransactionStatus::Aborted(AbortReason::Unspecified);
    let mut fallback_attempts_made = 0;
    while fallback_attempts_made < config.fallback_attempts {
        fallback_attempts_made += 1;
        fallback_status = fallback(flag);
        if fallback_status.is_success() {
            break;
        }
    }
    TransactionResultWfb {
        status,
        fallback_status,
        attempts_made,
        fallback_attempts_made,
    }
}

#[test]
fn status_encoding_is_stable() {
    use AbortReason::*;
    assert_eq!(TransactionStatus::Success.to_raw(), 0);
    assert_eq!(TransactionStatus::Aborted(Unspecified).to_raw(), 1);
    assert_eq!(TransactionStatus::Aborted(Explicit(0)).to_raw(), 0x3);
    assert_eq!(TransactionStatus::Aborted(Conflict).to_raw(), 0x5);
    assert_eq!(TransactionStatus::Aborted(Capacity).to_raw(), 0x9);
    assert_eq!(TransactionStatus::Aborted(Nested).to_raw(), 0x11);
    assert_eq!(TransactionStatus::Aborted(Debug).to_raw(), 0x21);
    assert_eq!(TransactionStatus::Aborted(Interrupt).to_raw(), 0x41);
    assert_eq!(
        TransactionStatus::Aborted(Explicit(0xAB)).to_raw(),
        0x3 | (0xAB << 8)
    );
}

#[test]
fn status_round_trips_through_raw() {
    use AbortReason::*;
    for status in [
        TransactionStatus::Success,
        TransactionStatus::Aborted(Unspecified),
        TransactionStatus::Aborted(Explicit(7)),
        TransactionStatus::Aborted(Conflict),
        TransactionStatus::Aborted(Capacity),
        TransactionStatus::Aborted(Nested),
        TransactionStatus::Aborted(Debug),
        TransactionStatus::Aborted(Interrupt),
    ] {
        assert_eq!(TransactionStatus::from_raw(status.to_raw()), status);
    }
}

#[test]
fn abort_reason_requires_explicit_bit() {
    assert_eq!(abort_reason(TransactionStatus::Success.to_raw()), 0);
    assert_eq!(
        abort_reason(TransactionStatus::Aborted(AbortReason::Conflict).to_raw()),
        0
    );
    // Reason payload present but the explicit bit missing: still 0.
    assert_eq!(abort_reason(0x5 | (0xCD << 8)), 0);
    assert_eq!(
        abort_reason(TransactionStatus::Aborted(AbortReason::Explicit(0xCD)).to_raw()),
        0xCD
    );
}

#[test]
fn padded_flag_occupies_its_own_cache_line() {
    assert!(size_of::<PaddedFlagHolder>() >= 2 * MAX_CACHE_LINE_SIZE);
    assert_eq!(
        offset_of!(PaddedFlagHolder, flag),
        MAX_CACHE_LINE_SIZE - 1
    );
}
