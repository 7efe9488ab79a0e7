// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Retry/fallback protocol bookkeeping and ABI-frozen encodings.

use core::mem::offset_of;
use core::ptr::NonNull;
use core::sync::atomic::Ordering;

use atomic_ops::MAX_CACHE_LINE_SIZE;
use atomic_ops::transaction::{
    AbortReason, PaddedFlagHolder, TransactionConfig, TransactionConfigWfb, TransactionFlag,
    TransactionStatus, abort_reason, execute, execute_with_fallback,
};
use static_assertions::{const_assert, const_assert_eq};

// ABI-frozen layout and encodings, pinned at compile time.
const_assert!(size_of::<PaddedFlagHolder>() >= 2 * MAX_CACHE_LINE_SIZE);
const_assert_eq!(offset_of!(PaddedFlagHolder, flag), MAX_CACHE_LINE_SIZE - 1);
const_assert_eq!(TransactionStatus::Success.to_raw(), 0);
const_assert_eq!(TransactionStatus::Aborted(AbortReason::Unspecified).to_raw(), 0x1);
const_assert_eq!(TransactionStatus::Aborted(AbortReason::Explicit(0)).to_raw(), 0x3);
const_assert_eq!(TransactionStatus::Aborted(AbortReason::Conflict).to_raw(), 0x5);
const_assert_eq!(TransactionStatus::Aborted(AbortReason::Capacity).to_raw(), 0x9);
const_assert_eq!(TransactionStatus::Aborted(AbortReason::Nested).to_raw(), 0x11);
const_assert_eq!(TransactionStatus::Aborted(AbortReason::Debug).to_raw(), 0x21);
const_assert_eq!(TransactionStatus::Aborted(AbortReason::Interrupt).to_raw(), 0x41);

fn config(attempts: usize) -> TransactionConfig {
    TransactionConfig {
        width: size_of::<u64>(),
        attempts,
        flag: None,
    }
}

fn config_wfb(attempts: usize, fallback_attempts: usize) -> TransactionConfigWfb {
    TransactionConfigWfb {
        width: size_of::<u64>(),
        attempts,
        fallback_attempts,
        flag: None,
        fallback_flag: None,
    }
}

#[test]
fn exhausts_attempts_when_every_attempt_aborts() {
    let mut calls = 0;
    // SAFETY: no caller-provided flag.
    let result = unsafe {
        execute(config(3), |_| {
            calls += 1;
            TransactionStatus::Aborted(AbortReason::Conflict)
        })
    };
    assert_eq!(calls, 3);
    assert_eq!(result.attempts_made, 3);
    assert_eq!(
        result.status,
        TransactionStatus::Aborted(AbortReason::Conflict)
    );
}

#[test]
fn stops_at_the_first_commit() {
    let mut calls = 0;
    // SAFETY: no caller-provided flag.
    let result = unsafe {
        execute(config(5), |_| {
            calls += 1;
            if calls == 2 {
                TransactionStatus::Success
            } else {
                TransactionStatus::Aborted(AbortReason::Capacity)
            }
        })
    };
    assert_eq!(result.attempts_made, 2);
    assert!(result.status.is_success());
}

#[test]
fn zero_attempts_reports_an_unspecified_abort() {
    // SAFETY: no caller-provided flag.
    let result = unsafe { execute(config(0), |_| unreachable!()) };
    assert_eq!(result.attempts_made, 0);
    assert_eq!(
        result.status,
        TransactionStatus::Aborted(AbortReason::Unspecified)
    );
}

#[test]
fn fallback_runs_only_after_the_primary_exhausts() {
    let mut fallback_calls = 0;
    // SAFETY: no caller-provided flags.
    let result = unsafe {
        execute_with_fallback(
            config_wfb(3, 2),
            |_| TransactionStatus::Aborted(AbortReason::Conflict),
            |_| {
                fallback_calls += 1;
                TransactionStatus::Success
            },
        )
    };
    assert_eq!(result.attempts_made, 3);
    assert_eq!(
        result.status,
        TransactionStatus::Aborted(AbortReason::Conflict)
    );
    assert_eq!(fallback_calls, 1);
    assert_eq!(result.fallback_attempts_made, 1);
    assert!(result.fallback_status.is_success());
}

#[test]
fn fallback_never_runs_when_the_primary_commits() {
    let mut calls = 0;
    // SAFETY: no caller-provided flags.
    let result = unsafe {
        execute_with_fallback(
            config_wfb(3, 2),
            |_| {
                calls += 1;
                if calls == 2 {
                    TransactionStatus::Success
                } else {
                    TransactionStatus::Aborted(AbortReason::Conflict)
                }
            },
            |_| unreachable!(),
        )
    };
    assert_eq!(result.attempts_made, 2);
    assert!(result.status.is_success());
    assert_eq!(result.fallback_attempts_made, 0);
    assert!(result.fallback_status.is_success());
}

#[test]
fn fallback_exhausts_its_own_budget() {
    // SAFETY: no caller-provided flags.
    let result = unsafe {
        execute_with_fallback(
            config_wfb(3, 2),
            |_| TransactionStatus::Aborted(AbortReason::Conflict),
            |_| TransactionStatus::Aborted(AbortReason::Capacity),
        )
    };
    assert_eq!(result.attempts_made, 3);
    assert_eq!(result.fallback_attempts_made, 2);
    assert_eq!(
        result.fallback_status,
        TransactionStatus::Aborted(AbortReason::Capacity)
    );
}

#[test]
fn caller_provided_flags_are_the_ones_handed_to_attempts() {
    let holder = PaddedFlagHolder::new();
    holder.flag.store(7, Ordering::Relaxed);
    let flag_ptr = NonNull::from(&holder.flag);

    let config = TransactionConfigWfb {
        width: size_of::<u64>(),
        attempts: 1,
        fallback_attempts: 1,
        // Primary and fallback may share one flag.
        flag: Some(flag_ptr),
        fallback_flag: Some(flag_ptr),
    };
    let saw = |flag: &TransactionFlag| flag.load(Ordering::Relaxed);
    // SAFETY: holder outlives the call.
    let result = unsafe {
        execute_with_fallback(
            config,
            |flag| {
                assert_eq!(saw(flag), 7);
                TransactionStatus::Aborted(AbortReason::Conflict)
            },
            |flag| {
                assert_eq!(saw(flag), 7);
                TransactionStatus::Success
            },
        )
    };
    assert!(result.fallback_status.is_success());
}

#[test]
fn abort_reason_is_zero_without_the_explicit_bit() {
    for status in [
        TransactionStatus::Success,
        TransactionStatus::Aborted(AbortReason::Unspecified),
        TransactionStatus::Aborted(AbortReason::Conflict),
        TransactionStatus::Aborted(AbortReason::Interrupt),
    ] {
        assert_eq!(abort_reason(status.to_raw()), 0);
    }
    assert_eq!(
        abort_reason(TransactionStatus::Aborted(AbortReason::Explicit(0x5A)).to_raw()),
        0x5A
    );
}
