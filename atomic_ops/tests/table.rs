// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end exercises of the generated operation tables.

use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use atomic_ops::{Kind, MemoryOrder, Ops, create_ops, create_ops_explicit, create_ops_native};
use rand::Rng;

const ALL_ORDERS: [MemoryOrder; 6] = [
    MemoryOrder::Relaxed,
    MemoryOrder::Consume,
    MemoryOrder::Acquire,
    MemoryOrder::Release,
    MemoryOrder::AcqRel,
    MemoryOrder::SeqCst,
];

fn supported_widths() -> Vec<usize> {
    let mut widths = vec![1, 2, 4];
    #[cfg(target_has_atomic = "64")]
    widths.push(8);
    widths.push(size_of::<usize>());
    widths.dedup();
    widths
}

fn erased<T>(r: &mut T) -> NonNull<()> {
    NonNull::from(r).cast()
}

fn erased_const<T>(r: &T) -> NonNull<()> {
    NonNull::from(r).cast()
}

#[test]
fn nullability_matrix_follows_the_order_class() {
    for width in supported_widths() {
        for order in ALL_ORDERS {
            let ops = create_ops_native(width, order);
            assert!(!ops.is_null(), "width {width} order {order:?}");
            assert_eq!(ops.store.is_some(), order.admits_store());
            assert_eq!(ops.load.is_some(), order.admits_load());
            assert_eq!(ops.bitwise.test.is_some(), order.admits_plain_test());

            assert!(ops.xchg.exchange.is_some());
            assert!(ops.xchg.cmpxchg_weak.is_some());
            assert!(ops.xchg.cmpxchg_strong.is_some());
            assert!(ops.bitwise.test_compl.is_some());
            assert!(ops.bitwise.test_set.is_some());
            assert!(ops.bitwise.test_reset.is_some());
            assert!(ops.binary.or.is_some());
            assert!(ops.binary.xor.is_some());
            assert!(ops.binary.and.is_some());
            assert!(ops.binary.not.is_some());
            assert!(ops.binary.fetch_not.is_some());
            for family in [&ops.unsigned, &ops.signed] {
                assert!(family.add.is_some());
                assert!(family.sub.is_some());
                assert!(family.inc.is_some());
                assert!(family.dec.is_some());
                assert!(family.neg.is_some());
                assert!(family.fetch_add.is_some());
                assert!(family.fetch_sub.is_some());
                assert!(family.fetch_inc.is_some());
                assert!(family.fetch_dec.is_some());
                assert!(family.fetch_neg.is_some());
            }
        }
    }
}

#[test]
fn unsupported_widths_yield_the_all_null_table() {
    for width in [0, 3, 5, 6, 7, 9, 16, 17, 64] {
        assert!(create_ops_native(width, MemoryOrder::SeqCst).is_null());
        assert!(
            create_ops(width, MemoryOrder::SeqCst, Kind::LOCK_FREE).is_null(),
            "width {width}"
        );
        assert!(create_ops_explicit(width, Kind::LOCK_FREE).is_null());
    }
}

#[test]
fn consume_builds_the_acquire_table() {
    let consume = create_ops_native(4, MemoryOrder::Consume);
    assert!(consume.store.is_none());
    assert!(consume.load.is_some());
    assert!(consume.bitwise.test.is_some());
}

fn seq_cst_u32_ops() -> Ops {
    create_ops_native(size_of::<u32>(), MemoryOrder::SeqCst)
}

#[test]
fn exchange_round_trip_returns_previous_values() {
    let ops = seq_cst_u32_ops();
    let exchange = ops.xchg.exchange.unwrap();

    let mut rng = rand::rng();
    for _ in 0..100 {
        let (v0, v1, v2) = (rng.random::<u32>(), rng.random::<u32>(), rng.random::<u32>());
        let mut obj = v0;
        let mut old = 0u32;
        // SAFETY: all pointers reference live, aligned u32 locals.
        unsafe {
            exchange(erased(&mut obj), erased_const(&v2), erased(&mut old));
            assert_eq!(old, v0);
            exchange(erased(&mut obj), erased_const(&v1), erased(&mut old));
            assert_eq!(old, v2);
        }
        assert_eq!(obj, v1);
    }
}

#[test]
fn cmpxchg_updates_expected_on_failure() {
    let ops = seq_cst_u32_ops();
    let cmpxchg = ops.xchg.cmpxchg_strong.unwrap();

    let mut obj = 10u32;
    let mut expected = 99u32;
    let desired = 11u32;
    // SAFETY: all pointers reference live, aligned u32 locals.
    unsafe {
        assert!(!cmpxchg(
            erased(&mut obj),
            erased(&mut expected),
            erased_const(&desired)
        ));
        assert_eq!(expected, 10);
        assert!(cmpxchg(
            erased(&mut obj),
            erased(&mut expected),
            erased_const(&desired)
        ));
    }
    assert_eq!(obj, 11);
}

#[test]
fn double_bit_complement_restores_the_object() {
    let ops = seq_cst_u32_ops();
    let test_compl = ops.bitwise.test_compl.unwrap();

    let mut obj = 0b1010_0001u32;
    // SAFETY: obj is a live, aligned u32 local.
    unsafe {
        let first = test_compl(erased(&mut obj), 0);
        assert!(first);
        assert_eq!(obj, 0b1010_0000);
        let second = test_compl(erased(&mut obj), 0);
        assert!(!second);
    }
    assert_eq!(obj, 0b1010_0001);
}

#[test]
fn bit_test_set_and_reset_report_the_previous_bit() {
    let ops = seq_cst_u32_ops();
    let test_set = ops.bitwise.test_set.unwrap();
    let test_reset = ops.bitwise.test_reset.unwrap();

    let mut obj = 0u32;
    // SAFETY: obj is a live, aligned u32 local.
    unsafe {
        assert!(!test_set(erased(&mut obj), 0));
        assert_eq!(obj, 1);
        assert!(test_set(erased(&mut obj), 0));
        assert!(test_reset(erased(&mut obj), 0));
        assert_eq!(obj, 0);
        assert!(!test_reset(erased(&mut obj), 0));
    }
}

// The bit operations compare the masked value against literal 1, so for
// any offset above 0 they report false even when the bit is set. Pinned
// here, not fixed: whether that comparison is intentional needs upstream
// resolution before anyone relies on it either way.
#[test]
fn bit_test_reports_false_at_nonzero_offsets() {
    let ops = seq_cst_u32_ops();
    let test = ops.bitwise.test.unwrap();
    let test_compl = ops.bitwise.test_compl.unwrap();

    let mut obj = 0b1000u32;
    let mut one = 1u32;
    // SAFETY: obj and one are live, aligned u32 locals.
    unsafe {
        assert!(!test(erased(&mut obj), 3));
        assert!(test(erased(&mut one), 0));
        // The modify ops share the comparison: the bit still toggles, but
        // the reported previous value stays false.
        assert!(!test_compl(erased(&mut obj), 3));
        assert_eq!(obj, 0);
        assert!(!test_compl(erased(&mut obj), 3));
        assert_eq!(obj, 0b1000);
    }
}

#[test]
fn double_not_restores_the_bit_pattern() {
    let ops = seq_cst_u32_ops();
    let not = ops.binary.not.unwrap();
    let fetch_not = ops.binary.fetch_not.unwrap();

    let mut rng = rand::rng();
    for _ in 0..100 {
        let v = rng.random::<u32>();
        let mut obj = v;
        let mut old = 0u32;
        // SAFETY: all pointers reference live, aligned u32 locals.
        unsafe {
            not(erased(&mut obj));
            assert_eq!(obj, !v);
            fetch_not(erased(&mut obj), erased(&mut old));
            assert_eq!(old, !v);
        }
        assert_eq!(obj, v);
    }
}

#[test]
fn signed_negate_handles_the_minimum_value() {
    let ops = seq_cst_u32_ops();
    let fetch_neg = ops.signed.fetch_neg.unwrap();

    let mut obj = i32::MIN;
    let mut old = 0i32;
    // SAFETY: all pointers reference live, aligned i32 locals.
    unsafe {
        fetch_neg(erased(&mut obj), erased(&mut old));
    }
    assert_eq!(old, i32::MIN);
    assert_eq!(obj, i32::MIN);

    let mut obj = 1729i32;
    // SAFETY: as above.
    unsafe {
        fetch_neg(erased(&mut obj), erased(&mut old));
    }
    assert_eq!(old, 1729);
    assert_eq!(obj, -1729);
}

#[test]
fn unsigned_negate_wraps() {
    let ops = seq_cst_u32_ops();
    let fetch_neg = ops.unsigned.fetch_neg.unwrap();

    let mut obj = 5u32;
    let mut old = 0u32;
    // SAFETY: all pointers reference live, aligned u32 locals.
    unsafe {
        fetch_neg(erased(&mut obj), erased(&mut old));
    }
    assert_eq!(old, 5);
    assert_eq!(obj, 5u32.wrapping_neg());

    let mut obj = 0u32;
    // SAFETY: as above.
    unsafe {
        fetch_neg(erased(&mut obj), erased(&mut old));
    }
    assert_eq!((old, obj), (0, 0));
}

#[test]
fn arithmetic_and_binary_ops_compute() {
    let ops = seq_cst_u32_ops();

    let mut obj = 100u32;
    let mut old = 0u32;
    // SAFETY: all pointers reference live, aligned u32 locals.
    unsafe {
        (ops.unsigned.fetch_add.unwrap())(erased(&mut obj), erased_const(&7u32), erased(&mut old));
        assert_eq!((old, obj), (100, 107));
        (ops.unsigned.sub.unwrap())(erased(&mut obj), erased_const(&7u32));
        assert_eq!(obj, 100);
        (ops.unsigned.fetch_inc.unwrap())(erased(&mut obj), erased(&mut old));
        assert_eq!((old, obj), (100, 101));
        (ops.unsigned.dec.unwrap())(erased(&mut obj));
        assert_eq!(obj, 100);

        (ops.binary.fetch_or.unwrap())(erased(&mut obj), erased_const(&0b11u32), erased(&mut old));
        assert_eq!((old, obj), (100, 103));
        (ops.binary.and.unwrap())(erased(&mut obj), erased_const(&!0b11u32));
        assert_eq!(obj, 100);
        (ops.binary.xor.unwrap())(erased(&mut obj), erased_const(&0b110u32));
        assert_eq!(obj, 98);
    }
}

#[test]
fn explicit_table_takes_orders_per_call() {
    let ops = create_ops_explicit(size_of::<u32>(), Kind::LOCK_FREE);
    let store = ops.store.unwrap();
    let load = ops.load.unwrap();
    let cmpxchg = ops.xchg.cmpxchg_weak.unwrap();

    let mut obj = 0u32;
    let mut out = 0u32;
    // SAFETY: all pointers reference live, aligned u32 locals.
    unsafe {
        store(erased(&mut obj), erased_const(&17u32), MemoryOrder::Release);
        load(erased(&mut obj), erased(&mut out), MemoryOrder::Acquire);
        assert_eq!(out, 17);

        let mut expected = 17u32;
        // A weak compare-exchange may fail spuriously; retry like any
        // caller would.
        while !cmpxchg(
            erased(&mut obj),
            erased(&mut expected),
            erased_const(&18u32),
            MemoryOrder::AcqRel,
            MemoryOrder::Acquire,
        ) {}
        load(erased(&mut obj), erased(&mut out), MemoryOrder::Consume);
        assert_eq!(out, 18);
    }
}

#[test]
fn tables_work_across_threads() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 10_000;
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let ops = create_ops(size_of::<usize>(), MemoryOrder::SeqCst, Kind::LOCK_FREE);
    let fetch_inc = ops.unsigned.fetch_inc.unwrap();

    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                let mut old = 0usize;
                for _ in 0..PER_THREAD {
                    // SAFETY: COUNTER is a static AtomicUsize; old is a
                    // live, aligned local.
                    unsafe {
                        fetch_inc(
                            NonNull::from(&COUNTER).cast(),
                            NonNull::from(&mut old).cast(),
                        );
                    }
                }
            });
        }
    });
    assert_eq!(COUNTER.load(Ordering::SeqCst), THREADS * PER_THREAD);
}
