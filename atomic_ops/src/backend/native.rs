// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The native backend: every operation is built on `core::sync::atomic`.
//!
//! One generic implementation covers the whole width/signedness/order
//! matrix. The order-specific tables take function pointers to
//! const-generic instantiations, so each entry monomorphizes with its
//! memory order baked in; the explicit tables point straight at the
//! generic functions, which take the order as a runtime argument.

use core::ops::{BitAnd, BitOr, BitXor, Not};
use core::ptr::NonNull;
use core::sync::atomic::Ordering;

use crate::align::Alignment;
use crate::ops::{ArithmeticOps, ArithmeticOpsExplicit, BinaryOps, BinaryOpsExplicit, BitwiseOps,
    BitwiseOpsExplicit, Ops, OpsExplicit, XchgOps, XchgOpsExplicit};
use crate::order::MemoryOrder;

/// A plain integer type paired with its atomic counterpart.
///
/// `MIN == ZERO` marks the unsigned rows; the negate implementation keys
/// its minimum-value special case off that constant, so the selection
/// happens at monomorphization time rather than per call.
pub(crate) trait AtomicCell:
    Copy
    + Eq
    + Not<Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + 'static
{
    type Shared: 'static;

    const ZERO: Self;
    const ONE: Self;
    const MIN: Self;

    /// Reinterprets `obj` as the atomic counterpart.
    ///
    /// # Safety
    ///
    /// `obj` must be non-null, aligned for `Self::Shared`, and valid for
    /// atomic access for the chosen lifetime.
    unsafe fn shared<'a>(obj: NonNull<()>) -> &'a Self::Shared;

    fn load(cell: &Self::Shared, order: Ordering) -> Self;
    fn store(cell: &Self::Shared, val: Self, order: Ordering);
    fn swap(cell: &Self::Shared, val: Self, order: Ordering) -> Self;
    fn cmpxchg_weak(
        cell: &Self::Shared,
        current: Self,
        new: Self,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self, Self>;
    fn cmpxchg_strong(
        cell: &Self::Shared,
        current: Self,
        new: Self,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self, Self>;
    fn fetch_or(cell: &Self::Shared, val: Self, order: Ordering) -> Self;
    fn fetch_xor(cell: &Self::Shared, val: Self, order: Ordering) -> Self;
    fn fetch_and(cell: &Self::Shared, val: Self, order: Ordering) -> Self;
    fn fetch_add(cell: &Self::Shared, val: Self, order: Ordering) -> Self;
    fn fetch_sub(cell: &Self::Shared, val: Self, order: Ordering) -> Self;

    fn wrapping_neg(self) -> Self;
    /// A mask with only the bit at `offset` set.
    fn mask(offset: u32) -> Self;
}

macro_rules! impl_atomic_cell {
    ($($width:literal: $int:ty => $atomic:ty;)*) => {$(
        #[cfg(target_has_atomic = $width)]
        impl AtomicCell for $int {
            type Shared = $atomic;

            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MIN: Self = <$int>::MIN;

            unsafe fn shared<'a>(obj: NonNull<()>) -> &'a $atomic {
                // SAFETY: caller promises obj is non-null, aligned, and
                // valid for atomic access.
                unsafe { obj.cast::<$atomic>().as_ref() }
            }

            fn load(cell: &$atomic, order: Ordering) -> Self {
                cell.load(order)
            }
            fn store(cell: &$atomic, val: Self, order: Ordering) {
                cell.store(val, order)
            }
            fn swap(cell: &$atomic, val: Self, order: Ordering) -> Self {
                cell.swap(val, order)
            }
            fn cmpxchg_weak(
                cell: &$atomic,
                current: Self,
                new: Self,
                success: Ordering,
                failure: Ordering,
            ) -> Result<Self, Self> {
                cell.compare_exchange_weak(current, new, success, failure)
            }
            fn cmpxchg_strong(
                cell: &$atomic,
                current: Self,
                new: Self,
                success: Ordering,
                failure: Ordering,
            ) -> Result<Self, Self> {
                cell.compare_exchange(current, new, success, failure)
            }
            fn fetch_or(cell: &$atomic, val: Self, order: Ordering) -> Self {
                cell.fetch_or(val, order)
            }
            fn fetch_xor(cell: &$atomic, val: Self, order: Ordering) -> Self {
                cell.fetch_xor(val, order)
            }
            fn fetch_and(cell: &$atomic, val: Self, order: Ordering) -> Self {
                cell.fetch_and(val, order)
            }
            fn fetch_add(cell: &$atomic, val: Self, order: Ordering) -> Self {
                cell.fetch_add(val, order)
            }
            fn fetch_sub(cell: &$atomic, val: Self, order: Ordering) -> Self {
                cell.fetch_sub(val, order)
            }

            fn wrapping_neg(self) -> Self {
                <$int>::wrapping_neg(self)
            }
            fn mask(offset: u32) -> Self {
                (1 as $int).wrapping_shl(offset)
            }
        }
    )*};
}

impl_atomic_cell! {
    "8": u8 => core::sync::atomic::AtomicU8;
    "8": i8 => core::sync::atomic::AtomicI8;
    "16": u16 => core::sync::atomic::AtomicU16;
    "16": i16 => core::sync::atomic::AtomicI16;
    "32": u32 => core::sync::atomic::AtomicU32;
    "32": i32 => core::sync::atomic::AtomicI32;
    "64": u64 => core::sync::atomic::AtomicU64;
    "64": i64 => core::sync::atomic::AtomicI64;
    "ptr": usize => core::sync::atomic::AtomicUsize;
    "ptr": isize => core::sync::atomic::AtomicIsize;
}

// Operation bodies, explicit-order form. These have exactly the signatures
// of the `*Explicit` table entries; the fixed-order tables wrap them below.
//
// SAFETY (all of them): the table contract — every pointer argument is
// non-null, aligned for the operand type, and valid for the accesses made
// through it.

unsafe fn store<A: AtomicCell>(obj: NonNull<()>, desired: NonNull<()>, order: MemoryOrder) {
    let desired = unsafe { desired.cast::<A>().read() };
    let cell = unsafe { A::shared(obj) };
    A::store(cell, desired, order.to_ordering());
}

unsafe fn load<A: AtomicCell>(obj: NonNull<()>, ret: NonNull<()>, order: MemoryOrder) {
    let cell = unsafe { A::shared(obj) };
    let val = A::load(cell, order.to_ordering());
    unsafe { ret.cast::<A>().write(val) };
}

unsafe fn exchange<A: AtomicCell>(
    obj: NonNull<()>,
    desired: NonNull<()>,
    ret: NonNull<()>,
    order: MemoryOrder,
) {
    let desired = unsafe { desired.cast::<A>().read() };
    let cell = unsafe { A::shared(obj) };
    let old = A::swap(cell, desired, order.to_ordering());
    unsafe { ret.cast::<A>().write(old) };
}

unsafe fn cmpxchg_weak<A: AtomicCell>(
    obj: NonNull<()>,
    expected: NonNull<()>,
    desired: NonNull<()>,
    succ: MemoryOrder,
    fail: MemoryOrder,
) -> bool {
    let current = unsafe { expected.cast::<A>().read() };
    let new = unsafe { desired.cast::<A>().read() };
    let cell = unsafe { A::shared(obj) };
    match A::cmpxchg_weak(cell, current, new, succ.to_ordering(), fail.to_ordering()) {
        Ok(_) => true,
        Err(observed) => {
            unsafe { expected.cast::<A>().write(observed) };
            false
        }
    }
}

unsafe fn cmpxchg_strong<A: AtomicCell>(
    obj: NonNull<()>,
    expected: NonNull<()>,
    desired: NonNull<()>,
    succ: MemoryOrder,
    fail: MemoryOrder,
) -> bool {
    let current = unsafe { expected.cast::<A>().read() };
    let new = unsafe { desired.cast::<A>().read() };
    let cell = unsafe { A::shared(obj) };
    match A::cmpxchg_strong(cell, current, new, succ.to_ordering(), fail.to_ordering()) {
        Ok(_) => true,
        Err(observed) => {
            unsafe { expected.cast::<A>().write(observed) };
            false
        }
    }
}

unsafe fn bit_test<A: AtomicCell>(obj: NonNull<()>, offset: u32, order: MemoryOrder) -> bool {
    let mask = A::mask(offset);
    let cell = unsafe { A::shared(obj) };
    let val = A::load(cell, order.to_ordering());
    (val & mask) == A::ONE
}

// The three test-and-modify operations share one compare-exchange retry
// loop: seed `expected` with a load at the failure order, compute the
// modified value, and let the weak compare-exchange refresh `expected`
// until it commits. Progress relies on the primitive, not on a bound here.
macro_rules! bit_test_modify {
    ($($name:ident => |$expected:ident, $mask:ident| $desired:expr;)*) => {$(
        unsafe fn $name<A: AtomicCell>(
            obj: NonNull<()>,
            offset: u32,
            order: MemoryOrder,
        ) -> bool {
            let $mask = A::mask(offset);
            let succ = order;
            let fail = order.fail_order();
            let cell = unsafe { A::shared(obj) };
            let mut $expected = A::load(cell, fail.to_ordering());
            loop {
                let desired = $desired;
                match A::cmpxchg_weak(
                    cell,
                    $expected,
                    desired,
                    succ.to_ordering(),
                    fail.to_ordering(),
                ) {
                    Ok(_) => break,
                    Err(observed) => $expected = observed,
                }
            }
            ($expected & $mask) == A::ONE
        }
    )*};
}

bit_test_modify! {
    bit_test_compl => |expected, mask| expected ^ mask;
    bit_test_set => |expected, mask| expected | mask;
    bit_test_reset => |expected, mask| expected & !mask;
}

macro_rules! fetch_direct {
    ($($name:ident => $prim:ident;)*) => {$(
        unsafe fn $name<A: AtomicCell>(
            obj: NonNull<()>,
            arg: NonNull<()>,
            ret: NonNull<()>,
            order: MemoryOrder,
        ) {
            let arg = unsafe { arg.cast::<A>().read() };
            let cell = unsafe { A::shared(obj) };
            let old = A::$prim(cell, arg, order.to_ordering());
            unsafe { ret.cast::<A>().write(old) };
        }
    )*};
}

fetch_direct! {
    fetch_or => fetch_or;
    fetch_xor => fetch_xor;
    fetch_and => fetch_and;
    fetch_add => fetch_add;
    fetch_sub => fetch_sub;
}

unsafe fn fetch_not<A: AtomicCell>(obj: NonNull<()>, ret: NonNull<()>, order: MemoryOrder) {
    let succ = order;
    let fail = order.fail_order();
    let cell = unsafe { A::shared(obj) };
    let mut expected = A::load(cell, fail.to_ordering());
    loop {
        // Integer `!` is the bytewise complement, defined for every width.
        let desired = !expected;
        match A::cmpxchg_weak(cell, expected, desired, succ.to_ordering(), fail.to_ordering()) {
            Ok(_) => break,
            Err(observed) => expected = observed,
        }
    }
    unsafe { ret.cast::<A>().write(expected) };
}

unsafe fn fetch_inc<A: AtomicCell>(obj: NonNull<()>, ret: NonNull<()>, order: MemoryOrder) {
    let cell = unsafe { A::shared(obj) };
    let old = A::fetch_add(cell, A::ONE, order.to_ordering());
    unsafe { ret.cast::<A>().write(old) };
}

unsafe fn fetch_dec<A: AtomicCell>(obj: NonNull<()>, ret: NonNull<()>, order: MemoryOrder) {
    let cell = unsafe { A::shared(obj) };
    let old = A::fetch_sub(cell, A::ONE, order.to_ordering());
    unsafe { ret.cast::<A>().write(old) };
}

unsafe fn fetch_neg<A: AtomicCell>(obj: NonNull<()>, ret: NonNull<()>, order: MemoryOrder) {
    let succ = order;
    let fail = order.fail_order();
    let cell = unsafe { A::shared(obj) };
    let mut expected = A::load(cell, fail.to_ordering());
    loop {
        let desired = if A::MIN != A::ZERO && expected == A::MIN {
            // Negating the minimum signed value would overflow, and its
            // two's-complement negation is itself: nothing to write. When
            // the success and failure orders agree the compare-exchange
            // has no extra ordering effect either, so stop here.
            if succ == fail {
                break;
            }
            expected
        } else {
            expected.wrapping_neg()
        };
        match A::cmpxchg_weak(cell, expected, desired, succ.to_ordering(), fail.to_ordering()) {
            Ok(_) => break,
            Err(observed) => expected = observed,
        }
    }
    unsafe { ret.cast::<A>().write(expected) };
}

// Plain (non-fetch) variants discard the old value into a local.

macro_rules! discard_binary {
    ($($name:ident => $fetch:ident;)*) => {$(
        unsafe fn $name<A: AtomicCell>(obj: NonNull<()>, arg: NonNull<()>, order: MemoryOrder) {
            let mut old = A::ZERO;
            // SAFETY: `old` is a live, aligned local of the operand type.
            unsafe { $fetch::<A>(obj, arg, NonNull::from(&mut old).cast(), order) };
        }
    )*};
}

discard_binary! {
    or => fetch_or;
    xor => fetch_xor;
    and => fetch_and;
    add => fetch_add;
    sub => fetch_sub;
}

macro_rules! discard_unary {
    ($($name:ident => $fetch:ident;)*) => {$(
        unsafe fn $name<A: AtomicCell>(obj: NonNull<()>, order: MemoryOrder) {
            let mut old = A::ZERO;
            // SAFETY: `old` is a live, aligned local of the operand type.
            unsafe { $fetch::<A>(obj, NonNull::from(&mut old).cast(), order) };
        }
    )*};
}

discard_unary! {
    not => fetch_not;
    inc => fetch_inc;
    dec => fetch_dec;
    neg => fetch_neg;
}

// Fixed-order wrappers: the same bodies with the order (and the derived
// compare-exchange failure order) baked in at monomorphization time.

macro_rules! fixed_order {
    // (obj, operand) shapes
    ($($name:ident($($param:ident: $ty:ty),*) $(-> $ret:ty)? = $body:ident;)*) => {$(
        unsafe fn $name<A: AtomicCell, const ORDER: u8>(
            obj: NonNull<()>,
            $($param: $ty),*
        ) $(-> $ret)? {
            // SAFETY: forwarded table contract.
            unsafe { $body::<A>(obj, $($param,)* MemoryOrder::from_repr(ORDER)) }
        }
    )*};
}

fixed_order! {
    store_ord(desired: NonNull<()>) = store;
    load_ord(ret: NonNull<()>) = load;
    exchange_ord(desired: NonNull<()>, ret: NonNull<()>) = exchange;
    bit_test_ord(offset: u32) -> bool = bit_test;
    bit_test_compl_ord(offset: u32) -> bool = bit_test_compl;
    bit_test_set_ord(offset: u32) -> bool = bit_test_set;
    bit_test_reset_ord(offset: u32) -> bool = bit_test_reset;
    or_ord(arg: NonNull<()>) = or;
    xor_ord(arg: NonNull<()>) = xor;
    and_ord(arg: NonNull<()>) = and;
    add_ord(arg: NonNull<()>) = add;
    sub_ord(arg: NonNull<()>) = sub;
    not_ord() = not;
    inc_ord() = inc;
    dec_ord() = dec;
    neg_ord() = neg;
    fetch_or_ord(arg: NonNull<()>, ret: NonNull<()>) = fetch_or;
    fetch_xor_ord(arg: NonNull<()>, ret: NonNull<()>) = fetch_xor;
    fetch_and_ord(arg: NonNull<()>, ret: NonNull<()>) = fetch_and;
    fetch_add_ord(arg: NonNull<()>, ret: NonNull<()>) = fetch_add;
    fetch_sub_ord(arg: NonNull<()>, ret: NonNull<()>) = fetch_sub;
    fetch_not_ord(ret: NonNull<()>) = fetch_not;
    fetch_inc_ord(ret: NonNull<()>) = fetch_inc;
    fetch_dec_ord(ret: NonNull<()>) = fetch_dec;
    fetch_neg_ord(ret: NonNull<()>) = fetch_neg;
}

unsafe fn cmpxchg_weak_ord<A: AtomicCell, const ORDER: u8>(
    obj: NonNull<()>,
    expected: NonNull<()>,
    desired: NonNull<()>,
) -> bool {
    let succ = MemoryOrder::from_repr(ORDER);
    // SAFETY: forwarded table contract.
    unsafe { cmpxchg_weak::<A>(obj, expected, desired, succ, succ.fail_order()) }
}

unsafe fn cmpxchg_strong_ord<A: AtomicCell, const ORDER: u8>(
    obj: NonNull<()>,
    expected: NonNull<()>,
    desired: NonNull<()>,
) -> bool {
    let succ = MemoryOrder::from_repr(ORDER);
    // SAFETY: forwarded table contract.
    unsafe { cmpxchg_strong::<A>(obj, expected, desired, succ, succ.fail_order()) }
}

// Table builders. `U` is the width's unsigned type and carries the base,
// exchange, bitwise, and binary families; the arithmetic family is built
// once for `U` and once for the signed type `S`.

fn xchg_ops<U: AtomicCell, const ORDER: u8>() -> XchgOps {
    XchgOps {
        exchange: Some(exchange_ord::<U, ORDER>),
        cmpxchg_weak: Some(cmpxchg_weak_ord::<U, ORDER>),
        cmpxchg_strong: Some(cmpxchg_strong_ord::<U, ORDER>),
    }
}

fn bitwise_ops<U: AtomicCell, const ORDER: u8>(with_test: bool) -> BitwiseOps {
    BitwiseOps {
        test: if with_test {
            Some(bit_test_ord::<U, ORDER>)
        } else {
            None
        },
        test_compl: Some(bit_test_compl_ord::<U, ORDER>),
        test_set: Some(bit_test_set_ord::<U, ORDER>),
        test_reset: Some(bit_test_reset_ord::<U, ORDER>),
    }
}

fn binary_ops<U: AtomicCell, const ORDER: u8>() -> BinaryOps {
    BinaryOps {
        or: Some(or_ord::<U, ORDER>),
        xor: Some(xor_ord::<U, ORDER>),
        and: Some(and_ord::<U, ORDER>),
        not: Some(not_ord::<U, ORDER>),
        fetch_or: Some(fetch_or_ord::<U, ORDER>),
        fetch_xor: Some(fetch_xor_ord::<U, ORDER>),
        fetch_and: Some(fetch_and_ord::<U, ORDER>),
        fetch_not: Some(fetch_not_ord::<U, ORDER>),
    }
}

fn arithmetic_ops<A: AtomicCell, const ORDER: u8>() -> ArithmeticOps {
    ArithmeticOps {
        add: Some(add_ord::<A, ORDER>),
        sub: Some(sub_ord::<A, ORDER>),
        inc: Some(inc_ord::<A, ORDER>),
        dec: Some(dec_ord::<A, ORDER>),
        neg: Some(neg_ord::<A, ORDER>),
        fetch_add: Some(fetch_add_ord::<A, ORDER>),
        fetch_sub: Some(fetch_sub_ord::<A, ORDER>),
        fetch_inc: Some(fetch_inc_ord::<A, ORDER>),
        fetch_dec: Some(fetch_dec_ord::<A, ORDER>),
        fetch_neg: Some(fetch_neg_ord::<A, ORDER>),
    }
}

fn table<U: AtomicCell, S: AtomicCell, const ORDER: u8>(
    with_store: bool,
    with_load: bool,
    with_test: bool,
) -> Ops {
    Ops {
        store: if with_store {
            Some(store_ord::<U, ORDER>)
        } else {
            None
        },
        load: if with_load {
            Some(load_ord::<U, ORDER>)
        } else {
            None
        },
        xchg: xchg_ops::<U, ORDER>(),
        bitwise: bitwise_ops::<U, ORDER>(with_test),
        binary: binary_ops::<U, ORDER>(),
        unsigned: arithmetic_ops::<U, ORDER>(),
        signed: arithmetic_ops::<S, ORDER>(),
    }
}

fn ops_for<U: AtomicCell, S: AtomicCell>(order: MemoryOrder) -> Ops {
    let with_store = order.admits_store();
    let with_load = order.admits_load();
    let with_test = order.admits_plain_test();
    match order {
        MemoryOrder::Relaxed => {
            table::<U, S, { MemoryOrder::Relaxed as u8 }>(with_store, with_load, with_test)
        }
        // Consume is never treated as weaker than acquire.
        MemoryOrder::Consume | MemoryOrder::Acquire => {
            table::<U, S, { MemoryOrder::Acquire as u8 }>(with_store, with_load, with_test)
        }
        MemoryOrder::Release => {
            table::<U, S, { MemoryOrder::Release as u8 }>(with_store, with_load, with_test)
        }
        MemoryOrder::AcqRel => {
            table::<U, S, { MemoryOrder::AcqRel as u8 }>(with_store, with_load, with_test)
        }
        MemoryOrder::SeqCst => {
            table::<U, S, { MemoryOrder::SeqCst as u8 }>(with_store, with_load, with_test)
        }
    }
}

fn ops_explicit_for<U: AtomicCell, S: AtomicCell>() -> OpsExplicit {
    OpsExplicit {
        store: Some(store::<U>),
        load: Some(load::<U>),
        xchg: XchgOpsExplicit {
            exchange: Some(exchange::<U>),
            cmpxchg_weak: Some(cmpxchg_weak::<U>),
            cmpxchg_strong: Some(cmpxchg_strong::<U>),
        },
        bitwise: BitwiseOpsExplicit {
            test: Some(bit_test::<U>),
            test_compl: Some(bit_test_compl::<U>),
            test_set: Some(bit_test_set::<U>),
            test_reset: Some(bit_test_reset::<U>),
        },
        binary: BinaryOpsExplicit {
            or: Some(or::<U>),
            xor: Some(xor::<U>),
            and: Some(and::<U>),
            not: Some(not::<U>),
            fetch_or: Some(fetch_or::<U>),
            fetch_xor: Some(fetch_xor::<U>),
            fetch_and: Some(fetch_and::<U>),
            fetch_not: Some(fetch_not::<U>),
        },
        unsigned: arithmetic_explicit::<U>(),
        signed: arithmetic_explicit::<S>(),
    }
}

fn arithmetic_explicit<A: AtomicCell>() -> ArithmeticOpsExplicit {
    ArithmeticOpsExplicit {
        add: Some(add::<A>),
        sub: Some(sub::<A>),
        inc: Some(inc::<A>),
        dec: Some(dec::<A>),
        neg: Some(neg::<A>),
        fetch_add: Some(fetch_add::<A>),
        fetch_sub: Some(fetch_sub::<A>),
        fetch_inc: Some(fetch_inc::<A>),
        fetch_dec: Some(fetch_dec::<A>),
        fetch_neg: Some(fetch_neg::<A>),
    }
}

/// Accepts a width only if it matches the atomic type's size, the atomic
/// type adds no padding over the plain type, and their alignments agree.
/// Anything else would hand out operations the target cannot actually make
/// atomic at the caller's object layout.
fn accepts<A: AtomicCell>(width: usize) -> bool {
    width == size_of::<A::Shared>()
        && size_of::<A::Shared>() == size_of::<A>()
        && align_of::<A::Shared>() == align_of::<A>()
}

/// Builds the native backend's operation table for `width` bytes at
/// `order`, or the all-null table if the width is not supported here.
///
/// Candidate widths are tried in ascending size; `usize` closes the ladder
/// for targets where it is not already covered by a fixed-width row.
pub fn create_ops_native(width: usize, order: MemoryOrder) -> Ops {
    #[cfg(target_has_atomic = "8")]
    if accepts::<u8>(width) {
        return ops_for::<u8, i8>(order);
    }
    #[cfg(target_has_atomic = "16")]
    if accepts::<u16>(width) {
        return ops_for::<u16, i16>(order);
    }
    #[cfg(target_has_atomic = "32")]
    if accepts::<u32>(width) {
        return ops_for::<u32, i32>(order);
    }
    #[cfg(target_has_atomic = "64")]
    if accepts::<u64>(width) {
        return ops_for::<u64, i64>(order);
    }
    #[cfg(target_has_atomic = "ptr")]
    if accepts::<usize>(width) {
        return ops_for::<usize, isize>(order);
    }
    let _ = (width, order);
    Ops::NULL
}

/// The explicit-order counterpart of [`create_ops_native`].
pub fn create_ops_explicit_native(width: usize) -> OpsExplicit {
    #[cfg(target_has_atomic = "8")]
    if accepts::<u8>(width) {
        return ops_explicit_for::<u8, i8>();
    }
    #[cfg(target_has_atomic = "16")]
    if accepts::<u16>(width) {
        return ops_explicit_for::<u16, i16>();
    }
    #[cfg(target_has_atomic = "32")]
    if accepts::<u32>(width) {
        return ops_explicit_for::<u32, i32>();
    }
    #[cfg(target_has_atomic = "64")]
    if accepts::<u64>(width) {
        return ops_explicit_for::<u64, i64>();
    }
    #[cfg(target_has_atomic = "ptr")]
    if accepts::<usize>(width) {
        return ops_explicit_for::<usize, isize>();
    }
    let _ = width;
    OpsExplicit::NULL
}

/// The alignment an object must have for the native backend's operations
/// on `width` bytes to be atomic, or `None` for unsupported widths.
pub fn alignment_native(width: usize) -> Option<Alignment> {
    #[cfg(target_has_atomic = "8")]
    if accepts::<u8>(width) {
        return Some(Alignment::exact(align_of::<<u8 as AtomicCell>::Shared>()));
    }
    #[cfg(target_has_atomic = "16")]
    if accepts::<u16>(width) {
        return Some(Alignment::exact(align_of::<<u16 as AtomicCell>::Shared>()));
    }
    #[cfg(target_has_atomic = "32")]
    if accepts::<u32>(width) {
        return Some(Alignment::exact(align_of::<<u32 as AtomicCell>::Shared>()));
    }
    #[cfg(target_has_atomic = "64")]
    if accepts::<u64>(width) {
        return Some(Alignment::exact(align_of::<<u64 as AtomicCell>::Shared>()));
    }
    #[cfg(target_has_atomic = "ptr")]
    if accepts::<usize>(width) {
        return Some(Alignment::exact(align_of::<<usize as AtomicCell>::Shared>()));
    }
    let _ = width;
    None
}
