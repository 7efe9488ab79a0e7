// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tables of type-erased atomic operations.
//!
//! Every entry is an `unsafe fn` over [`NonNull<()>`] pointers so that one
//! table type serves every object width; a `None` entry means the operation
//! is not offered for the width and memory-order strength the table was
//! built for. The pointed-to functions live for the whole process.
//!
//! # Safety
//!
//! Callers of any table entry must uphold, for every pointer argument:
//! it is non-null, properly aligned for the width the table was created
//! with, and valid for reads (and writes, where the operation writes
//! through it) of exactly that many bytes. Invoking an entry from a table
//! built for a different width is undefined behavior.

use core::ptr::NonNull;

use crate::order::MemoryOrder;

/// Atomically stores `desired` into `obj`.
pub type StoreOp = unsafe fn(obj: NonNull<()>, desired: NonNull<()>);
/// Atomically loads from `obj` into `ret`.
pub type LoadOp = unsafe fn(obj: NonNull<()>, ret: NonNull<()>);
/// Atomically replaces `obj` with `desired`, writing the old value to `ret`.
pub type ExchangeOp = unsafe fn(obj: NonNull<()>, desired: NonNull<()>, ret: NonNull<()>);
/// Atomically replaces `obj` with `desired` if it equals `expected`.
/// Returns whether the exchange took place; on failure the observed value
/// is written back through `expected`.
pub type CmpxchgOp = unsafe fn(obj: NonNull<()>, expected: NonNull<()>, desired: NonNull<()>) -> bool;
/// Returns the bit of `obj` at `offset`, without modifying `obj`.
pub type BitTestOp = unsafe fn(obj: NonNull<()>, offset: u32) -> bool;
/// Modifies the bit of `obj` at `offset`, returning its previous value.
pub type BitModifyOp = unsafe fn(obj: NonNull<()>, offset: u32) -> bool;
/// Atomically combines `obj` with the operand at `arg`, discarding the old
/// value.
pub type BinaryOp = unsafe fn(obj: NonNull<()>, arg: NonNull<()>);
/// Atomically combines `obj` with the operand at `arg`, writing the old
/// value to `ret`.
pub type FetchBinaryOp = unsafe fn(obj: NonNull<()>, arg: NonNull<()>, ret: NonNull<()>);
/// Atomically applies an operand-free modification (NOT, increment,
/// decrement, negate) to `obj`.
pub type UnaryOp = unsafe fn(obj: NonNull<()>);
/// Operand-free modification writing the old value to `ret`.
pub type FetchUnaryOp = unsafe fn(obj: NonNull<()>, ret: NonNull<()>);

/// [`StoreOp`] taking the memory order per call.
pub type StoreOpExplicit = unsafe fn(obj: NonNull<()>, desired: NonNull<()>, order: MemoryOrder);
/// [`LoadOp`] taking the memory order per call.
pub type LoadOpExplicit = unsafe fn(obj: NonNull<()>, ret: NonNull<()>, order: MemoryOrder);
/// [`ExchangeOp`] taking the memory order per call.
pub type ExchangeOpExplicit =
    unsafe fn(obj: NonNull<()>, desired: NonNull<()>, ret: NonNull<()>, order: MemoryOrder);
/// [`CmpxchgOp`] taking the success and failure orders per call.
pub type CmpxchgOpExplicit = unsafe fn(
    obj: NonNull<()>,
    expected: NonNull<()>,
    desired: NonNull<()>,
    succ: MemoryOrder,
    fail: MemoryOrder,
) -> bool;
/// [`BitTestOp`] taking the memory order per call.
pub type BitTestOpExplicit = unsafe fn(obj: NonNull<()>, offset: u32, order: MemoryOrder) -> bool;
/// [`BitModifyOp`] taking the memory order per call.
pub type BitModifyOpExplicit = unsafe fn(obj: NonNull<()>, offset: u32, order: MemoryOrder) -> bool;
/// [`BinaryOp`] taking the memory order per call.
pub type BinaryOpExplicit = unsafe fn(obj: NonNull<()>, arg: NonNull<()>, order: MemoryOrder);
/// [`FetchBinaryOp`] taking the memory order per call.
pub type FetchBinaryOpExplicit =
    unsafe fn(obj: NonNull<()>, arg: NonNull<()>, ret: NonNull<()>, order: MemoryOrder);
/// [`UnaryOp`] taking the memory order per call.
pub type UnaryOpExplicit = unsafe fn(obj: NonNull<()>, order: MemoryOrder);
/// [`FetchUnaryOp`] taking the memory order per call.
pub type FetchUnaryOpExplicit = unsafe fn(obj: NonNull<()>, ret: NonNull<()>, order: MemoryOrder);

macro_rules! op_structs {
    (
        $(#[$doc:meta])*
        $name:ident, $name_explicit:ident {
            $($field:ident: $op:ident / $op_explicit:ident),* $(,)?
        }
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name {
            $(pub $field: Option<$op>,)*
        }

        impl $name {
            pub const NULL: $name = $name {
                $($field: None,)*
            };

            pub fn is_null(&self) -> bool {
                $(self.$field.is_none())&&*
            }
        }

        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name_explicit {
            $(pub $field: Option<$op_explicit>,)*
        }

        impl $name_explicit {
            pub const NULL: $name_explicit = $name_explicit {
                $($field: None,)*
            };

            pub fn is_null(&self) -> bool {
                $(self.$field.is_none())&&*
            }
        }
    };
}

op_structs! {
    /// Exchange and compare-exchange operations.
    XchgOps, XchgOpsExplicit {
        exchange: ExchangeOp / ExchangeOpExplicit,
        cmpxchg_weak: CmpxchgOp / CmpxchgOpExplicit,
        cmpxchg_strong: CmpxchgOp / CmpxchgOpExplicit,
    }
}

op_structs! {
    /// Single-bit test and test-and-modify operations. All return the bit
    /// value observed before any modification.
    BitwiseOps, BitwiseOpsExplicit {
        test: BitTestOp / BitTestOpExplicit,
        test_compl: BitModifyOp / BitModifyOpExplicit,
        test_set: BitModifyOp / BitModifyOpExplicit,
        test_reset: BitModifyOp / BitModifyOpExplicit,
    }
}

op_structs! {
    /// Whole-value bitwise operations and their fetch variants.
    BinaryOps, BinaryOpsExplicit {
        or: BinaryOp / BinaryOpExplicit,
        xor: BinaryOp / BinaryOpExplicit,
        and: BinaryOp / BinaryOpExplicit,
        not: UnaryOp / UnaryOpExplicit,
        fetch_or: FetchBinaryOp / FetchBinaryOpExplicit,
        fetch_xor: FetchBinaryOp / FetchBinaryOpExplicit,
        fetch_and: FetchBinaryOp / FetchBinaryOpExplicit,
        fetch_not: FetchUnaryOp / FetchUnaryOpExplicit,
    }
}

op_structs! {
    /// Arithmetic operations and their fetch variants. Add and subtract
    /// wrap; negate of the minimum signed value is defined to leave the
    /// value unchanged.
    ArithmeticOps, ArithmeticOpsExplicit {
        add: BinaryOp / BinaryOpExplicit,
        sub: BinaryOp / BinaryOpExplicit,
        inc: UnaryOp / UnaryOpExplicit,
        dec: UnaryOp / UnaryOpExplicit,
        neg: UnaryOp / UnaryOpExplicit,
        fetch_add: FetchBinaryOp / FetchBinaryOpExplicit,
        fetch_sub: FetchBinaryOp / FetchBinaryOpExplicit,
        fetch_inc: FetchUnaryOp / FetchUnaryOpExplicit,
        fetch_dec: FetchUnaryOp / FetchUnaryOpExplicit,
        fetch_neg: FetchUnaryOp / FetchUnaryOpExplicit,
    }
}

/// A full table of atomic operations for one object width at one
/// memory-order strength.
///
/// The two arithmetic families interpret the object as an unsigned or
/// signed integer of the table's width; everything else operates on the
/// raw bit pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ops {
    pub store: Option<StoreOp>,
    pub load: Option<LoadOp>,
    pub xchg: XchgOps,
    pub bitwise: BitwiseOps,
    pub binary: BinaryOps,
    pub unsigned: ArithmeticOps,
    pub signed: ArithmeticOps,
}

impl Ops {
    /// The "unsupported" table: every entry absent.
    pub const NULL: Ops = Ops {
        store: None,
        load: None,
        xchg: XchgOps::NULL,
        bitwise: BitwiseOps::NULL,
        binary: BinaryOps::NULL,
        unsigned: ArithmeticOps::NULL,
        signed: ArithmeticOps::NULL,
    };

    pub fn is_null(&self) -> bool {
        self.store.is_none()
            && self.load.is_none()
            && self.xchg.is_null()
            && self.bitwise.is_null()
            && self.binary.is_null()
            && self.unsigned.is_null()
            && self.signed.is_null()
    }
}

/// [`Ops`] with every operation taking its memory order (or, for
/// compare-exchange, its success/failure pair) per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpsExplicit {
    pub store: Option<StoreOpExplicit>,
    pub load: Option<LoadOpExplicit>,
    pub xchg: XchgOpsExplicit,
    pub bitwise: BitwiseOpsExplicit,
    pub binary: BinaryOpsExplicit,
    pub unsigned: ArithmeticOpsExplicit,
    pub signed: ArithmeticOpsExplicit,
}

impl OpsExplicit {
    /// The "unsupported" table: every entry absent.
    pub const NULL: OpsExplicit = OpsExplicit {
        store: None,
        load: None,
        xchg: XchgOpsExplicit::NULL,
        bitwise: BitwiseOpsExplicit::NULL,
        binary: BinaryOpsExplicit::NULL,
        unsigned: ArithmeticOpsExplicit::NULL,
        signed: ArithmeticOpsExplicit::NULL,
    };

    pub fn is_null(&self) -> bool {
        self.store.is_none()
            && self.load.is_none()
            && self.xchg.is_null()
            && self.bitwise.is_null()
            && self.binary.is_null()
            && self.unsigned.is_null()
            && self.signed.is_null()
    }
}

#[test]
fn null_tables_are_null() {
    assert!(Ops::NULL.is_null());
    assert!(OpsExplicit::NULL.is_null());
    assert!(Ops::default().is_null());
    assert!(OpsExplicit::default().is_null());
}
