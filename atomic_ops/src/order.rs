// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::sync::atomic::Ordering;

/// Memory-order strength requested for an atomic operation.
///
/// This mirrors the standard acquire-release model, including `Consume`,
/// which `core::sync::atomic` does not name. This layer never treats
/// consume as weaker than acquire: everywhere an [`Ordering`] is needed,
/// `Consume` lowers to [`Ordering::Acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum MemoryOrder {
    Relaxed,
    Consume,
    Acquire,
    Release,
    AcqRel,
    SeqCst,
}

impl MemoryOrder {
    /// The failure order paired with `self` when a compare-exchange needs a
    /// (success, failure) pair but only one order was requested: the
    /// strongest order not above `self` with the release component dropped.
    pub const fn fail_order(self) -> MemoryOrder {
        match self {
            MemoryOrder::Release => MemoryOrder::Relaxed,
            MemoryOrder::AcqRel => MemoryOrder::Acquire,
            order => order,
        }
    }

    /// Whether a plain store is offered at this strength.
    pub const fn admits_store(self) -> bool {
        matches!(
            self,
            MemoryOrder::Relaxed | MemoryOrder::Release | MemoryOrder::SeqCst
        )
    }

    /// Whether a plain load is offered at this strength.
    pub const fn admits_load(self) -> bool {
        matches!(
            self,
            MemoryOrder::Relaxed
                | MemoryOrder::Consume
                | MemoryOrder::Acquire
                | MemoryOrder::SeqCst
        )
    }

    /// Whether the load-based (non-modifying) bit test is offered at this
    /// strength. Matches [`MemoryOrder::admits_load`]: the operation is a
    /// single load.
    pub const fn admits_plain_test(self) -> bool {
        self.admits_load()
    }

    pub(crate) const fn to_ordering(self) -> Ordering {
        match self {
            MemoryOrder::Relaxed => Ordering::Relaxed,
            MemoryOrder::Consume | MemoryOrder::Acquire => Ordering::Acquire,
            MemoryOrder::Release => Ordering::Release,
            MemoryOrder::AcqRel => Ordering::AcqRel,
            MemoryOrder::SeqCst => Ordering::SeqCst,
        }
    }

    // Enums cannot be const-generic parameters on stable, so order-specific
    // function instantiations carry the discriminant instead.
    pub(crate) const fn from_repr(repr: u8) -> MemoryOrder {
        match repr {
            0 => MemoryOrder::Relaxed,
            1 => MemoryOrder::Consume,
            2 => MemoryOrder::Acquire,
            3 => MemoryOrder::Release,
            4 => MemoryOrder::AcqRel,
            _ => MemoryOrder::SeqCst,
        }
    }
}

#[test]
fn fail_order_drops_release_component() {
    assert_eq!(MemoryOrder::Relaxed.fail_order(), MemoryOrder::Relaxed);
    assert_eq!(MemoryOrder::Consume.fail_order(), MemoryOrder::Consume);
    assert_eq!(MemoryOrder::Acquire.fail_order(), MemoryOrder::Acquire);
    assert_eq!(MemoryOrder::Release.fail_order(), MemoryOrder::Relaxed);
    assert_eq!(MemoryOrder::AcqRel.fail_order(), MemoryOrder::Acquire);
    assert_eq!(MemoryOrder::SeqCst.fail_order(), MemoryOrder::SeqCst);
}

#[test]
fn store_and_load_permissions() {
    assert!(MemoryOrder::Relaxed.admits_store());
    assert!(MemoryOrder::Release.admits_store());
    assert!(MemoryOrder::SeqCst.admits_store());
    assert!(!MemoryOrder::Consume.admits_store());
    assert!(!MemoryOrder::Acquire.admits_store());
    assert!(!MemoryOrder::AcqRel.admits_store());

    assert!(MemoryOrder::Relaxed.admits_load());
    assert!(MemoryOrder::Consume.admits_load());
    assert!(MemoryOrder::Acquire.admits_load());
    assert!(MemoryOrder::SeqCst.admits_load());
    assert!(!MemoryOrder::Release.admits_load());
    assert!(!MemoryOrder::AcqRel.admits_load());
}

#[test]
fn repr_round_trips() {
    for order in [
        MemoryOrder::Relaxed,
        MemoryOrder::Consume,
        MemoryOrder::Acquire,
        MemoryOrder::Release,
        MemoryOrder::AcqRel,
        MemoryOrder::SeqCst,
    ] {
        assert_eq!(MemoryOrder::from_repr(order as u8), order);
    }
}
