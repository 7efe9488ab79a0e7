// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The fixed registry of backend implementations.
//!
//! The registry is process-wide constant data: an ordered sequence of
//! descriptors fixed at build time, scanned linearly and never mutated.
//! Its public surface is exactly [`get_ids`] and [`get_kind`]; dispatch
//! walks it internally in priority order.

use bitflags::bitflags;

use crate::ops::{Ops, OpsExplicit};
use crate::order::MemoryOrder;

bitflags! {
    /// Backend identities. Each registered backend owns one bit, so sets
    /// of backends can be described in a single word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Id: u32 {
        /// The backend that supports nothing.
        const NULL = 1 << 0;
        /// The backend built on the compiler's native atomics.
        const NATIVE = 1 << 1;
        /// The hardware-transactional-memory backend.
        const HTM = 1 << 2;
    }
}

bitflags! {
    /// Capability classes a backend can advertise. The empty set is the
    /// "unknown" sentinel returned for unregistered identities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Kind: u32 {
        const LOCK_FREE = 1 << 0;
        const LOCK_BASED = 1 << 1;
        const TRANSACTIONAL = 1 << 2;
    }
}

pub(crate) struct Descriptor {
    pub id: Id,
    pub kind: Kind,
    pub create: fn(usize, MemoryOrder) -> Ops,
    pub create_explicit: fn(usize) -> OpsExplicit,
}

/// Priority-ordered: dispatch returns the first backend that produces a
/// non-null table. The null backend stays last.
pub(crate) static REGISTRY: &[Descriptor] = &[
    #[cfg(all(target_arch = "x86_64", target_feature = "rtm"))]
    Descriptor {
        id: Id::HTM,
        kind: Kind::TRANSACTIONAL,
        create: crate::htm::create_ops_htm,
        create_explicit: crate::htm::create_ops_explicit_htm,
    },
    Descriptor {
        id: Id::NATIVE,
        kind: Kind::LOCK_FREE,
        create: crate::backend::create_ops_native,
        create_explicit: crate::backend::create_ops_explicit_native,
    },
    Descriptor {
        id: Id::NULL,
        kind: Kind::empty(),
        create: crate::backend::create_ops_null,
        create_explicit: crate::backend::create_ops_explicit_null,
    },
];

/// The identities of every registered backend whose kind intersects
/// `kinds`.
pub fn get_ids(kinds: Kind) -> Id {
    let mut ids = Id::empty();
    for entry in REGISTRY {
        if entry.kind.intersects(kinds) {
            ids |= entry.id;
        }
    }
    ids
}

/// The kind of the backend registered under `id`, or [`Kind::empty`] if no
/// backend has that identity.
pub fn get_kind(id: Id) -> Kind {
    for entry in REGISTRY {
        if entry.id == id {
            return entry.kind;
        }
    }
    Kind::empty()
}

#[test]
fn native_backend_is_registered_lock_free() {
    assert_eq!(get_kind(Id::NATIVE), Kind::LOCK_FREE);
    assert!(get_ids(Kind::LOCK_FREE).contains(Id::NATIVE));
}

#[test]
fn unknown_identity_reports_empty_kind() {
    assert_eq!(get_kind(Id::from_bits_retain(1 << 30)), Kind::empty());
}

#[test]
fn null_backend_matches_no_capability() {
    let all = Kind::LOCK_FREE | Kind::LOCK_BASED | Kind::TRANSACTIONAL;
    assert!(!get_ids(all).contains(Id::NULL));
}
