// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Backend implementations and their table-construction entry points.

pub(crate) mod native;

use crate::ops::{Ops, OpsExplicit};
use crate::order::MemoryOrder;

pub use native::{alignment_native, create_ops_explicit_native, create_ops_native};

// The null backend supports nothing; it closes the registry so that a
// lookup always lands on a descriptor.
pub(crate) fn create_ops_null(_width: usize, _order: MemoryOrder) -> Ops {
    Ops::NULL
}

pub(crate) fn create_ops_explicit_null(_width: usize) -> OpsExplicit {
    OpsExplicit::NULL
}
