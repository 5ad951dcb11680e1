//! Core library definitions looked up once per pool.

use ilt_ir::{DefId, TypeId, TypePool};

pub const OBJECT: &str = "System.Object";
pub const STRING: &str = "System.String";
pub const ARRAY: &str = "System.Array";
pub const TYPE: &str = "System.Type";
pub const DELEGATE: &str = "System.Delegate";
pub const MULTICAST_DELEGATE: &str = "System.MulticastDelegate";
pub const NULLABLE: &str = "System.Nullable`1";
pub const SEQUENCE: &str = "System.Collections.Generic.IEnumerable`1";

/// Definitions of the core library types the translator treats specially.
///
/// A pool built without the core library leaves these `None`; every check
/// against a missing definition answers "no".
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct WellKnown {
    pub object: Option<DefId>,
    pub string: Option<DefId>,
    pub array: Option<DefId>,
    pub system_type: Option<DefId>,
    pub delegate: Option<DefId>,
    pub multicast_delegate: Option<DefId>,
    pub nullable: Option<DefId>,
    pub sequence: Option<DefId>,
}

impl WellKnown {
    pub fn resolve(pool: &TypePool) -> Self {
        WellKnown {
            object: pool.lookup_def(OBJECT),
            string: pool.lookup_def(STRING),
            array: pool.lookup_def(ARRAY),
            system_type: pool.lookup_def(TYPE),
            delegate: pool.lookup_def(DELEGATE),
            multicast_delegate: pool.lookup_def(MULTICAST_DELEGATE),
            nullable: pool.lookup_def(NULLABLE),
            sequence: pool.lookup_def(SEQUENCE),
        }
    }

    /// Self reference of `System.Delegate`, the target of delegate checks.
    pub fn delegate_type(&self, pool: &TypePool) -> Option<TypeId> {
        self.delegate.map(|def| pool.def(def).self_ref)
    }
}

/// `def` is present and equal to `expected`.
#[inline]
pub(crate) fn is(def: Option<DefId>, expected: Option<DefId>) -> bool {
    def.is_some() && def == expected
}
