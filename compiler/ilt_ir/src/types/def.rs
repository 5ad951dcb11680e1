//! Canonical type definitions.
//!
//! A reference is resolved to at most one [`TypeDef`] through the
//! definition table, keyed by fully-qualified name (`Namespace.Outer/Inner`).
//! Generic instances, modifiers and managed references resolve through to
//! the definition of what they wrap.

use bitflags::bitflags;

use super::TypeId;

/// Handle to a canonical definition.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct DefId(u32);

impl DefId {
    #[inline]
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// Definition attributes relevant to translation decisions.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct DefFlags: u8 {
        /// Derives from `System.ValueType` (structs, enums, primitives).
        const VALUE_TYPE = 1 << 0;
        const ENUM = 1 << 1;
        const INTERFACE = 1 << 2;
        const SEALED = 1 << 3;
    }
}

/// Everything the metadata reader supplies when defining a type.
#[derive(Clone, Debug, Default)]
pub struct DefSpec {
    pub flags: DefFlags,
    pub base: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    /// Underlying integral type, for enums.
    pub enum_underlying: Option<TypeId>,
}

impl DefSpec {
    pub fn class(base: TypeId) -> Self {
        Self {
            base: Some(base),
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, flags: DefFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_interfaces(mut self, interfaces: impl IntoIterator<Item = TypeId>) -> Self {
        self.interfaces.extend(interfaces);
        self
    }
}

/// A resolved, de-aliased declaration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeDef {
    pub full_name: Box<str>,
    /// The reference the definition was registered through.
    pub self_ref: TypeId,
    pub flags: DefFlags,
    pub base: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub enum_underlying: Option<TypeId>,
}

impl TypeDef {
    #[inline]
    pub fn is_value_type(&self) -> bool {
        self.flags.contains(DefFlags::VALUE_TYPE)
    }

    #[inline]
    pub fn is_enum(&self) -> bool {
        self.flags.contains(DefFlags::ENUM)
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.flags.contains(DefFlags::INTERFACE)
    }
}
