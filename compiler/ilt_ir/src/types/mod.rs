//! Type reference model.
//!
//! A [`TypeKind`] is an immutable structural description of one type
//! reference as it appears in metadata. Children are referenced by
//! [`TypeId`] handles into the same [`TypePool`], so a reference can only
//! point at references registered before it and the pool is acyclic by
//! construction.

mod def;
mod format;
mod pool;

pub use def::{DefFlags, DefId, DefSpec, TypeDef};
pub use pool::{PoolError, TypePool, TypePoolBuilder};

use smallvec::SmallVec;
use std::fmt;

/// Handle to a type reference in a [`TypePool`].
///
/// Equality is reference identity, not type equivalence.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // === Pre-interned references (indices 0-15) ===
    // Every pool starts with these at fixed indices.

    pub const BOOLEAN: Self = Self(0);
    pub const CHAR: Self = Self(1);
    pub const SBYTE: Self = Self(2);
    pub const BYTE: Self = Self(3);
    pub const INT16: Self = Self(4);
    pub const UINT16: Self = Self(5);
    pub const INT32: Self = Self(6);
    pub const UINT32: Self = Self(7);
    pub const INT64: Self = Self(8);
    pub const UINT64: Self = Self(9);
    pub const SINGLE: Self = Self(10);
    pub const DOUBLE: Self = Self(11);
    pub const INTPTR: Self = Self(12);
    pub const UINTPTR: Self = Self(13);
    /// `System.Object`, the universal top type.
    pub const OBJECT: Self = Self(14);
    /// `System.String`.
    pub const STRING: Self = Self(15);

    /// Number of pre-interned references.
    pub const PRE_INTERNED: u32 = 16;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Built-in scalar kinds. All live in the `System` namespace of the core module.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    IntPtr,
    UIntPtr,
}

impl PrimitiveKind {
    /// All primitive kinds, in pre-interned `TypeId` order.
    pub const ALL: [PrimitiveKind; 14] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Char,
        PrimitiveKind::SByte,
        PrimitiveKind::Byte,
        PrimitiveKind::Int16,
        PrimitiveKind::UInt16,
        PrimitiveKind::Int32,
        PrimitiveKind::UInt32,
        PrimitiveKind::Int64,
        PrimitiveKind::UInt64,
        PrimitiveKind::Single,
        PrimitiveKind::Double,
        PrimitiveKind::IntPtr,
        PrimitiveKind::UIntPtr,
    ];

    /// Simple metadata name (`Int32`, `Boolean`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::SByte => "SByte",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Int16 => "Int16",
            PrimitiveKind::UInt16 => "UInt16",
            PrimitiveKind::Int32 => "Int32",
            PrimitiveKind::UInt32 => "UInt32",
            PrimitiveKind::Int64 => "Int64",
            PrimitiveKind::UInt64 => "UInt64",
            PrimitiveKind::Single => "Single",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::IntPtr => "IntPtr",
            PrimitiveKind::UIntPtr => "UIntPtr",
        }
    }

    /// The pre-interned reference for this kind.
    pub const fn type_id(self) -> TypeId {
        TypeId(self as u32)
    }

    /// Integral kinds. Pointer-sized integers count as integral.
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::SByte
                | PrimitiveKind::Byte
                | PrimitiveKind::Int16
                | PrimitiveKind::UInt16
                | PrimitiveKind::Int32
                | PrimitiveKind::UInt32
                | PrimitiveKind::Int64
                | PrimitiveKind::UInt64
                | PrimitiveKind::IntPtr
                | PrimitiveKind::UIntPtr
        )
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, PrimitiveKind::Single | PrimitiveKind::Double)
    }

    pub const fn is_pointer_sized(self) -> bool {
        matches!(self, PrimitiveKind::IntPtr | PrimitiveKind::UIntPtr)
    }

    /// Integral or floating. `Char` and `Boolean` are not numeric.
    pub const fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating()
    }
}

/// Handle to a loaded module (assembly). Module 0 is the core library.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ModuleId(u32);

impl ModuleId {
    /// The core library module that holds `System.*`.
    pub const CORE: Self = Self(0);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A class, struct, interface, enum or delegate reference by name.
///
/// Nested types carry their declaring type and an empty namespace.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct NamedType {
    pub name: Box<str>,
    pub namespace: Box<str>,
    pub declaring: Option<TypeId>,
    pub module: ModuleId,
}

/// Whether a generic parameter was declared on a type or on a method.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GenericParamLevel {
    Type,
    Method,
}

/// The declaration that introduced a generic parameter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GenericOwner {
    Type(TypeId),
    Method(MethodId),
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct GenericParam {
    /// `None` when metadata left the owner unresolved.
    pub owner: Option<GenericOwner>,
    pub level: GenericParamLevel,
    pub position: u16,
    pub name: Box<str>,
    pub variance: Variance,
}

/// Compiler-inserted wrappers around another reference.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ModifierKind {
    /// `modreq(...)`
    Required,
    /// `modopt(...)`
    Optional,
    /// Pinned local.
    Pinned,
}

/// Structural description of a single type reference.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Named(NamedType),
    /// Rank 1 is a vector (`T[]`); higher ranks are `T[,]` etc.
    Array {
        rank: u32,
        element: TypeId,
    },
    Pointer {
        element: TypeId,
    },
    /// Managed reference (`T&`). Nested wrappers give the depth.
    ByReference {
        element: TypeId,
    },
    FunctionPointer,
    GenericParam(GenericParam),
    GenericInstance {
        definition: TypeId,
        args: SmallVec<[TypeId; 2]>,
    },
    Modified {
        inner: TypeId,
        modifier: ModifierKind,
    },
}

/// Handle to a method reference in a [`TypePool`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct MethodId(u32);

impl MethodId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A method reference: enough of a signature to drive rewrite decisions.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodSig {
    pub name: Box<str>,
    pub declaring: TypeId,
    pub is_static: bool,
    pub generic_arity: u16,
}

#[cfg(test)]
mod tests;
