//! Intermediate representation shared by the ilt translator core.
//!
//! Two independent halves live here:
//!
//! - **Type references** (`types`): an immutable, frozen [`TypePool`] of
//!   structural type descriptions addressed by [`TypeId`], plus the canonical
//!   definition table ([`TypeDef`]) keyed by fully-qualified name. The pool is
//!   built once by the metadata reader through [`TypePoolBuilder`] and then
//!   shared read-only by every worker.
//! - **Expression trees** (`expr`): one [`ExprArena`] per member body, produced
//!   by the decompiler and rewritten by `ilt_rewrite`.
//!
//! # Identity vs. Equivalence
//!
//! The pool does not deduplicate references: two separately registered
//! references to `System.Int32[]` get distinct `TypeId`s. `TypeId` equality is
//! *reference identity*; deciding whether two references denote the same type
//! is the job of `ilt_types`.

mod expr;
mod types;

pub use expr::{
    BinaryOp, Constructor, ExprArena, ExprId, ExprKind, ExprRange, Intrinsic, Literal, Member,
    UnaryOp, VarId,
};
pub use types::{
    DefFlags, DefId, DefSpec, GenericOwner, GenericParam, GenericParamLevel, MethodId,
    MethodSig, ModifierKind, ModuleId, NamedType, PoolError, PrimitiveKind, TypeDef, TypeId,
    TypeKind, TypePool, TypePoolBuilder, Variance,
};

/// Compile-time assertion that a type has a specific size.
///
/// Used to keep the hot handle types from growing by accident.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{ExprId, TypeId};
    crate::static_assert_size!(TypeId, 4);
    crate::static_assert_size!(ExprId, 4);
}
