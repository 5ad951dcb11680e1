//! Reference unwrapping and definition lookup.

use ilt_ir::{DefId, ModifierKind, TypeId, TypeKind, TypePool};

/// Remove one managed-reference level, and one pointer level when
/// `pointers` is set.
pub fn dereference(pool: &TypePool, ty: TypeId, pointers: bool) -> TypeId {
    match pool.kind(ty) {
        TypeKind::ByReference { element } => *element,
        TypeKind::Pointer { element } if pointers => *element,
        _ => ty,
    }
}

/// Remove every managed-reference level, returning the element and how many
/// levels were removed.
pub fn fully_dereference(pool: &TypePool, mut ty: TypeId) -> (TypeId, u32) {
    let mut depth = 0;
    while let TypeKind::ByReference { element } = pool.kind(ty) {
        ty = *element;
        depth += 1;
    }
    (ty, depth)
}

/// Peel `modreq`/`modopt` wrappers. Pinned wrappers are kept.
pub fn strip_modifiers(pool: &TypePool, mut ty: TypeId) -> TypeId {
    while let TypeKind::Modified {
        inner,
        modifier: ModifierKind::Required | ModifierKind::Optional,
    } = pool.kind(ty)
    {
        ty = *inner;
    }
    ty
}

/// Pointers, pinned references and function pointers have no definition the
/// translator can reason about.
pub fn is_ignored_type(pool: &TypePool, ty: TypeId) -> bool {
    matches!(
        pool.kind(dereference(pool, ty, false)),
        TypeKind::Pointer { .. }
            | TypeKind::FunctionPointer
            | TypeKind::Modified {
                modifier: ModifierKind::Pinned,
                ..
            }
    )
}

/// The canonical definition behind a reference.
///
/// One managed-reference level and any required or optional modifiers are
/// looked through; every array maps to `System.Array`.
pub fn type_definition(pool: &TypePool, ty: TypeId) -> Option<DefId> {
    let ty = strip_modifiers(pool, dereference(pool, ty, false));
    match pool.kind(ty) {
        TypeKind::Array { .. } => pool.lookup_def("System.Array"),
        TypeKind::GenericParam(param) if param.owner.is_none() => None,
        _ if is_ignored_type(pool, ty) => None,
        _ => pool.resolve_id(ty),
    }
}
