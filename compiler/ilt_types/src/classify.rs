//! Type classification queries used by the rewrite rules and the emitter.

use ilt_ir::{DefId, PrimitiveKind, TypeId, TypeKind, TypePool};
use ilt_stack::ensure_sufficient_stack;

use crate::deref::{dereference, strip_modifiers, type_definition};

pub use crate::deref::is_ignored_type;

/// The primitive a reference denotes, looking through one managed reference,
/// modifiers, and named references to primitive definitions.
pub fn primitive_kind(pool: &TypePool, ty: TypeId) -> Option<PrimitiveKind> {
    let ty = strip_modifiers(pool, dereference(pool, ty, false));
    match pool.kind(ty) {
        TypeKind::Primitive(kind) => Some(*kind),
        TypeKind::Named(_) => match pool.kind(pool.resolve(ty)?.self_ref) {
            TypeKind::Primitive(kind) => Some(*kind),
            _ => None,
        },
        _ => None,
    }
}

pub fn is_boolean(pool: &TypePool, ty: TypeId) -> bool {
    primitive_kind(pool, ty) == Some(PrimitiveKind::Boolean)
}

pub fn is_numeric(pool: &TypePool, ty: TypeId) -> bool {
    primitive_kind(pool, ty).is_some_and(PrimitiveKind::is_numeric)
}

pub fn is_integral(pool: &TypePool, ty: TypeId) -> bool {
    primitive_kind(pool, ty).is_some_and(PrimitiveKind::is_integral)
}

pub fn is_enum(pool: &TypePool, ty: TypeId) -> bool {
    type_definition(pool, ty).is_some_and(|def| pool.def(def).is_enum())
}

pub fn is_integral_or_enum(pool: &TypePool, ty: TypeId) -> bool {
    is_integral(pool, ty) || is_enum(pool, ty)
}

pub fn is_numeric_or_enum(pool: &TypePool, ty: TypeId) -> bool {
    is_numeric(pool, ty) || is_enum(pool, ty)
}

/// A user-defined value type: not a primitive, not an enum.
///
/// Generic instances follow their definition, so `KeyValuePair<K, V>` is a
/// struct while `List<T>` is not.
pub fn is_struct(pool: &TypePool, ty: TypeId) -> bool {
    let ty = dereference(pool, ty, false);
    if is_enum(pool, ty) || primitive_kind(pool, ty).is_some() {
        return false;
    }
    match pool.kind(strip_modifiers(pool, ty)) {
        TypeKind::Named(_) | TypeKind::GenericInstance { .. } => {
            type_definition(pool, ty).is_some_and(|def| pool.def(def).is_value_type())
        }
        _ => false,
    }
}

/// Whether the reference mentions a generic parameter anywhere.
pub fn is_open_type(pool: &TypePool, ty: TypeId) -> bool {
    ensure_sufficient_stack(|| match pool.kind(ty) {
        TypeKind::GenericParam(_) => true,
        TypeKind::GenericInstance { definition, args } => {
            args.iter().any(|&arg| is_open_type(pool, arg)) || is_open_type(pool, *definition)
        }
        TypeKind::Array { element, .. }
        | TypeKind::ByReference { element }
        | TypeKind::Pointer { element }
        | TypeKind::Modified { inner: element, .. } => is_open_type(pool, *element),
        TypeKind::Primitive(_) | TypeKind::Named(_) | TypeKind::FunctionPointer => false,
    })
}

/// `Nullable<T>` becomes `T`; anything else is returned unchanged.
pub fn strip_nullable(pool: &TypePool, ty: TypeId) -> TypeId {
    if let TypeKind::GenericInstance { definition, args } = pool.kind(ty) {
        let is_nullable = pool
            .namespace_and_name(*definition)
            .is_some_and(|(_, name)| name == "Nullable`1");
        if let (true, Some(&inner)) = (is_nullable, args.first()) {
            return inner;
        }
    }
    ty
}

/// Identifier-safe name of a named type: the declaring chain joined by `_`.
///
/// `Outer/Inner` becomes `Outer_Inner`. Returns `None` for structural references.
pub fn local_name(pool: &TypePool, ty: TypeId) -> Option<String> {
    let mut parts = Vec::new();
    let mut current = Some(ty);
    while let Some(id) = current {
        let TypeKind::Named(named) = pool.kind(id) else {
            break;
        };
        parts.push(&*named.name);
        current = named.declaring;
    }
    if parts.is_empty() {
        return None;
    }
    parts.reverse();
    Some(parts.join("_"))
}

/// Definitions of every base type of `def`, nearest first.
pub fn all_base_types_of(pool: &TypePool, def: DefId) -> Vec<DefId> {
    let mut bases = Vec::new();
    let mut current = pool.def(def).base.and_then(|base| type_definition(pool, base));
    while let Some(base) = current {
        if base == def || bases.contains(&base) {
            tracing::warn!(
                ty = %pool.def(def).full_name,
                "cyclic base type chain"
            );
            break;
        }
        bases.push(base);
        current = pool.def(base).base.and_then(|next| type_definition(pool, next));
    }
    bases
}
