//! Structural type equivalence.
//!
//! Two references are equivalent when they denote the same type, even if the
//! metadata reader registered them separately (different modules, different
//! generic contexts, modifier wrappers).
//!
//! # Strictness
//!
//! In strict mode generic instances must match argument for argument. In
//! loose mode an instance is also equivalent to anything its own generic
//! definition is equivalent to, so `List<int>` matches the open `List<T>`
//! shape. Loose mode is therefore not transitive.

use ilt_ir::{GenericOwner, GenericParam, ModuleId, TypeId, TypeKind, TypePool};
use ilt_stack::ensure_sufficient_stack;

use crate::deref::{fully_dereference, strip_modifiers};

/// Whether `a` and `b` denote the same type.
pub fn equivalent(pool: &TypePool, a: TypeId, b: TypeId, strict: bool) -> bool {
    if a == b {
        return true;
    }
    ensure_sufficient_stack(|| Equivalence { pool, strict }.references(a, b))
}

/// [`equivalent`] over optional references: absent equals only absent.
pub fn equivalent_opt(pool: &TypePool, a: Option<TypeId>, b: Option<TypeId>, strict: bool) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => equivalent(pool, a, b, strict),
        (None, None) => true,
        _ => false,
    }
}

/// Whether `needle` is `haystack` or one of its base types.
///
/// Falls back to plain equivalence when either side has no definition.
pub fn in_base_chain(pool: &TypePool, haystack: TypeId, needle: TypeId, strict: bool) -> bool {
    Equivalence { pool, strict }.in_bases(haystack, needle)
}

#[derive(Copy, Clone)]
struct Equivalence<'a> {
    pool: &'a TypePool,
    strict: bool,
}

/// Naming triple plus declaring type, for named and primitive references.
struct NameParts<'a> {
    namespace: &'a str,
    name: &'a str,
    module: ModuleId,
    declaring: Option<TypeId>,
}

impl<'a> Equivalence<'a> {
    fn references(self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }

        let (a, a_depth) = fully_dereference(self.pool, a);
        let (b, b_depth) = fully_dereference(self.pool, b);
        if a_depth != b_depth {
            return false;
        }
        let a = strip_modifiers(self.pool, a);
        let b = strip_modifiers(self.pool, b);
        if a == b {
            return true;
        }

        match (self.pool.kind(a), self.pool.kind(b)) {
            (TypeKind::GenericParam(pa), TypeKind::GenericParam(pb)) => self.params(pa, pb),
            (TypeKind::GenericParam(_), _) | (_, TypeKind::GenericParam(_)) => false,

            (
                TypeKind::Array {
                    rank: ra,
                    element: ea,
                },
                TypeKind::Array {
                    rank: rb,
                    element: eb,
                },
            ) => ra == rb && self.recurse(*ea, *eb),
            (TypeKind::Array { .. }, _) | (_, TypeKind::Array { .. }) => false,

            (TypeKind::GenericInstance { .. }, _) | (_, TypeKind::GenericInstance { .. }) => {
                self.instances(a, b)
            }

            // Managed references here sat under a modifier.
            (TypeKind::Pointer { element: ea }, TypeKind::Pointer { element: eb })
            | (TypeKind::ByReference { element: ea }, TypeKind::ByReference { element: eb })
            | (
                TypeKind::Modified { inner: ea, .. },
                TypeKind::Modified { inner: eb, .. },
            ) => self.recurse(*ea, *eb),
            (TypeKind::FunctionPointer, TypeKind::FunctionPointer) => true,
            (
                TypeKind::Pointer { .. }
                | TypeKind::ByReference { .. }
                | TypeKind::Modified { .. }
                | TypeKind::FunctionPointer,
                _,
            )
            | (
                _,
                TypeKind::Pointer { .. }
                | TypeKind::ByReference { .. }
                | TypeKind::Modified { .. }
                | TypeKind::FunctionPointer,
            ) => false,

            _ => self.named(a, b),
        }
    }

    fn recurse(self, a: TypeId, b: TypeId) -> bool {
        ensure_sufficient_stack(|| self.references(a, b))
    }

    fn params(self, a: &GenericParam, b: &GenericParam) -> bool {
        let owners_match = match (a.owner, b.owner) {
            (Some(GenericOwner::Type(x)), Some(GenericOwner::Type(y))) => {
                self.in_bases(x, y) || self.in_bases(y, x)
            }
            (Some(GenericOwner::Type(_)), _) | (_, Some(GenericOwner::Type(_))) => false,
            (x, y) => x == y,
        };
        owners_match && a.level == b.level && a.name == b.name && a.position == b.position
    }

    fn instances(self, a: TypeId, b: TypeId) -> bool {
        let a_instance = instance_parts(self.pool, a);
        let b_instance = instance_parts(self.pool, b);

        if !self.strict {
            // An instance also matches whatever its open definition matches.
            if let Some((definition, _)) = a_instance {
                if self.recurse(definition, b) {
                    return true;
                }
            }
            if let Some((definition, _)) = b_instance {
                if self.recurse(a, definition) {
                    return true;
                }
            }
        }

        let (Some((def_a, args_a)), Some((def_b, args_b))) = (a_instance, b_instance) else {
            return false;
        };
        args_a.len() == args_b.len()
            && args_a
                .iter()
                .zip(args_b)
                .all(|(x, y)| self.recurse(*x, *y))
            && self.recurse(def_a, def_b)
    }

    fn named(self, a: TypeId, b: TypeId) -> bool {
        if let (Some(x), Some(y)) = (self.name_parts(a), self.name_parts(b)) {
            let declaring_match = match (x.declaring, y.declaring) {
                (Some(da), Some(db)) => self.recurse(da, db),
                (None, None) => true,
                _ => false,
            };
            if x.name == y.name
                && x.namespace == y.namespace
                && x.module == y.module
                && declaring_match
            {
                return true;
            }
        }

        match (self.pool.resolve(a), self.pool.resolve(b)) {
            (Some(x), Some(y)) => {
                self.pool.resolve_id(a) == self.pool.resolve_id(b) || x.full_name == y.full_name
            }
            _ => false,
        }
    }

    fn name_parts(self, ty: TypeId) -> Option<NameParts<'a>> {
        match self.pool.kind(ty) {
            TypeKind::Primitive(kind) => Some(NameParts {
                namespace: "System",
                name: kind.name(),
                module: ModuleId::CORE,
                declaring: None,
            }),
            TypeKind::Named(named) => Some(NameParts {
                namespace: &named.namespace,
                name: &named.name,
                module: named.module,
                declaring: named.declaring,
            }),
            _ => None,
        }
    }

    fn in_bases(self, haystack: TypeId, needle: TypeId) -> bool {
        if self.pool.resolve(haystack).is_none() || self.pool.resolve(needle).is_none() {
            return self.recurse(haystack, needle);
        }

        // A chain longer than the definition table is cyclic.
        let mut remaining = self.pool.def_count() + 1;
        let mut current = haystack;
        loop {
            if self.recurse(current, needle) {
                return true;
            }
            let Some(base) = self.pool.resolve(current).and_then(|def| def.base) else {
                return false;
            };
            remaining -= 1;
            if remaining == 0 {
                tracing::warn!(
                    haystack = %self.pool.display(haystack),
                    "base type chain does not terminate"
                );
                return false;
            }
            current = base;
        }
    }
}

fn instance_parts(pool: &TypePool, ty: TypeId) -> Option<(TypeId, &[TypeId])> {
    match pool.kind(ty) {
        TypeKind::GenericInstance { definition, args } => Some((*definition, args.as_slice())),
        _ => None,
    }
}
