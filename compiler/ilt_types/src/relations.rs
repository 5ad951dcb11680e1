//! Assignability over the inheritance and interface graph.

use std::sync::Arc;

use ilt_cache::{CacheError, SingleFlightCache};
use ilt_ir::{TypeId, TypeKind, TypePool};
use ilt_stack::ensure_sufficient_stack;

use crate::deref::{fully_dereference, strip_modifiers};
use crate::equivalence::{equivalent, equivalent_opt, in_base_chain};
use crate::well_known::{self, WellKnown};

/// Memoized `(target, source)` assignability answers, keyed by reference
/// identity and shared by every worker translating against one pool.
pub type AssignabilityCache = SingleFlightCache<(TypeId, TypeId), bool>;

/// Type queries against one frozen pool.
///
/// Cloning is cheap; every clone shares the pool and the cache.
#[derive(Clone, Debug)]
pub struct TypeRelations {
    pool: Arc<TypePool>,
    cache: Arc<AssignabilityCache>,
    well_known: WellKnown,
}

impl TypeRelations {
    pub fn new(pool: Arc<TypePool>, cache: Arc<AssignabilityCache>) -> Self {
        let well_known = WellKnown::resolve(&pool);
        TypeRelations {
            pool,
            cache,
            well_known,
        }
    }

    /// Relations with a private cache.
    pub fn with_fresh_cache(pool: Arc<TypePool>) -> Self {
        Self::new(pool, Arc::new(AssignabilityCache::new()))
    }

    #[inline]
    pub fn pool(&self) -> &TypePool {
        &self.pool
    }

    #[inline]
    pub fn cache(&self) -> &AssignabilityCache {
        &self.cache
    }

    #[inline]
    pub fn well_known(&self) -> &WellKnown {
        &self.well_known
    }

    pub fn equivalent(&self, a: TypeId, b: TypeId, strict: bool) -> bool {
        equivalent(&self.pool, a, b, strict)
    }

    pub fn equivalent_opt(&self, a: Option<TypeId>, b: Option<TypeId>, strict: bool) -> bool {
        equivalent_opt(&self.pool, a, b, strict)
    }

    /// Whether a value of type `source` can be stored in a slot of type `target`.
    ///
    /// A cycle in the base or interface graph closed by this thread's own walk
    /// is logged and answered `false`. Two threads entering the same cycle
    /// from different types wait on each other's entries forever; see the
    /// deadlock note on [`ilt_cache`].
    pub fn assignable(&self, target: TypeId, source: TypeId) -> bool {
        loop {
            match self.try_assignable(target, source) {
                Ok(answer) => return answer,
                Err(CacheError::RecursiveConstruction) => {
                    tracing::error!(
                        target = %self.pool.display(target),
                        source = %self.pool.display(source),
                        "cyclic type hierarchy while checking assignability"
                    );
                    return false;
                }
                // The cache was cleared under us; the key is free again.
                Err(CacheError::Unavailable) => {
                    tracing::debug!("assignability cache cleared mid-query, retrying");
                }
            }
        }
    }

    /// Whether `ty` is `System.Delegate` or derives from it at any depth.
    pub fn is_delegate_type(&self, ty: TypeId) -> bool {
        self.well_known
            .delegate_type(&self.pool)
            .is_some_and(|delegate| self.assignable(delegate, ty))
    }

    /// [`assignable`](Self::assignable), surfacing cache failures.
    pub fn try_assignable(&self, target: TypeId, source: TypeId) -> Result<bool, CacheError> {
        if self.is_top(target) {
            return Ok(true);
        }

        let (stripped_target, target_depth) = fully_dereference(&self.pool, target);
        let (stripped_source, source_depth) = fully_dereference(&self.pool, source);
        if target_depth == source_depth
            && equivalent(&self.pool, stripped_target, stripped_source, false)
        {
            return Ok(true);
        }

        if self.array_as_sequence(target, source) {
            return Ok(true);
        }

        self.cache.get_or_create((target, source), || {
            ensure_sufficient_stack(|| self.walk_hierarchy(target, source))
        })
    }

    fn is_top(&self, ty: TypeId) -> bool {
        let ty = strip_modifiers(&self.pool, ty);
        self.pool.qualified_name(ty) == Some(well_known::OBJECT)
    }

    /// `T[]` to `IEnumerable<T>`. Vectors implement it without any
    /// inheritance edge in metadata.
    fn array_as_sequence(&self, target: TypeId, source: TypeId) -> bool {
        let pool = &*self.pool;
        let TypeKind::GenericInstance { definition, args } = pool.kind(strip_modifiers(pool, target))
        else {
            return false;
        };
        let TypeKind::Array { rank: 1, element } = pool.kind(strip_modifiers(pool, source)) else {
            return false;
        };
        well_known::is(pool.resolve_id(*definition), self.well_known.sequence)
            && args.len() == 1
            && equivalent(pool, args[0], *element, true)
    }

    fn walk_hierarchy(&self, target: TypeId, source: TypeId) -> bool {
        let Some(def) = self.pool.resolve(source) else {
            return false;
        };
        // Arrays resolve to `System.Array`, which no base chain reaches.
        // Strict, so `List<string>` does not pass for `List<int>` through
        // their shared open definition.
        if equivalent(&self.pool, target, def.self_ref, true) {
            return true;
        }
        if in_base_chain(&self.pool, source, target, false) {
            return true;
        }
        if def.base.is_some_and(|base| self.assignable(target, base)) {
            return true;
        }
        def.interfaces
            .iter()
            .any(|&interface| self.assignable(target, interface))
    }
}
