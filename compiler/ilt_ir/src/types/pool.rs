//! Type pool construction and lookup.
//!
//! The metadata reader registers references, methods and definitions through
//! [`TypePoolBuilder`]; [`TypePoolBuilder::finish`] resolves every reference
//! to its canonical definition once and yields an immutable [`TypePool`].
//!
//! # Pre-interned References
//!
//! Every builder starts with the fourteen primitives, `System.Object` and
//! `System.String` at the fixed indices named by the `TypeId` constants.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::def::{DefFlags, DefId, DefSpec, TypeDef};
use super::{
    GenericOwner, GenericParam, GenericParamLevel, MethodId, MethodSig, ModifierKind, ModuleId,
    NamedType, PrimitiveKind, TypeId, TypeKind, Variance,
};

/// Error when registering a definition fails.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum PoolError {
    /// A definition with this fully-qualified name already exists.
    #[error("type `{name}` is already defined")]
    DuplicateDefinition { name: String },
    /// Only named and primitive references can carry a definition.
    #[error("{ty:?} is not a named type reference and cannot be defined")]
    UnnamedDefinition { ty: TypeId },
}

/// Mutable staging area for a [`TypePool`].
pub struct TypePoolBuilder {
    kinds: Vec<TypeKind>,
    /// Fully-qualified name per reference (named and primitive only).
    qualified: Vec<Option<Box<str>>>,
    defs: Vec<TypeDef>,
    defs_by_name: FxHashMap<Box<str>, DefId>,
    methods: Vec<MethodSig>,
}

impl TypePoolBuilder {
    /// Create a builder holding only the pre-interned references.
    pub fn new() -> Self {
        let mut builder = Self {
            kinds: Vec::with_capacity(256),
            qualified: Vec::with_capacity(256),
            defs: Vec::new(),
            defs_by_name: FxHashMap::default(),
            methods: Vec::new(),
        };

        for kind in PrimitiveKind::ALL {
            builder.push(TypeKind::Primitive(kind));
        }
        builder.named("Object", "System", ModuleId::CORE);
        builder.named("String", "System", ModuleId::CORE);
        debug_assert_eq!(builder.kinds.len(), TypeId::PRE_INTERNED as usize);

        builder
    }

    /// Create a builder with the core library definitions already registered.
    ///
    /// Defines `System.Object`, `ValueType`, `Enum`, `String`, `Array`,
    /// `Type`, `Delegate`, `MulticastDelegate`, `Nullable`1`, the primitives,
    /// and `System.Collections.Generic.IEnumerable`1`.
    pub fn with_core_library() -> Self {
        let mut b = Self::new();

        b.insert_def(TypeId::OBJECT, DefSpec::default());
        let value_type = b.core_class("ValueType", TypeId::OBJECT, DefFlags::empty());
        b.core_class("Enum", value_type, DefFlags::empty());
        b.insert_def(
            TypeId::STRING,
            DefSpec::class(TypeId::OBJECT).with_flags(DefFlags::SEALED),
        );
        b.core_class("Array", TypeId::OBJECT, DefFlags::empty());
        b.core_class("Type", TypeId::OBJECT, DefFlags::empty());
        let delegate = b.core_class("Delegate", TypeId::OBJECT, DefFlags::empty());
        b.core_class("MulticastDelegate", delegate, DefFlags::empty());
        let nullable = b.core_class(
            "Nullable`1",
            value_type,
            DefFlags::VALUE_TYPE | DefFlags::SEALED,
        );
        b.type_param(nullable, 0, "T");

        for kind in PrimitiveKind::ALL {
            b.insert_def(
                kind.type_id(),
                DefSpec::class(value_type).with_flags(DefFlags::VALUE_TYPE | DefFlags::SEALED),
            );
        }

        let sequence = b.named("IEnumerable`1", "System.Collections.Generic", ModuleId::CORE);
        b.type_param(sequence, 0, "T");
        b.insert_def(
            sequence,
            DefSpec::default().with_flags(DefFlags::INTERFACE),
        );

        b
    }

    fn core_class(&mut self, name: &str, base: TypeId, flags: DefFlags) -> TypeId {
        let ty = self.named(name, "System", ModuleId::CORE);
        self.insert_def(ty, DefSpec::class(base).with_flags(flags));
        ty
    }

    fn push(&mut self, kind: TypeKind) -> TypeId {
        let qualified = match &kind {
            TypeKind::Primitive(p) => Some(format!("System.{}", p.name()).into_boxed_str()),
            TypeKind::Named(named) => Some(self.qualify(named)),
            _ => None,
        };
        let raw = u32::try_from(self.kinds.len())
            .unwrap_or_else(|_| panic!("type pool exceeded u32::MAX references"));
        self.kinds.push(kind);
        self.qualified.push(qualified);
        TypeId::from_raw(raw)
    }

    fn qualify(&self, named: &NamedType) -> Box<str> {
        match named.declaring {
            Some(outer) => {
                let outer_name = self.qualified[outer.index()].as_deref().unwrap_or_default();
                format!("{outer_name}/{}", named.name).into_boxed_str()
            }
            None if named.namespace.is_empty() => named.name.clone(),
            None => format!("{}.{}", named.namespace, named.name).into_boxed_str(),
        }
    }

    fn check(&self, ty: TypeId) {
        debug_assert!(
            ty.index() < self.kinds.len(),
            "{ty:?} referenced before it was registered"
        );
    }

    /// Number of references registered so far.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Always `false`: the pre-interned references are present from the start.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// The pre-interned reference for a primitive kind.
    pub fn primitive(&self, kind: PrimitiveKind) -> TypeId {
        kind.type_id()
    }

    /// Register a new top-level named reference.
    pub fn named(&mut self, name: &str, namespace: &str, module: ModuleId) -> TypeId {
        self.push(TypeKind::Named(NamedType {
            name: name.into(),
            namespace: namespace.into(),
            declaring: None,
            module,
        }))
    }

    /// Register a reference to a type nested inside `declaring`.
    pub fn nested(&mut self, name: &str, declaring: TypeId, module: ModuleId) -> TypeId {
        self.check(declaring);
        self.push(TypeKind::Named(NamedType {
            name: name.into(),
            namespace: "".into(),
            declaring: Some(declaring),
            module,
        }))
    }

    pub fn array(&mut self, element: TypeId, rank: u32) -> TypeId {
        self.check(element);
        self.push(TypeKind::Array {
            rank: rank.max(1),
            element,
        })
    }

    pub fn pointer(&mut self, element: TypeId) -> TypeId {
        self.check(element);
        self.push(TypeKind::Pointer { element })
    }

    pub fn by_ref(&mut self, element: TypeId) -> TypeId {
        self.check(element);
        self.push(TypeKind::ByReference { element })
    }

    pub fn function_pointer(&mut self) -> TypeId {
        self.push(TypeKind::FunctionPointer)
    }

    pub fn modified(&mut self, inner: TypeId, modifier: ModifierKind) -> TypeId {
        self.check(inner);
        self.push(TypeKind::Modified { inner, modifier })
    }

    pub fn generic_instance(&mut self, definition: TypeId, args: &[TypeId]) -> TypeId {
        self.check(definition);
        for &arg in args {
            self.check(arg);
        }
        self.push(TypeKind::GenericInstance {
            definition,
            args: SmallVec::from_slice(args),
        })
    }

    /// Register a generic parameter with full control over its fields.
    pub fn generic_param(&mut self, param: GenericParam) -> TypeId {
        if let Some(GenericOwner::Type(owner)) = param.owner {
            self.check(owner);
        }
        self.push(TypeKind::GenericParam(param))
    }

    /// Register an invariant type-level generic parameter owned by `owner`.
    pub fn type_param(&mut self, owner: TypeId, position: u16, name: &str) -> TypeId {
        self.generic_param(GenericParam {
            owner: Some(GenericOwner::Type(owner)),
            level: GenericParamLevel::Type,
            position,
            name: name.into(),
            variance: Variance::Invariant,
        })
    }

    /// Register an invariant method-level generic parameter owned by `owner`.
    pub fn method_param(&mut self, owner: MethodId, position: u16, name: &str) -> TypeId {
        self.generic_param(GenericParam {
            owner: Some(GenericOwner::Method(owner)),
            level: GenericParamLevel::Method,
            position,
            name: name.into(),
            variance: Variance::Invariant,
        })
    }

    /// Register a non-generic method reference.
    pub fn method(&mut self, name: &str, declaring: TypeId, is_static: bool) -> MethodId {
        self.generic_method(name, declaring, is_static, 0)
    }

    /// Register a method reference declaring `generic_arity` type parameters.
    pub fn generic_method(
        &mut self,
        name: &str,
        declaring: TypeId,
        is_static: bool,
        generic_arity: u16,
    ) -> MethodId {
        self.check(declaring);
        let raw = u32::try_from(self.methods.len())
            .unwrap_or_else(|_| panic!("type pool exceeded u32::MAX methods"));
        self.methods.push(MethodSig {
            name: name.into(),
            declaring,
            is_static,
            generic_arity,
        });
        MethodId::from_raw(raw)
    }

    /// Register the canonical definition reached through `ty`.
    pub fn define(&mut self, ty: TypeId, spec: DefSpec) -> Result<DefId, PoolError> {
        self.check(ty);
        let Some(name) = self.qualified[ty.index()].as_deref() else {
            return Err(PoolError::UnnamedDefinition { ty });
        };
        if self.defs_by_name.contains_key(name) {
            return Err(PoolError::DuplicateDefinition {
                name: name.to_owned(),
            });
        }
        Ok(self.insert_def(ty, spec))
    }

    fn insert_def(&mut self, ty: TypeId, spec: DefSpec) -> DefId {
        let full_name = self.qualified[ty.index()].clone().unwrap_or_default();
        let raw = u32::try_from(self.defs.len())
            .unwrap_or_else(|_| panic!("type pool exceeded u32::MAX definitions"));
        let id = DefId::new(raw);
        self.defs.push(TypeDef {
            full_name: full_name.clone(),
            self_ref: ty,
            flags: spec.flags,
            base: spec.base,
            interfaces: spec.interfaces,
            enum_underlying: spec.enum_underlying,
        });
        self.defs_by_name.insert(full_name, id);
        id
    }

    /// Look up a definition registered so far, returning its self reference.
    pub fn lookup_type(&self, full_name: &str) -> Option<TypeId> {
        self.defs_by_name
            .get(full_name)
            .map(|&id| self.defs[id.index()].self_ref)
    }

    /// Freeze the builder, resolving every reference to its definition.
    pub fn finish(self) -> TypePool {
        let array_def = self.defs_by_name.get("System.Array").copied();
        let mut canonical: Vec<Option<DefId>> = Vec::with_capacity(self.kinds.len());

        // Children always precede their parents, so one forward pass suffices.
        for (index, kind) in self.kinds.iter().enumerate() {
            let resolved = match kind {
                TypeKind::Primitive(_) | TypeKind::Named(_) => self.qualified[index]
                    .as_deref()
                    .and_then(|name| self.defs_by_name.get(name).copied()),
                TypeKind::GenericInstance { definition, .. } => canonical[definition.index()],
                TypeKind::Modified { inner, .. } => canonical[inner.index()],
                TypeKind::ByReference { element } => canonical[element.index()],
                TypeKind::Array { .. } => array_def,
                TypeKind::Pointer { .. } | TypeKind::FunctionPointer | TypeKind::GenericParam(_) => {
                    None
                }
            };
            canonical.push(resolved);
        }

        TypePool {
            kinds: self.kinds,
            qualified: self.qualified,
            canonical,
            defs: self.defs,
            defs_by_name: self.defs_by_name,
            methods: self.methods,
        }
    }
}

impl Default for TypePoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen, shareable store of type references and their definitions.
///
/// # Thread Safety
/// Immutable after construction; share it across workers behind an `Arc`.
#[derive(Debug)]
pub struct TypePool {
    kinds: Vec<TypeKind>,
    qualified: Vec<Option<Box<str>>>,
    canonical: Vec<Option<DefId>>,
    defs: Vec<TypeDef>,
    defs_by_name: FxHashMap<Box<str>, DefId>,
    methods: Vec<MethodSig>,
}

impl TypePool {
    /// Number of references in the pool.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// The structural description of a reference.
    ///
    /// # Panics
    /// Panics if `id` was not created by this pool's builder.
    #[inline]
    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id.index()]
    }

    /// Fully-qualified name of a named or primitive reference.
    #[inline]
    pub fn qualified_name(&self, id: TypeId) -> Option<&str> {
        self.qualified[id.index()].as_deref()
    }

    /// `(namespace, name)` for named and primitive references.
    pub fn namespace_and_name(&self, id: TypeId) -> Option<(&str, &str)> {
        match self.kind(id) {
            TypeKind::Primitive(p) => Some(("System", p.name())),
            TypeKind::Named(named) => Some((&named.namespace, &named.name)),
            _ => None,
        }
    }

    /// Canonical definition a reference resolves to, if any.
    #[inline]
    pub fn resolve_id(&self, id: TypeId) -> Option<DefId> {
        self.canonical[id.index()]
    }

    /// Canonical definition a reference resolves to, if any.
    #[inline]
    pub fn resolve(&self, id: TypeId) -> Option<&TypeDef> {
        self.resolve_id(id).map(|def| self.def(def))
    }

    #[inline]
    pub fn def(&self, id: DefId) -> &TypeDef {
        &self.defs[id.index()]
    }

    pub fn defs(&self) -> impl Iterator<Item = (DefId, &TypeDef)> {
        self.defs.iter().enumerate().map(|(index, def)| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "definition count was checked against u32::MAX on insert"
            )]
            let id = DefId::new(index as u32);
            (id, def)
        })
    }

    pub fn def_count(&self) -> usize {
        self.defs.len()
    }

    pub fn lookup_def(&self, full_name: &str) -> Option<DefId> {
        self.defs_by_name.get(full_name).copied()
    }

    /// Self reference of the definition named `full_name`.
    pub fn lookup_type(&self, full_name: &str) -> Option<TypeId> {
        self.lookup_def(full_name).map(|id| self.def(id).self_ref)
    }

    #[inline]
    pub fn method(&self, id: MethodId) -> &MethodSig {
        &self.methods[id.index()]
    }
}
