use pretty_assertions::assert_eq;

use super::*;

#[test]
fn pre_interned_references_have_fixed_ids() {
    let pool = TypePoolBuilder::new().finish();

    assert_eq!(pool.len(), TypeId::PRE_INTERNED as usize);
    assert_eq!(
        pool.kind(TypeId::INT32),
        &TypeKind::Primitive(PrimitiveKind::Int32)
    );
    assert_eq!(pool.qualified_name(TypeId::OBJECT), Some("System.Object"));
    assert_eq!(pool.qualified_name(TypeId::STRING), Some("System.String"));
    assert_eq!(pool.qualified_name(TypeId::BOOLEAN), Some("System.Boolean"));
}

#[test]
fn primitive_kinds_map_to_their_constants() {
    for kind in PrimitiveKind::ALL {
        assert_eq!(pool_kind_of(kind.type_id()), TypeKind::Primitive(kind));
    }
}

fn pool_kind_of(id: TypeId) -> TypeKind {
    TypePoolBuilder::new().finish().kind(id).clone()
}

#[test]
fn nested_types_qualify_through_declaring_type() {
    let mut b = TypePoolBuilder::new();
    let module = ModuleId::new(1);
    let outer = b.named("Outer", "App", module);
    let inner = b.nested("Inner", outer, module);
    let pool = b.finish();

    assert_eq!(pool.qualified_name(inner), Some("App.Outer/Inner"));
    assert_eq!(pool.namespace_and_name(inner), Some(("", "Inner")));
}

#[test]
fn references_resolve_through_wrappers() {
    let mut b = TypePoolBuilder::with_core_library();
    let module = ModuleId::new(1);
    let list = b.named("List`1", "App", module);
    let list_def = b.define(list, DefSpec::class(TypeId::OBJECT));
    assert!(list_def.is_ok());
    let list_of_int = b.generic_instance(list, &[TypeId::INT32]);
    let by_ref = b.by_ref(list_of_int);
    let modreq = b.modified(by_ref, ModifierKind::Required);
    let array = b.array(TypeId::INT32, 1);
    let pointer = b.pointer(TypeId::INT32);
    let pool = b.finish();

    let full_name = |id| pool.resolve(id).map(|def| def.full_name.to_string());
    assert_eq!(full_name(list_of_int).as_deref(), Some("App.List`1"));
    assert_eq!(full_name(by_ref).as_deref(), Some("App.List`1"));
    assert_eq!(full_name(modreq).as_deref(), Some("App.List`1"));
    assert_eq!(full_name(array).as_deref(), Some("System.Array"));
    assert_eq!(full_name(pointer), None);
}

#[test]
fn unresolved_named_reference_has_no_definition() {
    let mut b = TypePoolBuilder::new();
    let missing = b.named("Missing", "Nowhere", ModuleId::new(3));
    let pool = b.finish();

    assert!(pool.resolve(missing).is_none());
}

#[test]
fn duplicate_definitions_are_rejected() {
    let mut b = TypePoolBuilder::with_core_library();
    let again = b.named("Object", "System", ModuleId::CORE);

    assert_eq!(
        b.define(again, DefSpec::default()),
        Err(PoolError::DuplicateDefinition {
            name: "System.Object".to_owned()
        })
    );
}

#[test]
fn only_named_references_can_be_defined() {
    let mut b = TypePoolBuilder::new();
    let array = b.array(TypeId::INT32, 1);

    assert_eq!(
        b.define(array, DefSpec::default()),
        Err(PoolError::UnnamedDefinition { ty: array })
    );
}

#[test]
fn display_renders_structure() {
    let mut b = TypePoolBuilder::with_core_library();
    let sequence = b.lookup_type("System.Collections.Generic.IEnumerable`1");
    let Some(sequence) = sequence else {
        panic!("core library defines IEnumerable`1");
    };
    let seq_of_int = b.generic_instance(sequence, &[TypeId::INT32]);
    let matrix = b.array(TypeId::STRING, 2);
    let by_ref = b.by_ref(TypeId::INT32);
    let pinned = b.modified(TypeId::BYTE, ModifierKind::Pinned);
    let pool = b.finish();

    assert_eq!(
        pool.display(seq_of_int),
        "System.Collections.Generic.IEnumerable`1<System.Int32>"
    );
    assert_eq!(pool.display(matrix), "System.String[,]");
    assert_eq!(pool.display(by_ref), "System.Int32&");
    assert_eq!(pool.display(pinned), "System.Byte pinned");
}

#[test]
fn core_library_flags() {
    let pool = TypePoolBuilder::with_core_library().finish();

    let int32 = pool.resolve(TypeId::INT32);
    assert!(int32.is_some_and(TypeDef::is_value_type));
    let string = pool.resolve(TypeId::STRING);
    assert!(string.is_some_and(|def| !def.is_value_type()));
    assert_eq!(
        string.and_then(|def| def.base),
        Some(TypeId::OBJECT)
    );
}

#[test]
fn methods_keep_their_signature() {
    let mut b = TypePoolBuilder::with_core_library();
    let concat = b.method("Concat", TypeId::STRING, true);
    let select = b.generic_method("Select", TypeId::OBJECT, false, 2);
    let pool = b.finish();

    assert_eq!(&*pool.method(concat).name, "Concat");
    assert_eq!(pool.method(concat).declaring, TypeId::STRING);
    assert!(pool.method(concat).is_static);
    assert_eq!(pool.method(select).generic_arity, 2);
}
