#![expect(
    clippy::unwrap_used,
    reason = "fixtures unwrap core library lookups"
)]

use std::sync::Arc;
use std::thread;

use ilt_ir::{
    DefFlags, DefSpec, GenericParam, GenericParamLevel, ModifierKind, ModuleId, TypeId,
    TypePool, TypePoolBuilder, Variance,
};
use pretty_assertions::assert_eq;

use super::*;

const APP: ModuleId = ModuleId::new(1);
const OTHER: ModuleId = ModuleId::new(2);

/// A small class library on top of the core library.
struct World {
    pool: Arc<TypePool>,
    widget: TypeId,
    gadget: TypeId,
    sprocket: TypeId,
    shape: TypeId,
    point: TypeId,
    color: TypeId,
    action: TypeId,
    list: TypeId,
    list_t: TypeId,
    list_of_int: TypeId,
    list_of_string: TypeId,
    list_of_t: TypeId,
    int_vector: TypeId,
    int_matrix: TypeId,
    seq_of_int: TypeId,
    outer_inner: TypeId,
}

impl World {
    fn new() -> Self {
        let mut b = TypePoolBuilder::with_core_library();
        let value_type = b.lookup_type("System.ValueType").unwrap();
        let system_enum = b.lookup_type("System.Enum").unwrap();
        let multicast = b.lookup_type("System.MulticastDelegate").unwrap();
        let sequence = b.lookup_type(well_known::SEQUENCE).unwrap();

        let widget = b.named("Widget", "App", APP);
        let gadget = b.named("Gadget", "App", APP);
        let sprocket = b.named("Sprocket", "App", APP);
        let shape = b.named("IShape", "App", APP);
        let point = b.named("Point", "App", APP);
        let color = b.named("Color", "App", APP);
        let action = b.named("Action", "App", APP);
        let list = b.named("List`1", "App", APP);
        let list_t = b.type_param(list, 0, "T");
        let outer = b.named("Outer", "App", APP);
        let outer_inner = b.nested("Inner", outer, APP);

        b.define(widget, DefSpec::class(TypeId::OBJECT)).unwrap();
        b.define(gadget, DefSpec::class(widget).with_interfaces([shape]))
            .unwrap();
        b.define(sprocket, DefSpec::class(gadget)).unwrap();
        b.define(shape, DefSpec::default().with_flags(DefFlags::INTERFACE))
            .unwrap();
        b.define(
            point,
            DefSpec::class(value_type).with_flags(DefFlags::VALUE_TYPE | DefFlags::SEALED),
        )
        .unwrap();
        b.define(
            color,
            DefSpec {
                enum_underlying: Some(TypeId::INT32),
                ..DefSpec::class(system_enum).with_flags(DefFlags::VALUE_TYPE | DefFlags::ENUM)
            },
        )
        .unwrap();
        b.define(action, DefSpec::class(multicast)).unwrap();
        b.define(list, DefSpec::class(TypeId::OBJECT)).unwrap();
        b.define(outer, DefSpec::class(TypeId::OBJECT)).unwrap();
        b.define(outer_inner, DefSpec::class(TypeId::OBJECT)).unwrap();

        let list_of_int = b.generic_instance(list, &[TypeId::INT32]);
        let list_of_string = b.generic_instance(list, &[TypeId::STRING]);
        let list_of_t = b.generic_instance(list, &[list_t]);
        let int_vector = b.array(TypeId::INT32, 1);
        let int_matrix = b.array(TypeId::INT32, 2);
        let seq_of_int = b.generic_instance(sequence, &[TypeId::INT32]);

        World {
            pool: Arc::new(b.finish()),
            widget,
            gadget,
            sprocket,
            shape,
            point,
            color,
            action,
            list,
            list_t,
            list_of_int,
            list_of_string,
            list_of_t,
            int_vector,
            int_matrix,
            seq_of_int,
            outer_inner,
        }
    }

    fn relations(&self) -> TypeRelations {
        TypeRelations::with_fresh_cache(Arc::clone(&self.pool))
    }
}

/// Build a pool where `extend` registers more references; returns the pool
/// and whatever `extend` produced.
fn extended<T>(extend: impl FnOnce(&mut TypePoolBuilder) -> T) -> (Arc<TypePool>, T) {
    let mut b = TypePoolBuilder::with_core_library();
    let out = extend(&mut b);
    (Arc::new(b.finish()), out)
}

// === Equivalence ===

#[test]
fn separately_registered_references_are_equivalent() {
    let (pool, (a, b)) = extended(|b| {
        let a = b.named("Widget", "App", APP);
        let again = b.named("Widget", "App", APP);
        (a, again)
    });

    assert!(equivalent(&pool, a, b, true));
    assert!(equivalent(&pool, b, a, true));
}

#[test]
fn references_from_other_modules_match_through_the_definition() {
    let (pool, (local, foreign, stranger)) = extended(|b| {
        let local = b.named("Widget", "App", APP);
        b.define(local, DefSpec::class(TypeId::OBJECT)).unwrap();
        let foreign = b.named("Widget", "App", OTHER);
        let stranger = b.named("Widget", "Elsewhere", OTHER);
        (local, foreign, stranger)
    });

    assert!(equivalent(&pool, local, foreign, true));
    assert!(!equivalent(&pool, local, stranger, true));
}

#[test]
fn managed_reference_depth_must_match() {
    let (pool, (one, one_again, two)) = extended(|b| {
        let one = b.by_ref(TypeId::INT32);
        let one_again = b.by_ref(TypeId::INT32);
        let two = b.by_ref(one);
        (one, one_again, two)
    });

    assert!(equivalent(&pool, one, one_again, true));
    assert!(!equivalent(&pool, one, TypeId::INT32, false));
    assert!(!equivalent(&pool, one, two, false));
}

#[test]
fn arrays_compare_rank_and_element() {
    let world = World::new();
    let (pool, (vector, matrix, strings)) = extended(|b| {
        (
            b.array(TypeId::INT32, 1),
            b.array(TypeId::INT32, 2),
            b.array(TypeId::STRING, 1),
        )
    });

    assert!(equivalent(&pool, vector, vector, true));
    assert!(!equivalent(&pool, vector, matrix, false));
    assert!(!equivalent(&pool, vector, strings, false));
    assert!(!equivalent(&world.pool, world.int_vector, world.int_matrix, false));
}

#[test]
fn generic_parameters_match_across_related_owners() {
    let (pool, (base_t, derived_t, unrelated_t, derived_u)) = extended(|b| {
        let base = b.named("Base`1", "App", APP);
        let derived = b.named("Derived`1", "App", APP);
        let unrelated = b.named("Unrelated`1", "App", APP);
        b.define(base, DefSpec::class(TypeId::OBJECT)).unwrap();
        b.define(derived, DefSpec::class(base)).unwrap();
        b.define(unrelated, DefSpec::class(TypeId::OBJECT)).unwrap();
        (
            b.type_param(base, 0, "T"),
            b.type_param(derived, 0, "T"),
            b.type_param(unrelated, 0, "T"),
            b.type_param(derived, 1, "U"),
        )
    });

    assert!(equivalent(&pool, base_t, derived_t, true));
    assert!(equivalent(&pool, derived_t, base_t, true));
    assert!(!equivalent(&pool, base_t, unrelated_t, false));
    assert!(!equivalent(&pool, derived_t, derived_u, false));
}

#[test]
fn method_parameters_need_the_same_owner() {
    let (pool, (first, first_again, second, type_level)) = extended(|b| {
        let select = b.generic_method("Select", TypeId::OBJECT, true, 1);
        let where_ = b.generic_method("Where", TypeId::OBJECT, true, 1);
        let holder = b.named("Holder`1", "App", APP);
        (
            b.method_param(select, 0, "T"),
            b.method_param(select, 0, "T"),
            b.method_param(where_, 0, "T"),
            b.type_param(holder, 0, "T"),
        )
    });

    assert!(equivalent(&pool, first, first_again, true));
    assert!(!equivalent(&pool, first, second, true));
    assert!(!equivalent(&pool, first, type_level, false));
}

#[test]
fn unowned_parameters_compare_by_position_and_name() {
    let (pool, (a, b, c)) = extended(|b| {
        let param = |name: &str, position| GenericParam {
            owner: None,
            level: GenericParamLevel::Type,
            position,
            name: name.into(),
            variance: Variance::Invariant,
        };
        (
            b.generic_param(param("T", 0)),
            b.generic_param(param("T", 0)),
            b.generic_param(param("T", 1)),
        )
    });

    assert!(equivalent(&pool, a, b, true));
    assert!(!equivalent(&pool, a, c, true));
}

#[test]
fn loose_mode_matches_an_instance_to_its_open_definition() {
    let world = World::new();
    let pool = &world.pool;

    assert!(equivalent(pool, world.list_of_int, world.list, false));
    assert!(equivalent(pool, world.list, world.list_of_int, false));
    assert!(!equivalent(pool, world.list_of_int, world.list, true));
    assert!(!equivalent(pool, world.list_of_int, world.list_of_string, true));
    assert!(!equivalent(pool, world.list_of_int, world.list_of_t, true));
}

#[test]
fn strict_instances_compare_every_argument() {
    let (pool, (a, b, pair)) = extended(|b| {
        let list = b.named("List`1", "App", APP);
        let pair = b.named("Pair`2", "App", APP);
        let inner = b.array(TypeId::STRING, 1);
        let inner_again = b.array(TypeId::STRING, 1);
        (
            b.generic_instance(list, &[inner]),
            b.generic_instance(list, &[inner_again]),
            b.generic_instance(pair, &[inner, TypeId::INT32]),
        )
    });

    assert!(equivalent(&pool, a, b, true));
    assert!(!equivalent(&pool, a, pair, false));
}

#[test]
fn optional_and_required_modifiers_are_transparent() {
    let (pool, (modreq, modopt, pinned, pinned_again)) = extended(|b| {
        (
            b.modified(TypeId::INT32, ModifierKind::Required),
            b.modified(TypeId::INT32, ModifierKind::Optional),
            b.modified(TypeId::INT32, ModifierKind::Pinned),
            b.modified(TypeId::INT32, ModifierKind::Pinned),
        )
    });

    assert!(equivalent(&pool, modreq, TypeId::INT32, true));
    assert!(equivalent(&pool, modreq, modopt, true));
    assert!(!equivalent(&pool, pinned, TypeId::INT32, false));
    assert!(equivalent(&pool, pinned, pinned_again, true));
}

#[test]
fn pointers_compare_their_element() {
    let (pool, (int_ptr, int_ptr_again, long_ptr, fn_ptr, fn_ptr_again)) = extended(|b| {
        (
            b.pointer(TypeId::INT32),
            b.pointer(TypeId::INT32),
            b.pointer(TypeId::INT64),
            b.function_pointer(),
            b.function_pointer(),
        )
    });

    assert!(equivalent(&pool, int_ptr, int_ptr_again, true));
    assert!(!equivalent(&pool, int_ptr, long_ptr, true));
    assert!(!equivalent(&pool, int_ptr, TypeId::INT32, false));
    assert!(equivalent(&pool, fn_ptr, fn_ptr_again, true));
}

#[test]
fn nested_types_compare_their_declaring_chain() {
    let (pool, (a_inner, b_inner, a_inner_again)) = extended(|b| {
        let a = b.named("A", "App", APP);
        let other = b.named("B", "App", APP);
        let a_inner = b.nested("Inner", a, APP);
        let b_inner = b.nested("Inner", other, APP);
        let a_again = b.named("A", "App", APP);
        let a_inner_again = b.nested("Inner", a_again, APP);
        (a_inner, b_inner, a_inner_again)
    });

    assert!(!equivalent(&pool, a_inner, b_inner, true));
    assert!(equivalent(&pool, a_inner, a_inner_again, true));
}

#[test]
fn primitives_match_named_references_to_themselves() {
    let (pool, named_int) = extended(|b| b.named("Int32", "System", ModuleId::CORE));

    assert!(equivalent(&pool, named_int, TypeId::INT32, true));
    assert!(!equivalent(&pool, named_int, TypeId::INT64, true));
}

#[test]
fn optional_references() {
    let world = World::new();
    let pool = &world.pool;

    assert!(equivalent_opt(pool, None, None, true));
    assert!(!equivalent_opt(pool, Some(TypeId::INT32), None, true));
    assert!(equivalent_opt(pool, Some(world.widget), Some(world.widget), true));
}

// === Assignability ===

#[test]
fn everything_is_assignable_to_object() {
    let world = World::new();
    let relations = world.relations();
    let (pool, pointer) = extended(|b| b.pointer(TypeId::INT32));
    let pointer_relations = TypeRelations::with_fresh_cache(pool);

    for ty in [world.widget, world.point, world.int_vector, world.list_t] {
        assert!(relations.assignable(TypeId::OBJECT, ty));
    }
    assert!(pointer_relations.assignable(TypeId::OBJECT, pointer));
}

#[test]
fn derived_classes_assign_to_their_bases() {
    let world = World::new();
    let relations = world.relations();

    assert!(relations.assignable(world.widget, world.gadget));
    assert!(relations.assignable(world.widget, world.sprocket));
    assert!(!relations.assignable(world.gadget, world.widget));
    assert!(!relations.assignable(world.point, world.widget));
}

#[test]
fn implemented_interfaces_are_reached_through_bases() {
    let world = World::new();
    let relations = world.relations();

    assert!(relations.assignable(world.shape, world.gadget));
    assert!(relations.assignable(world.shape, world.sprocket));
    assert!(!relations.assignable(world.shape, world.widget));
}

#[test]
fn vectors_assign_to_sequences_of_their_element() {
    let world = World::new();
    let relations = world.relations();
    let (pool, (strings, seq_of_int)) = extended(|b| {
        let sequence = b.lookup_type(well_known::SEQUENCE).unwrap();
        (
            b.array(TypeId::STRING, 1),
            b.generic_instance(sequence, &[TypeId::INT32]),
        )
    });
    let other = TypeRelations::with_fresh_cache(pool);

    assert!(relations.assignable(world.seq_of_int, world.int_vector));
    assert!(!relations.assignable(world.seq_of_int, world.int_matrix));
    assert!(!other.assignable(seq_of_int, strings));
}

#[test]
fn arrays_of_any_rank_assign_to_system_array() {
    let world = World::new();
    let relations = world.relations();
    let system_array = world.pool.lookup_type(well_known::ARRAY).unwrap();

    assert!(relations.assignable(system_array, world.int_vector));
    assert!(relations.assignable(system_array, world.int_matrix));
    assert!(!relations.assignable(system_array, world.widget));
    assert!(!relations.assignable(world.int_vector, system_array));
}

#[test]
fn managed_references_assign_at_equal_depth() {
    let (pool, (widget_ref, widget_ref_again)) = extended(|b| {
        let widget = b.named("Widget", "App", APP);
        b.define(widget, DefSpec::class(TypeId::OBJECT)).unwrap();
        (b.by_ref(widget), b.by_ref(widget))
    });
    let relations = TypeRelations::with_fresh_cache(pool);

    assert!(relations.assignable(widget_ref, widget_ref_again));
}

#[test]
fn unresolvable_sources_are_not_assignable() {
    let (pool, (missing, pointer)) = extended(|b| {
        (b.named("Missing", "Nowhere", OTHER), b.pointer(TypeId::INT32))
    });
    let relations = TypeRelations::with_fresh_cache(pool);

    assert!(!relations.assignable(TypeId::STRING, missing));
    assert!(!relations.assignable(TypeId::STRING, pointer));
}

#[test]
fn hierarchy_walks_are_cached_by_identity_pair() {
    let world = World::new();
    let relations = world.relations();

    assert!(relations.assignable(world.widget, world.sprocket));
    assert!(relations.cache().contains_key(&(world.widget, world.sprocket)));
    assert_eq!(
        relations.cache().try_get(&(world.widget, world.sprocket)),
        Ok(Some(true))
    );

    // Fast paths never touch the cache.
    relations.assignable(TypeId::OBJECT, world.widget);
    assert!(!relations.cache().contains_key(&(TypeId::OBJECT, world.widget)));
}

#[test]
fn cyclic_hierarchies_answer_false() {
    let (pool, (a, shape)) = extended(|b| {
        let a = b.named("A", "App", APP);
        let other = b.named("B", "App", APP);
        let shape = b.named("IShape", "App", APP);
        b.define(a, DefSpec::class(other)).unwrap();
        b.define(other, DefSpec::class(a)).unwrap();
        b.define(shape, DefSpec::default().with_flags(DefFlags::INTERFACE))
            .unwrap();
        (a, shape)
    });
    let relations = TypeRelations::with_fresh_cache(pool);

    assert!(!relations.assignable(shape, a));
}

#[test]
fn concurrent_queries_share_one_answer() {
    let world = World::new();
    let relations = world.relations();

    let answers: Vec<bool> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let relations = relations.clone();
                let (shape, sprocket) = (world.shape, world.sprocket);
                s.spawn(move || relations.assignable(shape, sprocket))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(answers, vec![true; 8]);
    assert!(relations.cache().contains_key(&(world.shape, world.sprocket)));
}

// === Classification ===

#[test]
fn structs_exclude_primitives_enums_and_classes() {
    let world = World::new();
    let pool = &world.pool;
    let (nullable_pool, nullable_of_int) = extended(|b| {
        let nullable = b.lookup_type(well_known::NULLABLE).unwrap();
        b.generic_instance(nullable, &[TypeId::INT32])
    });

    assert!(classify::is_struct(pool, world.point));
    assert!(!classify::is_struct(pool, world.color));
    assert!(!classify::is_struct(pool, TypeId::INT32));
    assert!(!classify::is_struct(pool, world.widget));
    assert!(classify::is_struct(&nullable_pool, nullable_of_int));
}

#[test]
fn enums_and_primitives() {
    let world = World::new();
    let pool = &world.pool;
    let (ref_pool, bool_ref) = extended(|b| b.by_ref(TypeId::BOOLEAN));

    assert!(classify::is_enum(pool, world.color));
    assert!(classify::is_integral_or_enum(pool, world.color));
    assert!(classify::is_numeric_or_enum(pool, TypeId::DOUBLE));
    assert!(!classify::is_integral(pool, TypeId::DOUBLE));
    assert!(classify::is_integral(pool, TypeId::UINTPTR));
    assert!(!classify::is_numeric(pool, TypeId::CHAR));
    assert!(classify::is_boolean(&ref_pool, bool_ref));
    assert!(!classify::is_boolean(pool, TypeId::INT32));
}

#[test]
fn delegates_derive_from_delegate_at_any_depth() {
    let (pool, (action, retry, widget)) = extended(|b| {
        let multicast = b.lookup_type("System.MulticastDelegate").unwrap();
        let action = b.named("Action", "App", APP);
        let retry = b.named("RetryAction", "App", APP);
        let widget = b.named("Widget", "App", APP);
        b.define(action, DefSpec::class(multicast)).unwrap();
        b.define(retry, DefSpec::class(action)).unwrap();
        b.define(widget, DefSpec::class(TypeId::OBJECT)).unwrap();
        (action, retry, widget)
    });
    let relations = TypeRelations::with_fresh_cache(pool);
    let delegate = relations
        .well_known()
        .delegate_type(relations.pool())
        .unwrap();

    assert!(relations.is_delegate_type(action));
    assert!(relations.is_delegate_type(retry));
    assert!(relations.is_delegate_type(delegate));
    assert!(!relations.is_delegate_type(widget));
    assert!(!relations.is_delegate_type(TypeId::INT32));
}

#[test]
fn open_types_mention_a_parameter() {
    let world = World::new();
    let pool = &world.pool;
    let (array_pool, t_array) = extended(|b| {
        let holder = b.named("Holder`1", "App", APP);
        let t = b.type_param(holder, 0, "T");
        b.array(t, 1)
    });

    assert!(classify::is_open_type(pool, world.list_of_t));
    assert!(classify::is_open_type(pool, world.list_t));
    assert!(!classify::is_open_type(pool, world.list_of_int));
    assert!(classify::is_open_type(&array_pool, t_array));
}

#[test]
fn nullable_is_stripped_to_its_argument() {
    let world = World::new();
    let (pool, nullable_of_int) = extended(|b| {
        let nullable = b.lookup_type(well_known::NULLABLE).unwrap();
        b.generic_instance(nullable, &[TypeId::INT32])
    });

    assert_eq!(classify::strip_nullable(&pool, nullable_of_int), TypeId::INT32);
    assert_eq!(
        classify::strip_nullable(&world.pool, world.list_of_int),
        world.list_of_int
    );
}

#[test]
fn local_names_join_the_declaring_chain() {
    let world = World::new();

    assert_eq!(
        classify::local_name(&world.pool, world.outer_inner).as_deref(),
        Some("Outer_Inner")
    );
    assert_eq!(classify::local_name(&world.pool, world.int_vector), None);
}

#[test]
fn base_types_are_listed_nearest_first() {
    let world = World::new();
    let pool = &world.pool;
    let sprocket = pool.resolve_id(world.sprocket).unwrap();
    let names: Vec<&str> = classify::all_base_types_of(pool, sprocket)
        .into_iter()
        .map(|def| &*pool.def(def).full_name)
        .collect();

    assert_eq!(names, vec!["App.Gadget", "App.Widget", "System.Object"]);
}

#[test]
fn type_definitions_look_through_wrappers() {
    let (pool, (int_ref, modreq, vector, pointer)) = extended(|b| {
        let int_ref = b.by_ref(TypeId::INT32);
        (
            int_ref,
            b.modified(TypeId::STRING, ModifierKind::Required),
            b.array(TypeId::STRING, 1),
            b.pointer(TypeId::INT32),
        )
    });
    let name = |ty| type_definition(&pool, ty).map(|def| pool.def(def).full_name.to_string());

    assert_eq!(name(int_ref).as_deref(), Some("System.Int32"));
    assert_eq!(name(modreq).as_deref(), Some("System.String"));
    assert_eq!(name(vector).as_deref(), Some("System.Array"));
    assert_eq!(name(pointer), None);
    assert!(is_ignored_type(&pool, pointer));
    assert_eq!(fully_dereference(&pool, int_ref), (TypeId::INT32, 1));
    assert_eq!(dereference(&pool, pointer, true), TypeId::INT32);
    assert_eq!(dereference(&pool, pointer, false), pointer);
}
