use pretty_assertions::assert_eq;

use super::*;
use crate::{TypePool, TypePoolBuilder};

fn pool() -> TypePool {
    TypePoolBuilder::with_core_library().finish()
}

#[test]
fn alloc_keeps_kind_and_type_in_step() {
    let mut arena = ExprArena::new();
    let a = arena.int(1);
    let s = arena.string("x");
    let v = arena.variable(VarId::new(0), None);

    assert_eq!(arena.len(), 3);
    assert_eq!(arena.ty(a), Some(TypeId::INT32));
    assert_eq!(arena.ty(s), Some(TypeId::STRING));
    assert_eq!(arena.ty(v), None);
    assert_eq!(arena.kind(a), &ExprKind::Literal(Literal::Int(1)));
}

#[test]
fn empty_lists_share_the_empty_range() {
    let mut arena = ExprArena::new();
    let range = arena.alloc_list(&[]);

    assert_eq!(range, ExprRange::EMPTY);
    assert!(arena.list(range).is_empty());
}

#[test]
fn lists_hold_more_than_u16_entries() {
    let mut arena = ExprArena::new();
    let statements: Vec<ExprId> = (0..70_000).map(|n| arena.int(n)).collect();

    let block = arena.block(&statements);

    let ExprKind::Block(range) = *arena.kind(block) else {
        panic!("expected block");
    };
    assert_eq!(range.len(), 70_000);
    assert_eq!(arena.list(range).last(), statements.last());
    assert_eq!(arena.children(block).len(), 70_000);
}

#[test]
fn list_mut_repoints_children() {
    let mut arena = ExprArena::new();
    let a = arena.int(1);
    let b = arena.int(2);
    let block = arena.block(&[a]);
    let ExprKind::Block(statements) = *arena.kind(block) else {
        panic!("expected block");
    };

    arena.list_mut(statements)[0] = b;

    assert_eq!(arena.list(statements), &[b]);
    assert_eq!(arena.children(block).as_slice(), &[b]);
}

#[test]
fn children_include_invocation_target_first() {
    let mut arena = ExprArena::new();
    let receiver = arena.variable(VarId::new(1), None);
    let arg = arena.int(3);
    let call = arena.invoke(Some(receiver), Member::named("f"), &[arg], None);

    assert_eq!(arena.children(call).as_slice(), &[receiver, arg]);
    assert_eq!(arena.subtree_len(call), 3);
}

#[test]
fn strip_references_peels_nested_wrappers() {
    let mut arena = ExprArena::new();
    let x = arena.variable(VarId::new(7), Some(TypeId::INT32));
    let once = arena.reference(x);
    let twice = arena.reference(once);

    assert_eq!(arena.strip_references(twice), x);
    assert_eq!(arena.ty(twice), Some(TypeId::INT32));
}

#[test]
fn same_structure_ignores_node_identity_and_references() {
    let mut arena = ExprArena::new();
    let this_a = arena.this(VarId::new(0), None);
    let field_a = arena.member_access(this_a, Member::named("count"), None);
    let this_b = arena.this(VarId::new(0), None);
    let wrapped = arena.reference(this_b);
    let field_b = arena.member_access(wrapped, Member::named("count"), None);
    let field_b = arena.reference(field_b);

    assert!(arena.same_structure(field_a, field_b));
}

#[test]
fn same_structure_distinguishes_variables_and_members() {
    let mut arena = ExprArena::new();
    let x = arena.variable(VarId::new(0), None);
    let y = arena.variable(VarId::new(1), None);
    let x_len = arena.member_access(x, Member::named("length"), None);
    let x_count = arena.member_access(x, Member::named("count"), None);
    let one = arena.int(1);
    let one_float = arena.literal(Literal::Float(1.0), None);

    assert!(!arena.same_structure(x, y));
    assert!(!arena.same_structure(x_len, x_count));
    assert!(!arena.same_structure(one, one_float));
}

#[test]
fn binary_op_tables() {
    assert_eq!(BinaryOp::Less.inverted(), Some(BinaryOp::GreaterEqual));
    assert_eq!(BinaryOp::LessEqual.inverted(), Some(BinaryOp::Greater));
    assert_eq!(BinaryOp::Equal.inverted(), Some(BinaryOp::NotEqual));
    assert_eq!(BinaryOp::Add.inverted(), None);
    assert!(!BinaryOp::Assign.is_comparison());

    assert_eq!(BinaryOp::Multiply.compound_assign(), Some(BinaryOp::MultiplyAssign));
    assert_eq!(BinaryOp::Divide.compound_assign(), None);
    assert_eq!(BinaryOp::Subtract.prefix_step(), Some(UnaryOp::PreDecrement));
    assert_eq!(BinaryOp::Multiply.prefix_step(), None);
}

#[test]
fn render_is_fully_parenthesized() {
    let pool = pool();
    let mut arena = ExprArena::new();
    let a = arena.string("a");
    let b = arena.string("b");
    let c = arena.string("c");
    let ab = arena.binary(BinaryOp::Add, a, b, Some(TypeId::STRING));
    let abc = arena.binary(BinaryOp::Add, ab, c, Some(TypeId::STRING));

    assert_eq!(arena.render(&pool, abc), r#"(("a" + "b") + "c")"#);
}

#[test]
fn render_statements() {
    let mut builder = TypePoolBuilder::with_core_library();
    let concat = builder.method("Concat", TypeId::STRING, true);
    let pool = builder.finish();

    let mut arena = ExprArena::new();
    let x = arena.variable(VarId::new(2), Some(TypeId::INT32));
    let inc = arena.unary(UnaryOp::PreIncrement, x, Some(TypeId::INT32));
    let s = arena.string("s");
    let call = arena.call(concat, &[s], Some(TypeId::STRING));
    let this = arena.this(VarId::new(0), None);
    let copy = arena.intrinsic(Intrinsic::CopyMembers, &[x, this]);
    let block = arena.block(&[inc, call, copy]);

    assert_eq!(
        arena.render(&pool, block),
        r#"{ ++v2; System.String::Concat("s"); CopyMembers(v2, this) }"#
    );
}
