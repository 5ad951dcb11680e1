//! Struct-of-arrays storage for one member body.

use smallvec::SmallVec;

use super::{
    BinaryOp, Constructor, ExprId, ExprKind, ExprRange, Intrinsic, Literal, Member, UnaryOp,
    VarId,
};
use crate::{MethodId, TypeId};

fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("expression arena exceeded u32::MAX {what}"))
}

/// Arena for one member body's expressions.
///
/// # Index Spaces
///
/// - `kinds`/`types`: parallel arrays indexed by [`ExprId`]
/// - `lists`: flat `Vec<ExprId>` indexed by [`ExprRange`]
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    kinds: Vec<ExprKind>,
    /// Statically expected type per node, when the decompiler knew it.
    types: Vec<Option<TypeId>>,
    lists: Vec<ExprId>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            kinds: Vec::with_capacity(nodes),
            types: Vec::with_capacity(nodes),
            lists: Vec::with_capacity(nodes),
        }
    }

    /// Allocate a node, returning its id.
    pub fn alloc(&mut self, kind: ExprKind, ty: Option<TypeId>) -> ExprId {
        let id = ExprId::new(to_u32(self.kinds.len(), "expressions"));
        self.kinds.push(kind);
        self.types.push(ty);
        id
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.kinds[id.index()]
    }

    /// Mutable access for repointing a parent's child slots.
    #[inline]
    pub fn kind_mut(&mut self, id: ExprId) -> &mut ExprKind {
        &mut self.kinds[id.index()]
    }

    /// The statically expected type of a node.
    #[inline]
    pub fn ty(&self, id: ExprId) -> Option<TypeId> {
        self.types[id.index()]
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Allocate a child list.
    pub fn alloc_list(&mut self, ids: &[ExprId]) -> ExprRange {
        if ids.is_empty() {
            return ExprRange::EMPTY;
        }
        let start = to_u32(self.lists.len(), "list entries");
        self.lists.extend_from_slice(ids);
        ExprRange::new(start, to_u32(ids.len(), "list entries"))
    }

    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        if range.is_empty() {
            return &[];
        }
        let start = range.start as usize;
        &self.lists[start..start + range.len()]
    }

    pub fn list_mut(&mut self, range: ExprRange) -> &mut [ExprId] {
        if range.is_empty() {
            return &mut [];
        }
        let start = range.start as usize;
        &mut self.lists[start..start + range.len()]
    }

    // Constructors used by the decompiler front end and by rewrite rules.

    pub fn literal(&mut self, literal: Literal, ty: Option<TypeId>) -> ExprId {
        self.alloc(ExprKind::Literal(literal), ty)
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        self.alloc(
            ExprKind::Literal(Literal::String(value.into())),
            Some(TypeId::STRING),
        )
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.alloc(ExprKind::Literal(Literal::Int(value)), Some(TypeId::INT32))
    }

    pub fn variable(&mut self, var: VarId, ty: Option<TypeId>) -> ExprId {
        self.alloc(ExprKind::Variable { var, is_this: false }, ty)
    }

    pub fn this(&mut self, var: VarId, ty: Option<TypeId>) -> ExprId {
        self.alloc(ExprKind::Variable { var, is_this: true }, ty)
    }

    pub fn binary(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        ty: Option<TypeId>,
    ) -> ExprId {
        self.alloc(ExprKind::Binary { op, left, right }, ty)
    }

    /// `left = right`, typed as the left side.
    pub fn assign(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let ty = self.ty(left);
        self.binary(BinaryOp::Assign, left, right, ty)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId, ty: Option<TypeId>) -> ExprId {
        self.alloc(ExprKind::Unary { op, operand }, ty)
    }

    pub fn invoke(
        &mut self,
        target: Option<ExprId>,
        member: Member,
        args: &[ExprId],
        ty: Option<TypeId>,
    ) -> ExprId {
        let args = self.alloc_list(args);
        self.alloc(
            ExprKind::Invocation {
                target,
                member,
                args,
            },
            ty,
        )
    }

    pub fn call(&mut self, method: MethodId, args: &[ExprId], ty: Option<TypeId>) -> ExprId {
        self.invoke(None, Member::Method(method), args, ty)
    }

    pub fn member_access(&mut self, target: ExprId, member: Member, ty: Option<TypeId>) -> ExprId {
        self.alloc(ExprKind::MemberAccess { target, member }, ty)
    }

    pub fn new_object(
        &mut self,
        constructor: Constructor,
        args: &[ExprId],
        ty: Option<TypeId>,
    ) -> ExprId {
        let args = self.alloc_list(args);
        self.alloc(ExprKind::New { constructor, args }, ty)
    }

    pub fn reference(&mut self, inner: ExprId) -> ExprId {
        let ty = self.ty(inner);
        self.alloc(ExprKind::Reference(inner), ty)
    }

    pub fn array_literal(&mut self, element: TypeId, elements: &[ExprId]) -> ExprId {
        let elements = self.alloc_list(elements);
        self.alloc(ExprKind::ArrayLiteral { element, elements }, None)
    }

    pub fn intrinsic(&mut self, helper: Intrinsic, args: &[ExprId]) -> ExprId {
        let args = self.alloc_list(args);
        self.alloc(ExprKind::Intrinsic { helper, args }, None)
    }

    pub fn block(&mut self, statements: &[ExprId]) -> ExprId {
        let statements = self.alloc_list(statements);
        self.alloc(ExprKind::Block(statements), None)
    }

    pub fn declaration(&mut self, declarators: &[ExprId]) -> ExprId {
        let declarators = self.alloc_list(declarators);
        self.alloc(ExprKind::Declaration(declarators), None)
    }

    pub fn untranslatable(&mut self, original: ExprId) -> ExprId {
        let ty = self.ty(original);
        self.alloc(ExprKind::Untranslatable(original), ty)
    }

    /// Direct children in evaluation order.
    pub fn children(&self, id: ExprId) -> SmallVec<[ExprId; 4]> {
        let mut out = SmallVec::new();
        match self.kind(id) {
            ExprKind::Literal(_) | ExprKind::Variable { .. } => {}
            ExprKind::Binary { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            ExprKind::Unary { operand: inner, .. }
            | ExprKind::MemberAccess { target: inner, .. }
            | ExprKind::Reference(inner)
            | ExprKind::Untranslatable(inner) => out.push(*inner),
            ExprKind::Invocation { target, args, .. } => {
                out.extend(*target);
                out.extend_from_slice(self.list(*args));
            }
            ExprKind::DelegateInvocation { delegate, args, .. } => {
                out.push(*delegate);
                out.extend_from_slice(self.list(*args));
            }
            ExprKind::New { args: list, .. }
            | ExprKind::ArrayLiteral { elements: list, .. }
            | ExprKind::Intrinsic { args: list, .. }
            | ExprKind::Block(list)
            | ExprKind::Declaration(list) => out.extend_from_slice(self.list(*list)),
        }
        out
    }

    /// Number of nodes reachable from `root`, including it.
    pub fn subtree_len(&self, root: ExprId) -> usize {
        let mut count = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend(self.children(id));
        }
        count
    }

    /// Peel explicit dereference wrappers.
    pub fn strip_references(&self, mut id: ExprId) -> ExprId {
        while let ExprKind::Reference(inner) = self.kind(id) {
            id = *inner;
        }
        id
    }

    /// Whether two subtrees denote the same expression, ignoring node
    /// identity and explicit dereference wrappers at every level.
    pub fn same_structure(&self, a: ExprId, b: ExprId) -> bool {
        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            let a = self.strip_references(a);
            let b = self.strip_references(b);
            if a == b {
                continue;
            }
            let shallow = match (self.kind(a), self.kind(b)) {
                (ExprKind::Literal(x), ExprKind::Literal(y)) => x == y,
                (
                    ExprKind::Variable { var: x, is_this: tx },
                    ExprKind::Variable { var: y, is_this: ty },
                ) => x == y && tx == ty,
                (ExprKind::Binary { op: x, .. }, ExprKind::Binary { op: y, .. }) => x == y,
                (ExprKind::Unary { op: x, .. }, ExprKind::Unary { op: y, .. }) => x == y,
                (
                    ExprKind::Invocation {
                        target: tx,
                        member: x,
                        ..
                    },
                    ExprKind::Invocation {
                        target: ty,
                        member: y,
                        ..
                    },
                ) => x == y && tx.is_some() == ty.is_some(),
                (
                    ExprKind::DelegateInvocation { method: x, .. },
                    ExprKind::DelegateInvocation { method: y, .. },
                ) => x == y,
                (
                    ExprKind::MemberAccess { member: x, .. },
                    ExprKind::MemberAccess { member: y, .. },
                ) => x == y,
                (
                    ExprKind::New { constructor: x, .. },
                    ExprKind::New { constructor: y, .. },
                ) => x == y,
                (
                    ExprKind::ArrayLiteral { element: x, .. },
                    ExprKind::ArrayLiteral { element: y, .. },
                ) => x == y,
                (ExprKind::Intrinsic { helper: x, .. }, ExprKind::Intrinsic { helper: y, .. }) => {
                    x == y
                }
                (ExprKind::Block(_), ExprKind::Block(_))
                | (ExprKind::Declaration(_), ExprKind::Declaration(_))
                | (ExprKind::Untranslatable(_), ExprKind::Untranslatable(_)) => true,
                _ => false,
            };
            if !shallow {
                return false;
            }
            let left = self.children(a);
            let right = self.children(b);
            if left.len() != right.len() {
                return false;
            }
            pending.extend(left.into_iter().zip(right));
        }
        true
    }
}
