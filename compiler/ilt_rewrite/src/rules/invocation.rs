//! Calls that the emitter writes as operators, plain members or nothing.

use ilt_ir::{BinaryOp, DefId, ExprId, ExprKind, ExprRange, Member, MethodId, TypeId};
use ilt_types::type_definition;
use smallvec::SmallVec;

use crate::rewriter::{Rewriter, Step};
use crate::Rule;

impl Rewriter<'_> {
    pub(crate) fn rewrite_invocation(&mut self, id: ExprId) -> Step {
        let ExprKind::Invocation {
            target,
            member: Member::Method(method),
            args: arg_list,
        } = self.arena.kind(id)
        else {
            return Step::Keep;
        };
        let (target, method, arg_list) = (*target, *method, *arg_list);
        let args: SmallVec<[ExprId; 4]> = SmallVec::from_slice(self.arena.list(arg_list));

        let relations = self.relations;
        let well_known = relations.well_known();
        let sig = relations.pool().method(method);
        let declaring = sig.declaring;

        match &*sig.name {
            "Concat" if self.is_string(Some(declaring)) => self.fold_concat(id, &args),
            "Invoke" => match target {
                Some(delegate) if relations.is_delegate_type(declaring) => {
                    self.delegate_invocation(id, delegate, method, arg_list)
                }
                _ => Step::Keep,
            },
            "GetTypeFromHandle"
                if args.len() == 1 && self.declared_on(declaring, well_known.system_type) =>
            {
                self.fired(Rule::TypeToken, id);
                Step::Replace(args[0])
            }
            name @ ("GetLength" | "GetUpperBound" | "GetLowerBound")
                if args.len() == 1 && self.declared_on(declaring, well_known.array) =>
            {
                self.array_bound(id, name, target, args[0])
            }
            _ => Step::Keep,
        }
    }

    /// Whether a node's expected type is `System.String`.
    pub(crate) fn is_string(&self, ty: Option<TypeId>) -> bool {
        ty.is_some_and(|ty| {
            self.relations
                .equivalent(TypeId::STRING, ty, self.options.strict_string_check)
        })
    }

    fn declared_on(&self, declaring: TypeId, expected: Option<DefId>) -> bool {
        let def = type_definition(self.relations.pool(), declaring);
        def.is_some() && def == expected
    }

    /// `String.Concat` with zero, one, two or many operands.
    ///
    /// Three or more operands fold only when every one is a string; the
    /// two-operand form converts whichever side is not.
    fn fold_concat(&mut self, id: ExprId, args: &[ExprId]) -> Step {
        let folded = match *args {
            [] => {
                self.fired(Rule::ConcatFold, id);
                return Step::Remove;
            }
            [only] => only,
            [left, right] => {
                let left = self.ensure_string(left);
                let right = self.ensure_string(right);
                self.arena
                    .binary(BinaryOp::Add, left, right, Some(TypeId::STRING))
            }
            [first, ref rest @ ..] if args.iter().all(|&arg| self.is_string(self.arena.ty(arg))) => {
                rest.iter().fold(first, |chain, &next| {
                    self.arena
                        .binary(BinaryOp::Add, chain, next, Some(TypeId::STRING))
                })
            }
            _ => return Step::Keep,
        };
        self.fired(Rule::ConcatFold, id);
        Step::Replace(folded)
    }

    fn ensure_string(&mut self, operand: ExprId) -> ExprId {
        if self.is_string(self.arena.ty(operand)) {
            return operand;
        }
        self.arena.invoke(
            Some(operand),
            Member::named("toString"),
            &[],
            Some(TypeId::STRING),
        )
    }

    fn delegate_invocation(
        &mut self,
        id: ExprId,
        delegate: ExprId,
        method: MethodId,
        args: ExprRange,
    ) -> Step {
        let ty = self.arena.ty(id);
        let call = self.arena.alloc(
            ExprKind::DelegateInvocation {
                delegate,
                method,
                args,
            },
            ty,
        );
        self.fired(Rule::DelegateInvoke, id);
        Step::Replace(call)
    }

    /// `GetLength(i)` reads the `length{i}` field the runtime keeps on
    /// multi-dimensional arrays; lower bounds are always zero.
    fn array_bound(
        &mut self,
        id: ExprId,
        name: &str,
        receiver: Option<ExprId>,
        dimension: ExprId,
    ) -> Step {
        let replacement = if name == "GetLowerBound" {
            self.arena.int(0)
        } else {
            let dimension = match self.arena.kind(dimension) {
                ExprKind::Literal(literal) => literal.as_int(),
                _ => None,
            };
            let (Some(receiver), Some(dimension)) = (receiver, dimension) else {
                return Step::Keep;
            };
            let length = self.arena.member_access(
                receiver,
                Member::Name(format!("length{dimension}").into()),
                Some(TypeId::INT32),
            );
            if name == "GetUpperBound" {
                let one = self.arena.int(1);
                self.arena
                    .binary(BinaryOp::Subtract, length, one, Some(TypeId::INT32))
            } else {
                length
            }
        };
        self.fired(Rule::ArrayBound, id);
        Step::Replace(replacement)
    }
}
