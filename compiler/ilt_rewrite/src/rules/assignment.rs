//! Plain `=` assignments: increments, compound forms, collection
//! initializers and receiver overwrites.

use ilt_ir::{BinaryOp, Constructor, ExprId, ExprKind, Intrinsic, Literal, Member, TypeId};
use ilt_types::classify::is_struct;
use smallvec::SmallVec;

use crate::rewriter::{Rewriter, Slot, Step};
use crate::Rule;

impl Rewriter<'_> {
    pub(crate) fn rewrite_assignment(&mut self, id: ExprId, slot: Slot) -> Step {
        let ExprKind::Binary {
            op: BinaryOp::Assign,
            left: written,
            right: value,
        } = self.arena.kind(id)
        else {
            return Step::Keep;
        };
        let (written, value) = (*written, *value);
        let left = self.arena.strip_references(written);
        let right = self.arena.strip_references(value);

        if slot != Slot::Declarator && self.is_update_target(left) {
            if let Some(step) = self.fold_update(id, written, left, right) {
                return step;
            }
        }

        if let ExprKind::New {
            constructor: Constructor::CollectionInitializer,
            args,
        } = self.arena.kind(right)
        {
            let args: SmallVec<[ExprId; 4]> = SmallVec::from_slice(self.arena.list(*args));
            let items = self.arena.array_literal(TypeId::OBJECT, &args);
            let call = self
                .arena
                .invoke(Some(written), Member::named("__Initialize__"), &[items], None);
            self.fired(Rule::InitializerCall, id);
            return Step::Replace(call);
        }

        if let ExprKind::Variable { is_this: true, .. } = self.arena.kind(left) {
            let receiver_ty = self.arena.ty(left);
            let replacement = if receiver_ty.is_some_and(|ty| is_struct(self.relations.pool(), ty))
            {
                self.arena.intrinsic(Intrinsic::CopyMembers, &[value, left])
            } else {
                self.arena.untranslatable(id)
            };
            self.fired(Rule::ReceiverAssign, id);
            return Step::Replace(replacement);
        }

        Step::Keep
    }

    /// Literals, variables and member accesses can be stepped in place.
    fn is_update_target(&self, id: ExprId) -> bool {
        matches!(
            self.arena.kind(id),
            ExprKind::Literal(_) | ExprKind::Variable { .. } | ExprKind::MemberAccess { .. }
        )
    }

    /// `x = x op y` into `++x`, `--x` or `x op= y`.
    fn fold_update(
        &mut self,
        id: ExprId,
        written: ExprId,
        left: ExprId,
        right: ExprId,
    ) -> Option<Step> {
        let ExprKind::Binary {
            op,
            left: read,
            right: step,
        } = self.arena.kind(right)
        else {
            return None;
        };
        let (op, read, step) = (*op, *read, *step);
        if !self.arena.same_structure(left, read) {
            return None;
        }
        let ty = self.arena.ty(id);

        let steps_by_one = matches!(self.arena.kind(step), ExprKind::Literal(Literal::Int(1)));
        if let (Some(prefix), true) = (op.prefix_step(), steps_by_one) {
            let update = self.arena.unary(prefix, written, ty);
            self.fired(Rule::Increment, id);
            return Some(Step::Replace(update));
        }

        let compound = op.compound_assign()?;
        let update = self.arena.binary(compound, written, step, ty);
        self.fired(Rule::CompoundAssign, id);
        Some(Step::Replace(update))
    }
}
