//! Boolean unary folds.

use ilt_ir::{ExprId, ExprKind, UnaryOp};
use ilt_types::classify::is_boolean;

use crate::rewriter::{Rewriter, Step};
use crate::Rule;

impl Rewriter<'_> {
    pub(crate) fn rewrite_unary(&mut self, id: ExprId) -> Step {
        let ExprKind::Unary { op, operand } = self.arena.kind(id) else {
            return Step::Keep;
        };
        let (op, operand) = (*op, *operand);

        // Untyped truth tests inherit the type of what they test.
        let expected = self.arena.ty(id).or_else(|| self.arena.ty(operand));
        if !expected.is_some_and(|ty| is_boolean(self.relations.pool(), ty)) {
            return Step::Keep;
        }

        match op {
            UnaryOp::IsTrue => {
                self.fired(Rule::TruthTest, id);
                Step::Replace(operand)
            }
            UnaryOp::LogicalNot => self.fold_negation(id, operand),
            _ => Step::Keep,
        }
    }

    fn fold_negation(&mut self, id: ExprId, operand: ExprId) -> Step {
        match self.arena.kind(operand) {
            ExprKind::Binary { op, left, right } => {
                let Some(inverted) = op.inverted() else {
                    return Step::Keep;
                };
                let (left, right) = (*left, *right);
                let ty = self.arena.ty(operand);
                let comparison = self.arena.binary(inverted, left, right, ty);
                self.fired(Rule::InvertedComparison, id);
                Step::Replace(comparison)
            }
            ExprKind::Unary {
                op: UnaryOp::LogicalNot,
                operand: inner,
            } => {
                let inner = *inner;
                self.fired(Rule::DoubleNegation, id);
                Step::Replace(inner)
            }
            _ => Step::Keep,
        }
    }
}
