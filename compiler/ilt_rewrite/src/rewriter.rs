//! Traversal driver: per-slot trampoline and child repointing.

use ilt_ir::{BinaryOp, ExprArena, ExprId, ExprKind, ExprRange};
use ilt_stack::ensure_sufficient_stack;
use ilt_types::TypeRelations;
use smallvec::SmallVec;

use crate::{RewriteOptions, RewriteStats, Rule};

/// Where a node sits, as far as the rules care.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Slot {
    /// The member body itself.
    Root,
    /// An entry of a block.
    Statement,
    /// A declarator of a variable declaration statement.
    Declarator,
    /// Any other child position.
    Operand,
}

/// What a rule decided for the node in a slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Step {
    Keep,
    Replace(ExprId),
    /// The node evaluates to nothing and leaves its slot.
    Remove,
}

pub(crate) struct Rewriter<'a> {
    pub(crate) arena: &'a mut ExprArena,
    pub(crate) relations: &'a TypeRelations,
    pub(crate) options: RewriteOptions,
    stats: RewriteStats,
}

impl<'a> Rewriter<'a> {
    pub(crate) fn new(
        arena: &'a mut ExprArena,
        relations: &'a TypeRelations,
        options: RewriteOptions,
    ) -> Self {
        Rewriter {
            arena,
            relations,
            options,
            stats: RewriteStats::default(),
        }
    }

    pub(crate) fn finish(self) -> RewriteStats {
        self.stats
    }

    pub(crate) fn rewrite_root(&mut self, root: ExprId) -> Option<ExprId> {
        self.visit(root, Slot::Root)
    }

    pub(crate) fn fired(&mut self, rule: Rule, node: ExprId) {
        tracing::trace!(rule = rule.name(), ?node, "rewrite rule fired");
        self.stats.record(rule);
    }

    /// Settle the node occupying one slot, then visit its children.
    ///
    /// A fold below can expose a pattern at this node (`x = Concat(x, y)`
    /// becomes `x = x + y`), so a node whose children changed is matched
    /// once more. Returns `None` when the node was removed.
    fn visit(&mut self, mut id: ExprId, slot: Slot) -> Option<ExprId> {
        loop {
            loop {
                match self.apply_rules(id, slot) {
                    Step::Keep => break,
                    Step::Replace(next) => id = next,
                    Step::Remove => return None,
                }
            }
            if !ensure_sufficient_stack(|| self.visit_children(id)) {
                return Some(id);
            }
            match self.apply_rules(id, slot) {
                Step::Keep => return Some(id),
                Step::Replace(next) => id = next,
                Step::Remove => return None,
            }
        }
    }

    /// A slot that must stay filled. A removed node leaves the empty string,
    /// which is what a zero-argument concatenation evaluates to. Block and
    /// declaration entries go through [`visit_statements`](Self::visit_statements)
    /// instead and are dropped.
    fn visit_operand(&mut self, id: ExprId) -> ExprId {
        match self.visit(id, Slot::Operand) {
            Some(id) => id,
            None => self.arena.string(""),
        }
    }

    fn apply_rules(&mut self, id: ExprId, slot: Slot) -> Step {
        match self.arena.kind(id) {
            ExprKind::Invocation { .. } => self.rewrite_invocation(id),
            ExprKind::Unary { .. } => self.rewrite_unary(id),
            ExprKind::Binary {
                op: BinaryOp::Assign,
                ..
            } => self.rewrite_assignment(id, slot),
            _ => Step::Keep,
        }
    }

    /// Visit every child slot of `id`, repointing slots whose node was
    /// replaced. Returns whether any slot changed.
    fn visit_children(&mut self, id: ExprId) -> bool {
        match self.arena.kind(id) {
            // Untranslatable keeps its original subtree verbatim for diagnostics.
            ExprKind::Literal(_) | ExprKind::Variable { .. } | ExprKind::Untranslatable(_) => {
                false
            }
            ExprKind::Binary { left, right, .. } => {
                let (old_left, old_right) = (*left, *right);
                let left = self.visit_operand(old_left);
                let right = self.visit_operand(old_right);
                if let ExprKind::Binary {
                    left: left_slot,
                    right: right_slot,
                    ..
                } = self.arena.kind_mut(id)
                {
                    *left_slot = left;
                    *right_slot = right;
                }
                left != old_left || right != old_right
            }
            ExprKind::Unary { operand: child, .. }
            | ExprKind::MemberAccess { target: child, .. }
            | ExprKind::Reference(child) => {
                let old = *child;
                let child = self.visit_operand(old);
                match self.arena.kind_mut(id) {
                    ExprKind::Unary { operand: slot, .. }
                    | ExprKind::MemberAccess { target: slot, .. }
                    | ExprKind::Reference(slot) => *slot = child,
                    _ => {}
                }
                child != old
            }
            ExprKind::Invocation { target, args, .. } => {
                let (target, args) = (*target, *args);
                let mut changed = false;
                if let Some(old) = target {
                    let target = self.visit_operand(old);
                    if let ExprKind::Invocation {
                        target: Some(slot), ..
                    } = self.arena.kind_mut(id)
                    {
                        *slot = target;
                    }
                    changed = target != old;
                }
                self.visit_operands(args) || changed
            }
            ExprKind::DelegateInvocation { delegate, args, .. } => {
                let (old, args) = (*delegate, *args);
                let delegate = self.visit_operand(old);
                if let ExprKind::DelegateInvocation { delegate: slot, .. } =
                    self.arena.kind_mut(id)
                {
                    *slot = delegate;
                }
                self.visit_operands(args) || delegate != old
            }
            ExprKind::New { args: list, .. }
            | ExprKind::ArrayLiteral { elements: list, .. }
            | ExprKind::Intrinsic { args: list, .. } => {
                let list = *list;
                self.visit_operands(list)
            }
            ExprKind::Block(list) => {
                let list = *list;
                let (changed, shrunk) = self.visit_statements(list, Slot::Statement);
                if let Some(list) = shrunk {
                    *self.arena.kind_mut(id) = ExprKind::Block(list);
                }
                changed
            }
            ExprKind::Declaration(list) => {
                let list = *list;
                let (changed, shrunk) = self.visit_statements(list, Slot::Declarator);
                if let Some(list) = shrunk {
                    *self.arena.kind_mut(id) = ExprKind::Declaration(list);
                }
                changed
            }
        }
    }

    fn visit_operands(&mut self, list: ExprRange) -> bool {
        let mut changed = false;
        for index in 0..list.len() {
            let old = self.arena.list(list)[index];
            let child = self.visit_operand(old);
            self.arena.list_mut(list)[index] = child;
            changed |= child != old;
        }
        changed
    }

    /// Visit a statement list in place. Returns whether any entry changed,
    /// plus a fresh list when entries were removed.
    fn visit_statements(&mut self, list: ExprRange, slot: Slot) -> (bool, Option<ExprRange>) {
        let mut kept: SmallVec<[ExprId; 8]> = SmallVec::with_capacity(list.len());
        let mut changed = false;
        for index in 0..list.len() {
            let old = self.arena.list(list)[index];
            match self.visit(old, slot) {
                Some(child) => {
                    self.arena.list_mut(list)[index] = child;
                    kept.push(child);
                    changed |= child != old;
                }
                None => changed = true,
            }
        }
        let shrunk = (kept.len() != list.len()).then(|| self.arena.alloc_list(&kept));
        (changed, shrunk)
    }
}
