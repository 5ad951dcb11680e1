use std::fmt::Write;

use super::{Constructor, ExprArena, ExprId, ExprKind, ExprRange, Literal, Member, UnaryOp};
use crate::TypePool;

impl ExprArena {
    /// Compact source-like rendering for logs and test assertions.
    ///
    /// Binary nodes are fully parenthesized: `(("a" + "b") + "c")`.
    pub fn render(&self, pool: &TypePool, id: ExprId) -> String {
        let mut out = String::new();
        Renderer { arena: self, pool }.expr(&mut out, id);
        out
    }
}

struct Renderer<'a> {
    arena: &'a ExprArena,
    pool: &'a TypePool,
}

impl Renderer<'_> {
    fn expr(&self, out: &mut String, id: ExprId) {
        match self.arena.kind(id) {
            ExprKind::Literal(literal) => self.literal(out, literal),
            ExprKind::Variable { is_this: true, .. } => out.push_str("this"),
            ExprKind::Variable { var, .. } => {
                let _ = write!(out, "v{}", var.raw());
            }
            ExprKind::Binary { op, left, right } => {
                out.push('(');
                self.expr(out, *left);
                let _ = write!(out, " {} ", op.symbol());
                self.expr(out, *right);
                out.push(')');
            }
            ExprKind::Unary { op, operand } => {
                let (prefix, suffix) = match op {
                    UnaryOp::IsTrue => ("istrue(", ")"),
                    UnaryOp::LogicalNot => ("!", ""),
                    UnaryOp::Negate => ("-", ""),
                    UnaryOp::BitNot => ("~", ""),
                    UnaryOp::PreIncrement => ("++", ""),
                    UnaryOp::PreDecrement => ("--", ""),
                    UnaryOp::PostIncrement => ("", "++"),
                    UnaryOp::PostDecrement => ("", "--"),
                };
                out.push_str(prefix);
                self.expr(out, *operand);
                out.push_str(suffix);
            }
            ExprKind::Invocation {
                target,
                member,
                args,
            } => {
                match (target, member) {
                    (Some(target), _) => {
                        self.expr(out, *target);
                        out.push('.');
                        self.member_name(out, member);
                    }
                    (None, Member::Method(method)) => {
                        let sig = self.pool.method(*method);
                        let _ = write!(out, "{}::{}", self.pool.display(sig.declaring), sig.name);
                    }
                    (None, Member::Name(name)) => out.push_str(name),
                }
                self.args(out, *args);
            }
            ExprKind::DelegateInvocation { delegate, args, .. } => {
                out.push_str("delegate ");
                self.expr(out, *delegate);
                self.args(out, *args);
            }
            ExprKind::MemberAccess { target, member } => {
                self.expr(out, *target);
                out.push('.');
                self.member_name(out, member);
            }
            ExprKind::New { constructor, args } => {
                out.push_str("new ");
                match constructor {
                    Constructor::Type(ty) => out.push_str(&self.pool.display(*ty)),
                    Constructor::CollectionInitializer => out.push_str("{init}"),
                }
                self.args(out, *args);
            }
            ExprKind::Reference(inner) => {
                out.push_str("ref ");
                self.expr(out, *inner);
            }
            ExprKind::ArrayLiteral { elements, .. } => {
                out.push('[');
                self.list(out, *elements, ", ");
                out.push(']');
            }
            ExprKind::Intrinsic { helper, args } => {
                out.push_str(helper.name());
                self.args(out, *args);
            }
            ExprKind::Block(statements) => {
                out.push_str("{ ");
                self.list(out, *statements, "; ");
                out.push_str(" }");
            }
            ExprKind::Declaration(declarators) => {
                out.push_str("var ");
                self.list(out, *declarators, ", ");
            }
            ExprKind::Untranslatable(original) => {
                out.push_str("untranslatable(");
                self.expr(out, *original);
                out.push(')');
            }
        }
    }

    fn literal(&self, out: &mut String, literal: &Literal) {
        let _ = match literal {
            Literal::Null => write!(out, "null"),
            Literal::Bool(value) => write!(out, "{value}"),
            Literal::Int(value) => write!(out, "{value}"),
            Literal::Float(value) => write!(out, "{value:?}"),
            Literal::String(value) => write!(out, "{value:?}"),
            Literal::Type(ty) => write!(out, "typeof({})", self.pool.display(*ty)),
        };
    }

    fn member_name(&self, out: &mut String, member: &Member) {
        match member {
            Member::Method(method) => out.push_str(&self.pool.method(*method).name),
            Member::Name(name) => out.push_str(name),
        }
    }

    fn args(&self, out: &mut String, args: ExprRange) {
        out.push('(');
        self.list(out, args, ", ");
        out.push(')');
    }

    fn list(&self, out: &mut String, range: ExprRange, separator: &str) {
        for (i, id) in self.arena.list(range).iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            self.expr(out, *id);
        }
    }
}
