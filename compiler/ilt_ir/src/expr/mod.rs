//! Lowered expression trees.
//!
//! One [`ExprArena`] holds the body of one translated member. Nodes are
//! addressed by [`ExprId`]; child lists (arguments, statements, array
//! elements) live in a flat side table addressed by [`ExprRange`].
//!
//! A node has exactly one parent. Rewrites never splice in place: a visit
//! returns the id that should occupy the parent's slot, and the parent
//! stores it.

mod arena;
mod format;

pub use arena::ExprArena;

use std::fmt;

use crate::{MethodId, TypeId};

/// Index into an [`ExprArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// A contiguous run of child ids in an [`ExprArena`] list table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(C)]
pub struct ExprRange {
    pub start: u32,
    pub len: u32,
}

impl ExprRange {
    pub const EMPTY: Self = Self { start: 0, len: 0 };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Debug for ExprRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExprRange({}..{})",
            self.start,
            self.start + u32::from(self.len)
        )
    }
}

/// Identity of a local, parameter or receiver within one member body.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Box<str>),
    /// A type token (`typeof(T)`).
    Type(TypeId),
}

impl Literal {
    /// Integer value of an integral literal.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    LogicalAnd,
    LogicalOr,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
}

impl BinaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::Assign => "=",
            BinaryOp::AddAssign => "+=",
            BinaryOp::SubtractAssign => "-=",
            BinaryOp::MultiplyAssign => "*=",
        }
    }

    pub const fn is_comparison(self) -> bool {
        self.inverted().is_some()
    }

    /// The comparison that holds exactly when `self` does not.
    pub const fn inverted(self) -> Option<BinaryOp> {
        match self {
            BinaryOp::Less => Some(BinaryOp::GreaterEqual),
            BinaryOp::LessEqual => Some(BinaryOp::Greater),
            BinaryOp::Greater => Some(BinaryOp::LessEqual),
            BinaryOp::GreaterEqual => Some(BinaryOp::Less),
            BinaryOp::Equal => Some(BinaryOp::NotEqual),
            BinaryOp::NotEqual => Some(BinaryOp::Equal),
            _ => None,
        }
    }

    /// `x = x op y` can be written `x op= y`.
    pub const fn compound_assign(self) -> Option<BinaryOp> {
        match self {
            BinaryOp::Add => Some(BinaryOp::AddAssign),
            BinaryOp::Subtract => Some(BinaryOp::SubtractAssign),
            BinaryOp::Multiply => Some(BinaryOp::MultiplyAssign),
            _ => None,
        }
    }

    /// `x = x op 1` can be written as a prefix step.
    pub const fn prefix_step(self) -> Option<UnaryOp> {
        match self {
            BinaryOp::Add => Some(UnaryOp::PreIncrement),
            BinaryOp::Subtract => Some(UnaryOp::PreDecrement),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UnaryOp {
    /// Truth test inserted by the decompiler around conditions.
    IsTrue,
    LogicalNot,
    Negate,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

/// What an invocation or member access refers to.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Member {
    Method(MethodId),
    /// A member known only by its emitted name (`length0`, `toString`).
    Name(Box<str>),
}

impl Member {
    pub fn named(name: &str) -> Self {
        Member::Name(name.into())
    }

    pub fn method(&self) -> Option<MethodId> {
        match self {
            Member::Method(method) => Some(*method),
            Member::Name(_) => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Constructor {
    Type(TypeId),
    /// Placeholder construction the decompiler emits for `new T { a, b }`.
    CollectionInitializer,
}

/// Runtime helpers the emitted script calls directly.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Intrinsic {
    /// `CopyMembers(source, target)`: field-wise value copy.
    CopyMembers,
}

impl Intrinsic {
    pub const fn name(self) -> &'static str {
        match self {
            Intrinsic::CopyMembers => "CopyMembers",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Variable {
        var: VarId,
        /// The method receiver (`this`).
        is_this: bool,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    /// `target.member(args)`, or a static call when `target` is `None`.
    Invocation {
        target: Option<ExprId>,
        member: Member,
        args: ExprRange,
    },
    DelegateInvocation {
        delegate: ExprId,
        method: MethodId,
        args: ExprRange,
    },
    MemberAccess {
        target: ExprId,
        member: Member,
    },
    New {
        constructor: Constructor,
        args: ExprRange,
    },
    /// Explicit dereference of a managed reference.
    Reference(ExprId),
    ArrayLiteral {
        element: TypeId,
        elements: ExprRange,
    },
    Intrinsic {
        helper: Intrinsic,
        args: ExprRange,
    },
    Block(ExprRange),
    /// Variable declaration statement; children are the initializing assignments.
    Declaration(ExprRange),
    /// A construct the emitter cannot express, kept for diagnostics.
    Untranslatable(ExprId),
}

#[cfg(test)]
mod tests;
