//! Operator simplification over lowered member bodies.
//!
//! The decompiler lowers everything to calls and plain assignments:
//! `String.Concat(a, b)`, `Delegate.Invoke(...)`, `x = x + 1`. This pass
//! recognizes those shapes and folds them into the forms a script emitter
//! writes directly (`a + b`, `d(...)`, `++x`).
//!
//! # Traversal
//!
//! Pre-order and depth-first. Every child slot runs a small trampoline: when
//! a rule replaces the node in that slot, the replacement is matched again
//! before its children are visited, so folds compose (a concatenation fold
//! that exposes `x = x + y` becomes `x += y` in the same pass). Every rule
//! produces a node that is strictly closer to a fixed point, so the loop
//! terminates.
//!
//! # Rules
//!
//! | [`Rule`] | Folds |
//! |---|---|
//! | `ConcatFold` | `String.Concat(a, b, ...)` into a `+` chain |
//! | `DelegateInvoke` | `d.Invoke(args)` into a direct delegate call |
//! | `TypeToken` | `Type.GetTypeFromHandle(t)` into `t` |
//! | `ArrayBound` | `a.GetLength(i)`, `GetUpperBound`, `GetLowerBound` |
//! | `TruthTest` | boolean `istrue(x)` into `x` |
//! | `InvertedComparison` | `!(a < b)` into `a >= b` |
//! | `DoubleNegation` | `!!x` into `x` |
//! | `Increment` | `x = x + 1` into `++x` |
//! | `CompoundAssign` | `x = x * y` into `x *= y` |
//! | `InitializerCall` | collection-initializer construction into `__Initialize__` |
//! | `ReceiverAssign` | `this = v` into a member copy, or an untranslatable marker |

mod rewriter;
mod rules;

use ilt_ir::{ExprArena, ExprId};
use ilt_types::TypeRelations;

use crate::rewriter::Rewriter;

/// Tunable rule decisions.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RewriteOptions {
    /// Test `String.Concat` operands against `System.String` with strict
    /// equivalence. With loose equivalence an operand typed as an open
    /// generic shape can pass for a string.
    pub strict_string_check: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        RewriteOptions {
            strict_string_check: true,
        }
    }
}

/// A fold performed by the pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Rule {
    ConcatFold,
    DelegateInvoke,
    TypeToken,
    ArrayBound,
    TruthTest,
    InvertedComparison,
    DoubleNegation,
    Increment,
    CompoundAssign,
    InitializerCall,
    ReceiverAssign,
}

impl Rule {
    pub const ALL: [Rule; 11] = [
        Rule::ConcatFold,
        Rule::DelegateInvoke,
        Rule::TypeToken,
        Rule::ArrayBound,
        Rule::TruthTest,
        Rule::InvertedComparison,
        Rule::DoubleNegation,
        Rule::Increment,
        Rule::CompoundAssign,
        Rule::InitializerCall,
        Rule::ReceiverAssign,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Rule::ConcatFold => "concat-fold",
            Rule::DelegateInvoke => "delegate-invoke",
            Rule::TypeToken => "type-token",
            Rule::ArrayBound => "array-bound",
            Rule::TruthTest => "truth-test",
            Rule::InvertedComparison => "inverted-comparison",
            Rule::DoubleNegation => "double-negation",
            Rule::Increment => "increment",
            Rule::CompoundAssign => "compound-assign",
            Rule::InitializerCall => "initializer-call",
            Rule::ReceiverAssign => "receiver-assign",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// How often each rule fired.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RewriteStats {
    fired: [u32; Rule::ALL.len()],
}

impl RewriteStats {
    pub fn get(&self, rule: Rule) -> u32 {
        self.fired[rule.index()]
    }

    pub fn total(&self) -> u32 {
        self.fired.iter().sum()
    }

    /// Add another member's counts into these.
    pub fn merge(&mut self, other: &RewriteStats) {
        for (mine, theirs) in self.fired.iter_mut().zip(other.fired) {
            *mine += theirs;
        }
    }

    /// Rules that fired at least once, with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (Rule, u32)> + '_ {
        Rule::ALL
            .into_iter()
            .map(|rule| (rule, self.get(rule)))
            .filter(|&(_, count)| count > 0)
    }

    pub(crate) fn record(&mut self, rule: Rule) {
        self.fired[rule.index()] += 1;
    }
}

/// Result of rewriting one member body.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RewriteOutput {
    /// The new root. `None` when the whole body folded away (a
    /// zero-argument concatenation at the root).
    pub root: Option<ExprId>,
    pub stats: RewriteStats,
}

/// Rewrite one member body with default options.
pub fn rewrite(arena: &mut ExprArena, root: ExprId, relations: &TypeRelations) -> RewriteOutput {
    rewrite_with(arena, root, relations, RewriteOptions::default())
}

/// Rewrite one member body.
///
/// Discarded nodes stay in the arena but are unreachable from the returned
/// root.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = arena.len()))]
pub fn rewrite_with(
    arena: &mut ExprArena,
    root: ExprId,
    relations: &TypeRelations,
    options: RewriteOptions,
) -> RewriteOutput {
    let mut rewriter = Rewriter::new(arena, relations, options);
    let root = rewriter.rewrite_root(root);
    let stats = rewriter.finish();
    tracing::debug!(fired = stats.total(), "member rewritten");
    RewriteOutput { root, stats }
}
