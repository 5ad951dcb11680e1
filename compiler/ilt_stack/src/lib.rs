//! Stack growth guard.
//!
//! Decompiled member bodies can nest arbitrarily deep (long string
//! concatenation chains lower to left-leaning binary trees), and the rewrite
//! pass recurses once per level. Wrap each recursive step in
//! [`ensure_sufficient_stack`] and the stack is extended on the heap when it
//! runs low.
//!
//! On `wasm32` the guard is a plain call.

/// Grow when less than this much stack remains.
const MIN_REMAINING: usize = 128 * 1024;

/// Size of each freshly allocated stack segment.
const SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f`, first switching to a new stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(MIN_REMAINING, SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Bytes of stack left on the current segment, when the platform reports it.
#[cfg(not(target_arch = "wasm32"))]
pub fn remaining_stack() -> Option<usize> {
    stacker::remaining_stack()
}

#[cfg(target_arch = "wasm32")]
pub fn remaining_stack() -> Option<usize> {
    None
}
