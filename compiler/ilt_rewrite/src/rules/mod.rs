//! Rule implementations, grouped by the node kind they match.
//!
//! Each rule inspects one node and answers a [`Step`](crate::rewriter::Step).
//! Rules allocate replacement nodes but never mutate the node they match;
//! the driver repoints the parent slot.

mod assignment;
mod invocation;
mod unary;
