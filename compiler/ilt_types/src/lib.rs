//! Type relations for the ilt translator.
//!
//! - [`equivalent`]: do two references denote the same type?
//! - [`TypeRelations::assignable`]: can a `source` value be stored in a
//!   `target` slot? Answers are memoized in a shared [`AssignabilityCache`].
//! - [`classify`]: value-type, enum, delegate and primitive predicates.
//!
//! Equivalence is a pure function of the pool. Assignability is the only
//! query with shared mutable state, and that state lives entirely in the
//! single-flight cache, so any number of workers may query concurrently.

pub mod classify;
mod deref;
mod equivalence;
mod relations;
pub mod well_known;

pub use deref::{dereference, fully_dereference, is_ignored_type, strip_modifiers, type_definition};
pub use equivalence::{equivalent, equivalent_opt, in_base_chain};
pub use relations::{AssignabilityCache, TypeRelations};
pub use well_known::WellKnown;

#[cfg(test)]
mod tests;
