//! Entry search entry points.
//!
//! # Responsibility
//! - Express `find` queries as predicates over entries.
//! - Keep filtering semantics inside core.

pub mod predicate;
