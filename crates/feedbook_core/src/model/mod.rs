//! Domain model for tracked feed entries.
//!
//! # Responsibility
//! - Define canonical data structures used by the command engine.
//! - Keep validation next to the values it protects.
//!
//! # Invariants
//! - Every entry is identified by its link.
//! - An entry book never holds two entries with the same link.
//!
//! # See also
//! - `crate::store::model_store` for how the books are held at runtime.

pub mod context;
pub mod entry;
pub mod entry_book;
pub mod index;
