//! Model store and presentation-facing observable state.
//!
//! # Responsibility
//! - Hold the single source of truth for both entry books.
//! - Expose read-only observable cells for presentation layers.
//!
//! # See also
//! - `crate::service::command_service`, the only writer.

pub mod model_store;
pub mod observable;
