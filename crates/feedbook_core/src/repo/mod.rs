//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the command service saves through.
//! - Isolate SQLite query details from command orchestration.
//!
//! # Invariants
//! - Loaded entries pass the same validation as user input.
//!
//! # See also
//! - `crate::db` for connection setup and migrations.

pub mod entry_repo;
