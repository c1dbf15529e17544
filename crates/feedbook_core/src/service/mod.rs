//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate parser, commands and storage into one entry point.
//! - Keep CLI/FFI layers decoupled from storage details.
//!
//! # See also
//! - `crate::store::model_store` for the state the service publishes.

pub mod command_service;
