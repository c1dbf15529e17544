//! Flutter-facing bindings for the FeedBook engine.

pub mod api;
