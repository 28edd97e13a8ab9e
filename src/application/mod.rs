//! Application layer - use-case handlers and the reconciliation engine.

pub mod handlers;
pub mod reconciliation;
