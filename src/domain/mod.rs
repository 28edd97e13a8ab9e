//! Domain layer - pure business types and rules, no I/O.

pub mod foundation;
pub mod registration;
