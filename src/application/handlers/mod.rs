//! Application handlers, grouped by domain area.

pub mod registration;
