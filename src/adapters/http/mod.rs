//! HTTP adapters (Axum).

pub mod registration;
pub mod webhook;
