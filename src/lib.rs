//! Fest Registry - Event Registration and Payment Reconciliation Service
//!
//! This crate books solo and group tickets against an external payment
//! provider and keeps the stored payment status converged with the
//! provider through webhook push and on-demand pull reconciliation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
