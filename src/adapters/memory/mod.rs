//! In-memory adapters for tests and local runs.

mod registration_store;

pub use registration_store::InMemoryRegistrationStore;
