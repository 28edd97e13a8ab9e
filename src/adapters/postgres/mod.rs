//! PostgreSQL adapters.

mod registration_store;

pub use registration_store::PostgresRegistrationStore;
