//! Adapters connecting the application core to the outside world.

pub mod gateway;
pub mod http;
pub mod memory;
pub mod postgres;
