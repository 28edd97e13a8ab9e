//! Booking gateway adapters.

mod http_gateway;
mod mock;

pub use http_gateway::HttpBookingGateway;
pub use mock::MockBookingGateway;
