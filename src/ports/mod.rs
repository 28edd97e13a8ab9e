//! Ports - contracts between the application core and the outside world.
//!
//! Adapters implement these traits; application handlers depend on them
//! through `Arc<dyn Trait>` so every seam can be swapped in tests.

pub mod booking_gateway;
pub mod registration_store;

pub use booking_gateway::{
    BookingCreated, BookingGateway, BookingSnapshot, BulkBookingCreated, BulkMemberRequest,
    ChildBooking, CreateBookingRequest, CreateBulkBookingRequest, GatewayError,
};
pub use registration_store::{
    CreateOutcome, RegistrationStore, RegistrationUpdate, StoreError,
};
