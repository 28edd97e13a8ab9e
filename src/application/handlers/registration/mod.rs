//! Registration command and query handlers.

mod book_group;
mod book_solo;
mod get_status;
mod list_registrations;
mod process_webhook;

pub use book_group::{BookGroupCommand, BookGroupHandler, BookGroupResult, BookedMember};
pub use book_solo::{BookSoloCommand, BookSoloHandler, BookSoloResult};
pub use get_status::{GetStatusHandler, GetStatusQuery};
pub use list_registrations::{
    ListGroupQuery, ListRegistrationsHandler, ListRegistrationsQuery,
};
pub use process_webhook::{ProcessWebhookCommand, ProcessWebhookHandler};
