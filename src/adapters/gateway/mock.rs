//! Scripted booking gateway for tests and local development.
//!
//! Each operation replays a configured response and counts its calls, so
//! tests can assert not only on outcomes but on how often the provider was
//! actually contacted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{
    BookingCreated, BookingGateway, BookingSnapshot, BulkBookingCreated, ChildBooking,
    CreateBookingRequest, CreateBulkBookingRequest, GatewayError,
};

type Scripted<T> = Mutex<Option<Result<T, GatewayError>>>;

/// Booking gateway that replays scripted responses.
#[derive(Default)]
pub struct MockBookingGateway {
    booking: Scripted<BookingCreated>,
    bulk: Scripted<BulkBookingCreated>,
    snapshot: Scripted<BookingSnapshot>,

    create_calls: AtomicUsize,
    bulk_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl MockBookingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_booking(self, booking: BookingCreated) -> Self {
        *self.booking.lock().unwrap() = Some(Ok(booking));
        self
    }

    pub fn with_bulk(self, bulk: BulkBookingCreated) -> Self {
        *self.bulk.lock().unwrap() = Some(Ok(bulk));
        self
    }

    pub fn with_snapshot(self, snapshot: BookingSnapshot) -> Self {
        *self.snapshot.lock().unwrap() = Some(Ok(snapshot));
        self
    }

    pub fn with_create_error(self, error: GatewayError) -> Self {
        *self.booking.lock().unwrap() = Some(Err(error));
        self
    }

    pub fn with_bulk_error(self, error: GatewayError) -> Self {
        *self.bulk.lock().unwrap() = Some(Err(error));
        self
    }

    pub fn with_fetch_error(self, error: GatewayError) -> Self {
        *self.snapshot.lock().unwrap() = Some(Err(error));
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Convenience bulk response: one child per name, ids `bkg_child_<i>`.
    pub fn bulk_children(
        parent: &str,
        count: usize,
        status: crate::domain::registration::PaymentStatus,
    ) -> BulkBookingCreated {
        BulkBookingCreated {
            parent_booking_id: parent.to_string(),
            children: (0..count)
                .map(|i| ChildBooking {
                    booking_id: format!("bkg_child_{}", i),
                    status,
                })
                .collect(),
            payment_url: format!("https://pay.example.com/order/{}", parent),
        }
    }

    fn unscripted<T>(op: &str) -> Result<T, GatewayError> {
        Err(GatewayError::Network(format!(
            "mock gateway has no scripted response for {}",
            op
        )))
    }
}

#[async_trait]
impl BookingGateway for MockBookingGateway {
    async fn create_booking(
        &self,
        _request: CreateBookingRequest,
    ) -> Result<BookingCreated, GatewayError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        match self.booking.lock().unwrap().clone() {
            Some(result) => result,
            None => Self::unscripted("create_booking"),
        }
    }

    async fn create_bulk_booking(
        &self,
        _request: CreateBulkBookingRequest,
    ) -> Result<BulkBookingCreated, GatewayError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        match self.bulk.lock().unwrap().clone() {
            Some(result) => result,
            None => Self::unscripted("create_bulk_booking"),
        }
    }

    async fn fetch_booking(&self, _booking_id: &str) -> Result<BookingSnapshot, GatewayError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match self.snapshot.lock().unwrap().clone() {
            Some(result) => result,
            None => Self::unscripted("fetch_booking"),
        }
    }
}
