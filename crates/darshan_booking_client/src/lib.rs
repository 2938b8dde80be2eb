//! Typed client for the darshan booking backend (a Frappe application), plus
//! the date/time and slot helpers its screens rely on.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

pub mod config;
pub mod datetime;
pub mod endpoints;
pub mod http_client;
pub mod models;
pub mod observability;
pub mod session;
pub mod slots;
pub mod store;

pub use datetime::{
    DISPLAY_PLACEHOLDER, DateTimeInput, format_for_display, format_for_display_in,
    to_canonical_iso, to_canonical_iso_in,
};
pub use endpoints::{Role, SlotBook};
pub use models::{
    AppointmentFilter, Booking, Companion, DarshanKind, LoginResponse, PendingRow, ReviewEvent,
    VipAppointmentPayload, WorkflowState,
};
pub use slots::{to_12_hour, to_24_hour};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("api error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("server exception: {0}")]
    Frappe(String),
}

impl BookingError {
    /// Map a non-success status to an error. Frappe reports validation
    /// failures as 417.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => BookingError::NotFound(body),
            401 | 403 => BookingError::Auth(body),
            417 | 422 => BookingError::InvalidInput(body),
            _ => BookingError::Api { status, body },
        }
    }
}

#[async_trait]
pub trait BookingClient: Send + Sync + 'static {
    /// Password login; on success the session cookie is kept for later calls.
    async fn login(
        &self,
        phone: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, BookingError>;
    async fn logout(&self) -> Result<(), BookingError>;
    /// Ask the backend to send a one-time login code to `phone`.
    async fn login_request(&self, phone: &str) -> Result<serde_json::Value, BookingError>;
    async fn register_devotee(&self, phone: &str) -> Result<serde_json::Value, BookingError>;
    async fn get_profile(&self) -> Result<serde_json::Value, BookingError>;
    async fn update_profile(
        &self,
        info: &serde_json::Value,
    ) -> Result<serde_json::Value, BookingError>;
    async fn get_appointment_list(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<serde_json::Value, BookingError>;
    async fn get_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<serde_json::Value, BookingError>;
    async fn create_appointment(
        &self,
        info: &serde_json::Value,
    ) -> Result<serde_json::Value, BookingError>;
    async fn get_appointment_stats(&self) -> Result<serde_json::Value, BookingError>;
    async fn approve_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<serde_json::Value, BookingError>;
    async fn reject_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<serde_json::Value, BookingError>;
    /// Booked/free counts per slot for `slot_date` (`YYYY-MM-DD`).
    async fn get_slot_occupancy(
        &self,
        book: SlotBook,
        slot_date: &str,
    ) -> Result<serde_json::Value, BookingError>;

    /// Appointment list decoded into [`Booking`]s.
    async fn get_bookings(&self, filter: &AppointmentFilter) -> Result<Vec<Booking>, BookingError> {
        let message = self.get_appointment_list(filter).await?;
        Ok(models::bookings_from_list(&message))
    }

    /// Appointment list as review-queue rows.
    async fn get_pending_rows(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<PendingRow>, BookingError> {
        let message = self.get_appointment_list(filter).await?;
        Ok(models::list_items(&message)
            .iter()
            .filter_map(PendingRow::from_raw)
            .collect())
    }

    async fn create_vip_appointment(
        &self,
        payload: &VipAppointmentPayload,
    ) -> Result<serde_json::Value, BookingError> {
        let info = serde_json::to_value(payload)
            .map_err(|e| BookingError::InvalidInput(e.to_string()))?;
        self.create_appointment(&info).await
    }

    /// Carry out a review-table action, one backend call per id.
    async fn apply_review(
        &self,
        event: &ReviewEvent,
    ) -> Result<Vec<serde_json::Value>, BookingError> {
        let mut results = Vec::new();
        for id in event.ids() {
            let result = match event {
                ReviewEvent::Approve { .. } | ReviewEvent::ApproveBulk { .. } => {
                    self.approve_appointment(id).await?
                }
                ReviewEvent::Reject { .. } | ReviewEvent::RejectBulk { .. } => {
                    self.reject_appointment(id).await?
                }
                ReviewEvent::View { .. } => self.get_appointment(id).await?,
            };
            results.push(result);
        }
        Ok(results)
    }
}
