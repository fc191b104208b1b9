use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Quote,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Quote => "quote",
            EventStatus::Confirmed => "confirmed",
            EventStatus::InProgress => "in_progress",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub client_user_id: Option<Uuid>,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub guest_count: Option<i32>,
    pub status: EventStatus,
    pub all_inclusive: bool,
    pub all_inclusive_price: Option<Decimal>,
    pub all_inclusive_includes_vat: bool,
    pub discount_amount: Option<Decimal>,
    pub discount_before_vat: bool,
    pub total_override: Option<Decimal>,
    pub notes: Option<String>,
    pub google_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub title: String,
    pub client_user_id: Option<Uuid>,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub guest_count: Option<i32>,
    pub notes: Option<String>,
}

/// Full-record update; the admin screen always submits the whole event.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    pub title: String,
    pub client_user_id: Option<Uuid>,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub guest_count: Option<i32>,
    pub status: EventStatus,
    pub all_inclusive: bool,
    pub all_inclusive_price: Option<Decimal>,
    pub all_inclusive_includes_vat: bool,
    pub discount_amount: Option<Decimal>,
    pub discount_before_vat: bool,
    pub total_override: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventStatusResponse {
    pub id: Uuid,
    pub status: EventStatus,
    pub event_date: NaiveDate,
    /// The event date is in the past relative to today
    pub is_past: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateExpiredResponse {
    pub updated: u64,
}
