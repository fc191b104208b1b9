use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-supplier status of a line-item assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Declined,
}

/// One service instance attached to an event. Package grouping: children point
/// at the main item via `parent_item_id`; the bundle price lives on the main
/// item and children are excluded from the financial base.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventService {
    pub id: Uuid,
    pub event_id: Uuid,
    pub service_id: Option<Uuid>,
    pub name: String,
    pub custom_price: Decimal,
    pub quantity: i32,
    pub includes_vat: bool,
    pub position: i32,
    pub package_id: Option<Uuid>,
    pub parent_item_id: Option<Uuid>,
    pub is_package_main_item: bool,
    pub supplier_ids: Vec<Uuid>,
    #[schema(value_type = Object)]
    pub supplier_statuses: Json<HashMap<Uuid, AssignmentStatus>>,
    #[schema(value_type = Object)]
    pub supplier_notes: Json<HashMap<Uuid, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventServiceRequest {
    pub service_id: Option<Uuid>,
    pub name: String,
    pub custom_price: Decimal,
    pub quantity: i32,
    pub includes_vat: bool,
    pub package_id: Option<Uuid>,
    pub parent_item_id: Option<Uuid>,
    #[serde(default)]
    pub is_package_main_item: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEventServiceRequest {
    pub name: String,
    pub custom_price: Decimal,
    pub quantity: i32,
    pub includes_vat: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignSuppliersRequest {
    pub supplier_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSupplierStatusRequest {
    pub status: AssignmentStatus,
    pub note: Option<String>,
}

/// A line item as seen from the supplier portal: the item plus the context a
/// supplier needs (which event, when, where, their own status).
#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierAssignment {
    pub event_service_id: Uuid,
    pub event_id: Uuid,
    pub event_title: String,
    pub event_date: chrono::NaiveDate,
    pub location: Option<String>,
    pub service_name: String,
    pub status: AssignmentStatus,
    pub note: Option<String>,
}
