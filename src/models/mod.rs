// src/models/mod.rs

mod backup;
mod catalog;
mod event;
mod event_service;
mod payment;
mod settings;
mod supplier;
mod templates;
mod user;

pub use backup::*;
pub use catalog::*;
pub use event::*;
pub use event_service::*;
pub use payment::*;
pub use settings::*;
pub use supplier::*;
pub use templates::*;
pub use user::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── JWT Claims ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub supplier_id: Option<Uuid>,
    pub exp: usize,
    pub iat: usize,
}

// ─── Batch reorder (services, packages, event line items) ─────────────────────

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReorderItem {
    pub id: Uuid,
    pub position: i32,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReorderRequest {
    pub items: Vec<ReorderItem>,
}
