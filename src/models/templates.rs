use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

// ─── Quote templates ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct QuoteTemplate {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub intro_html: String,
    pub terms_html: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateQuoteTemplateRequest {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub intro_html: String,
    #[serde(default)]
    pub terms_html: String,
    #[serde(default)]
    pub is_default: bool,
}

// ─── Notification templates ───────────────────────────────────────────────────

/// Email template keyed by the business moment that triggers it, e.g.
/// `supplier_assignment`, `payment_received`, `event_confirmed`. Subject and
/// body support `{{placeholder}}` substitution.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NotificationTemplate {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNotificationTemplateRequest {
    pub key: String,
    pub name: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNotificationTemplateRequest {
    pub name: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendNotificationRequest {
    pub template_key: String,
    pub recipient_email: String,
    pub recipient_name: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
}
