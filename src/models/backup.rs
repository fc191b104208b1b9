use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Backup metadata; the snapshot payload itself is only loaded for a restore.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BackupInfo {
    pub id: Uuid,
    pub label: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBackupRequest {
    pub label: Option<String>,
}

/// Row counts per entity, returned by backup creation and restore.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct BackupCounts {
    pub suppliers: usize,
    pub services: usize,
    pub packages: usize,
    pub events: usize,
    pub event_services: usize,
    pub payments: usize,
    pub quote_templates: usize,
    pub notification_templates: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BackupCreatedResponse {
    pub backup: BackupInfo,
    pub counts: BackupCounts,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestoreResponse {
    pub backup_id: Uuid,
    pub counts: BackupCounts,
}
