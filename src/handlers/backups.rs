// src/handlers/backups.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{BackupCreatedResponse, BackupInfo, CreateBackupRequest, RestoreResponse},
    services::backup::{BackupSnapshot, capture_snapshot, restore_snapshot},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::types::Json as SqlJson;
use tracing::info;
use uuid::Uuid;

/// Snapshot every business table into one backup record
#[utoipa::path(
    post,
    path = "/api/v1/backups",
    request_body = CreateBackupRequest,
    responses(
        (status = 201, description = "Backup created", body = BackupCreatedResponse),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Backups"
)]
pub async fn create_backup(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateBackupRequest>,
) -> AppResult<(StatusCode, Json<BackupCreatedResponse>)> {
    auth.require_admin()?;

    let snapshot = capture_snapshot(&state.db).await?;
    let counts = snapshot.counts();
    let label = body
        .label
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| format!("Backup of {} events", counts.events));

    let backup = sqlx::query_as::<_, BackupInfo>(
        "INSERT INTO backups (id, label, created_by, payload, created_at)
         VALUES ($1, $2, $3, $4, NOW())
         RETURNING id, label, created_by, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&label)
    .bind(auth.id)
    .bind(SqlJson(&snapshot))
    .fetch_one(&state.db)
    .await?;

    info!("Backup '{}' created by {}", backup.label, auth.name);

    Ok((
        StatusCode::CREATED,
        Json(BackupCreatedResponse { backup, counts }),
    ))
}

/// List backups, newest first
#[utoipa::path(
    get,
    path = "/api/v1/backups",
    responses(
        (status = 200, description = "Backups, newest first", body = Vec<BackupInfo>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Backups"
)]
pub async fn list_backups(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BackupInfo>>> {
    auth.require_admin()?;

    let backups = sqlx::query_as::<_, BackupInfo>(
        "SELECT id, label, created_by, created_at FROM backups ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(backups))
}

/// Wipe the business tables and reload them from a backup. All-or-nothing:
/// a failed restore leaves the database untouched.
#[utoipa::path(
    post,
    path = "/api/v1/backups/{backup_id}/restore",
    params(("backup_id" = Uuid, Path, description = "Backup ID")),
    responses(
        (status = 200, description = "Restore complete", body = RestoreResponse),
        (status = 404, description = "Backup not found"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Backups"
)]
pub async fn restore_backup(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(backup_id): Path<Uuid>,
) -> AppResult<Json<RestoreResponse>> {
    auth.require_admin()?;

    let payload: SqlJson<BackupSnapshot> =
        sqlx::query_scalar("SELECT payload FROM backups WHERE id = $1")
            .bind(backup_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Backup {} not found", backup_id)))?;

    let snapshot = payload.0;
    restore_snapshot(&state.db, &snapshot).await?;

    info!("Backup {} restored by {}", backup_id, auth.name);

    Ok(Json(RestoreResponse {
        backup_id,
        counts: snapshot.counts(),
    }))
}
