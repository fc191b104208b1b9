// src/handlers/notifications.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        CreateNotificationTemplateRequest, NotificationTemplate, SendNotificationRequest,
        UpdateNotificationTemplateRequest,
    },
    services::email::EmailService,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Create a notification template
#[utoipa::path(
    post,
    path = "/api/v1/notification-templates",
    request_body = CreateNotificationTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = NotificationTemplate),
        (status = 409, description = "Template key already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn create_notification_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateNotificationTemplateRequest>,
) -> AppResult<(StatusCode, Json<NotificationTemplate>)> {
    auth.require_admin()?;

    let existing = sqlx::query("SELECT id FROM notification_templates WHERE key = $1")
        .bind(&body.key)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "Template with key '{}' already exists",
            body.key
        )));
    }

    let template = sqlx::query_as::<_, NotificationTemplate>(
        "INSERT INTO notification_templates (id, key, name, subject, body, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&body.key)
    .bind(&body.name)
    .bind(&body.subject)
    .bind(&body.body)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(template)))
}

/// List notification templates
#[utoipa::path(
    get,
    path = "/api/v1/notification-templates",
    responses((status = 200, description = "List of templates", body = Vec<NotificationTemplate>)),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn list_notification_templates(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<NotificationTemplate>>> {
    auth.require_admin()?;

    let templates = sqlx::query_as::<_, NotificationTemplate>(
        "SELECT * FROM notification_templates ORDER BY key",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(templates))
}

/// Update a notification template's name, subject or body
#[utoipa::path(
    put,
    path = "/api/v1/notification-templates/{template_id}",
    params(("template_id" = Uuid, Path, description = "Template ID")),
    request_body = UpdateNotificationTemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = NotificationTemplate),
        (status = 404, description = "Template not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn update_notification_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
    Json(body): Json<UpdateNotificationTemplateRequest>,
) -> AppResult<Json<NotificationTemplate>> {
    auth.require_admin()?;

    let template = sqlx::query_as::<_, NotificationTemplate>(
        "UPDATE notification_templates
         SET name = $1, subject = $2, body = $3, updated_at = NOW()
         WHERE id = $4
         RETURNING *",
    )
    .bind(&body.name)
    .bind(&body.subject)
    .bind(&body.body)
    .bind(template_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Template {} not found", template_id)))?;

    Ok(Json(template))
}

/// Delete a notification template
#[utoipa::path(
    delete,
    path = "/api/v1/notification-templates/{template_id}",
    params(("template_id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 204, description = "Template deleted"),
        (status = 404, description = "Template not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn delete_notification_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM notification_templates WHERE id = $1")
        .bind(template_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Template {} not found",
            template_id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Send a named template to an explicit recipient. Unlike the automatic
/// notifications this call reports delivery failure to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/send",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Notification sent"),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Delivery failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn send_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<SendNotificationRequest>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    let template = sqlx::query_as::<_, NotificationTemplate>(
        "SELECT * FROM notification_templates WHERE key = $1",
    )
    .bind(&body.template_key)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!("Template '{}' not found", body.template_key))
    })?;

    let email_svc = EmailService::new(Arc::clone(&state.config));
    email_svc
        .send_notification(
            &body.recipient_email,
            &body.recipient_name,
            &template,
            &body.variables,
        )
        .await?;

    Ok(Json(json!({
        "sent": true,
        "template": body.template_key,
        "recipient": body.recipient_email,
    })))
}
