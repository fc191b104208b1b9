// src/handlers/calendar.rs
//
// Google Calendar connection and per-event sync.

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    services::google::GoogleCalendarService,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// OAuth consent URL the admin opens to grant calendar access
#[utoipa::path(
    get,
    path = "/api/v1/calendar/oauth-url",
    responses(
        (status = 200, description = "Consent URL"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
pub async fn get_oauth_url(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    let google = GoogleCalendarService::new(Arc::clone(&state.config));
    let url = google.oauth_consent_url()?;

    Ok(Json(json!({ "url": url })))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ConnectCalendarRequest {
    /// Authorization code from the consent redirect
    pub code: String,
}

/// Exchange the consent code and store the refresh token
#[utoipa::path(
    post,
    path = "/api/v1/calendar/connect",
    request_body = ConnectCalendarRequest,
    responses(
        (status = 200, description = "Calendar connected"),
        (status = 500, description = "Token exchange failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
pub async fn connect_calendar(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ConnectCalendarRequest>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    let google = GoogleCalendarService::new(Arc::clone(&state.config));
    let tokens = google.exchange_code(&body.code).await?;

    let refresh_token = tokens.refresh_token.ok_or_else(|| {
        AppError::GoogleError("No refresh token in response; re-run consent with prompt=consent".to_string())
    })?;

    sqlx::query("UPDATE app_settings SET google_refresh_token = $1, updated_at = NOW() WHERE id = 1")
        .bind(&refresh_token)
        .execute(&state.db)
        .await?;

    Ok(Json(json!({ "connected": true })))
}

/// Whether a working Google Calendar connection is stored
#[utoipa::path(
    get,
    path = "/api/v1/calendar/connection",
    responses((status = 200, description = "Connection state")),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
pub async fn check_connection(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    let settings = super::settings::load_settings(&state.db).await?;
    let Some(refresh_token) = settings.google_refresh_token else {
        return Ok(Json(json!({ "connected": false })));
    };

    let google = GoogleCalendarService::new(Arc::clone(&state.config));
    let connected = match google.refresh_access_token(&refresh_token).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Stored Google token no longer works: {}", e);
            false
        }
    };

    Ok(Json(json!({ "connected": connected })))
}

/// Push one event into the connected Google calendar
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/calendar-sync",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event synced"),
        (status = 404, description = "Event not found"),
        (status = 422, description = "Calendar not connected"),
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
pub async fn sync_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_admin()?;

    let event = super::events::fetch_event(&state.db, event_id).await?;
    let settings = super::settings::load_settings(&state.db).await?;

    let refresh_token = settings
        .google_refresh_token
        .ok_or(AppError::CalendarNotConnected)?;
    let calendar_id = settings
        .google_calendar_id
        .unwrap_or_else(|| "primary".to_string());

    let google = GoogleCalendarService::new(Arc::clone(&state.config));
    let access_token = google.refresh_access_token(&refresh_token).await?;
    let google_event_id = google
        .upsert_event(&access_token, &calendar_id, &event)
        .await?;

    sqlx::query("UPDATE events SET google_event_id = $1, updated_at = NOW() WHERE id = $2")
        .bind(&google_event_id)
        .bind(event_id)
        .execute(&state.db)
        .await?;

    Ok(Json(json!({
        "event_id": event_id,
        "google_event_id": google_event_id,
    })))
}
