// src/handlers/settings.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{AppSettings, UpdateSettingsRequest},
    state::AppState,
};
use axum::{Json, extract::State};
use rust_decimal_macros::dec;
use sqlx::PgPool;

/// Settings row with a defaults fallback; every consumer of the VAT rate goes
/// through here.
pub(crate) async fn load_settings(db: &PgPool) -> AppResult<AppSettings> {
    let settings = sqlx::query_as::<_, AppSettings>("SELECT * FROM app_settings WHERE id = 1")
        .fetch_optional(db)
        .await?
        .unwrap_or_else(AppSettings::fallback);
    Ok(settings)
}

/// Get application settings
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses((status = 200, description = "Current settings", body = AppSettings)),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_settings(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<AppSettings>> {
    Ok(Json(load_settings(&state.db).await?))
}

/// Update application settings (business identity and VAT rate)
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings saved", body = AppSettings),
        (status = 400, description = "VAT rate out of range"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateSettingsRequest>,
) -> AppResult<Json<AppSettings>> {
    auth.require_admin()?;

    if body.vat_rate < dec!(0) || body.vat_rate > dec!(100) {
        return Err(AppError::Validation(
            "vat_rate must be between 0 and 100".to_string(),
        ));
    }

    let settings = sqlx::query_as::<_, AppSettings>(
        "INSERT INTO app_settings (id, business_name, vat_rate, currency_symbol, quote_footer, google_calendar_id, updated_at)
         VALUES (1, $1, $2, $3, $4, $5, NOW())
         ON CONFLICT (id) DO UPDATE
         SET business_name = EXCLUDED.business_name,
             vat_rate = EXCLUDED.vat_rate,
             currency_symbol = EXCLUDED.currency_symbol,
             quote_footer = EXCLUDED.quote_footer,
             google_calendar_id = EXCLUDED.google_calendar_id,
             updated_at = NOW()
         RETURNING *",
    )
    .bind(&body.business_name)
    .bind(body.vat_rate)
    .bind(&body.currency_symbol)
    .bind(&body.quote_footer)
    .bind(&body.google_calendar_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(settings))
}
