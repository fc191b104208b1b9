// src/handlers/quotes.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{CreateQuoteTemplateRequest, QuoteTemplate},
    services::{financials::calculate_event_financials, quote::render_quote_html},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use serde::Deserialize;
use uuid::Uuid;

/// Create a quote template. Marking it default clears the flag elsewhere.
#[utoipa::path(
    post,
    path = "/api/v1/quote-templates",
    request_body = CreateQuoteTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = QuoteTemplate),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn create_quote_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateQuoteTemplateRequest>,
) -> AppResult<(StatusCode, Json<QuoteTemplate>)> {
    auth.require_admin()?;

    let mut tx = state.db.begin().await?;
    if body.is_default {
        sqlx::query("UPDATE quote_templates SET is_default = FALSE WHERE is_default")
            .execute(&mut *tx)
            .await?;
    }

    let template = sqlx::query_as::<_, QuoteTemplate>(
        "INSERT INTO quote_templates (id, name, title, intro_html, terms_html, is_default, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&body.name)
    .bind(&body.title)
    .bind(&body.intro_html)
    .bind(&body.terms_html)
    .bind(body.is_default)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(template)))
}

/// List quote templates
#[utoipa::path(
    get,
    path = "/api/v1/quote-templates",
    responses((status = 200, description = "List of templates", body = Vec<QuoteTemplate>)),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn list_quote_templates(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<QuoteTemplate>>> {
    auth.require_admin()?;

    let templates =
        sqlx::query_as::<_, QuoteTemplate>("SELECT * FROM quote_templates ORDER BY name")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(templates))
}

/// Update a quote template
#[utoipa::path(
    put,
    path = "/api/v1/quote-templates/{template_id}",
    params(("template_id" = Uuid, Path, description = "Template ID")),
    request_body = CreateQuoteTemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = QuoteTemplate),
        (status = 404, description = "Template not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn update_quote_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
    Json(body): Json<CreateQuoteTemplateRequest>,
) -> AppResult<Json<QuoteTemplate>> {
    auth.require_admin()?;

    let mut tx = state.db.begin().await?;
    if body.is_default {
        sqlx::query("UPDATE quote_templates SET is_default = FALSE WHERE is_default AND id != $1")
            .bind(template_id)
            .execute(&mut *tx)
            .await?;
    }

    let template = sqlx::query_as::<_, QuoteTemplate>(
        "UPDATE quote_templates
         SET name = $1, title = $2, intro_html = $3, terms_html = $4, is_default = $5,
             updated_at = NOW()
         WHERE id = $6
         RETURNING *",
    )
    .bind(&body.name)
    .bind(&body.title)
    .bind(&body.intro_html)
    .bind(&body.terms_html)
    .bind(body.is_default)
    .bind(template_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Template {} not found", template_id)))?;
    tx.commit().await?;

    Ok(Json(template))
}

/// Delete a quote template
#[utoipa::path(
    delete,
    path = "/api/v1/quote-templates/{template_id}",
    params(("template_id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 204, description = "Template deleted"),
        (status = 404, description = "Template not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn delete_quote_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM quote_templates WHERE id = $1")
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

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct QuoteQuery {
    /// Render with a specific template instead of the default one
    pub template_id: Option<Uuid>,
}

/// Render the HTML quote document for an event
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/quote",
    params(
        ("event_id" = Uuid, Path, description = "Event ID"),
        QuoteQuery,
    ),
    responses(
        (status = 200, description = "Rendered quote document", content_type = "text/html"),
        (status = 404, description = "Event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Quotes"
)]
pub async fn generate_quote(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<QuoteQuery>,
) -> AppResult<Html<String>> {
    let event = super::events::fetch_event_for(&auth, &state.db, event_id).await?;
    let line_items = super::events::fetch_line_items(&state.db, event_id).await?;
    let payments = super::events::fetch_payments(&state.db, event_id).await?;
    let settings = super::settings::load_settings(&state.db).await?;

    let template = match query.template_id {
        Some(template_id) => Some(
            sqlx::query_as::<_, QuoteTemplate>("SELECT * FROM quote_templates WHERE id = $1")
                .bind(template_id)
                .fetch_optional(&state.db)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Template {} not found", template_id))
                })?,
        ),
        None => {
            sqlx::query_as::<_, QuoteTemplate>(
                "SELECT * FROM quote_templates WHERE is_default LIMIT 1",
            )
            .fetch_optional(&state.db)
            .await?
        }
    };

    let financials =
        calculate_event_financials(&event, &line_items, &payments, settings.vat_fraction());
    let html = render_quote_html(
        &settings,
        template.as_ref(),
        &event,
        &line_items,
        &financials,
    );

    Ok(Html(html))
}
