// src/handlers/payments.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{CreatePaymentRequest, NotificationTemplate, Payment, User},
    services::email::EmailService,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// List payments recorded against an event
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/payments",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Payments in date order", body = Vec<Payment>),
        (status = 404, description = "Event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn list_payments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<Vec<Payment>>> {
    super::events::fetch_event_for(&auth, &state.db, event_id).await?;
    let payments = super::events::fetch_payments(&state.db, event_id).await?;
    Ok(Json(payments))
}

/// Record a payment against an event. The event's client is notified when a
/// `payment_received` template exists.
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/payments",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = Payment),
        (status = 404, description = "Event not found"),
        (status = 400, description = "Invalid amount"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<CreatePaymentRequest>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    auth.require_admin()?;

    if body.amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Payment amount must be positive".to_string(),
        ));
    }

    let event = super::events::fetch_event(&state.db, event_id).await?;

    let payment = sqlx::query_as::<_, Payment>(
        "INSERT INTO payments (id, event_id, amount, payment_date, payment_method, note, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, NOW())
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(event_id)
    .bind(body.amount)
    .bind(body.payment_date)
    .bind(body.payment_method)
    .bind(&body.note)
    .fetch_one(&state.db)
    .await?;

    // Client receipt email, when both a portal account and a template exist.
    if let Some(client_user_id) = event.client_user_id {
        let template = sqlx::query_as::<_, NotificationTemplate>(
            "SELECT * FROM notification_templates WHERE key = 'payment_received'",
        )
        .fetch_optional(&state.db)
        .await?;

        if let Some(template) = template {
            let client = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(client_user_id)
                .fetch_optional(&state.db)
                .await?;

            if let Some(client) = client {
                let settings = super::settings::load_settings(&state.db).await?;
                let email_svc = EmailService::new(Arc::clone(&state.config));
                let amount = format!("{}{:.2}", settings.currency_symbol, payment.amount);
                let vars = HashMap::from([
                    ("client_name".to_string(), client.full_name.clone()),
                    ("event_title".to_string(), event.title.clone()),
                    ("amount".to_string(), amount),
                    ("payment_date".to_string(), payment.payment_date.to_string()),
                    ("business_name".to_string(), settings.business_name.clone()),
                ]);

                tokio::spawn(async move {
                    if let Err(e) = email_svc
                        .send_notification(&client.email, &client.full_name, &template, &vars)
                        .await
                    {
                        warn!("Payment receipt email to {} failed: {}", client.email, e);
                    }
                });
            }
        }
    }

    Ok((StatusCode::CREATED, Json(payment)))
}

/// Delete a payment
#[utoipa::path(
    delete,
    path = "/api/v1/payments/{payment_id}",
    params(("payment_id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 404, description = "Payment not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn delete_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(payment_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Payment {} not found",
            payment_id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}
