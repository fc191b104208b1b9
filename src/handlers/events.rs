// src/handlers/events.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        CreateEventRequest, Event, EventService, EventStatus, EventStatusResponse, Payment, Role,
        UpdateEventRequest, UpdateExpiredResponse,
    },
    services::financials::{EventFinancials, calculate_event_financials},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

pub(crate) async fn fetch_event(db: &PgPool, event_id: Uuid) -> AppResult<Event> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))
}

/// Load an event and enforce the role gate: admins see everything, clients
/// only their own events.
pub(crate) async fn fetch_event_for(
    auth: &AuthUser,
    db: &PgPool,
    event_id: Uuid,
) -> AppResult<Event> {
    let event = fetch_event(db, event_id).await?;
    if !auth.can_access_event(event.client_user_id) {
        return Err(AppError::Forbidden(
            "You do not have access to this event".to_string(),
        ));
    }
    Ok(event)
}

pub(crate) async fn fetch_line_items(db: &PgPool, event_id: Uuid) -> AppResult<Vec<EventService>> {
    Ok(sqlx::query_as::<_, EventService>(
        "SELECT * FROM event_services WHERE event_id = $1 ORDER BY position",
    )
    .bind(event_id)
    .fetch_all(db)
    .await?)
}

pub(crate) async fn fetch_payments(db: &PgPool, event_id: Uuid) -> AppResult<Vec<Payment>> {
    Ok(sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE event_id = $1 ORDER BY payment_date",
    )
    .bind(event_id)
    .fetch_all(db)
    .await?)
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct EventListQuery {
    /// Restrict the list to one status
    pub status: Option<EventStatus>,
}

/// Create an event (starts in the quote status)
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn create_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<Event>)> {
    auth.require_admin()?;

    let event = sqlx::query_as::<_, Event>(
        "INSERT INTO events (id, title, client_user_id, client_name, client_phone, event_date,
            event_time, location, guest_count, notes, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&body.title)
    .bind(body.client_user_id)
    .bind(&body.client_name)
    .bind(&body.client_phone)
    .bind(body.event_date)
    .bind(&body.event_time)
    .bind(&body.location)
    .bind(body.guest_count)
    .bind(&body.notes)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// List events. Admins see all (optionally filtered by status); clients see
/// their own.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(EventListQuery),
    responses((status = 200, description = "List of events", body = Vec<Event>)),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn list_events(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> AppResult<Json<Vec<Event>>> {
    let events = match auth.role {
        Role::Admin => match query.status {
            Some(status) => {
                sqlx::query_as::<_, Event>(
                    "SELECT * FROM events WHERE status = $1 ORDER BY event_date",
                )
                .bind(status)
                .fetch_all(&state.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY event_date")
                    .fetch_all(&state.db)
                    .await?
            }
        },
        Role::Client => {
            sqlx::query_as::<_, Event>(
                "SELECT * FROM events WHERE client_user_id = $1 ORDER BY event_date",
            )
            .bind(auth.id)
            .fetch_all(&state.db)
            .await?
        }
        Role::Supplier => {
            return Err(AppError::Forbidden(
                "Suppliers see assignments, not events".to_string(),
            ));
        }
    };

    Ok(Json(events))
}

/// Get a single event
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event detail", body = Event),
        (status = 404, description = "Event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn get_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<Event>> {
    let event = fetch_event_for(&auth, &state.db, event_id).await?;
    Ok(Json(event))
}

/// Update an event (full record, including pricing flags and status)
#[utoipa::path(
    put,
    path = "/api/v1/events/{event_id}",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 404, description = "Event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn update_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<UpdateEventRequest>,
) -> AppResult<Json<Event>> {
    auth.require_admin()?;

    if let Some(discount) = body.discount_amount {
        if discount < rust_decimal::Decimal::ZERO {
            return Err(AppError::Validation(
                "discount_amount cannot be negative".to_string(),
            ));
        }
    }

    let event = sqlx::query_as::<_, Event>(
        "UPDATE events
         SET title = $1, client_user_id = $2, client_name = $3, client_phone = $4,
             event_date = $5, event_time = $6, location = $7, guest_count = $8,
             status = $9, all_inclusive = $10, all_inclusive_price = $11,
             all_inclusive_includes_vat = $12, discount_amount = $13,
             discount_before_vat = $14, total_override = $15, notes = $16,
             updated_at = NOW()
         WHERE id = $17
         RETURNING *",
    )
    .bind(&body.title)
    .bind(body.client_user_id)
    .bind(&body.client_name)
    .bind(&body.client_phone)
    .bind(body.event_date)
    .bind(&body.event_time)
    .bind(&body.location)
    .bind(body.guest_count)
    .bind(body.status)
    .bind(body.all_inclusive)
    .bind(body.all_inclusive_price)
    .bind(body.all_inclusive_includes_vat)
    .bind(body.discount_amount)
    .bind(body.discount_before_vat)
    .bind(body.total_override)
    .bind(&body.notes)
    .bind(event_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

    Ok(Json(event))
}

/// Delete an event and everything attached to it
#[utoipa::path(
    delete,
    path = "/api/v1/events/{event_id}",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn delete_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Event {} not found", event_id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Derived financial snapshot for one event
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/financials",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Financial breakdown", body = EventFinancials),
        (status = 404, description = "Event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn get_event_financials(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<EventFinancials>> {
    let event = fetch_event_for(&auth, &state.db, event_id).await?;
    let line_items = fetch_line_items(&state.db, event_id).await?;
    let payments = fetch_payments(&state.db, event_id).await?;
    let settings = super::settings::load_settings(&state.db).await?;

    let financials =
        calculate_event_financials(&event, &line_items, &payments, settings.vat_fraction());

    Ok(Json(financials))
}

/// Current status of one event plus whether its date has passed
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/status",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event status", body = EventStatusResponse),
        (status = 404, description = "Event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn check_event_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<EventStatusResponse>> {
    let event = fetch_event_for(&auth, &state.db, event_id).await?;
    let today = Utc::now().date_naive();

    Ok(Json(EventStatusResponse {
        id: event.id,
        status: event.status,
        event_date: event.event_date,
        is_past: event.event_date < today,
    }))
}

/// Mark past-dated confirmed / in-progress events as completed
#[utoipa::path(
    post,
    path = "/api/v1/events/update-expired",
    responses(
        (status = 200, description = "Number of events moved to completed", body = UpdateExpiredResponse),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn update_expired_events(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UpdateExpiredResponse>> {
    auth.require_admin()?;

    let result = sqlx::query(
        "UPDATE events SET status = 'completed', updated_at = NOW()
         WHERE status IN ('confirmed', 'in_progress') AND event_date < CURRENT_DATE",
    )
    .execute(&state.db)
    .await?;

    Ok(Json(UpdateExpiredResponse {
        updated: result.rows_affected(),
    }))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Export all events with computed totals as CSV
#[utoipa::path(
    get,
    path = "/api/v1/events/export",
    responses(
        (status = 200, description = "CSV export of all events"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn export_events_csv(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    auth.require_admin()?;

    let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY event_date")
        .fetch_all(&state.db)
        .await?;
    let all_items =
        sqlx::query_as::<_, EventService>("SELECT * FROM event_services ORDER BY position")
            .fetch_all(&state.db)
            .await?;
    let all_payments = sqlx::query_as::<_, Payment>("SELECT * FROM payments")
        .fetch_all(&state.db)
        .await?;
    let settings = super::settings::load_settings(&state.db).await?;
    let vat_rate = settings.vat_fraction();

    let mut items_by_event: HashMap<Uuid, Vec<EventService>> = HashMap::new();
    for item in all_items {
        items_by_event.entry(item.event_id).or_default().push(item);
    }
    let mut payments_by_event: HashMap<Uuid, Vec<Payment>> = HashMap::new();
    for payment in all_payments {
        payments_by_event
            .entry(payment.event_id)
            .or_default()
            .push(payment);
    }

    let mut csv = String::from(
        "title,client,date,status,subtotal,vat,discount,final_total,paid,balance\n",
    );
    let empty_items: Vec<EventService> = Vec::new();
    let empty_payments: Vec<Payment> = Vec::new();

    for event in &events {
        let items = items_by_event.get(&event.id).unwrap_or(&empty_items);
        let payments = payments_by_event.get(&event.id).unwrap_or(&empty_payments);
        let fin = calculate_event_financials(event, items, payments, vat_rate);

        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            csv_field(&event.title),
            csv_field(&event.client_name),
            event.event_date,
            event.status.as_str(),
            fin.subtotal,
            fin.vat_amount,
            fin.discount_total,
            fin.final_total,
            fin.total_paid,
            fin.balance,
        ));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"events.csv\"",
            ),
        ],
        csv,
    ))
}

#[cfg(test)]
mod tests {
    use super::csv_field;

    #[test]
    fn csv_fields_with_metacharacters_are_quoted() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
