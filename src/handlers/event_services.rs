// src/handlers/event_services.rs
//
// Event line items: the services attached to one event, their package
// grouping, and per-line supplier assignment.

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        AssignSuppliersRequest, AssignmentStatus, CreateEventServiceRequest, EventService,
        NotificationTemplate, ReorderRequest, Role, Service, Supplier, SupplierAssignment,
        UpdateEventServiceRequest, UpdateSupplierStatusRequest,
    },
    services::email::EmailService,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::types::Json as SqlJson;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

async fn fetch_item(db: &sqlx::PgPool, item_id: Uuid) -> AppResult<EventService> {
    sqlx::query_as::<_, EventService>("SELECT * FROM event_services WHERE id = $1")
        .bind(item_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Line item {} not found", item_id)))
}

/// List the line items of one event
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/services",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Line items in display order", body = Vec<EventService>),
        (status = 404, description = "Event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Line items"
)]
pub async fn list_event_services(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<Vec<EventService>>> {
    super::events::fetch_event_for(&auth, &state.db, event_id).await?;
    let items = super::events::fetch_line_items(&state.db, event_id).await?;
    Ok(Json(items))
}

/// Attach a service to an event. Attaching a package main item also expands
/// the package's component services into child rows.
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/services",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    request_body = CreateEventServiceRequest,
    responses(
        (status = 201, description = "Line item created", body = EventService),
        (status = 404, description = "Event not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Line items"
)]
pub async fn create_event_service(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<CreateEventServiceRequest>,
) -> AppResult<(StatusCode, Json<EventService>)> {
    auth.require_admin()?;
    super::events::fetch_event(&state.db, event_id).await?;

    if body.quantity < 1 {
        return Err(AppError::Validation("quantity must be at least 1".to_string()));
    }

    let position: i32 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), -1) + 1 FROM event_services WHERE event_id = $1",
    )
    .bind(event_id)
    .fetch_one(&state.db)
    .await?;

    let mut tx = state.db.begin().await?;

    let item = sqlx::query_as::<_, EventService>(
        "INSERT INTO event_services (id, event_id, service_id, name, custom_price, quantity,
            includes_vat, position, package_id, parent_item_id, is_package_main_item,
            created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(event_id)
    .bind(body.service_id)
    .bind(&body.name)
    .bind(body.custom_price)
    .bind(body.quantity)
    .bind(body.includes_vat)
    .bind(position)
    .bind(body.package_id)
    .bind(body.parent_item_id)
    .bind(body.is_package_main_item)
    .fetch_one(&mut *tx)
    .await?;

    if body.is_package_main_item {
        if let Some(package_id) = body.package_id {
            let service_ids: Vec<Uuid> =
                sqlx::query_scalar("SELECT service_ids FROM packages WHERE id = $1")
                    .bind(package_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Package {} not found", package_id))
                    })?;

            let components = sqlx::query_as::<_, Service>(
                "SELECT * FROM services WHERE id = ANY($1) ORDER BY position",
            )
            .bind(&service_ids)
            .fetch_all(&mut *tx)
            .await?;

            for (offset, component) in components.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO event_services (id, event_id, service_id, name, custom_price,
                        quantity, includes_vat, position, parent_item_id, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, 0, 1, FALSE, $5, $6, NOW(), NOW())",
                )
                .bind(Uuid::new_v4())
                .bind(event_id)
                .bind(component.id)
                .bind(&component.name)
                .bind(position + 1 + offset as i32)
                .bind(item.id)
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Update a line item's label, price, quantity or VAT flag
#[utoipa::path(
    put,
    path = "/api/v1/event-services/{item_id}",
    params(("item_id" = Uuid, Path, description = "Line item ID")),
    request_body = UpdateEventServiceRequest,
    responses(
        (status = 200, description = "Line item updated", body = EventService),
        (status = 404, description = "Line item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Line items"
)]
pub async fn update_event_service(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(body): Json<UpdateEventServiceRequest>,
) -> AppResult<Json<EventService>> {
    auth.require_admin()?;

    if body.quantity < 1 {
        return Err(AppError::Validation("quantity must be at least 1".to_string()));
    }

    let item = sqlx::query_as::<_, EventService>(
        "UPDATE event_services
         SET name = $1, custom_price = $2, quantity = $3, includes_vat = $4, updated_at = NOW()
         WHERE id = $5
         RETURNING *",
    )
    .bind(&body.name)
    .bind(body.custom_price)
    .bind(body.quantity)
    .bind(body.includes_vat)
    .bind(item_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Line item {} not found", item_id)))?;

    Ok(Json(item))
}

/// Remove a line item; removing a package main item removes its children too
#[utoipa::path(
    delete,
    path = "/api/v1/event-services/{item_id}",
    params(("item_id" = Uuid, Path, description = "Line item ID")),
    responses(
        (status = 204, description = "Line item deleted"),
        (status = 404, description = "Line item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Line items"
)]
pub async fn delete_event_service(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM event_services WHERE id = $1")
        .bind(item_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Line item {} not found", item_id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Reorder one event's line items (batch, all-or-nothing)
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/services/reorder",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    request_body = ReorderRequest,
    responses(
        (status = 204, description = "Order saved"),
        (status = 404, description = "A line item in the batch was not found; nothing was changed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Line items"
)]
pub async fn reorder_event_services(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<ReorderRequest>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;

    let mut tx = state.db.begin().await?;
    for item in &body.items {
        let result = sqlx::query(
            "UPDATE event_services SET position = $1, updated_at = NOW()
             WHERE id = $2 AND event_id = $3",
        )
        .bind(item.position)
        .bind(item.id)
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Line item {} not found on this event",
                item.id
            )));
        }
    }
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Replace the supplier assignment of a line item. Newly added suppliers start
/// as pending and get an assignment email when a `supplier_assignment`
/// notification template exists.
#[utoipa::path(
    put,
    path = "/api/v1/event-services/{item_id}/suppliers",
    params(("item_id" = Uuid, Path, description = "Line item ID")),
    request_body = AssignSuppliersRequest,
    responses(
        (status = 200, description = "Assignment updated", body = EventService),
        (status = 404, description = "Line item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Line items"
)]
pub async fn assign_suppliers(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(body): Json<AssignSuppliersRequest>,
) -> AppResult<Json<EventService>> {
    auth.require_admin()?;

    let item = fetch_item(&state.db, item_id).await?;
    let event = super::events::fetch_event(&state.db, item.event_id).await?;

    let mut statuses: HashMap<Uuid, AssignmentStatus> = HashMap::new();
    let mut notes: HashMap<Uuid, String> = HashMap::new();
    let mut added: Vec<Uuid> = Vec::new();

    for supplier_id in &body.supplier_ids {
        match item.supplier_statuses.0.get(supplier_id) {
            Some(existing) => {
                statuses.insert(*supplier_id, *existing);
                if let Some(note) = item.supplier_notes.0.get(supplier_id) {
                    notes.insert(*supplier_id, note.clone());
                }
            }
            None => {
                statuses.insert(*supplier_id, AssignmentStatus::Pending);
                added.push(*supplier_id);
            }
        }
    }

    let updated = sqlx::query_as::<_, EventService>(
        "UPDATE event_services
         SET supplier_ids = $1, supplier_statuses = $2, supplier_notes = $3, updated_at = NOW()
         WHERE id = $4
         RETURNING *",
    )
    .bind(&body.supplier_ids)
    .bind(SqlJson(&statuses))
    .bind(SqlJson(&notes))
    .bind(item_id)
    .fetch_one(&state.db)
    .await?;

    if !added.is_empty() {
        let template = sqlx::query_as::<_, NotificationTemplate>(
            "SELECT * FROM notification_templates WHERE key = 'supplier_assignment'",
        )
        .fetch_optional(&state.db)
        .await?;

        if let Some(template) = template {
            let suppliers = sqlx::query_as::<_, Supplier>(
                "SELECT * FROM suppliers WHERE id = ANY($1)",
            )
            .bind(&added)
            .fetch_all(&state.db)
            .await?;

            let settings = super::settings::load_settings(&state.db).await?;
            let email_svc = EmailService::new(Arc::clone(&state.config));
            let service_name = updated.name.clone();

            // Fire-and-forget: assignment emails never block or fail the request.
            tokio::spawn(async move {
                for supplier in suppliers {
                    let Some(email) = supplier.email.clone() else {
                        continue;
                    };
                    let vars = HashMap::from([
                        ("supplier_name".to_string(), supplier.name.clone()),
                        ("service_name".to_string(), service_name.clone()),
                        ("event_title".to_string(), event.title.clone()),
                        ("event_date".to_string(), event.event_date.to_string()),
                        (
                            "business_name".to_string(),
                            settings.business_name.clone(),
                        ),
                    ]);
                    if let Err(e) = email_svc
                        .send_notification(&email, &supplier.name, &template, &vars)
                        .await
                    {
                        warn!("Assignment email to {} failed: {}", email, e);
                    }
                }
            });
        }
    }

    Ok(Json(updated))
}

/// Set one supplier's status on a line item. Suppliers may only change their
/// own status; admins may change any.
#[utoipa::path(
    patch,
    path = "/api/v1/event-services/{item_id}/suppliers/{supplier_id}/status",
    params(
        ("item_id" = Uuid, Path, description = "Line item ID"),
        ("supplier_id" = Uuid, Path, description = "Supplier ID"),
    ),
    request_body = UpdateSupplierStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = EventService),
        (status = 404, description = "Line item or assignment not found"),
        (status = 403, description = "Not your assignment"),
    ),
    security(("bearer_auth" = [])),
    tag = "Line items"
)]
pub async fn update_supplier_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((item_id, supplier_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateSupplierStatusRequest>,
) -> AppResult<Json<EventService>> {
    let allowed = match auth.role {
        Role::Admin => true,
        Role::Supplier => auth.supplier_id == Some(supplier_id),
        Role::Client => false,
    };
    if !allowed {
        return Err(AppError::Forbidden(
            "You may only update your own assignment".to_string(),
        ));
    }

    let item = fetch_item(&state.db, item_id).await?;

    if !item.supplier_ids.contains(&supplier_id) {
        return Err(AppError::NotFound(format!(
            "Supplier {} is not assigned to this line item",
            supplier_id
        )));
    }

    let mut statuses = item.supplier_statuses.0.clone();
    statuses.insert(supplier_id, body.status);

    let mut notes = item.supplier_notes.0.clone();
    if let Some(note) = body.note {
        notes.insert(supplier_id, note);
    }

    let updated = sqlx::query_as::<_, EventService>(
        "UPDATE event_services
         SET supplier_statuses = $1, supplier_notes = $2, updated_at = NOW()
         WHERE id = $3
         RETURNING *",
    )
    .bind(SqlJson(&statuses))
    .bind(SqlJson(&notes))
    .bind(item_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// The authenticated supplier's assignments across all events
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/me/assignments",
    responses(
        (status = 200, description = "Assignments for the logged-in supplier", body = Vec<SupplierAssignment>),
        (status = 403, description = "Supplier accounts only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Line items"
)]
pub async fn my_assignments(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SupplierAssignment>>> {
    let supplier_id = match (auth.role, auth.supplier_id) {
        (Role::Supplier, Some(id)) => id,
        _ => {
            return Err(AppError::Forbidden(
                "Supplier accounts only".to_string(),
            ));
        }
    };

    let items = sqlx::query_as::<_, EventService>(
        "SELECT * FROM event_services WHERE $1 = ANY(supplier_ids) ORDER BY created_at",
    )
    .bind(supplier_id)
    .fetch_all(&state.db)
    .await?;

    let event_ids: Vec<Uuid> = items.iter().map(|i| i.event_id).collect();
    let events = sqlx::query_as::<_, crate::models::Event>(
        "SELECT * FROM events WHERE id = ANY($1)",
    )
    .bind(&event_ids)
    .fetch_all(&state.db)
    .await?;
    let events_by_id: HashMap<Uuid, &crate::models::Event> =
        events.iter().map(|e| (e.id, e)).collect();

    let assignments = items
        .iter()
        .filter_map(|item| {
            let event = events_by_id.get(&item.event_id)?;
            Some(SupplierAssignment {
                event_service_id: item.id,
                event_id: item.event_id,
                event_title: event.title.clone(),
                event_date: event.event_date,
                location: event.location.clone(),
                service_name: item.name.clone(),
                status: item
                    .supplier_statuses
                    .0
                    .get(&supplier_id)
                    .copied()
                    .unwrap_or(AssignmentStatus::Pending),
                note: item.supplier_notes.0.get(&supplier_id).cloned(),
            })
        })
        .collect();

    Ok(Json(assignments))
}
