// src/handlers/suppliers.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{CreateSupplierRequest, Supplier, UpdateSupplierRequest},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Add a supplier
#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = Supplier),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn create_supplier(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateSupplierRequest>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    auth.require_admin()?;

    let supplier = sqlx::query_as::<_, Supplier>(
        "INSERT INTO suppliers (id, name, contact_name, email, phone, category, notes, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&body.name)
    .bind(&body.contact_name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.category)
    .bind(&body.notes)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

/// List suppliers
#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    responses(
        (status = 200, description = "List of suppliers", body = Vec<Supplier>),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn list_suppliers(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Supplier>>> {
    auth.require_admin()?;

    let suppliers =
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(suppliers))
}

/// Get a single supplier
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{supplier_id}",
    params(("supplier_id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier detail", body = Supplier),
        (status = 404, description = "Supplier not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn get_supplier(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    auth.require_admin()?;

    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
        .bind(supplier_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Supplier {} not found", supplier_id)))?;

    Ok(Json(supplier))
}

/// Update a supplier
#[utoipa::path(
    put,
    path = "/api/v1/suppliers/{supplier_id}",
    params(("supplier_id" = Uuid, Path, description = "Supplier ID")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Supplier updated", body = Supplier),
        (status = 404, description = "Supplier not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn update_supplier(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Json(body): Json<UpdateSupplierRequest>,
) -> AppResult<Json<Supplier>> {
    auth.require_admin()?;

    let supplier = sqlx::query_as::<_, Supplier>(
        "UPDATE suppliers
         SET name = $1, contact_name = $2, email = $3, phone = $4,
             category = $5, notes = $6, is_active = $7, updated_at = NOW()
         WHERE id = $8
         RETURNING *",
    )
    .bind(&body.name)
    .bind(&body.contact_name)
    .bind(&body.email)
    .bind(&body.phone)
    .bind(&body.category)
    .bind(&body.notes)
    .bind(body.is_active)
    .bind(supplier_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Supplier {} not found", supplier_id)))?;

    Ok(Json(supplier))
}

/// Deactivate a supplier (kept on past events, hidden from new assignments)
#[utoipa::path(
    delete,
    path = "/api/v1/suppliers/{supplier_id}",
    params(("supplier_id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier deactivated", body = Supplier),
        (status = 404, description = "Supplier not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn deactivate_supplier(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    auth.require_admin()?;

    let supplier = sqlx::query_as::<_, Supplier>(
        "UPDATE suppliers SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(supplier_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Supplier {} not found", supplier_id)))?;

    Ok(Json(supplier))
}
