// src/handlers/catalog.rs
//
// Catalog management: the services and packages an event can be built from.

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        CreatePackageRequest, CreateServiceRequest, Package, ReorderRequest, Service,
        UpdatePackageRequest, UpdateServiceRequest,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Apply a batch of `{id, position}` updates in one transaction. A missing row
/// aborts the whole batch so the stored order never ends up half-applied.
async fn apply_reorder(db: &PgPool, table: &str, body: &ReorderRequest) -> AppResult<()> {
    let mut tx = db.begin().await?;

    for item in &body.items {
        let result = sqlx::query(&format!(
            "UPDATE {table} SET position = $1, updated_at = NOW() WHERE id = $2"
        ))
        .bind(item.position)
        .bind(item.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Record {} not found during reorder",
                item.id
            )));
        }
    }

    tx.commit().await?;
    Ok(())
}

async fn next_position(db: &PgPool, table: &str) -> AppResult<i32> {
    let position: i32 =
        sqlx::query_scalar(&format!("SELECT COALESCE(MAX(position), -1) + 1 FROM {table}"))
            .fetch_one(db)
            .await?;
    Ok(position)
}

// ─── Services ─────────────────────────────────────────────────────────────────

/// Add a catalog service
#[utoipa::path(
    post,
    path = "/api/v1/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = Service),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_service(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateServiceRequest>,
) -> AppResult<(StatusCode, Json<Service>)> {
    auth.require_admin()?;

    let position = next_position(&state.db, "services").await?;
    let service = sqlx::query_as::<_, Service>(
        "INSERT INTO services (id, name, description, category, default_price, includes_vat, position, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&body.name)
    .bind(&body.description)
    .bind(&body.category)
    .bind(body.default_price)
    .bind(body.includes_vat)
    .bind(position)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(service)))
}

/// List catalog services in display order
#[utoipa::path(
    get,
    path = "/api/v1/services",
    responses((status = 200, description = "List of services", body = Vec<Service>)),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_services(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Service>>> {
    let services = sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY position")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(services))
}

/// Update a catalog service
#[utoipa::path(
    put,
    path = "/api/v1/services/{service_id}",
    params(("service_id" = Uuid, Path, description = "Service ID")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = Service),
        (status = 404, description = "Service not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_service(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
    Json(body): Json<UpdateServiceRequest>,
) -> AppResult<Json<Service>> {
    auth.require_admin()?;

    let service = sqlx::query_as::<_, Service>(
        "UPDATE services
         SET name = $1, description = $2, category = $3, default_price = $4,
             includes_vat = $5, is_active = $6, updated_at = NOW()
         WHERE id = $7
         RETURNING *",
    )
    .bind(&body.name)
    .bind(&body.description)
    .bind(&body.category)
    .bind(body.default_price)
    .bind(body.includes_vat)
    .bind(body.is_active)
    .bind(service_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Service {} not found", service_id)))?;

    Ok(Json(service))
}

/// Delete a catalog service
#[utoipa::path(
    delete,
    path = "/api/v1/services/{service_id}",
    params(("service_id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 404, description = "Service not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_service(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM services WHERE id = $1")
        .bind(service_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Service {} not found",
            service_id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Reorder catalog services (batch, all-or-nothing)
#[utoipa::path(
    post,
    path = "/api/v1/services/reorder",
    request_body = ReorderRequest,
    responses(
        (status = 204, description = "Order saved"),
        (status = 404, description = "A record in the batch was not found; nothing was changed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn reorder_services(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ReorderRequest>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;
    apply_reorder(&state.db, "services", &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Packages ─────────────────────────────────────────────────────────────────

/// Add a package (bundle of services at one price)
#[utoipa::path(
    post,
    path = "/api/v1/packages",
    request_body = CreatePackageRequest,
    responses(
        (status = 201, description = "Package created", body = Package),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_package(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreatePackageRequest>,
) -> AppResult<(StatusCode, Json<Package>)> {
    auth.require_admin()?;

    let position = next_position(&state.db, "packages").await?;
    let package = sqlx::query_as::<_, Package>(
        "INSERT INTO packages (id, name, description, price, includes_vat, service_ids, position, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&body.name)
    .bind(&body.description)
    .bind(body.price)
    .bind(body.includes_vat)
    .bind(&body.service_ids)
    .bind(position)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(package)))
}

/// List packages in display order
#[utoipa::path(
    get,
    path = "/api/v1/packages",
    responses((status = 200, description = "List of packages", body = Vec<Package>)),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_packages(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Package>>> {
    let packages = sqlx::query_as::<_, Package>("SELECT * FROM packages ORDER BY position")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(packages))
}

/// Update a package
#[utoipa::path(
    put,
    path = "/api/v1/packages/{package_id}",
    params(("package_id" = Uuid, Path, description = "Package ID")),
    request_body = UpdatePackageRequest,
    responses(
        (status = 200, description = "Package updated", body = Package),
        (status = 404, description = "Package not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_package(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(package_id): Path<Uuid>,
    Json(body): Json<UpdatePackageRequest>,
) -> AppResult<Json<Package>> {
    auth.require_admin()?;

    let package = sqlx::query_as::<_, Package>(
        "UPDATE packages
         SET name = $1, description = $2, price = $3, includes_vat = $4,
             service_ids = $5, is_active = $6, updated_at = NOW()
         WHERE id = $7
         RETURNING *",
    )
    .bind(&body.name)
    .bind(&body.description)
    .bind(body.price)
    .bind(body.includes_vat)
    .bind(&body.service_ids)
    .bind(body.is_active)
    .bind(package_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Package {} not found", package_id)))?;

    Ok(Json(package))
}

/// Delete a package
#[utoipa::path(
    delete,
    path = "/api/v1/packages/{package_id}",
    params(("package_id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 204, description = "Package deleted"),
        (status = 404, description = "Package not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_package(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(package_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;

    let result = sqlx::query("DELETE FROM packages WHERE id = $1")
        .bind(package_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Package {} not found",
            package_id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Reorder packages (batch, all-or-nothing)
#[utoipa::path(
    post,
    path = "/api/v1/packages/reorder",
    request_body = ReorderRequest,
    responses(
        (status = 204, description = "Order saved"),
        (status = 404, description = "A record in the batch was not found; nothing was changed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn reorder_packages(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ReorderRequest>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;
    apply_reorder(&state.db, "packages", &body).await?;
    Ok(StatusCode::NO_CONTENT)
}
