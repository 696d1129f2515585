use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::catalog::SupplierSummary;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::models::{now, CascadeReport, Supplier, SupplierInput};
use crate::routes::{changed_fields, require_supplier};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/supplier",
            get(get_own)
                .post(create)
                .patch(update)
                .delete(delete),
        )
        .route("/api/supplier/summary", get(summary))
        .route("/api/suppliers/{id}", get(get_by_id))
}

async fn get_own(State(state): State<AppState>, user: CurrentUser) -> AppResult<Json<Supplier>> {
    Ok(Json(require_supplier(&state, &user).await?))
}

/// One supplier per owner; a second create is refused.
async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<SupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let suppliers = &state.catalog.suppliers;
    if suppliers.first_by_owner(&user.id).await?.is_some() {
        return Err(AppError::Conflict(
            "A supplier already exists for this account".to_string(),
        ));
    }

    let supplier = suppliers
        .create(&Supplier::new(&user.id, input, &now()))
        .await?;
    tracing::info!(supplier_id = %supplier.id, owner_id = %user.id, "Supplier created");

    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<SupplierInput>,
) -> AppResult<Json<Supplier>> {
    let supplier = require_supplier(&state, &user).await?;
    let changes = changed_fields(&supplier, &input)?;
    if changes.is_empty() {
        return Ok(Json(supplier));
    }

    let suppliers = &state.catalog.suppliers;
    suppliers.update(&supplier.id, changes).await?;
    let updated = suppliers
        .get_by_id(&supplier.id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(updated))
}

/// Removes the supplier together with its products and categories.
async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<CascadeReport>> {
    let supplier = require_supplier(&state, &user).await?;
    let report = state.catalog.delete_supplier_cascade(&supplier.id).await?;
    Ok(Json(report))
}

async fn summary(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<SupplierSummary>> {
    let supplier = require_supplier(&state, &user).await?;
    let categories = state.catalog.categories.get_by_supplier(&supplier.id).await?;
    let products = state.catalog.products.get_by_supplier(&supplier.id).await?;
    Ok(Json(SupplierSummary::build(&categories, &products)))
}

async fn get_by_id(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Supplier>> {
    state
        .catalog
        .suppliers
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}
