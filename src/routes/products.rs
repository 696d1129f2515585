use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::catalog::{ProductFilter, StatusFilter};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::models::{now, Product, ProductInput, Supplier};
use crate::routes::require_supplier;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl ProductQuery {
    fn into_filter(self) -> AppResult<ProductFilter> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<StatusFilter>().map_err(AppError::BadRequest)?),
        };
        Ok(ProductFilter {
            search: self.search,
            category_id: self.category,
            status,
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route(
            "/api/products/{id}",
            get(get_one).patch(update).delete(delete),
        )
}

async fn owned_product(state: &AppState, supplier: &Supplier, id: &str) -> AppResult<Product> {
    match state.catalog.products.get_by_id(id).await? {
        Some(product) if product.supplier_id == supplier.id => Ok(product),
        _ => Err(AppError::NotFound),
    }
}

/// Products may only be filed under one of the supplier's own categories.
async fn check_category(state: &AppState, supplier: &Supplier, category_id: &str) -> AppResult<()> {
    match state.catalog.categories.get_by_id(category_id).await? {
        Some(category) if category.supplier_id == supplier.id => Ok(()),
        _ => Err(AppError::BadRequest(format!(
            "Unknown category: {category_id}"
        ))),
    }
}

async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let filter = query.into_filter()?;
    let supplier = require_supplier(&state, &user).await?;
    let products = state.catalog.products.get_by_supplier(&supplier.id).await?;
    Ok(Json(filter.apply(products)))
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let supplier = require_supplier(&state, &user).await?;
    let product = Product::new(&supplier.id, input, &now())?;
    check_category(&state, &supplier, &product.category_id).await?;

    let product = state.catalog.products.create(&product).await?;
    tracing::info!(product_id = %product.id, supplier_id = %supplier.id, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_one(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let supplier = require_supplier(&state, &user).await?;
    Ok(Json(owned_product(&state, &supplier, &id).await?))
}

/// Prices and availability are recomputed from the merged record before it
/// is written back.
async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    let supplier = require_supplier(&state, &user).await?;
    let mut product = owned_product(&state, &supplier, &id).await?;

    let previous_category = product.category_id.clone();
    product.apply(input, &now())?;
    if product.category_id != previous_category {
        check_category(&state, &supplier, &product.category_id).await?;
    }

    if !state.catalog.products.save(&product).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(product))
}

async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let supplier = require_supplier(&state, &user).await?;
    owned_product(&state, &supplier, &id).await?;
    state.catalog.products.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
