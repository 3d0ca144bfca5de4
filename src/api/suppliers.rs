use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    api::{
        AppState,
        error::ApiError,
        models::{SupplierDto, SupplierRequest, validated},
    },
    auth::Claims,
    core::SupplierId,
    db::suppliers::SupplierWithRates,
    prelude::*,
};

#[instrument(skip_all, fields(username = %claims.sub))]
pub async fn list(
    claims: Claims,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<SupplierDto>> {
    let suppliers = state.db.suppliers().list().await;
    info!(n_suppliers = suppliers.len(), "listed");
    Json(suppliers.into_iter().map(SupplierDto::from).collect())
}

#[instrument(skip_all, fields(username = %claims.sub, id = %id))]
pub async fn get(
    claims: Claims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<SupplierId>,
) -> Result<Json<SupplierDto>, ApiError> {
    let supplier = state.db.suppliers().get(id).await.ok_or_else(|| not_found(id))?;
    Ok(Json(supplier.into()))
}

#[instrument(skip_all, fields(username = %claims.sub))]
pub async fn create(
    claims: Claims,
    State(state): State<Arc<AppState>>,
    request: Result<Json<SupplierRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SupplierDto>), ApiError> {
    let request = validated(request)?;
    let supplier = state.db.suppliers().insert(request.into()).await?;
    Ok((StatusCode::CREATED, Json(SupplierWithRates { supplier, rates: Vec::new() }.into())))
}

#[instrument(skip_all, fields(username = %claims.sub, id = %id))]
pub async fn update(
    claims: Claims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<SupplierId>,
    request: Result<Json<SupplierRequest>, JsonRejection>,
) -> Result<Json<SupplierDto>, ApiError> {
    let request = validated(request)?;
    state.db.suppliers().update(id, request.into()).await?.ok_or_else(|| not_found(id))?;
    let supplier = state.db.suppliers().get(id).await.ok_or_else(|| not_found(id))?;
    info!("updated");
    Ok(Json(supplier.into()))
}

#[instrument(skip_all, fields(username = %claims.sub, id = %id))]
pub async fn delete(
    claims: Claims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<SupplierId>,
) -> Result<StatusCode, ApiError> {
    if state.db.suppliers().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

fn not_found(id: SupplierId) -> ApiError {
    ApiError::not_found(format_args!("Supplier with ID {id}"))
}
