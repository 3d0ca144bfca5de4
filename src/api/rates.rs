use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    api::{
        AppState,
        error::ApiError,
        models::{RateDto, RateRequest, validated},
    },
    auth::Claims,
    core::{RateId, SupplierId},
    prelude::*,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesQuery {
    supplier_id: Option<SupplierId>,
}

#[instrument(skip_all, fields(username = %claims.sub))]
pub async fn list(
    claims: Claims,
    State(state): State<Arc<AppState>>,
    query: Result<Query<RatesQuery>, QueryRejection>,
) -> Result<Json<Vec<RateDto>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let rates = state.db.rates().list(query.supplier_id).await;
    info!(n_rates = rates.len(), "listed");
    Ok(Json(rates.into_iter().map(RateDto::from).collect()))
}

#[instrument(skip_all, fields(username = %claims.sub, id = %id))]
pub async fn get(
    claims: Claims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<RateId>,
) -> Result<Json<RateDto>, ApiError> {
    let rate = state.db.rates().get(id).await.ok_or_else(|| not_found(id))?;
    Ok(Json(rate.into()))
}

#[instrument(skip_all, fields(username = %claims.sub))]
pub async fn create(
    claims: Claims,
    State(state): State<Arc<AppState>>,
    request: Result<Json<RateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RateDto>), ApiError> {
    let request = validated(request)?;
    let rate = state.db.rates().insert(request.into()).await?;
    Ok((StatusCode::CREATED, Json(rate.into())))
}

#[instrument(skip_all, fields(username = %claims.sub, id = %id))]
pub async fn update(
    claims: Claims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<RateId>,
    request: Result<Json<RateRequest>, JsonRejection>,
) -> Result<Json<RateDto>, ApiError> {
    let request = validated(request)?;
    let rate = state.db.rates().update(id, request.into()).await?.ok_or_else(|| not_found(id))?;
    info!("updated");
    Ok(Json(rate.into()))
}

#[instrument(skip_all, fields(username = %claims.sub, id = %id))]
pub async fn delete(
    claims: Claims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<RateId>,
) -> Result<StatusCode, ApiError> {
    if state.db.rates().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

fn not_found(id: RateId) -> ApiError {
    ApiError::not_found(format_args!("Rate with ID {id}"))
}
