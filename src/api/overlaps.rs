use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use chrono::Local;
use serde::Deserialize;

use crate::{
    api::{AppState, error::ApiError, models::OverlapGroupDto},
    auth::Claims,
    core::{OverlapDetector, SupplierId},
    prelude::*,
    validation::SUPPLIER_ID_RANGE,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapsQuery {
    supplier_id: Option<i64>,
}

#[instrument(skip_all, fields(username = %claims.sub))]
pub async fn get(
    claims: Claims,
    State(state): State<Arc<AppState>>,
    query: Result<Query<OverlapsQuery>, QueryRejection>,
) -> Result<Json<Vec<OverlapGroupDto>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let supplier_id = match query.supplier_id {
        Some(supplier_id) if !SUPPLIER_ID_RANGE.contains(&supplier_id) => {
            warn!(supplier_id, "invalid supplier ID");
            return Err(ApiError::BadRequest(
                "Supplier ID must be between 1 and 10,000,000".to_string(),
            ));
        }
        Some(supplier_id) => {
            let supplier_id = SupplierId(u32::try_from(supplier_id).context("supplier ID")?);
            if !state.db.suppliers().exists(supplier_id).await {
                warn!(%supplier_id, "supplier not found");
                return Err(ApiError::not_found(format_args!("Supplier with ID {supplier_id}")));
            }
            Some(supplier_id)
        }
        None => None,
    };

    let snapshot = state.db.rates().overlap_snapshot(supplier_id).await;
    let groups = OverlapDetector::builder()
        .today(Local::now().date_naive())
        .strategy(state.strategy)
        .build()
        .detect(&snapshot.rates, supplier_id, &snapshot.names);
    info!(n_groups = groups.len(), "found overlaps");
    Ok(Json(groups.into_iter().map(OverlapGroupDto::from).collect()))
}
