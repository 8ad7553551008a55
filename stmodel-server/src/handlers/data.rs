//! Feed diagnostics handler

use axum::{extract::{Query, State}, Json};

use stmodel_core::constants::DEFAULT_LOOKBACK_HOURS;
use crate::AppState;
use crate::models::{FetchQuery, FetchResponse};

/// Raw feed contents as the fetcher sees them
pub async fn fetch(
    State(state): State<AppState>,
    Query(query): Query<FetchQuery>,
) -> Json<FetchResponse> {
    let hours = query.hours.unwrap_or(DEFAULT_LOOKBACK_HOURS);
    let data = state.fetcher.fetch_all(hours).await;

    Json(FetchResponse {
        status: "ok",
        capteurs_records: data.capteurs.len(),
        satellite_records: data.satellite.len(),
        data,
    })
}
