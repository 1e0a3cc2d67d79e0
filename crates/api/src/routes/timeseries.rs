//! Historical Timeseries Routes

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use storage::HistoryRecord;

use crate::AppState;

/// Query parameters for the timeseries endpoint
#[derive(Debug, Default, Deserialize)]
pub struct TimeseriesQuery {
    /// Maximum number of records, capped at the configured history limit
    pub limit: Option<usize>,
}

/// `GET /timeseries`: most recent historical records, oldest first
pub async fn get_timeseries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeseriesQuery>,
) -> Json<Vec<HistoryRecord>> {
    let limit = params
        .limit
        .map_or(state.history_limit, |limit| limit.min(state.history_limit));

    Json(state.context.history().recent(limit))
}
