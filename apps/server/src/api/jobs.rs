use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};
use tobby_core::recurring::GenerationReport;

#[derive(Deserialize)]
struct GenerateQuery {
    /// Overrides the generation date. Used for backfills and testing;
    /// defaults to today (UTC).
    date: Option<NaiveDate>,
}

/// External trigger for the generation job, for cron-style setups that
/// prefer to drive the schedule themselves.
///
/// Safe to call more than once per day; already-generated rules are skipped.
async fn generate_recurring(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GenerateQuery>,
) -> ApiResult<Json<GenerationReport>> {
    let date = query.date.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let report = state.generation_service.run_for_date(date).await?;
    Ok(Json(report))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/jobs/generate-recurring", post(generate_recurring))
}
