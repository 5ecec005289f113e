use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};
use tobby_core::recurring::{
    NewRecurringRule, RecurringRule, RecurringRuleUpdate, RecurringRuleWithLogs,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: String,
}

async fn list_rules(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<RecurringRule>>> {
    let rules = state.recurring_service.list_rules(&query.user_id)?;
    Ok(Json(rules))
}

/// Rules joined with their generation history, newest entries first.
async fn list_rules_full(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<RecurringRuleWithLogs>>> {
    let rules = state.recurring_service.list_rules_with_logs(&query.user_id)?;
    Ok(Json(rules))
}

async fn get_rule(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RecurringRule>> {
    let rule = state.recurring_service.get_rule(&id)?;
    Ok(Json(rule))
}

async fn create_rule(
    State(state): State<Arc<AppState>>,
    Json(new_rule): Json<NewRecurringRule>,
) -> ApiResult<Json<RecurringRule>> {
    let rule = state.recurring_service.create_rule(new_rule).await?;
    Ok(Json(rule))
}

async fn update_rule(
    State(state): State<Arc<AppState>>,
    Json(update): Json<RecurringRuleUpdate>,
) -> ApiResult<Json<RecurringRule>> {
    let rule = state.recurring_service.update_rule(update).await?;
    Ok(Json(rule))
}

async fn delete_rule(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let _ = state.recurring_service.delete_rule(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn pause_rule(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RecurringRule>> {
    let rule = state.recurring_service.set_rule_active(id, false).await?;
    Ok(Json(rule))
}

async fn resume_rule(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RecurringRule>> {
    let rule = state.recurring_service.set_rule_active(id, true).await?;
    Ok(Json(rule))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recurring/full", get(list_rules_full))
        .route(
            "/recurring",
            get(list_rules).post(create_rule).put(update_rule),
        )
        .route("/recurring/{id}", get(get_rule).delete(delete_rule))
        .route("/recurring/{id}/pause", post(pause_rule))
        .route("/recurring/{id}/resume", post(resume_rule))
}
