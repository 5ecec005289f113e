use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};
use tobby_core::categories::{Category, NewCategory};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: String,
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = state.category_service.list_categories(&query.user_id)?;
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(new_category): Json<NewCategory>,
) -> ApiResult<Json<Category>> {
    let category = state.category_service.create_category(new_category).await?;
    Ok(Json(category))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    Json(category): Json<Category>,
) -> ApiResult<Json<Category>> {
    let category = state.category_service.update_category(category).await?;
    Ok(Json(category))
}

async fn delete_category(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let _ = state.category_service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/categories",
            get(list_categories)
                .post(create_category)
                .put(update_category),
        )
        .route("/categories/{id}", delete(delete_category))
}
