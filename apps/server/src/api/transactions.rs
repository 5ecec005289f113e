use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};
use tobby_core::transactions::{
    NewTransaction, Transaction, TransactionUpdate, TransactionWithCategories,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    user_id: String,
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let transactions = state.transaction_service.list_transactions(&query.user_id)?;
    Ok(Json(transactions))
}

/// Transactions joined with their assigned categories, as the client's
/// overview screens consume them.
async fn list_transactions_full(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<TransactionWithCategories>>> {
    let transactions = state
        .transaction_service
        .list_transactions_with_categories(&query.user_id)?;
    Ok(Json(transactions))
}

async fn get_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Transaction>> {
    let transaction = state.transaction_service.get_transaction(&id)?;
    Ok(Json(transaction))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(new_transaction): Json<NewTransaction>,
) -> ApiResult<Json<Transaction>> {
    let transaction = state
        .transaction_service
        .create_transaction(new_transaction)
        .await?;
    Ok(Json(transaction))
}

async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Json(update): Json<TransactionUpdate>,
) -> ApiResult<Json<Transaction>> {
    let transaction = state.transaction_service.update_transaction(update).await?;
    Ok(Json(transaction))
}

async fn delete_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.transaction_service.delete_transaction(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_transaction_categories(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(category_ids): Json<Vec<String>>,
) -> ApiResult<StatusCode> {
    state
        .category_service
        .set_transaction_categories(id, category_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/transactions/full", get(list_transactions_full))
        .route(
            "/transactions",
            get(list_transactions)
                .post(create_transaction)
                .put(update_transaction),
        )
        .route(
            "/transactions/{id}",
            get(get_transaction).delete(delete_transaction),
        )
        .route(
            "/transactions/{id}/categories",
            put(set_transaction_categories),
        )
}
