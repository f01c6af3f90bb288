use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use storefront_core::models::Order;
use storefront_order::{OrderError, PlaceOrderRequest};
use uuid::Uuid;

use crate::{error::AppError, extract::AppJson, state::AppState};

#[derive(Debug, Deserialize)]
pub struct OrdersByUserRequest {
    pub userid: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderByIdRequest {
    pub orderid: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders/placeorder", post(place_order))
        .route("/api/orders/getordersbyuserid", post(get_orders_by_user_id))
        .route("/api/orders/getorderbyid", post(get_order_by_id))
        .route("/api/orders/getallorders", get(get_all_orders))
}

/// POST /api/orders/placeorder
/// Charge the card, record the order and reduce CMS stock
async fn place_order(
    State(state): State<AppState>,
    AppJson(req): AppJson<PlaceOrderRequest>,
) -> Result<&'static str, AppError> {
    let outcome = state.orders.place_order(req).await.map_err(|e| match e {
        OrderError::ChargeFailed(msg) => AppError::PaymentFailed(msg),
        OrderError::InvalidRequest(msg) => AppError::ValidationError(msg),
        persist @ OrderError::PersistFailed { .. } => AppError::storage(persist),
    })?;

    if !outcome.stock.is_complete() {
        tracing::warn!(
            "Order {} placed; {} CMS stock update(s) failed",
            outcome.order.id,
            outcome.stock.failures().count()
        );
    }

    Ok("Order Placed Successfully")
}

/// POST /api/orders/getordersbyuserid
async fn get_orders_by_user_id(
    State(state): State<AppState>,
    AppJson(req): AppJson<OrdersByUserRequest>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state
        .order_repo
        .list_orders_for_user(&req.userid)
        .await
        .map_err(AppError::storage)?;
    Ok(Json(orders))
}

/// POST /api/orders/getorderbyid
/// Unknown ids answer `null`
async fn get_order_by_id(
    State(state): State<AppState>,
    AppJson(req): AppJson<OrderByIdRequest>,
) -> Result<Json<Option<Order>>, AppError> {
    let order_id = Uuid::parse_str(&req.orderid)?;
    let order = state.order_repo.get_order(order_id).await.map_err(AppError::storage)?;
    Ok(Json(order))
}

/// GET /api/orders/getallorders
async fn get_all_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state.order_repo.list_orders().await.map_err(AppError::storage)?;
    Ok(Json(orders))
}
