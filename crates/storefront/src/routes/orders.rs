//! Order route handlers.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use atelier_core::order::{Order, OrderDraft, OrderError};

use super::ApiJson;
use crate::db::orders::OrderRepository;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Order history response.
#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
}

/// Place an order for the caller.
///
/// POST /api/orders
///
/// The submitted totals must match the ones recomputed from the items.
#[instrument(skip_all, fields(user_id = %user.id, items = draft.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(draft): ApiJson<OrderDraft>,
) -> Result<Json<Order>> {
    draft.validate()?;

    let order = Order::place(draft, user.id, Utc::now());
    OrderRepository::new(state.store())
        .append(&order)
        .await
        .map_err(|e| OrderError::OrderCreationFailed(e.to_string()))?;

    add_breadcrumb("order", "Order placed", Some(&[("order_id", order.id.as_str())]));
    tracing::info!(order_id = %order.id, total = %order.total, "Order placed");
    Ok(Json(order))
}

/// The caller's orders, oldest first.
///
/// GET /api/orders
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<OrderList>> {
    let orders = OrderRepository::new(state.store())
        .list_for_user(user.id)
        .await?;
    Ok(Json(OrderList { orders }))
}
