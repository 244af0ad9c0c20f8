use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{
    dto::checkout::{ReconciliationList, ReconciliationReport},
    dto::orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{order_service, reconciliation_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", axum::routing::get(list_orders))
        .route("/orders/{id}", axum::routing::get(get_order))
        .route("/orders/{id}/status", axum::routing::patch(update_order_status))
        .route("/orders/{id}", axum::routing::delete(delete_order))
        .route(
            "/reconciliations",
            axum::routing::get(list_reconciliations),
        )
        .route(
            "/reconciliations/run",
            axum::routing::post(run_reconciliations),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("payment_status" = Option<String>, Query, description = "pending | complete | failed"),
        ("sort_order" = Option<String>, Query, description = "asc | desc by placed_at"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All orders", body = ApiResponse<OrderList>),
        (status = 403, description = "Admin only"),
    ),
    tag = "admin"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    crate::middleware::auth::ensure_admin(&user)?;
    Ok(Json(order_service::list_orders(&state, &user, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order with line items", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Order not found"),
    ),
    tag = "admin"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    crate::middleware::auth::ensure_admin(&user)?;
    Ok(Json(order_service::get_order(&state, &user, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Order>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Order not found"),
    ),
    tag = "admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(Json(
        order_service::update_order_status(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Order not found"),
    ),
    tag = "admin"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(order_service::delete_order(&state, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/reconciliations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unresolved reconciliation entries", body = ApiResponse<ReconciliationList>),
        (status = 403, description = "Admin only"),
    ),
    tag = "admin"
)]
pub async fn list_reconciliations(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ReconciliationList>>> {
    Ok(Json(
        reconciliation_service::list_pending(&state.pool, &user).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/reconciliations/run",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reconciliation report", body = ApiResponse<ReconciliationReport>),
        (status = 403, description = "Admin only"),
    ),
    tag = "admin"
)]
pub async fn run_reconciliations(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ReconciliationReport>>> {
    Ok(Json(reconciliation_service::run(&state, &user).await?))
}
