use axum::{
    Json, Router,
    extract::{Query, State},
};

use crate::{
    dto::checkout::{
        CheckoutSessionRequest, CheckoutSessionResponse, GuestOrderRequest, GuestOrderResponse,
        OrderActionRequest, PaymentResult, PaymentSuccessQuery,
    },
    dto::orders::CancelledOrder,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{checkout_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/create-checkout-session",
            axum::routing::post(create_checkout_session),
        )
        .route("/payment-success", axum::routing::get(payment_success))
        .route("/complete-order", axum::routing::post(complete_order))
        .route("/cancel-order", axum::routing::post(cancel_order))
        .route("/guest-orders", axum::routing::post(guest_order))
        .route(
            "/guest-checkout-session",
            axum::routing::post(guest_checkout_session),
        )
        .route(
            "/guest-payment-success",
            axum::routing::get(guest_payment_success),
        )
}

#[utoipa::path(
    post,
    path = "/api/create-checkout-session",
    request_body = CheckoutSessionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Hosted checkout session", body = ApiResponse<CheckoutSessionResponse>),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Order is already paid"),
        (status = 502, description = "Payment processor unavailable"),
    ),
    tag = "checkout"
)]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutSessionRequest>,
) -> AppResult<Json<ApiResponse<CheckoutSessionResponse>>> {
    Ok(Json(
        checkout_service::create_checkout_session(&state, &user, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/payment-success",
    params(
        ("session_id" = String, Query, description = "Checkout session ID"),
        ("order_id" = Uuid, Query, description = "Order ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payment confirmed", body = ApiResponse<PaymentResult>),
        (status = 400, description = "Payment not completed"),
        (status = 502, description = "Status check failed, order queued for reconciliation"),
    ),
    tag = "checkout"
)]
pub async fn payment_success(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PaymentSuccessQuery>,
) -> AppResult<Json<ApiResponse<PaymentResult>>> {
    Ok(Json(
        checkout_service::payment_success(&state, &user, query).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/complete-order",
    request_body = OrderActionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order completed", body = ApiResponse<PaymentResult>),
        (status = 403, description = "Not the owner"),
    ),
    tag = "checkout"
)]
pub async fn complete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<OrderActionRequest>,
) -> AppResult<Json<ApiResponse<PaymentResult>>> {
    Ok(Json(
        checkout_service::complete_order(&state, &user, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/cancel-order",
    request_body = OrderActionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<CancelledOrder>),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Order is no longer pending"),
    ),
    tag = "checkout"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<OrderActionRequest>,
) -> AppResult<Json<ApiResponse<CancelledOrder>>> {
    Ok(Json(
        order_service::cancel_order(&state, &user, payload.order_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/guest-orders",
    request_body = GuestOrderRequest,
    responses(
        (status = 200, description = "Guest order created", body = ApiResponse<GuestOrderResponse>),
        (status = 400, description = "Cart missing or empty"),
    ),
    tag = "checkout"
)]
pub async fn guest_order(
    State(state): State<AppState>,
    Json(payload): Json<GuestOrderRequest>,
) -> AppResult<Json<ApiResponse<GuestOrderResponse>>> {
    Ok(Json(order_service::create_guest_order(&state, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/guest-checkout-session",
    request_body = OrderActionRequest,
    responses(
        (status = 200, description = "Hosted checkout session", body = ApiResponse<CheckoutSessionResponse>),
        (status = 403, description = "Order belongs to a customer"),
        (status = 502, description = "Payment processor unavailable"),
    ),
    tag = "checkout"
)]
pub async fn guest_checkout_session(
    State(state): State<AppState>,
    Json(payload): Json<OrderActionRequest>,
) -> AppResult<Json<ApiResponse<CheckoutSessionResponse>>> {
    Ok(Json(
        checkout_service::guest_checkout_session(&state, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/guest-payment-success",
    params(
        ("session_id" = String, Query, description = "Checkout session ID"),
        ("order_id" = Uuid, Query, description = "Order ID"),
    ),
    responses(
        (status = 200, description = "Payment confirmed", body = ApiResponse<PaymentResult>),
        (status = 400, description = "Payment not completed"),
        (status = 403, description = "Order belongs to a customer"),
        (status = 502, description = "Status check failed, order queued for reconciliation"),
    ),
    tag = "checkout"
)]
pub async fn guest_payment_success(
    State(state): State<AppState>,
    Query(query): Query<PaymentSuccessQuery>,
) -> AppResult<Json<ApiResponse<PaymentResult>>> {
    Ok(Json(
        checkout_service::guest_payment_success(&state, query).await?,
    ))
}
