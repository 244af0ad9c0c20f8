use axum::{
    Json, Router,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{
    dto::customers::{CustomerList, CustomerProfile, MeQuery, UpdateCustomerRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Customer,
    response::ApiResponse,
    routes::params::Pagination,
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_customers))
        .route("/me", axum::routing::get(me))
        .route("/me", axum::routing::put(update_me))
        .route("/{id}", axum::routing::get(get_customer))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List customers", body = ApiResponse<CustomerList>),
        (status = 403, description = "Admin only"),
    ),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    Ok(Json(
        customer_service::list_customers(&state.pool, &user, pagination).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/customers/me",
    params(
        ("cart_id" = Option<Uuid>, Query, description = "Anonymous cart to claim"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current customer profile", body = ApiResponse<CustomerProfile>)
    ),
    tag = "customers"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MeQuery>,
) -> AppResult<Json<ApiResponse<CustomerProfile>>> {
    Ok(Json(customer_service::me(&state.pool, &user, query).await?))
}

#[utoipa::path(
    put,
    path = "/api/customers/me",
    params(
        ("cart_id" = Option<Uuid>, Query, description = "Anonymous cart to claim"),
    ),
    request_body = UpdateCustomerRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<CustomerProfile>),
        (status = 400, description = "Invalid membership"),
    ),
    tag = "customers"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MeQuery>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<CustomerProfile>>> {
    Ok(Json(
        customer_service::update_me(&state.pool, &user, query, payload).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Get customer", body = ApiResponse<Customer>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Customer not found"),
    ),
    tag = "customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    Ok(Json(customer_service::get_customer(&state.pool, &user, id).await?))
}
