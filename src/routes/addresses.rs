use axum::{
    Json, Router,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    dto::addresses::{AddressList, CreateAddressRequest, UpdateAddressRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Address,
    response::ApiResponse,
    services::address_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_addresses))
        .route("/", axum::routing::post(create_address))
        .route("/{id}", axum::routing::get(get_address))
        .route("/{id}", axum::routing::put(update_address))
        .route("/{id}", axum::routing::delete(delete_address))
}

#[utoipa::path(
    get,
    path = "/api/addresses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List own addresses", body = ApiResponse<AddressList>)
    ),
    tag = "addresses"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AddressList>>> {
    Ok(Json(address_service::list_addresses(&state.pool, &user).await?))
}

#[utoipa::path(
    get,
    path = "/api/addresses/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Get address", body = ApiResponse<Address>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Address not found"),
    ),
    tag = "addresses"
)]
pub async fn get_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Address>>> {
    Ok(Json(address_service::get_address(&state.pool, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/addresses",
    request_body = CreateAddressRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Address created", body = ApiResponse<Address>)
    ),
    tag = "addresses"
)]
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAddressRequest>,
) -> AppResult<Json<ApiResponse<Address>>> {
    Ok(Json(
        address_service::create_address(&state.pool, &user, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/addresses/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    request_body = UpdateAddressRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated address", body = ApiResponse<Address>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Address not found"),
    ),
    tag = "addresses"
)]
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAddressRequest>,
) -> AppResult<Json<ApiResponse<Address>>> {
    Ok(Json(
        address_service::update_address(&state.pool, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/addresses/{id}",
    params(
        ("id" = Uuid, Path, description = "Address ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted address"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Address not found"),
    ),
    tag = "addresses"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        address_service::delete_address(&state.pool, &user, id).await?,
    ))
}
