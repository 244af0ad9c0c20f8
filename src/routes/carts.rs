use axum::{
    Json, Router,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddCartItemRequest, CartDetail, UpdateCartItemRequest},
    error::AppResult,
    models::CartItem,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

// Carts are addressed by an unguessable id, so no auth is required here;
// anonymous visitors shop with the same endpoints as logged-in customers.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_cart))
        .route("/{id}", axum::routing::get(get_cart))
        .route("/{id}", axum::routing::delete(delete_cart))
        .route("/{id}/items", axum::routing::post(add_item))
        .route("/{id}/items/{item_id}", axum::routing::patch(update_item))
        .route("/{id}/items/{item_id}", axum::routing::delete(remove_item))
}

#[utoipa::path(
    post,
    path = "/api/carts",
    responses(
        (status = 200, description = "Cart created", body = ApiResponse<CartDetail>)
    ),
    tag = "carts"
)]
pub async fn create_cart(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CartDetail>>> {
    Ok(Json(cart_service::create_cart(&state.pool).await?))
}

#[utoipa::path(
    get,
    path = "/api/carts/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID")
    ),
    responses(
        (status = 200, description = "Cart with items and totals", body = ApiResponse<CartDetail>),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartDetail>>> {
    Ok(Json(cart_service::get_cart(&state.pool, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID")
    ),
    responses(
        (status = 200, description = "Cart deleted"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn delete_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(cart_service::delete_cart(&state.pool, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/carts/{id}/items",
    params(
        ("id" = Uuid, Path, description = "Cart ID")
    ),
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Item added", body = ApiResponse<CartItem>),
        (status = 400, description = "Not enough items in stock"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "carts"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    Ok(Json(cart_service::add_item(&state.pool, id, payload).await?))
}

#[utoipa::path(
    patch,
    path = "/api/carts/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID"),
        ("item_id" = Uuid, Path, description = "Cart item ID"),
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity updated", body = ApiResponse<CartItem>),
        (status = 400, description = "Not enough items in stock"),
        (status = 404, description = "Item not found"),
    ),
    tag = "carts"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    Ok(Json(
        cart_service::update_item(&state.pool, id, item_id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Cart ID"),
        ("item_id" = Uuid, Path, description = "Cart item ID"),
    ),
    responses(
        (status = 200, description = "Item removed"),
        (status = 404, description = "Item not found"),
    ),
    tag = "carts"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(cart_service::remove_item(&state.pool, id, item_id).await?))
}
