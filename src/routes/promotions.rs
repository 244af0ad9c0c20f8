use axum::{
    Json, Router,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    dto::promotions::{CreatePromotionRequest, PromotionList, UpdatePromotionRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Promotion,
    response::ApiResponse,
    services::promotion_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_promotions))
        .route("/", axum::routing::post(create_promotion))
        .route("/{id}", axum::routing::put(update_promotion))
        .route("/{id}", axum::routing::delete(delete_promotion))
}

#[utoipa::path(
    get,
    path = "/api/promotions",
    responses(
        (status = 200, description = "List promotions", body = ApiResponse<PromotionList>)
    ),
    tag = "promotions"
)]
pub async fn list_promotions(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<PromotionList>>> {
    Ok(Json(promotion_service::list_promotions(&state.pool).await?))
}

#[utoipa::path(
    post,
    path = "/api/promotions",
    request_body = CreatePromotionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Promotion created", body = ApiResponse<Promotion>),
        (status = 403, description = "Admin only"),
    ),
    tag = "promotions"
)]
pub async fn create_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePromotionRequest>,
) -> AppResult<Json<ApiResponse<Promotion>>> {
    Ok(Json(
        promotion_service::create_promotion(&state.pool, &user, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/promotions/{id}",
    params(
        ("id" = Uuid, Path, description = "Promotion ID")
    ),
    request_body = UpdatePromotionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated promotion", body = ApiResponse<Promotion>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Promotion not found"),
    ),
    tag = "promotions"
)]
pub async fn update_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePromotionRequest>,
) -> AppResult<Json<ApiResponse<Promotion>>> {
    Ok(Json(
        promotion_service::update_promotion(&state.pool, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/promotions/{id}",
    params(
        ("id" = Uuid, Path, description = "Promotion ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted promotion"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Promotion not found"),
    ),
    tag = "promotions"
)]
pub async fn delete_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        promotion_service::delete_promotion(&state.pool, &user, id).await?,
    ))
}
