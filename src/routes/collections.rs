use axum::{
    Json, Router,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    dto::collections::{CollectionList, CreateCollectionRequest, UpdateCollectionRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Collection,
    response::ApiResponse,
    services::collection_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(list_collections))
        .route("/", axum::routing::post(create_collection))
        .route("/{id}", axum::routing::get(get_collection))
        .route("/{id}", axum::routing::put(update_collection))
        .route("/{id}", axum::routing::delete(delete_collection))
}

#[utoipa::path(
    get,
    path = "/api/collections",
    responses(
        (status = 200, description = "List collections", body = ApiResponse<CollectionList>)
    ),
    tag = "collections"
)]
pub async fn list_collections(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CollectionList>>> {
    Ok(Json(collection_service::list_collections(&state.pool).await?))
}

#[utoipa::path(
    get,
    path = "/api/collections/{id}",
    params(
        ("id" = Uuid, Path, description = "Collection ID")
    ),
    responses(
        (status = 200, description = "Get collection", body = ApiResponse<Collection>),
        (status = 404, description = "Collection not found"),
    ),
    tag = "collections"
)]
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Collection>>> {
    Ok(Json(collection_service::get_collection(&state.pool, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/collections",
    request_body = CreateCollectionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Collection created", body = ApiResponse<Collection>),
        (status = 403, description = "Admin only"),
    ),
    tag = "collections"
)]
pub async fn create_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCollectionRequest>,
) -> AppResult<Json<ApiResponse<Collection>>> {
    Ok(Json(
        collection_service::create_collection(&state.pool, &user, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/collections/{id}",
    params(
        ("id" = Uuid, Path, description = "Collection ID")
    ),
    request_body = UpdateCollectionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated collection", body = ApiResponse<Collection>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Collection not found"),
    ),
    tag = "collections"
)]
pub async fn update_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCollectionRequest>,
) -> AppResult<Json<ApiResponse<Collection>>> {
    Ok(Json(
        collection_service::update_collection(&state.pool, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/collections/{id}",
    params(
        ("id" = Uuid, Path, description = "Collection ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted collection"),
        (status = 400, description = "Collection still contains products"),
        (status = 403, description = "Admin only"),
    ),
    tag = "collections"
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        collection_service::delete_collection(&state.pool, &user, id).await?,
    ))
}
