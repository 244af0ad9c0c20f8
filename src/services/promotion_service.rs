use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::promotions::{CreatePromotionRequest, PromotionList, UpdatePromotionRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Promotion,
    response::{ApiResponse, Meta},
};

pub async fn list_promotions(pool: &DbPool) -> AppResult<ApiResponse<PromotionList>> {
    let items = sqlx::query_as::<_, Promotion>("SELECT * FROM promotions ORDER BY description")
        .fetch_all(pool)
        .await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Promotions",
        PromotionList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_promotion(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreatePromotionRequest,
) -> AppResult<ApiResponse<Promotion>> {
    ensure_admin(user)?;
    let promotion = sqlx::query_as::<_, Promotion>(
        "INSERT INTO promotions (id, description, discount) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.description)
    .bind(payload.discount)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Promotion created",
        promotion,
        Some(Meta::empty()),
    ))
}

pub async fn update_promotion(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePromotionRequest,
) -> AppResult<ApiResponse<Promotion>> {
    ensure_admin(user)?;
    let existing = sqlx::query_as::<_, Promotion>("SELECT * FROM promotions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let description = payload.description.unwrap_or(existing.description);
    let discount = payload.discount.unwrap_or(existing.discount);

    let promotion = sqlx::query_as::<_, Promotion>(
        "UPDATE promotions SET description = $2, discount = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(description)
    .bind(discount)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Updated",
        promotion,
        Some(Meta::empty()),
    ))
}

pub async fn delete_promotion(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
