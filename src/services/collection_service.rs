use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::collections::{CollectionList, CreateCollectionRequest, UpdateCollectionRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Collection,
    response::{ApiResponse, Meta},
};

pub async fn list_collections(pool: &DbPool) -> AppResult<ApiResponse<CollectionList>> {
    let items = sqlx::query_as::<_, Collection>(
        r#"
        SELECT c.id, c.title, c.featured_product_id, COUNT(p.id) AS products_count
        FROM collections c
        LEFT JOIN products p ON p.collection_id = c.id
        GROUP BY c.id
        ORDER BY c.title
        "#,
    )
    .fetch_all(pool)
    .await?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Collections",
        CollectionList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn get_collection(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<Collection>> {
    let collection = sqlx::query_as::<_, Collection>(
        r#"
        SELECT c.id, c.title, c.featured_product_id, COUNT(p.id) AS products_count
        FROM collections c
        LEFT JOIN products p ON p.collection_id = c.id
        WHERE c.id = $1
        GROUP BY c.id
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match collection {
        Some(c) => Ok(ApiResponse::success("Collection", c, None)),
        None => Err(AppError::NotFound),
    }
}

pub async fn create_collection(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateCollectionRequest,
) -> AppResult<ApiResponse<Collection>> {
    ensure_admin(user)?;
    let id = Uuid::new_v4();
    let collection = sqlx::query_as::<_, Collection>(
        r#"
        INSERT INTO collections (id, title, featured_product_id)
        VALUES ($1, $2, $3)
        RETURNING id, title, featured_product_id, 0::bigint AS products_count
        "#,
    )
    .bind(id)
    .bind(payload.title)
    .bind(payload.featured_product_id)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "collection_create",
        Some("collections"),
        Some(serde_json::json!({ "collection_id": collection.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Collection created",
        collection,
        Some(Meta::empty()),
    ))
}

pub async fn update_collection(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCollectionRequest,
) -> AppResult<ApiResponse<Collection>> {
    ensure_admin(user)?;
    let existing = sqlx::query_as::<_, Collection>(
        r#"
        SELECT c.id, c.title, c.featured_product_id, COUNT(p.id) AS products_count
        FROM collections c
        LEFT JOIN products p ON p.collection_id = c.id
        WHERE c.id = $1
        GROUP BY c.id
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let title = payload.title.unwrap_or(existing.title);
    let featured = payload.featured_product_id.or(existing.featured_product_id);

    let collection = sqlx::query_as::<_, Collection>(
        r#"
        UPDATE collections
        SET title = $2, featured_product_id = $3
        WHERE id = $1
        RETURNING id, title, featured_product_id,
            (SELECT COUNT(*) FROM products WHERE collection_id = $1) AS products_count
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(featured)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Updated",
        collection,
        Some(Meta::empty()),
    ))
}

pub async fn delete_collection(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let products: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products WHERE collection_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if products.0 > 0 {
        return Err(AppError::BadRequest(
            "Collection still contains products".into(),
        ));
    }

    let result = sqlx::query("DELETE FROM collections WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "collection_delete",
        Some("collections"),
        Some(serde_json::json!({ "collection_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
