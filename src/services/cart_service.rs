use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::cart::{AddCartItemRequest, CartDetail, CartItemDetail, UpdateCartItemRequest},
    error::{AppError, AppResult},
    models::{CartItem, Product},
    response::{ApiResponse, Meta},
};

#[derive(FromRow)]
struct CartItemProductRow {
    item_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    title: String,
    slug: String,
    description: Option<String>,
    unit_price: Decimal,
    inventory: i32,
    collection_id: Uuid,
    last_update: DateTime<Utc>,
}

#[derive(FromRow)]
struct CartRow {
    id: Uuid,
    customer_id: Option<Uuid>,
}

pub async fn create_cart(pool: &DbPool) -> AppResult<ApiResponse<CartDetail>> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO carts (id) VALUES ($1)")
        .bind(id)
        .execute(pool)
        .await?;

    let data = CartDetail {
        id,
        customer_id: None,
        items: Vec::new(),
        total_price: Decimal::ZERO,
    };
    Ok(ApiResponse::success("Cart created", data, Some(Meta::empty())))
}

pub async fn get_cart(pool: &DbPool, cart_id: Uuid) -> AppResult<ApiResponse<CartDetail>> {
    let cart = fetch_cart(pool, cart_id).await?;
    Ok(ApiResponse::success("OK", cart, Some(Meta::empty())))
}

pub async fn delete_cart(pool: &DbPool, cart_id: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM carts WHERE id = $1")
        .bind(cart_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Cart deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Add a product to the cart. Quantities accumulate when the product is
/// already present; the combined quantity may not exceed inventory.
pub async fn add_item(
    pool: &DbPool,
    cart_id: Uuid,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    ensure_cart_exists(pool, cart_id).await?;

    let product: Option<(Uuid, i32)> =
        sqlx::query_as("SELECT id, inventory FROM products WHERE id = $1")
            .bind(payload.product_id)
            .fetch_optional(pool)
            .await?;
    let (product_id, inventory) = match product {
        Some(p) => p,
        None => return Err(AppError::BadRequest("product not found".to_string())),
    };

    let exist: Option<CartItem> =
        sqlx::query_as("SELECT * FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .fetch_optional(pool)
            .await?;

    let cart_item = if let Some(item) = exist {
        let new_quantity = item.quantity + payload.quantity;
        if new_quantity > inventory {
            return Err(AppError::BadRequest("Not enough items in stock".to_string()));
        }
        sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items
            SET quantity = $3
            WHERE id = $1 AND cart_id = $2
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(cart_id)
        .bind(new_quantity)
        .fetch_one(pool)
        .await?
    } else {
        if payload.quantity > inventory {
            return Err(AppError::BadRequest("Not enough items in stock".to_string()));
        }
        sqlx::query_as(
            "INSERT INTO cart_items (id, cart_id, product_id, quantity) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(cart_id)
        .bind(product_id)
        .bind(payload.quantity)
        .fetch_one(pool)
        .await?
    };

    Ok(ApiResponse::success("OK", cart_item, None))
}

pub async fn update_item(
    pool: &DbPool,
    cart_id: Uuid,
    item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let inventory: Option<(i32,)> = sqlx::query_as(
        r#"
        SELECT p.inventory FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.id = $1 AND ci.cart_id = $2
        "#,
    )
    .bind(item_id)
    .bind(cart_id)
    .fetch_optional(pool)
    .await?;
    let inventory = match inventory {
        Some((n,)) => n,
        None => return Err(AppError::NotFound),
    };
    if payload.quantity > inventory {
        return Err(AppError::BadRequest("Not enough items in stock".to_string()));
    }

    let cart_item = sqlx::query_as::<_, CartItem>(
        "UPDATE cart_items SET quantity = $3 WHERE id = $1 AND cart_id = $2 RETURNING *",
    )
    .bind(item_id)
    .bind(cart_id)
    .bind(payload.quantity)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success("OK", cart_item, None))
}

pub async fn remove_item(
    pool: &DbPool,
    cart_id: Uuid,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2")
        .bind(item_id)
        .bind(cart_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) async fn fetch_cart(pool: &DbPool, cart_id: Uuid) -> AppResult<CartDetail> {
    let cart: Option<CartRow> = sqlx::query_as("SELECT id, customer_id FROM carts WHERE id = $1")
        .bind(cart_id)
        .fetch_optional(pool)
        .await?;
    let cart = match cart {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let rows = sqlx::query_as::<_, CartItemProductRow>(
        r#"
        SELECT ci.id AS item_id, ci.quantity,
               p.id AS product_id, p.title, p.slug, p.description, p.unit_price,
               p.inventory, p.collection_id, p.last_update
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY p.title
        "#,
    )
    .bind(cart_id)
    .fetch_all(pool)
    .await?;

    let items: Vec<CartItemDetail> = rows
        .into_iter()
        .map(|row| CartItemDetail {
            id: row.item_id,
            total_price: row.unit_price * Decimal::from(row.quantity),
            quantity: row.quantity,
            product: Product {
                id: row.product_id,
                title: row.title,
                slug: row.slug,
                description: row.description,
                unit_price: row.unit_price,
                inventory: row.inventory,
                collection_id: row.collection_id,
                last_update: row.last_update,
            },
        })
        .collect();

    let total_price = items.iter().map(|i| i.total_price).sum();

    Ok(CartDetail {
        id: cart.id,
        customer_id: cart.customer_id,
        items,
        total_price,
    })
}

async fn ensure_cart_exists(pool: &DbPool, cart_id: Uuid) -> AppResult<()> {
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM carts WHERE id = $1")
        .bind(cart_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound);
    }
    Ok(())
}
