use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::customers::{CustomerList, CustomerProfile, MeQuery, UpdateCustomerRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Customer,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

const MEMBERSHIPS: [&str; 3] = ["B", "S", "G"];

pub async fn list_customers(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CustomerList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();
    let items = sqlx::query_as::<_, Customer>(
        "SELECT * FROM customers ORDER BY id LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
        .fetch_one(pool)
        .await?;

    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        Some(Meta::new(page, limit, total.0)),
    ))
}

pub async fn get_customer(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Customer>> {
    ensure_admin(user)?;
    let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match customer {
        Some(c) => Ok(ApiResponse::success("Customer", c, None)),
        None => Err(AppError::NotFound),
    }
}

/// Current customer profile. An anonymous cart token passed along is claimed
/// for the customer; otherwise they keep their existing cart or get a fresh
/// one.
pub async fn me(
    pool: &DbPool,
    user: &AuthUser,
    query: MeQuery,
) -> AppResult<ApiResponse<CustomerProfile>> {
    let customer = customer_for_user(pool, user.user_id).await?;
    let cart_id = resolve_cart(pool, &customer, query.cart_id).await?;

    Ok(ApiResponse::success(
        "OK",
        CustomerProfile {
            customer,
            cart_id: Some(cart_id),
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_me(
    pool: &DbPool,
    user: &AuthUser,
    query: MeQuery,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<CustomerProfile>> {
    let customer = customer_for_user(pool, user.user_id).await?;

    if let Some(membership) = payload.membership.as_deref() {
        if !MEMBERSHIPS.contains(&membership) {
            return Err(AppError::BadRequest("Invalid membership".into()));
        }
    }

    let phone = payload.phone.or(customer.phone);
    let birth_date = payload.birth_date.or(customer.birth_date);
    let membership = payload.membership.unwrap_or(customer.membership);

    let customer = sqlx::query_as::<_, Customer>(
        r#"
        UPDATE customers
        SET phone = $2, birth_date = $3, membership = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(customer.id)
    .bind(phone)
    .bind(birth_date)
    .bind(membership)
    .fetch_one(pool)
    .await?;

    let cart_id = resolve_cart(pool, &customer, query.cart_id).await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "customer_update",
        Some("customers"),
        Some(serde_json::json!({ "customer_id": customer.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        CustomerProfile {
            customer,
            cart_id: Some(cart_id),
        },
        Some(Meta::empty()),
    ))
}

pub(crate) async fn customer_for_user(pool: &DbPool, user_id: Uuid) -> AppResult<Customer> {
    let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    match customer {
        Some(c) => Ok(c),
        None => Err(AppError::BadRequest("No customer profile for user".into())),
    }
}

async fn resolve_cart(
    pool: &DbPool,
    customer: &Customer,
    anonymous_cart: Option<Uuid>,
) -> AppResult<Uuid> {
    let owned: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM carts WHERE customer_id = $1")
        .bind(customer.id)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = owned {
        return Ok(id);
    }

    if let Some(cart_id) = anonymous_cart {
        // Claim the anonymous cart; the guard on customer_id keeps us from
        // stealing a cart that belongs to someone else.
        let claimed: Option<(Uuid,)> = sqlx::query_as(
            "UPDATE carts SET customer_id = $1 WHERE id = $2 AND customer_id IS NULL RETURNING id",
        )
        .bind(customer.id)
        .bind(cart_id)
        .fetch_optional(pool)
        .await?;
        if let Some((id,)) = claimed {
            tracing::debug!(cart_id = %id, customer_id = %customer.id, "claimed anonymous cart");
            return Ok(id);
        }
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO carts (id, customer_id) VALUES ($1, $2)")
        .bind(id)
        .bind(customer.id)
        .execute(pool)
        .await?;
    Ok(id)
}
