use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::addresses::{AddressList, CreateAddressRequest, UpdateAddressRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Address,
    response::{ApiResponse, Meta},
    services::customer_service::customer_for_user,
};

pub async fn list_addresses(
    pool: &DbPool,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    let items = if user.role == "admin" {
        sqlx::query_as::<_, Address>("SELECT * FROM addresses ORDER BY city, street")
            .fetch_all(pool)
            .await?
    } else {
        let customer = customer_for_user(pool, user.user_id).await?;
        sqlx::query_as::<_, Address>(
            "SELECT * FROM addresses WHERE customer_id = $1 ORDER BY city, street",
        )
        .bind(customer.id)
        .fetch_all(pool)
        .await?
    };

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Addresses",
        AddressList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn get_address(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Address>> {
    let address = owned_address(pool, user, id).await?;
    Ok(ApiResponse::success("Address", address, None))
}

pub async fn create_address(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let customer = customer_for_user(pool, user.user_id).await?;
    let address = sqlx::query_as::<_, Address>(
        r#"
        INSERT INTO addresses (id, street, house_number, apartment_number, city, post_code, customer_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.street)
    .bind(payload.house_number)
    .bind(payload.apartment_number)
    .bind(payload.city)
    .bind(payload.post_code)
    .bind(customer.id)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Address created",
        address,
        Some(Meta::empty()),
    ))
}

pub async fn update_address(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let existing = owned_address(pool, user, id).await?;

    let street = payload.street.unwrap_or(existing.street);
    let house_number = payload.house_number.unwrap_or(existing.house_number);
    let apartment_number = payload.apartment_number.or(existing.apartment_number);
    let city = payload.city.unwrap_or(existing.city);
    let post_code = payload.post_code.unwrap_or(existing.post_code);

    let address = sqlx::query_as::<_, Address>(
        r#"
        UPDATE addresses
        SET street = $2, house_number = $3, apartment_number = $4, city = $5, post_code = $6
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(street)
    .bind(house_number)
    .bind(apartment_number)
    .bind(city)
    .bind(post_code)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Updated",
        address,
        Some(Meta::empty()),
    ))
}

pub async fn delete_address(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = owned_address(pool, user, id).await?;

    sqlx::query("DELETE FROM addresses WHERE id = $1")
        .bind(existing.id)
        .execute(pool)
        .await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn owned_address(pool: &DbPool, user: &AuthUser, id: Uuid) -> AppResult<Address> {
    let address = sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let address = match address {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    if user.role == "admin" {
        return Ok(address);
    }

    let customer = customer_for_user(pool, user.user_id).await?;
    if address.customer_id != Some(customer.id) {
        return Err(AppError::Forbidden);
    }
    Ok(address)
}
