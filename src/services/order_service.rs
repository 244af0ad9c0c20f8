use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::checkout::{GuestOrderRequest, GuestOrderResponse},
    dto::orders::{
        CancelledOrder, CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest,
    },
    entity::{
        addresses::ActiveModel as AddressActive,
        cart_items::{Column as CartItemCol, Entity as CartItems},
        carts::Entity as Carts,
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::Model as ProductModel,
        Products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderItem, PaymentStatus},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::customer_service::customer_for_user,
    state::AppState,
};

/// Convert a cart snapshot into a Pending order. Line items copy the current
/// unit price; the cart itself is left alone so an abandoned checkout can be
/// resumed.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let customer = customer_for_user(&state.pool, user.user_id).await?;

    let txn = state.orm.begin().await?;
    let (order, items) =
        build_order_from_cart(&txn, payload.cart_id, Some(customer.id), None).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "cart_id": payload.cart_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: order_from_entity(order)?,
            items: items.into_iter().map(order_item_from_entity).collect(),
        },
        Some(Meta::empty()),
    ))
}

/// Guest checkout entry point: order plus inline contact data and a shipping
/// address hanging off the order instead of a customer.
pub async fn create_guest_order(
    state: &AppState,
    payload: GuestOrderRequest,
) -> AppResult<ApiResponse<GuestOrderResponse>> {
    let guest = GuestContact {
        email: payload.guest_email,
        first_name: payload.guest_first_name,
        last_name: payload.guest_last_name,
        phone: payload.guest_phone,
    };

    let txn = state.orm.begin().await?;
    let (order, _items) =
        build_order_from_cart(&txn, payload.cart_id, None, Some(guest)).await?;

    AddressActive {
        id: Set(Uuid::new_v4()),
        street: Set(payload.street),
        house_number: Set(payload.house_number),
        apartment_number: Set(payload.apartment_number),
        city: Set(payload.city),
        post_code: Set(payload.post_code),
        customer_id: Set(None),
        order_id: Set(Some(order.id)),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "guest_order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = GuestOrderResponse {
        id: order.id,
        total_price: order.total_price,
        guest_email: order.guest_email.unwrap_or_default(),
        guest_first_name: order.guest_first_name.unwrap_or_default(),
        guest_last_name: order.guest_last_name.unwrap_or_default(),
    };
    Ok(ApiResponse::success("Order created", data, Some(Meta::empty())))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if user.role == "admin" {
        if let Some(status) = query.payment_status {
            condition = condition.add(OrderCol::PaymentStatus.eq(status.code()));
        }
    } else {
        // Buyers only see finished orders in the list; pending orders stay
        // reachable by id while checkout is in flight.
        let customer = customer_for_user(&state.pool, user.user_id).await?;
        condition = condition
            .add(OrderCol::CustomerId.eq(customer.id))
            .add(OrderCol::PaymentStatus.eq(PaymentStatus::Complete.code()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::PlacedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::PlacedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<Order>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if user.role != "admin" {
        let customer = customer_for_user(&state.pool, user.user_id).await?;
        if order.customer_id != Some(customer.id) {
            return Err(AppError::Forbidden);
        }
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let mut active: OrderActive = order.into();
    active.payment_status = Set(payload.payment_status.code().to_string());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "payment_status": payload.payment_status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

/// Admin removal of any order regardless of status.
pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    if Orders::find_by_id(id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound);
    }
    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(id))
        .exec(&txn)
        .await?;
    Orders::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
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

/// Cancellation deletes the Pending order outright; anything past Pending is
/// a conflict.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<CancelledOrder>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if user.role != "admin" {
        let customer = customer_for_user(&state.pool, user.user_id).await?;
        if order.customer_id != Some(customer.id) {
            return Err(AppError::Forbidden);
        }
    }

    if order.payment_status != PaymentStatus::Pending.code() {
        return Err(AppError::Conflict("Cannot cancel completed order".into()));
    }

    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    Orders::delete_by_id(order.id).exec(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_cancel",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled successfully",
        CancelledOrder { order_id },
        Some(Meta::empty()),
    ))
}

struct GuestContact {
    email: String,
    first_name: String,
    last_name: String,
    phone: String,
}

/// Shared cart-to-order copy. Runs inside the caller's transaction so the
/// order, its items and the persisted total land or fail together.
async fn build_order_from_cart(
    txn: &sea_orm::DatabaseTransaction,
    cart_id: Uuid,
    customer_id: Option<Uuid>,
    guest: Option<GuestContact>,
) -> AppResult<(OrderModel, Vec<OrderItemModel>)> {
    if Carts::find_by_id(cart_id).one(txn).await?.is_none() {
        return Err(AppError::BadRequest("Cart does not exist".into()));
    }

    let lines: Vec<(crate::entity::cart_items::Model, Option<ProductModel>)> = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .find_also_related(Products)
        .all(txn)
        .await?;

    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let (guest_email, guest_first_name, guest_last_name, guest_phone) = match guest {
        Some(g) => (
            Some(g.email),
            Some(g.first_name),
            Some(g.last_name),
            Some(g.phone),
        ),
        None => (None, None, None, None),
    };

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        placed_at: NotSet,
        payment_status: Set(PaymentStatus::Pending.code().to_string()),
        total_price: Set(Decimal::ZERO),
        guest_email: Set(guest_email),
        guest_first_name: Set(guest_first_name),
        guest_last_name: Set(guest_last_name),
        guest_phone: Set(guest_phone),
    }
    .insert(txn)
    .await?;

    let mut subtotal = Decimal::ZERO;
    let mut order_items = Vec::with_capacity(lines.len());
    for (line, product) in lines {
        let product = product.ok_or_else(|| {
            AppError::BadRequest(format!("Product {} no longer exists", line.product_id))
        })?;
        subtotal += product.unit_price * Decimal::from(line.quantity);

        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(line.quantity),
            unit_price: Set(product.unit_price),
        }
        .insert(txn)
        .await?;
        order_items.push(item);
    }

    let mut active: OrderActive = order.into();
    active.total_price = Set(pricing::order_total(subtotal));
    let order = active.update(txn).await?;

    Ok((order, order_items))
}

pub(crate) fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let payment_status = PaymentStatus::from_code(&model.payment_status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "unknown payment status {:?}",
            model.payment_status
        ))
    })?;
    Ok(Order {
        id: model.id,
        customer_id: model.customer_id,
        placed_at: model.placed_at.with_timezone(&chrono::Utc),
        payment_status,
        total_price: model.total_price,
        guest_email: model.guest_email,
        guest_first_name: model.guest_first_name,
        guest_last_name: model.guest_last_name,
        guest_phone: model.guest_phone,
    })
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
    }
}
