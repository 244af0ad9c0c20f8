use rust_decimal::Decimal;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::OrmConn,
    dto::checkout::{
        CheckoutSessionRequest, CheckoutSessionResponse, OrderActionRequest, PaymentResult,
        PaymentSuccessQuery,
    },
    entity::{
        addresses::{Column as AddressCol, Entity as Addresses, Model as AddressModel},
        carts::Column as CartCol,
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Entity as Orders, Model as OrderModel},
        Carts, Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::PaymentStatus,
    payments::{ManifestEntry, SessionRequest},
    pricing,
    response::{ApiResponse, Meta},
    services::{customer_service::customer_for_user, reconciliation_service},
    state::AppState,
    payments::webhook::{WebhookEvent, CHECKOUT_SESSION_COMPLETED},
};

/// Line-item name used for the shipping charge on the hosted checkout page.
const DELIVERY_ITEM_NAME: &str = "Dostawa";

/// Start a hosted checkout session for a pending order. The order total is
/// recomputed and persisted here so the charged amount always matches what
/// the processor shows.
pub async fn create_checkout_session(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutSessionRequest,
) -> AppResult<ApiResponse<CheckoutSessionResponse>> {
    let order = owned_order(state, user, payload.order_id).await?;
    if order.payment_status != PaymentStatus::Pending.code() {
        return Err(AppError::Conflict("Order is already paid".into()));
    }

    let address = Addresses::find_by_id(payload.address_id)
        .one(&state.orm)
        .await?;
    let address = match address {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };
    if user.role != "admin" {
        let customer = customer_for_user(&state.pool, user.user_id).await?;
        if address.customer_id != Some(customer.id) {
            return Err(AppError::Forbidden);
        }
    }

    let session = open_session(state, &order, Some(&address), None).await?;
    Ok(ApiResponse::success(
        "Checkout session created",
        session,
        Some(Meta::empty()),
    ))
}

/// Guest variant: the shipping address was captured at order creation and the
/// processor form is prefilled with the guest's email.
pub async fn guest_checkout_session(
    state: &AppState,
    payload: OrderActionRequest,
) -> AppResult<ApiResponse<CheckoutSessionResponse>> {
    let order = guest_order(state, payload.order_id).await?;
    if order.payment_status != PaymentStatus::Pending.code() {
        return Err(AppError::Conflict("Order is already paid".into()));
    }

    let address = Addresses::find()
        .filter(AddressCol::OrderId.eq(order.id))
        .one(&state.orm)
        .await?;
    let email = order.guest_email.clone();

    let session = open_session(state, &order, address.as_ref(), email).await?;
    Ok(ApiResponse::success(
        "Checkout session created",
        session,
        Some(Meta::empty()),
    ))
}

/// Landing endpoint after the processor redirects back. Confirms payment
/// against the processor before completing; a processor outage queues the
/// order for reconciliation instead of assuming success.
pub async fn payment_success(
    state: &AppState,
    user: &AuthUser,
    query: PaymentSuccessQuery,
) -> AppResult<ApiResponse<PaymentResult>> {
    let order = owned_order(state, user, query.order_id).await?;
    confirm_payment(state, order, query.session_id).await
}

pub async fn guest_payment_success(
    state: &AppState,
    query: PaymentSuccessQuery,
) -> AppResult<ApiResponse<PaymentResult>> {
    let order = guest_order(state, query.order_id).await?;
    confirm_payment(state, order, query.session_id).await
}

async fn confirm_payment(
    state: &AppState,
    order: OrderModel,
    session_id: String,
) -> AppResult<ApiResponse<PaymentResult>> {
    // Repeated confirmations are fine; the first one wins.
    if order.payment_status == PaymentStatus::Complete.code() {
        let result = PaymentResult {
            order_id: order.id,
            session_id: Some(session_id),
            payment_status: PaymentStatus::Complete,
        };
        return Ok(ApiResponse::success("Payment completed", result, Some(Meta::empty())));
    }

    let status = match state.gateway.retrieve_session(&session_id).await {
        Ok(status) => status,
        Err(err) => {
            tracing::error!(order_id = %order.id, error = %err, "payment status check failed");
            reconciliation_service::enqueue(&state.pool, order.id, &session_id).await?;
            return Err(AppError::Upstream(err));
        }
    };

    if !status.is_paid() {
        return Err(AppError::BadRequest("Payment not completed".into()));
    }

    finalize_order(&state.orm, order.id).await?;

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "payment_confirmed",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "session_id": session_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let result = PaymentResult {
        order_id: order.id,
        session_id: Some(session_id),
        payment_status: PaymentStatus::Complete,
    };
    Ok(ApiResponse::success("Payment completed", result, Some(Meta::empty())))
}

/// Manual completion for flows that settle outside the hosted checkout
/// (e.g. cash on delivery).
pub async fn complete_order(
    state: &AppState,
    user: &AuthUser,
    payload: OrderActionRequest,
) -> AppResult<ApiResponse<PaymentResult>> {
    let order = owned_order(state, user, payload.order_id).await?;
    if order.payment_status == PaymentStatus::Complete.code() {
        let result = PaymentResult {
            order_id: order.id,
            session_id: None,
            payment_status: PaymentStatus::Complete,
        };
        return Ok(ApiResponse::success("Order completed", result, Some(Meta::empty())));
    }
    if order.payment_status != PaymentStatus::Pending.code() {
        return Err(AppError::Conflict("Order cannot be completed".into()));
    }

    finalize_order(&state.orm, order.id).await?;

    let result = PaymentResult {
        order_id: order.id,
        session_id: None,
        payment_status: PaymentStatus::Complete,
    };
    Ok(ApiResponse::success("Order completed", result, Some(Meta::empty())))
}

/// Signed webhook from the processor. Completion events finish the order;
/// anything else is acknowledged and ignored.
pub async fn handle_webhook_event(state: &AppState, event: WebhookEvent) -> AppResult<()> {
    if event.event_type != CHECKOUT_SESSION_COMPLETED {
        tracing::debug!(event_type = %event.event_type, "ignoring webhook event");
        return Ok(());
    }

    let order_id = event
        .data
        .object
        .metadata
        .get("order_id")
        .and_then(|v| Uuid::parse_str(v).ok());
    let order_id = match order_id {
        Some(id) => id,
        None => {
            tracing::warn!(session_id = %event.data.object.id, "webhook without order_id metadata");
            return Ok(());
        }
    };

    match finalize_order(&state.orm, order_id).await {
        Ok(_) => {
            tracing::info!(%order_id, "order completed via webhook");
            if let Err(err) = log_audit(
                &state.pool,
                None,
                "payment_webhook",
                Some("orders"),
                Some(serde_json::json!({ "order_id": order_id })),
            )
            .await
            {
                tracing::warn!(error = %err, "audit log failed");
            }
            Ok(())
        }
        // Events can outlive their order (cancelled before the webhook
        // arrived); acknowledge so the processor stops retrying.
        Err(AppError::NotFound) => {
            tracing::warn!(%order_id, "webhook for unknown order");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Mark an order complete and drop the customer's cart. Idempotent under a
/// row lock so the redirect handler, the webhook and the reconciliation job
/// can all race safely.
pub(crate) async fn finalize_order(orm: &OrmConn, order_id: Uuid) -> AppResult<OrderModel> {
    let txn = orm.begin().await?;

    let order = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if order.payment_status == PaymentStatus::Complete.code() {
        txn.commit().await?;
        return Ok(order);
    }

    let customer_id = order.customer_id;
    let mut active: OrderActive = order.into();
    active.payment_status = Set(PaymentStatus::Complete.code().to_string());
    let order = active.update(&txn).await?;

    if let Some(customer_id) = customer_id {
        Carts::delete_many()
            .filter(CartCol::CustomerId.eq(customer_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(order)
}

async fn open_session(
    state: &AppState,
    order: &OrderModel,
    address: Option<&AddressModel>,
    customer_email: Option<String>,
) -> AppResult<CheckoutSessionResponse> {
    let (line_items, subtotal) = manifest_for_order(state, order, address).await?;

    // Re-persist the total in case product prices or the delivery rule
    // changed since the order was placed.
    let mut active: OrderActive = order.clone().into();
    active.total_price = Set(pricing::order_total(subtotal));
    active.update(&state.orm).await?;

    let frontend = state.config.frontend_url.trim_end_matches('/');
    let request = SessionRequest {
        line_items,
        success_url: format!(
            "{frontend}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}&order_id={}",
            order.id
        ),
        cancel_url: format!("{frontend}/checkout/payment"),
        customer_email,
        order_id: order.id,
    };

    let session = state.gateway.create_session(request).await?;

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "checkout_session_created",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "session_id": session.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(CheckoutSessionResponse {
        url: session.url,
        session_id: session.id,
    })
}

/// Build the line-item manifest from the order snapshot, plus a delivery
/// entry when the subtotal is below the free-delivery threshold.
async fn manifest_for_order(
    state: &AppState,
    order: &OrderModel,
    address: Option<&AddressModel>,
) -> AppResult<(Vec<ManifestEntry>, Decimal)> {
    let lines = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    if lines.is_empty() {
        return Err(AppError::BadRequest("Order has no items".into()));
    }

    let mut subtotal = Decimal::ZERO;
    let mut manifest = Vec::with_capacity(lines.len() + 1);
    for (item, product) in lines {
        let product = product.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("order item {} has no product", item.id))
        })?;
        subtotal += item.unit_price * Decimal::from(item.quantity);

        let unit_amount = pricing::to_minor_units(item.unit_price)
            .ok_or_else(|| AppError::BadRequest("Price out of range".into()))?;
        manifest.push(ManifestEntry {
            name: product.title,
            description: product.description.unwrap_or_default(),
            unit_amount,
            quantity: item.quantity as i64,
        });
    }

    let fee = pricing::delivery_fee(subtotal);
    if fee > Decimal::ZERO {
        let unit_amount = pricing::to_minor_units(fee)
            .ok_or_else(|| AppError::BadRequest("Price out of range".into()))?;
        manifest.push(ManifestEntry {
            name: DELIVERY_ITEM_NAME.to_string(),
            description: address.map(describe_address).unwrap_or_default(),
            unit_amount,
            quantity: 1,
        });
    }

    Ok((manifest, subtotal))
}

fn describe_address(address: &AddressModel) -> String {
    match address.apartment_number {
        Some(apartment) => format!(
            "{} {}/{}, {} {}",
            address.street, address.house_number, apartment, address.post_code, address.city
        ),
        None => format!(
            "{} {}, {} {}",
            address.street, address.house_number, address.post_code, address.city
        ),
    }
}

async fn owned_order(state: &AppState, user: &AuthUser, order_id: Uuid) -> AppResult<OrderModel> {
    let order = Orders::find_by_id(order_id).one(&state.orm).await?;
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
    Ok(order)
}

async fn guest_order(state: &AppState, order_id: Uuid) -> AppResult<OrderModel> {
    let order = Orders::find_by_id(order_id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };
    if order.customer_id.is_some() {
        return Err(AppError::Forbidden);
    }
    Ok(order)
}
