use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::cart::AddCartItemRequest,
    dto::checkout::{GuestOrderRequest, OrderActionRequest, PaymentSuccessQuery},
    dto::customers::MeQuery,
    dto::orders::CreateOrderRequest,
    error::AppError,
    middleware::auth::AuthUser,
    payments::webhook::WebhookEvent,
    payments::{CheckoutSession, GatewayError, PaymentGateway, SessionRequest, SessionStatus},
    services::{
        cart_service, checkout_service, customer_service, order_service, reconciliation_service,
    },
    state::AppState,
};
use uuid::Uuid;

struct StubGateway {
    paid: bool,
    fail: bool,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_session(&self, _req: SessionRequest) -> Result<CheckoutSession, GatewayError> {
        if self.fail {
            return Err(GatewayError::Api("processor down".into()));
        }
        Ok(CheckoutSession {
            id: "cs_test".into(),
            url: "http://stub/session".into(),
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        if self.fail {
            return Err(GatewayError::Api("processor down".into()));
        }
        Ok(SessionStatus {
            id: session_id.into(),
            status: "open".into(),
            payment_status: if self.paid { "paid" } else { "unpaid" }.into(),
        })
    }
}

// Allow skipping when no DB is configured in the environment.
async fn setup_state(gateway: StubGateway) -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&pool).await?;

    let config = AppConfig {
        database_url: database_url.clone(),
        host: "127.0.0.1".into(),
        port: 0,
        stripe_secret_key: "sk_test".into(),
        stripe_webhook_secret: "whsec_test".into(),
        frontend_url: "http://localhost:5173".into(),
    };

    Ok(Some(AppState {
        pool,
        orm,
        gateway: Arc::new(gateway),
        config,
    }))
}

// Every test creates its own users and products, so tests can run in parallel
// against a shared database.
async fn create_customer(state: &AppState) -> anyhow::Result<(AuthUser, Uuid, Uuid)> {
    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, 'dummy')")
        .bind(user_id)
        .bind(format!("user-{user_id}@example.com"))
        .execute(&state.pool)
        .await?;

    let customer_id = Uuid::new_v4();
    sqlx::query("INSERT INTO customers (id, user_id) VALUES ($1, $2)")
        .bind(customer_id)
        .bind(user_id)
        .execute(&state.pool)
        .await?;

    let cart_id = Uuid::new_v4();
    sqlx::query("INSERT INTO carts (id, customer_id) VALUES ($1, $2)")
        .bind(cart_id)
        .bind(customer_id)
        .execute(&state.pool)
        .await?;

    let auth = AuthUser {
        user_id,
        role: "user".into(),
    };
    Ok((auth, customer_id, cart_id))
}

async fn create_product(
    state: &AppState,
    price: &str,
    inventory: i32,
) -> anyhow::Result<Uuid> {
    let collection_id = Uuid::new_v4();
    sqlx::query("INSERT INTO collections (id, title) VALUES ($1, $2)")
        .bind(collection_id)
        .bind(format!("Collection {collection_id}"))
        .execute(&state.pool)
        .await?;

    let product_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO products (id, title, slug, unit_price, inventory, collection_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(product_id)
    .bind(format!("Product {product_id}"))
    .bind(format!("product-{product_id}"))
    .bind(price.parse::<Decimal>()?)
    .bind(inventory)
    .bind(collection_id)
    .execute(&state.pool)
    .await?;

    Ok(product_id)
}

#[tokio::test]
async fn order_total_includes_flat_delivery_below_threshold() -> anyhow::Result<()> {
    let Some(state) = setup_state(StubGateway {
        paid: true,
        fail: false,
    })
    .await?
    else {
        return Ok(());
    };

    let (user, _customer_id, cart_id) = create_customer(&state).await?;
    let product_id = create_product(&state, "100.00", 10).await?;

    cart_service::add_item(
        &state.pool,
        cart_id,
        AddCartItemRequest {
            product_id,
            quantity: 2,
        },
    )
    .await?;

    let resp = order_service::create_order(&state, &user, CreateOrderRequest { cart_id }).await?;
    let order = resp.data.unwrap().order;
    assert_eq!(order.total_price, "215.00".parse::<Decimal>()?);

    // Cart survives order creation so checkout can be abandoned and resumed.
    let cart = cart_service::get_cart(&state.pool, cart_id).await?;
    assert_eq!(cart.data.unwrap().items.len(), 1);

    Ok(())
}

#[tokio::test]
async fn order_total_has_free_delivery_at_threshold() -> anyhow::Result<()> {
    let Some(state) = setup_state(StubGateway {
        paid: true,
        fail: false,
    })
    .await?
    else {
        return Ok(());
    };

    let (user, _customer_id, cart_id) = create_customer(&state).await?;
    let product_id = create_product(&state, "150.00", 10).await?;

    cart_service::add_item(
        &state.pool,
        cart_id,
        AddCartItemRequest {
            product_id,
            quantity: 2,
        },
    )
    .await?;

    let resp = order_service::create_order(&state, &user, CreateOrderRequest { cart_id }).await?;
    let order = resp.data.unwrap().order;
    assert_eq!(order.total_price, "300.00".parse::<Decimal>()?);

    Ok(())
}

#[tokio::test]
async fn paid_session_completes_order_and_clears_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state(StubGateway {
        paid: true,
        fail: false,
    })
    .await?
    else {
        return Ok(());
    };

    let (user, _customer_id, cart_id) = create_customer(&state).await?;
    let product_id = create_product(&state, "50.00", 10).await?;
    cart_service::add_item(
        &state.pool,
        cart_id,
        AddCartItemRequest {
            product_id,
            quantity: 1,
        },
    )
    .await?;

    let resp = order_service::create_order(&state, &user, CreateOrderRequest { cart_id }).await?;
    let order_id = resp.data.unwrap().order.id;

    let result = checkout_service::payment_success(
        &state,
        &user,
        PaymentSuccessQuery {
            session_id: "cs_paid".into(),
            order_id,
        },
    )
    .await?;
    assert_eq!(
        result.data.unwrap().payment_status,
        storefront_api::models::PaymentStatus::Complete
    );

    // The customer's cart is gone once payment lands.
    let cart = cart_service::get_cart(&state.pool, cart_id).await;
    assert!(matches!(cart, Err(AppError::NotFound)));

    // Confirming again is a no-op, not an error.
    let again = checkout_service::payment_success(
        &state,
        &user,
        PaymentSuccessQuery {
            session_id: "cs_paid".into(),
            order_id,
        },
    )
    .await?;
    assert_eq!(
        again.data.unwrap().payment_status,
        storefront_api::models::PaymentStatus::Complete
    );

    Ok(())
}

#[tokio::test]
async fn unpaid_session_does_not_complete_order() -> anyhow::Result<()> {
    let Some(state) = setup_state(StubGateway {
        paid: false,
        fail: false,
    })
    .await?
    else {
        return Ok(());
    };

    let (user, _customer_id, cart_id) = create_customer(&state).await?;
    let product_id = create_product(&state, "50.00", 10).await?;
    cart_service::add_item(
        &state.pool,
        cart_id,
        AddCartItemRequest {
            product_id,
            quantity: 1,
        },
    )
    .await?;

    let resp = order_service::create_order(&state, &user, CreateOrderRequest { cart_id }).await?;
    let order_id = resp.data.unwrap().order.id;

    let result = checkout_service::payment_success(
        &state,
        &user,
        PaymentSuccessQuery {
            session_id: "cs_unpaid".into(),
            order_id,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

#[tokio::test]
async fn completed_order_cannot_be_cancelled() -> anyhow::Result<()> {
    let Some(state) = setup_state(StubGateway {
        paid: true,
        fail: false,
    })
    .await?
    else {
        return Ok(());
    };

    let (user, _customer_id, cart_id) = create_customer(&state).await?;
    let product_id = create_product(&state, "50.00", 10).await?;
    cart_service::add_item(
        &state.pool,
        cart_id,
        AddCartItemRequest {
            product_id,
            quantity: 1,
        },
    )
    .await?;

    let resp = order_service::create_order(&state, &user, CreateOrderRequest { cart_id }).await?;
    let order_id = resp.data.unwrap().order.id;

    checkout_service::complete_order(&state, &user, OrderActionRequest { order_id }).await?;

    let result = order_service::cancel_order(&state, &user, order_id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    Ok(())
}

#[tokio::test]
async fn failed_order_cannot_be_completed_manually() -> anyhow::Result<()> {
    let Some(state) = setup_state(StubGateway {
        paid: true,
        fail: false,
    })
    .await?
    else {
        return Ok(());
    };

    let (user, _customer_id, cart_id) = create_customer(&state).await?;
    let product_id = create_product(&state, "50.00", 10).await?;
    cart_service::add_item(
        &state.pool,
        cart_id,
        AddCartItemRequest {
            product_id,
            quantity: 1,
        },
    )
    .await?;

    let resp = order_service::create_order(&state, &user, CreateOrderRequest { cart_id }).await?;
    let order_id = resp.data.unwrap().order.id;

    // Admin marks the order failed; manual completion must not revive it.
    sqlx::query("UPDATE orders SET payment_status = 'F' WHERE id = $1")
        .bind(order_id)
        .execute(&state.pool)
        .await?;

    let result = checkout_service::complete_order(&state, &user, OrderActionRequest { order_id }).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let status: (String,) = sqlx::query_as("SELECT payment_status FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(status.0, "F");

    Ok(())
}

#[tokio::test]
async fn guest_order_carries_contact_and_address() -> anyhow::Result<()> {
    let Some(state) = setup_state(StubGateway {
        paid: true,
        fail: false,
    })
    .await?
    else {
        return Ok(());
    };

    // Anonymous cart with no customer.
    let cart_id = Uuid::new_v4();
    sqlx::query("INSERT INTO carts (id) VALUES ($1)")
        .bind(cart_id)
        .execute(&state.pool)
        .await?;
    let product_id = create_product(&state, "100.00", 10).await?;
    cart_service::add_item(
        &state.pool,
        cart_id,
        AddCartItemRequest {
            product_id,
            quantity: 1,
        },
    )
    .await?;

    let resp = order_service::create_guest_order(
        &state,
        GuestOrderRequest {
            cart_id,
            guest_email: "guest@example.com".into(),
            guest_first_name: "Jan".into(),
            guest_last_name: "Kowalski".into(),
            guest_phone: "+48123456789".into(),
            street: "Polna".into(),
            house_number: 1,
            apartment_number: Some(2),
            city: "Warszawa".into(),
            post_code: "00-001".into(),
        },
    )
    .await?;
    let guest = resp.data.unwrap();
    assert_eq!(guest.guest_email, "guest@example.com");
    assert_eq!(guest.total_price, "115.00".parse::<Decimal>()?);

    let address: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM addresses WHERE order_id = $1")
            .bind(guest.id)
            .fetch_optional(&state.pool)
            .await?;
    assert!(address.is_some(), "guest order should carry an address");

    // A customer-owned order must be rejected by the guest session endpoint.
    let (user, _customer_id, owned_cart) = create_customer(&state).await?;
    let owned_product = create_product(&state, "10.00", 5).await?;
    cart_service::add_item(
        &state.pool,
        owned_cart,
        AddCartItemRequest {
            product_id: owned_product,
            quantity: 1,
        },
    )
    .await?;
    let owned = order_service::create_order(&state, &user, CreateOrderRequest { cart_id: owned_cart })
        .await?
        .data
        .unwrap()
        .order;
    let result = checkout_service::guest_checkout_session(
        &state,
        OrderActionRequest { order_id: owned.id },
    )
    .await;
    assert!(matches!(result, Err(AppError::Forbidden)));

    Ok(())
}

#[tokio::test]
async fn login_claims_anonymous_cart() -> anyhow::Result<()> {
    let Some(state) = setup_state(StubGateway {
        paid: true,
        fail: false,
    })
    .await?
    else {
        return Ok(());
    };

    let (user, customer_id, owned_cart) = create_customer(&state).await?;

    // Customer already owns a cart, so a foreign token is ignored.
    let profile = customer_service::me(
        &state.pool,
        &user,
        MeQuery {
            cart_id: Some(Uuid::new_v4()),
        },
    )
    .await?;
    assert_eq!(profile.data.unwrap().cart_id, Some(owned_cart));

    // Drop the owned cart; the anonymous token is then claimed.
    sqlx::query("DELETE FROM carts WHERE id = $1")
        .bind(owned_cart)
        .execute(&state.pool)
        .await?;
    let anon_cart = Uuid::new_v4();
    sqlx::query("INSERT INTO carts (id) VALUES ($1)")
        .bind(anon_cart)
        .execute(&state.pool)
        .await?;

    let profile = customer_service::me(
        &state.pool,
        &user,
        MeQuery {
            cart_id: Some(anon_cart),
        },
    )
    .await?;
    assert_eq!(profile.data.unwrap().cart_id, Some(anon_cart));

    let owner: (Option<Uuid>,) = sqlx::query_as("SELECT customer_id FROM carts WHERE id = $1")
        .bind(anon_cart)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(owner.0, Some(customer_id));

    Ok(())
}

#[tokio::test]
async fn webhook_event_completes_order() -> anyhow::Result<()> {
    let Some(state) = setup_state(StubGateway {
        paid: true,
        fail: false,
    })
    .await?
    else {
        return Ok(());
    };

    let (user, _customer_id, cart_id) = create_customer(&state).await?;
    let product_id = create_product(&state, "50.00", 10).await?;
    cart_service::add_item(
        &state.pool,
        cart_id,
        AddCartItemRequest {
            product_id,
            quantity: 1,
        },
    )
    .await?;
    let resp = order_service::create_order(&state, &user, CreateOrderRequest { cart_id }).await?;
    let order_id = resp.data.unwrap().order.id;

    let body = format!(
        r#"{{"type":"checkout.session.completed","data":{{"object":{{"id":"cs_hook","metadata":{{"order_id":"{order_id}"}}}}}}}}"#
    );
    let event: WebhookEvent = serde_json::from_str(&body)?;
    checkout_service::handle_webhook_event(&state, event).await?;

    let fetched = order_service::get_order(&state, &user, order_id).await?;
    assert_eq!(
        fetched.data.unwrap().order.payment_status,
        storefront_api::models::PaymentStatus::Complete
    );

    // An event for an order that no longer exists is acknowledged quietly.
    let body = format!(
        r#"{{"type":"checkout.session.completed","data":{{"object":{{"id":"cs_gone","metadata":{{"order_id":"{}"}}}}}}}}"#,
        Uuid::new_v4()
    );
    let event: WebhookEvent = serde_json::from_str(&body)?;
    checkout_service::handle_webhook_event(&state, event).await?;

    Ok(())
}

#[tokio::test]
async fn gateway_outage_queues_reconciliation() -> anyhow::Result<()> {
    let Some(state) = setup_state(StubGateway {
        paid: true,
        fail: true,
    })
    .await?
    else {
        return Ok(());
    };

    let (user, _customer_id, cart_id) = create_customer(&state).await?;
    let product_id = create_product(&state, "50.00", 10).await?;
    cart_service::add_item(
        &state.pool,
        cart_id,
        AddCartItemRequest {
            product_id,
            quantity: 1,
        },
    )
    .await?;

    let resp = order_service::create_order(&state, &user, CreateOrderRequest { cart_id }).await?;
    let order_id = resp.data.unwrap().order.id;

    let result = checkout_service::payment_success(
        &state,
        &user,
        PaymentSuccessQuery {
            session_id: "cs_outage".into(),
            order_id,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Upstream(_))));

    let queued: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM payment_reconciliations WHERE order_id = $1 AND resolved_at IS NULL",
    )
    .bind(order_id)
    .fetch_optional(&state.pool)
    .await?;
    assert!(queued.is_some(), "order should be queued for reconciliation");

    // Processor comes back; the admin run completes the queued order.
    let recovered = AppState {
        gateway: Arc::new(StubGateway {
            paid: true,
            fail: false,
        }),
        ..state
    };
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: "admin".into(),
    };
    let report = reconciliation_service::run(&recovered, &admin).await?;
    let report = report.data.unwrap();
    assert!(report.completed >= 1);

    let fetched = order_service::get_order(&recovered, &user, order_id).await?;
    assert_eq!(
        fetched.data.unwrap().order.payment_status,
        storefront_api::models::PaymentStatus::Complete
    );

    Ok(())
}
