use axum::Router;

use crate::state::AppState;

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod carts;
pub mod checkout;
pub mod collections;
pub mod customers;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod promotions;
pub mod webhook;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/collections", collections::router())
        .nest("/promotions", promotions::router())
        .nest("/carts", carts::router())
        .nest("/customers", customers::router())
        .nest("/addresses", addresses::router())
        .nest("/orders", orders::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .merge(checkout::router())
        .merge(webhook::router())
}
