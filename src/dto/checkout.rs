use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutSessionRequest {
    pub order_id: Uuid,
    pub address_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutSessionResponse {
    pub url: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderActionRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentSuccessQuery {
    pub session_id: String,
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResult {
    pub order_id: Uuid,
    pub session_id: Option<String>,
    pub payment_status: crate::models::PaymentStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GuestOrderRequest {
    pub cart_id: Uuid,
    pub guest_email: String,
    pub guest_first_name: String,
    pub guest_last_name: String,
    pub guest_phone: String,
    pub street: String,
    pub house_number: i32,
    pub apartment_number: Option<i32>,
    pub city: String,
    pub post_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GuestOrderResponse {
    pub id: Uuid,
    pub total_price: Decimal,
    pub guest_email: String,
    pub guest_first_name: String,
    pub guest_last_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReconciliationEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReconciliationList {
    pub items: Vec<ReconciliationEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReconciliationReport {
    pub checked: usize,
    pub completed: usize,
    pub still_pending: usize,
}
