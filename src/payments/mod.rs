pub mod stripe;
pub mod webhook;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("processor rejected the request: {0}")]
    Api(String),

    #[error("malformed processor response: {0}")]
    Malformed(String),
}

/// One entry of the line-item manifest sent to the hosted checkout,
/// amounts in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub description: String,
    pub unit_amount: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub line_items: Vec<ManifestEntry>,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
    pub order_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatus {
    pub id: String,
    pub status: String,
    pub payment_status: String,
}

impl SessionStatus {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid" || self.status == "complete"
    }
}

/// Seam to the external payment processor. The production implementation
/// talks to the Stripe HTTP API; tests substitute a stub.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(&self, req: SessionRequest) -> Result<CheckoutSession, GatewayError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError>;
}
