use async_trait::async_trait;

use super::{CheckoutSession, GatewayError, PaymentGateway, SessionRequest, SessionStatus};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

const CURRENCY: &str = "pln";

/// Stripe hosted-checkout client. Session creation and retrieval only;
/// everything else happens on Stripe's side.
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_api_base(secret_key, DEFAULT_API_BASE)
    }

    pub fn with_api_base(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into(),
        }
    }

    fn session_form(req: &SessionRequest) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "payment_method_types[0]".to_string(),
                "card".to_string(),
            ),
            ("success_url".to_string(), req.success_url.clone()),
            ("cancel_url".to_string(), req.cancel_url.clone()),
            (
                "metadata[order_id]".to_string(),
                req.order_id.to_string(),
            ),
        ];
        if let Some(email) = &req.customer_email {
            form.push(("customer_email".to_string(), email.clone()));
        }
        for (i, item) in req.line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                CURRENCY.to_string(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][description]"),
                item.description.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }
        form
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(&self, req: SessionRequest) -> Result<CheckoutSession, GatewayError> {
        let form = Self::session_form(&req);
        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(body));
        }

        let session = response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        let response = self
            .http
            .get(format!(
                "{}/v1/checkout/sessions/{session_id}",
                self.api_base
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(body));
        }

        let status = response
            .json::<SessionStatus>()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::ManifestEntry;
    use uuid::Uuid;

    #[test]
    fn session_form_encodes_manifest_and_metadata() {
        let order_id = Uuid::new_v4();
        let req = SessionRequest {
            line_items: vec![
                ManifestEntry {
                    name: "Widget".into(),
                    description: "A widget".into(),
                    unit_amount: 10000,
                    quantity: 2,
                },
                ManifestEntry {
                    name: "Dostawa".into(),
                    description: "Dostawa na adres: Polna 1, Warszawa".into(),
                    unit_amount: 1500,
                    quantity: 1,
                },
            ],
            success_url: "http://front/checkout/success".into(),
            cancel_url: "http://front/checkout/payment".into(),
            customer_email: Some("guest@example.com".into()),
            order_id,
        };

        let form = StripeGateway::session_form(&req);
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("metadata[order_id]"), Some(order_id.to_string().as_str()));
        assert_eq!(get("customer_email"), Some("guest@example.com"));
        assert_eq!(
            get("line_items[0][price_data][unit_amount]"),
            Some("10000")
        );
        assert_eq!(get("line_items[0][quantity]"), Some("2"));
        assert_eq!(
            get("line_items[1][price_data][product_data][name]"),
            Some("Dostawa")
        );
        assert_eq!(get("line_items[1][price_data][unit_amount]"), Some("1500"));
    }

    #[test]
    fn paid_session_is_detected_from_either_field() {
        let paid = SessionStatus {
            id: "cs_1".into(),
            status: "open".into(),
            payment_status: "paid".into(),
        };
        let complete = SessionStatus {
            id: "cs_2".into(),
            status: "complete".into(),
            payment_status: "unpaid".into(),
        };
        let unpaid = SessionStatus {
            id: "cs_3".into(),
            status: "open".into(),
            payment_status: "unpaid".into(),
        };
        assert!(paid.is_paid());
        assert!(complete.is_paid());
        assert!(!unpaid.is_paid());
    }
}
