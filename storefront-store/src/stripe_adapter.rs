use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use storefront_core::payment::{Charge, ChargeRequest, PaymentAdapter, PaymentCustomer, PaymentError};
use tracing::info;

use crate::app_config::PaymentConfig;

/// Charges cards through Stripe's customers and charges endpoints
pub struct StripePaymentAdapter {
    client: Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChargeDto {
    id: String,
    #[serde(default)]
    paid: bool,
    source: Option<SourceDto>,
}

#[derive(Debug, Deserialize)]
struct SourceDto {
    id: String,
}

impl StripePaymentAdapter {
    pub fn new(config: &PaymentConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
        idempotency_key: Option<&str>,
    ) -> Result<T, PaymentError> {
        let mut request = self
            .client
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key)
            .form(form);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(PaymentError::Declined(error_message(&body, status.as_u16())));
        }
        serde_json::from_slice(&body).map_err(|e| PaymentError::Decode(e.to_string()))
    }
}

fn error_message(body: &[u8], status: u16) -> String {
    serde_json::from_slice::<StripeErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| format!("provider returned status {}", status))
}

fn charge_form(request: &ChargeRequest) -> Vec<(&'static str, String)> {
    vec![
        ("amount", request.amount.to_string()),
        ("currency", request.currency.clone()),
        ("customer", request.customer_id.clone()),
        ("receipt_email", request.receipt_email.clone()),
    ]
}

#[async_trait]
impl PaymentAdapter for StripePaymentAdapter {
    async fn create_customer(
        &self,
        email: &str,
        source: &str,
    ) -> Result<PaymentCustomer, PaymentError> {
        let form = [("email", email.to_string()), ("source", source.to_string())];
        self.post_form("/v1/customers", &form, None).await
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, PaymentError> {
        let dto: ChargeDto = self
            .post_form(
                "/v1/charges",
                &charge_form(request),
                Some(request.idempotency_key.as_str()),
            )
            .await?;

        info!("Stripe charge {} created (paid: {})", dto.id, dto.paid);
        Ok(Charge {
            id: dto.id,
            paid: dto.paid,
            source_id: dto.source.map(|s| s.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::payment::IdempotencyKey;

    #[test]
    fn test_charge_form_fields() {
        let request = ChargeRequest {
            amount: 49900,
            currency: "inr".to_string(),
            customer_id: "cus_123".to_string(),
            receipt_email: "asha@example.com".to_string(),
            idempotency_key: IdempotencyKey::generate(),
        };
        let form = charge_form(&request);
        assert!(form.contains(&("amount", "49900".to_string())));
        assert!(form.contains(&("customer", "cus_123".to_string())));
        assert_eq!(form.len(), 4);
    }

    #[test]
    fn test_error_message_prefers_provider_text() {
        let body = br#"{"error": {"type": "card_error", "message": "Your card was declined."}}"#;
        assert_eq!(error_message(body, 402), "Your card was declined.");
        assert_eq!(error_message(b"oops", 500), "provider returned status 500");
    }

    #[test]
    fn test_charge_dto_without_source() {
        let dto: ChargeDto = serde_json::from_str(r#"{"id": "ch_1", "paid": true, "source": null}"#).unwrap();
        assert!(dto.source.is_none());
    }
}
