use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ShippingAddress;

/// Card token produced by the provider's checkout widget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentToken {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub card: Option<CardDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CardDetails {
    pub address_line1: Option<String>,
    pub address_city: Option<String>,
    pub address_country: Option<String>,
    pub address_zip: Option<String>,
}

impl PaymentToken {
    /// Billing address on the card doubles as the shipping address
    pub fn shipping_address(&self) -> ShippingAddress {
        let card = self.card.clone().unwrap_or_default();
        ShippingAddress {
            address: card.address_line1,
            city: card.address_city,
            country: card.address_country,
            postal_code: card.address_zip,
        }
    }
}

/// Fresh per charge attempt, never reused across requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCustomer {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    /// Amount in the currency's minor unit (paise, cents)
    pub amount: i64,
    pub currency: String,
    pub customer_id: String,
    pub receipt_email: String,
    pub idempotency_key: IdempotencyKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    pub paid: bool,
    /// Id of the card the charge was taken from
    pub source_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),
    #[error("Payment provider unreachable: {0}")]
    Transport(String),
    #[error("Unexpected payment provider response: {0}")]
    Decode(String),
}

/// Convert a decimal amount to the provider's integer minor unit
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Register a customer with a reusable payment source
    async fn create_customer(
        &self,
        email: &str,
        source: &str,
    ) -> Result<PaymentCustomer, PaymentError>;

    /// Charge an existing customer
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, PaymentError>;
}

/// In-process provider for local runs and tests. Records every charge request.
#[derive(Default)]
pub struct MockPaymentAdapter {
    decline: bool,
    charges: Mutex<Vec<(ChargeRequest, Charge)>>,
}

impl MockPaymentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every charge attempt is declined
    pub fn declining() -> Self {
        Self {
            decline: true,
            ..Self::default()
        }
    }

    pub fn charges(&self) -> Vec<(ChargeRequest, Charge)> {
        self.charges.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PaymentAdapter for MockPaymentAdapter {
    async fn create_customer(
        &self,
        email: &str,
        source: &str,
    ) -> Result<PaymentCustomer, PaymentError> {
        if source.is_empty() {
            return Err(PaymentError::Declined(format!("no payment source for {}", email)));
        }
        Ok(PaymentCustomer {
            id: format!("cus_mock_{}", source),
        })
    }

    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, PaymentError> {
        if self.decline {
            return Err(PaymentError::Declined("Your card was declined.".to_string()));
        }

        let charge = Charge {
            id: format!("ch_mock_{}", Uuid::new_v4().simple()),
            paid: true,
            source_id: Some(format!("card_{}", request.customer_id.trim_start_matches("cus_mock_"))),
        };

        if let Ok(mut charges) = self.charges.lock() {
            charges.push((request.clone(), charge.clone()));
        }
        Ok(charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units_rounding() {
        assert_eq!(to_minor_units(499.0), 49900);
        assert_eq!(to_minor_units(19.99), 1999);
        assert_eq!(to_minor_units(0.1 + 0.2), 30);
    }

    #[test]
    fn test_shipping_address_from_card() {
        let token: PaymentToken = serde_json::from_value(serde_json::json!({
            "id": "tok_1",
            "email": "asha@example.com",
            "card": {
                "address_line1": "12 MG Road",
                "address_city": "Pune",
                "address_country": "India",
                "address_zip": "411001"
            }
        }))
        .unwrap();

        let address = token.shipping_address();
        assert_eq!(address.city.as_deref(), Some("Pune"));
        assert_eq!(address.postal_code.as_deref(), Some("411001"));
    }

    #[test]
    fn test_token_without_card_has_empty_address() {
        let token: PaymentToken =
            serde_json::from_value(serde_json::json!({"id": "tok_1", "email": "a@b.c"})).unwrap();
        assert_eq!(token.shipping_address(), ShippingAddress::default());
    }

    #[test]
    fn test_idempotency_keys_are_unique() {
        assert_ne!(IdempotencyKey::generate(), IdempotencyKey::generate());
    }

    #[tokio::test]
    async fn test_declining_mock() {
        let adapter = MockPaymentAdapter::declining();
        let customer = adapter.create_customer("a@b.c", "tok_1").await.unwrap();
        let request = ChargeRequest {
            amount: 100,
            currency: "inr".to_string(),
            customer_id: customer.id,
            receipt_email: "a@b.c".to_string(),
            idempotency_key: IdempotencyKey::generate(),
        };

        assert!(adapter.create_charge(&request).await.is_err());
        assert!(adapter.charges().is_empty());
    }
}
