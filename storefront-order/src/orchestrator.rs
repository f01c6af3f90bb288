use std::sync::Arc;

use storefront_core::cms::CatalogCms;
use storefront_core::models::Order;
use storefront_core::payment::{to_minor_units, Charge, ChargeRequest, IdempotencyKey, PaymentAdapter, PaymentToken};
use storefront_core::repository::OrderRepository;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::{OrderAttemptState, PlaceOrderOutcome, PlaceOrderRequest};
use crate::reconciliation::reconcile_stock;

/// Runs checkout: charge the card, record the order, then bring CMS stock down.
///
/// The charge and the order row are the source of truth. Stock updates are
/// best effort and never fail an order that has already been recorded.
pub struct OrderWorkflow {
    payment: Arc<dyn PaymentAdapter>,
    orders: Arc<dyn OrderRepository>,
    cms: Arc<dyn CatalogCms>,
    currency: String,
}

/// Tracks one checkout for logging
struct Attempt {
    id: Uuid,
    state: OrderAttemptState,
}

impl Attempt {
    fn start() -> Self {
        let attempt = Self { id: Uuid::new_v4(), state: OrderAttemptState::Charging };
        debug!("Order attempt {} -> {}", attempt.id, attempt.state);
        attempt
    }

    fn advance(&mut self, next: OrderAttemptState) {
        info!("Order attempt {} {} -> {}", self.id, self.state, next);
        self.state = next;
    }
}

impl OrderWorkflow {
    pub fn new(
        payment: Arc<dyn PaymentAdapter>,
        orders: Arc<dyn OrderRepository>,
        cms: Arc<dyn CatalogCms>,
        currency: impl Into<String>,
    ) -> Self {
        Self { payment, orders, cms, currency: currency.into() }
    }

    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<PlaceOrderOutcome, OrderError> {
        if !request.subtotal.is_finite() || request.subtotal <= 0.0 {
            return Err(OrderError::InvalidRequest(format!(
                "subtotal must be a positive amount, got {}",
                request.subtotal
            )));
        }

        let mut attempt = Attempt::start();

        let (charge, transaction_id) = match self.charge(&request.token, request.subtotal).await {
            Ok(charged) => charged,
            Err(e) => {
                attempt.advance(OrderAttemptState::ChargeFailed);
                warn!("Charge failed for {}: {}", request.current_user.id, e);
                return Err(e);
            }
        };
        attempt.advance(OrderAttemptState::Charged);

        let order = Order::new(
            &request.current_user,
            request.cart_items,
            request.token.shipping_address(),
            request.subtotal,
            transaction_id,
        );

        attempt.advance(OrderAttemptState::Persisting);
        if let Err(e) = self.orders.create_order(&order).await {
            attempt.advance(OrderAttemptState::PersistFailed);
            // The customer has paid but there is no order. Nothing reverses the charge.
            error!(
                "Order for {} not saved after charge {} succeeded; charge stands: {}",
                order.user_id, charge.id, e
            );
            return Err(OrderError::PersistFailed {
                charge_id: charge.id,
                reason: e.to_string(),
            });
        }
        attempt.advance(OrderAttemptState::Persisted);
        info!("Order {} placed for {} (charge {})", order.id, order.user_id, charge.id);

        attempt.advance(OrderAttemptState::StockReconciling);
        let stock = reconcile_stock(self.cms.as_ref(), &order.order_items).await;
        for (uid, e) in stock.failures() {
            warn!("Stock not reduced in CMS for {} (order {}): {}", uid, order.id, e);
        }
        attempt.advance(OrderAttemptState::Done);

        Ok(PlaceOrderOutcome { order, charge_id: charge.id, stock })
    }

    /// Returns the charge and the id of the card it was taken from
    async fn charge(&self, token: &PaymentToken, subtotal: f64) -> Result<(Charge, String), OrderError> {
        let customer = self
            .payment
            .create_customer(&token.email, &token.id)
            .await
            .map_err(|e| OrderError::ChargeFailed(e.to_string()))?;

        let request = ChargeRequest {
            amount: to_minor_units(subtotal),
            currency: self.currency.clone(),
            customer_id: customer.id,
            receipt_email: token.email.clone(),
            idempotency_key: IdempotencyKey::generate(),
        };

        let charge = self
            .payment
            .create_charge(&request)
            .await
            .map_err(|e| OrderError::ChargeFailed(e.to_string()))?;

        if !charge.paid {
            return Err(OrderError::ChargeFailed(format!("charge {} was not paid", charge.id)));
        }
        match charge.source_id.clone() {
            Some(source_id) => Ok((charge, source_id)),
            None => {
                error!("Charge {} succeeded without a payment source; no order recorded", charge.id);
                Err(OrderError::ChargeFailed(format!("charge {} has no payment source", charge.id)))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid order request: {0}")]
    InvalidRequest(String),

    #[error("Payment failed: {0}")]
    ChargeFailed(String),

    #[error("Order not saved after charge {charge_id}: {reason}")]
    PersistFailed {
        charge_id: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use storefront_core::cms::MockCatalogCms;
    use storefront_core::models::{CurrentUser, OrderItem};
    use storefront_core::payment::{CardDetails, MockPaymentAdapter};
    use storefront_store::MemoryStore;

    struct UnavailableOrderRepo;

    #[async_trait]
    impl OrderRepository for UnavailableOrderRepo {
        async fn create_order(&self, _order: &Order) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
            Err("connection refused".into())
        }

        async fn get_order(&self, _id: Uuid) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(None)
        }

        async fn list_orders_for_user(&self, _user_id: &str) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(vec![])
        }

        async fn list_orders(&self) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(vec![])
        }
    }

    fn request(items: Vec<OrderItem>, subtotal: f64) -> PlaceOrderRequest {
        PlaceOrderRequest {
            token: PaymentToken {
                id: "tok_visa".to_string(),
                email: "asha@example.com".to_string(),
                card: Some(CardDetails {
                    address_line1: Some("12 MG Road".to_string()),
                    address_city: Some("Pune".to_string()),
                    address_country: Some("India".to_string()),
                    address_zip: Some("411001".to_string()),
                }),
            },
            cart_items: items,
            current_user: CurrentUser {
                id: "u-1".to_string(),
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
            },
            subtotal,
        }
    }

    #[tokio::test]
    async fn test_successful_checkout_records_one_order() {
        let payment = Arc::new(MockPaymentAdapter::new());
        let store = Arc::new(MemoryStore::new());
        let cms = Arc::new(MockCatalogCms::new().with_entry("blt1", 10, 0.0, 0));
        let workflow = OrderWorkflow::new(payment.clone(), store.clone(), cms.clone(), "inr");

        let outcome = workflow
            .place_order(request(vec![OrderItem::new("blt1", 2)], 499.5))
            .await
            .unwrap();

        let charges = payment.charges();
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].0.amount, 49950);
        assert_eq!(charges[0].0.currency, "inr");

        assert_eq!(store.order_count(), 1);
        let saved = store.get_order(outcome.order.id).await.unwrap().unwrap();
        assert_eq!(saved.order_amount, 499.5);
        assert_eq!(Some(saved.transaction_id.clone()), charges[0].1.source_id);
        assert_eq!(saved.shipping_address.city.as_deref(), Some("Pune"));
        assert!(!saved.is_delivered);

        assert!(outcome.stock.is_complete());
        assert_eq!(cms.entry("blt1").unwrap().stock_count, 8);
    }

    #[tokio::test]
    async fn test_each_checkout_uses_fresh_idempotency_key() {
        let payment = Arc::new(MockPaymentAdapter::new());
        let workflow = OrderWorkflow::new(
            payment.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(MockCatalogCms::new()),
            "inr",
        );

        workflow.place_order(request(vec![], 100.0)).await.unwrap();
        workflow.place_order(request(vec![], 100.0)).await.unwrap();

        let charges = payment.charges();
        assert_eq!(charges.len(), 2);
        assert_ne!(charges[0].0.idempotency_key, charges[1].0.idempotency_key);
    }

    #[tokio::test]
    async fn test_declined_charge_creates_no_order() {
        let store = Arc::new(MemoryStore::new());
        let cms = Arc::new(MockCatalogCms::new().with_entry("blt1", 10, 0.0, 0));
        let workflow = OrderWorkflow::new(
            Arc::new(MockPaymentAdapter::declining()),
            store.clone(),
            cms.clone(),
            "inr",
        );

        let result = workflow.place_order(request(vec![OrderItem::new("blt1", 1)], 250.0)).await;

        assert!(matches!(result, Err(OrderError::ChargeFailed(_))));
        assert_eq!(store.order_count(), 0);
        assert!(cms.stock_calls().is_empty());
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_charge_and_skips_stock() {
        let payment = Arc::new(MockPaymentAdapter::new());
        let cms = Arc::new(MockCatalogCms::new().with_entry("blt1", 10, 0.0, 0));
        let workflow = OrderWorkflow::new(payment.clone(), Arc::new(UnavailableOrderRepo), cms.clone(), "inr");

        let result = workflow.place_order(request(vec![OrderItem::new("blt1", 1)], 250.0)).await;

        match result {
            Err(OrderError::PersistFailed { charge_id, .. }) => {
                assert_eq!(charge_id, payment.charges()[0].1.id);
            }
            other => panic!("expected PersistFailed, got {:?}", other.map(|o| o.order.id)),
        }
        assert!(cms.stock_calls().is_empty());
    }

    #[tokio::test]
    async fn test_stock_failure_does_not_fail_order() {
        let store = Arc::new(MemoryStore::new());
        let cms = Arc::new(
            MockCatalogCms::new()
                .with_broken_entry("blt1")
                .with_entry("blt2", 3, 0.0, 0),
        );
        let workflow = OrderWorkflow::new(Arc::new(MockPaymentAdapter::new()), store.clone(), cms.clone(), "inr");

        let outcome = workflow
            .place_order(request(vec![OrderItem::new("blt1", 1), OrderItem::new("blt2", 1)], 80.0))
            .await
            .unwrap();

        assert_eq!(store.order_count(), 1);
        assert_eq!(outcome.stock.failures().count(), 1);
        assert_eq!(cms.entry("blt2").unwrap().stock_count, 2);
    }

    #[tokio::test]
    async fn test_non_positive_subtotal_is_rejected_before_charging() {
        let payment = Arc::new(MockPaymentAdapter::new());
        let workflow = OrderWorkflow::new(
            payment.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(MockCatalogCms::new()),
            "inr",
        );

        let result = workflow.place_order(request(vec![], 0.0)).await;

        assert!(matches!(result, Err(OrderError::InvalidRequest(_))));
        assert!(payment.charges().is_empty());
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderAttemptState::ChargeFailed.is_terminal());
        assert!(OrderAttemptState::PersistFailed.is_terminal());
        assert!(OrderAttemptState::Done.is_terminal());
        assert!(!OrderAttemptState::StockReconciling.is_terminal());
    }
}
