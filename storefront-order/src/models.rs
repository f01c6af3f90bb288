use serde::{Deserialize, Serialize};
use storefront_core::models::{CurrentUser, Order, OrderItem};
use storefront_core::payment::PaymentToken;

use crate::reconciliation::StockReconciliationReport;

/// Checkout request as posted by the storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub token: PaymentToken,
    pub cart_items: Vec<OrderItem>,
    pub current_user: CurrentUser,
    /// Decimal currency units
    pub subtotal: f64,
}

/// Where an order attempt is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderAttemptState {
    Charging,
    ChargeFailed,
    Charged,
    Persisting,
    PersistFailed,
    Persisted,
    StockReconciling,
    Done,
}

impl OrderAttemptState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ChargeFailed | Self::PersistFailed | Self::Done)
    }
}

impl std::fmt::Display for OrderAttemptState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Charging => "CHARGING",
            Self::ChargeFailed => "CHARGE_FAILED",
            Self::Charged => "CHARGED",
            Self::Persisting => "PERSISTING",
            Self::PersistFailed => "PERSIST_FAILED",
            Self::Persisted => "PERSISTED",
            Self::StockReconciling => "STOCK_RECONCILING",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// A placed order plus how the CMS stock updates went.
/// Stock failures never undo the order.
#[derive(Debug, Clone)]
pub struct PlaceOrderOutcome {
    pub order: Order,
    pub charge_id: String,
    pub stock: StockReconciliationReport,
}
