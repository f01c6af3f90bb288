pub mod models;
pub mod orchestrator;
pub mod reconciliation;

pub use models::{OrderAttemptState, PlaceOrderOutcome, PlaceOrderRequest};
pub use orchestrator::{OrderError, OrderWorkflow};
pub use reconciliation::{reconcile_stock, StockReconciliationReport, StockUpdateResult};
