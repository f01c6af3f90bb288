use futures_util::future::join_all;
use storefront_catalog::inventory::{reduce_stock, StockAdjustment};
use storefront_core::cms::{CatalogCms, CmsError};
use storefront_core::models::OrderItem;

#[derive(Debug, Clone)]
pub struct StockUpdateResult {
    pub uid: String,
    pub outcome: Result<StockAdjustment, CmsError>,
}

#[derive(Debug, Clone, Default)]
pub struct StockReconciliationReport {
    pub results: Vec<StockUpdateResult>,
}

impl StockReconciliationReport {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &CmsError)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().err().map(|e| (r.uid.as_str(), e)))
    }

    pub fn is_complete(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_ok())
    }
}

/// One (uid, quantity) per product, in first-seen cart order.
/// Repeated lines for the same uid are summed so they cannot race each other.
pub fn stock_lines(items: &[OrderItem]) -> Vec<(String, u32)> {
    let mut lines: Vec<(String, u32)> = Vec::new();
    for item in items {
        match lines.iter_mut().find(|(uid, _)| *uid == item.product_id) {
            Some((_, quantity)) => *quantity = quantity.saturating_add(item.quantity),
            None => lines.push((item.product_id.clone(), item.quantity)),
        }
    }
    lines
}

/// Reduce CMS stock for every product concurrently. Waits for all of them;
/// one failure neither cancels nor skips the others.
pub async fn reconcile_stock(cms: &dyn CatalogCms, items: &[OrderItem]) -> StockReconciliationReport {
    let updates = stock_lines(items).into_iter().map(|(uid, quantity)| async move {
        let outcome = reduce_stock(cms, &uid, quantity).await;
        StockUpdateResult { uid, outcome }
    });

    StockReconciliationReport {
        results: join_all(updates).await,
    }
}
