use serde::{Deserialize, Serialize};
use storefront_core::cms::{CatalogCms, CmsError, StockAutomationPayload};

/// A stock reduction as computed from the CMS's current figure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub uid: String,
    pub quantity: u32,
    pub current_stock: i64,
    pub new_stock: i64,
}

impl StockAdjustment {
    /// Stock never goes below zero, even when the cart asks for more than is left
    pub fn reduce(uid: &str, current_stock: i64, quantity: u32) -> Self {
        Self {
            uid: uid.to_string(),
            quantity,
            current_stock,
            new_stock: current_stock.saturating_sub(i64::from(quantity)).max(0),
        }
    }
}

impl From<&StockAdjustment> for StockAutomationPayload {
    fn from(adjustment: &StockAdjustment) -> Self {
        StockAutomationPayload {
            uid: adjustment.uid.clone(),
            stock_count: adjustment.quantity,
            current_stock: adjustment.current_stock,
            new_stock_count: adjustment.new_stock,
        }
    }
}

/// Read the current stock for `uid` and ask the stock automation to store the reduced figure
pub async fn reduce_stock(
    cms: &dyn CatalogCms,
    uid: &str,
    quantity: u32,
) -> Result<StockAdjustment, CmsError> {
    let entry = cms.fetch_entry(uid).await?;
    let adjustment = StockAdjustment::reduce(uid, entry.stock_count, quantity);
    cms.run_stock_automation(&StockAutomationPayload::from(&adjustment)).await?;
    Ok(adjustment)
}
