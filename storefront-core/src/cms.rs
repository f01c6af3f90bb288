use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Stock and rating fields of a CMS product entry
#[derive(Debug, Clone, PartialEq)]
pub struct CmsEntry {
    pub uid: String,
    pub stock_count: i64,
    pub rating: f64,
    pub total_reviews: u32,
}

/// Body of the stock automation. Values are precomputed; the automation just writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAutomationPayload {
    pub uid: String,
    /// Quantity being removed
    pub stock_count: u32,
    pub current_stock: i64,
    pub new_stock_count: i64,
}

/// Body of the rating automation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingAutomationPayload {
    pub uid: String,
    pub ratings: f64,
    pub total_reviews: u32,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CmsError {
    #[error("Entry not found: {0}")]
    EntryNotFound(String),
    #[error("CMS request failed: {0}")]
    Transport(String),
    #[error("CMS responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unexpected CMS response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait CatalogCms: Send + Sync {
    async fn fetch_entry(&self, uid: &str) -> Result<CmsEntry, CmsError>;

    async fn run_stock_automation(&self, payload: &StockAutomationPayload) -> Result<(), CmsError>;

    async fn run_rating_automation(&self, payload: &RatingAutomationPayload) -> Result<(), CmsError>;
}

#[derive(Default)]
struct MockCmsState {
    entries: HashMap<String, CmsEntry>,
    broken: HashSet<String>,
    stock_calls: Vec<StockAutomationPayload>,
    rating_calls: Vec<RatingAutomationPayload>,
}

/// In-process CMS. Automation calls are applied to the stored entries so a
/// follow-up fetch sees the new figures.
#[derive(Default)]
pub struct MockCatalogCms {
    state: Mutex<MockCmsState>,
}

impl MockCatalogCms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, uid: &str, stock_count: i64, rating: f64, total_reviews: u32) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.entries.insert(
                uid.to_string(),
                CmsEntry {
                    uid: uid.to_string(),
                    stock_count,
                    rating,
                    total_reviews,
                },
            );
        }
        self
    }

    /// Every call touching `uid` fails with a transport error
    pub fn with_broken_entry(self, uid: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.broken.insert(uid.to_string());
        }
        self
    }

    pub fn entry(&self, uid: &str) -> Option<CmsEntry> {
        self.state.lock().ok()?.entries.get(uid).cloned()
    }

    pub fn stock_calls(&self) -> Vec<StockAutomationPayload> {
        self.state.lock().map(|s| s.stock_calls.clone()).unwrap_or_default()
    }

    pub fn rating_calls(&self) -> Vec<RatingAutomationPayload> {
        self.state.lock().map(|s| s.rating_calls.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MockCmsState>, CmsError> {
        self.state
            .lock()
            .map_err(|_| CmsError::Transport("mock CMS state poisoned".to_string()))
    }
}

#[async_trait]
impl CatalogCms for MockCatalogCms {
    async fn fetch_entry(&self, uid: &str) -> Result<CmsEntry, CmsError> {
        let state = self.lock()?;
        if state.broken.contains(uid) {
            return Err(CmsError::Transport(format!("connection reset fetching {}", uid)));
        }
        state
            .entries
            .get(uid)
            .cloned()
            .ok_or_else(|| CmsError::EntryNotFound(uid.to_string()))
    }

    async fn run_stock_automation(&self, payload: &StockAutomationPayload) -> Result<(), CmsError> {
        let mut state = self.lock()?;
        if state.broken.contains(&payload.uid) {
            return Err(CmsError::Status { status: 502, body: "automation failed".to_string() });
        }
        if let Some(entry) = state.entries.get_mut(&payload.uid) {
            entry.stock_count = payload.new_stock_count;
        }
        state.stock_calls.push(payload.clone());
        Ok(())
    }

    async fn run_rating_automation(&self, payload: &RatingAutomationPayload) -> Result<(), CmsError> {
        let mut state = self.lock()?;
        if state.broken.contains(&payload.uid) {
            return Err(CmsError::Status { status: 502, body: "automation failed".to_string() });
        }
        if let Some(entry) = state.entries.get_mut(&payload.uid) {
            entry.rating = payload.ratings;
            entry.total_reviews = payload.total_reviews;
        }
        state.rating_calls.push(payload.clone());
        Ok(())
    }
}
