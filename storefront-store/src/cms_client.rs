//! Reqwest-backed CMS adapter: entry reads through the delivery API and the
//! two automation webhooks that write stock and rating figures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use storefront_core::cms::{
    CatalogCms, CmsEntry, CmsError, RatingAutomationPayload, StockAutomationPayload,
};
use tracing::debug;

use crate::app_config::{AutomationEndpoint, AutomationsConfig, CmsConfig};

const AUTOMATION_KEY_HEADER: &str = "ah-http-key";

pub struct ContentstackClient {
    client: Client,
    cms: CmsConfig,
    automations: AutomationsConfig,
}

#[derive(Debug, Deserialize)]
struct EntryEnvelope {
    entry: Option<EntryDto>,
}

/// Numeric fields may be missing or typed as floats by the CMS
#[derive(Debug, Deserialize)]
struct EntryDto {
    #[serde(default)]
    stock_count: Option<f64>,
    #[serde(default)]
    ratings: Option<f64>,
    #[serde(default)]
    total_reviews: Option<f64>,
}

impl EntryDto {
    fn into_entry(self, uid: &str) -> CmsEntry {
        CmsEntry {
            uid: uid.to_string(),
            stock_count: self.stock_count.unwrap_or(0.0).round() as i64,
            rating: self.ratings.unwrap_or(0.0),
            total_reviews: self.total_reviews.unwrap_or(0.0).max(0.0).round() as u32,
        }
    }
}

impl ContentstackClient {
    pub fn new(cms: CmsConfig, automations: AutomationsConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cms.timeout_seconds))
            .build()?;
        Ok(Self { client, cms, automations })
    }

    fn entry_url(&self, uid: &str) -> String {
        format!(
            "{}/content_types/{}/entries/{}",
            self.cms.base_url.trim_end_matches('/'),
            self.cms.content_type,
            uid
        )
    }

    async fn post_automation<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &AutomationEndpoint,
        payload: &T,
    ) -> Result<(), CmsError> {
        let response = self
            .client
            .post(&endpoint.url)
            .header(AUTOMATION_KEY_HEADER, endpoint.key.as_str())
            .json(payload)
            .send()
            .await
            .map_err(|e| CmsError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CmsError::Status { status: status.as_u16(), body });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogCms for ContentstackClient {
    async fn fetch_entry(&self, uid: &str) -> Result<CmsEntry, CmsError> {
        let response = self
            .client
            .get(self.entry_url(uid))
            .query(&[("environment", self.cms.environment.as_str())])
            .header("api_key", self.cms.api_key.as_str())
            .header("access_token", self.cms.access_token.as_str())
            .send()
            .await
            .map_err(|e| CmsError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CmsError::EntryNotFound(uid.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CmsError::Status { status: status.as_u16(), body });
        }

        let body = response.bytes().await.map_err(|e| CmsError::Transport(e.to_string()))?;
        let entry = parse_entry(&body, uid)?;
        debug!("Fetched CMS entry {}: stock {}, rating {} ({} reviews)", uid, entry.stock_count, entry.rating, entry.total_reviews);
        Ok(entry)
    }

    async fn run_stock_automation(&self, payload: &StockAutomationPayload) -> Result<(), CmsError> {
        self.post_automation(&self.automations.stock, payload).await
    }

    async fn run_rating_automation(&self, payload: &RatingAutomationPayload) -> Result<(), CmsError> {
        self.post_automation(&self.automations.rating, payload).await
    }
}

fn parse_entry(body: &[u8], uid: &str) -> Result<CmsEntry, CmsError> {
    let envelope: EntryEnvelope = serde_json::from_slice(body)
        .map_err(|e| CmsError::Decode(format!("invalid entry payload: {}", e)))?;
    envelope
        .entry
        .map(|dto| dto.into_entry(uid))
        .ok_or_else(|| CmsError::EntryNotFound(uid.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ContentstackClient {
        let endpoint = |name: &str| AutomationEndpoint {
            url: format!("https://automations.example.io/run/{}", name),
            key: format!("{}-secret", name),
        };
        ContentstackClient::new(
            CmsConfig {
                api_key: "blt_key".to_string(),
                access_token: "cs_token".to_string(),
                environment: "main".to_string(),
                base_url: "https://cdn.example.io/v3/".to_string(),
                content_type: "home".to_string(),
                timeout_seconds: 5,
            },
            AutomationsConfig { stock: endpoint("stock"), rating: endpoint("rating") },
        )
        .unwrap()
    }

    #[test]
    fn test_entry_url() {
        assert_eq!(
            client().entry_url("blt42"),
            "https://cdn.example.io/v3/content_types/home/entries/blt42"
        );
    }

    #[test]
    fn test_missing_fields_read_as_zero() {
        let entry = parse_entry(br#"{"entry": {"title": "Kettle"}}"#, "blt42").unwrap();
        assert_eq!(entry.stock_count, 0);
        assert_eq!(entry.rating, 0.0);
        assert_eq!(entry.total_reviews, 0);
    }

    #[test]
    fn test_float_typed_counts() {
        let entry = parse_entry(
            br#"{"entry": {"stock_count": 12.0, "ratings": 4.3, "total_reviews": 7}}"#,
            "blt42",
        )
        .unwrap();
        assert_eq!(entry.stock_count, 12);
        assert_eq!(entry.rating, 4.3);
        assert_eq!(entry.total_reviews, 7);
    }

    #[test]
    fn test_absent_entry_is_not_found() {
        assert!(matches!(
            parse_entry(br#"{"error_message": "nope"}"#, "blt42"),
            Err(CmsError::EntryNotFound(_))
        ));
        assert!(matches!(parse_entry(b"<html>", "blt42"), Err(CmsError::Decode(_))));
    }

    #[test]
    fn test_automation_payload_shape() {
        let payload = StockAutomationPayload {
            uid: "blt42".to_string(),
            stock_count: 2,
            current_stock: 5,
            new_stock_count: 3,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"uid": "blt42", "stock_count": 2, "current_stock": 5, "new_stock_count": 3})
        );
    }
}
