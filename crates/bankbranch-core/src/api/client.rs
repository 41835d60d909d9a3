//! API client for the bank branch listing service.

use std::time::Duration;

use reqwest::{header, Client};
use tracing::{debug, info};

use crate::models::BankRecord;

use super::{ApiError, BranchSource};

// ============================================================================
// Constants
// ============================================================================

/// Default base URL of the listing service
pub const DEFAULT_API_BASE_URL: &str = "https://vast-shore-74260.herokuapp.com";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the branch listing service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against `base_url`
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn branches_url(&self) -> String {
        format!("{}/banks", self.base_url)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Parse a listing response body.
    ///
    /// Every record starts out as a non-favourite regardless of what the
    /// payload says.
    pub fn parse_branches(body: &str) -> Result<Vec<BankRecord>, ApiError> {
        let mut records: Vec<BankRecord> = serde_json::from_str(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse branch list: {}", e)))?;

        for record in &mut records {
            record.favourite = false;
        }

        Ok(records)
    }
}

impl BranchSource for ApiClient {
    async fn fetch_branches(&self, city: &str) -> Result<Vec<BankRecord>, ApiError> {
        let url = self.branches_url();
        info!(%url, city, "Fetching branch list");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .query(&[("city", city)])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;
        debug!(bytes = body.len(), "Branch list received");

        let records = Self::parse_branches(&body)?;
        info!(count = records.len(), "Branch list parsed");
        Ok(records)
    }
}

// ============================================================================
// Tests
// ============================================================================
