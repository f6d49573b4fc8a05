use crate::errors::SubmitError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Read side of the content-addressed store. Fetch failures are never
/// retried here; the caller re-runs the whole flow instead.
#[derive(Clone)]
pub struct IpfsFetcher {
    client: Client,
    gateway_base: String,
}

impl IpfsFetcher {
    pub fn new(gateway_base: &str) -> Self {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            gateway_base: gateway_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn content_url(&self, cid: &str) -> String {
        format!("{}/{}", self.gateway_base, cid)
    }

    #[instrument(skip(self))]
    pub async fn fetch_analysis(&self, cid: &str) -> Result<Value, SubmitError> {
        let url = self.content_url(cid);
        debug!(url = %url, "Fetching analysis document");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SubmitError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Gateway returned non-success status");
            return Err(SubmitError::Fetch(format!(
                "Request failed with status {status}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SubmitError::Fetch(e.to_string()))
    }
}
