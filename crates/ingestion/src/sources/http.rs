//! HTTP JSON source

use contracts::{Batch, ContractError, DataSource};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::decode::decode_json;

/// One GET against a JSON endpoint
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    /// Bind the source to `url`, issuing requests with `client`
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl DataSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn location(&self) -> String {
        self.url.clone()
    }

    #[instrument(name = "http_source_fetch", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Batch, ContractError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ContractError::source_unavailable(&self.url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContractError::source_unavailable(
                &self.url,
                format!("HTTP status {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ContractError::source_unavailable(&self.url, e.to_string()))?;
        debug!(bytes = body.len(), "Response received");

        decode_json(&self.url, &body)
    }
}
