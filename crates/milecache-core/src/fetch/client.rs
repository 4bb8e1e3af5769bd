//! HTTP fetcher for public activity pages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;

use super::PageFetcher;
use crate::config::Config;
use crate::error::{MilesError, Result};

/// Fetches pages over HTTP, one at a time, sleeping before each request.
pub struct HttpFetcher {
    client: Client,
    throttle: Duration,
    gate: Mutex<()>,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| MilesError::Network {
                url: config.base_url().to_string(),
                source: e,
            })?;

        Ok(Self::with_client(client, config.throttle()))
    }

    pub fn with_client(client: Client, throttle: Duration) -> Self {
        Self {
            client,
            throttle,
            gate: Mutex::new(()),
        }
    }

    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    async fn get(&self, url: &str) -> Result<String> {
        let network = |source: reqwest::Error| MilesError::Network {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MilesError::from_status(status, url, &body));
        }

        response.text().await.map_err(network)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        // Held across the delay and the request: one call in flight per fetcher
        let _slot = self.gate.lock().await;

        if !self.throttle.is_zero() {
            tokio::time::sleep(self.throttle).await;
        }

        debug!(url = url, "GET");
        let body = self.get(url).await?;
        debug!(url = url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
