// Shared JSON-over-HTTP transport for the API clients.
use crate::model::ApiError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    retry_delay: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration, retry_delay: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("movie-trends/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { client, retry_delay })
    }

    /// GETs `url` and decodes the JSON body, re-attempting once on a transient failure.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        match self.get_once(url, query).await {
            Err(e) if e.is_transient() => {
                warn!("Request to {} failed ({}), retrying in {:?}", url, e, self.retry_delay);
                sleep(self.retry_delay).await;
                self.get_once(url, query).await
            }
            other => other,
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(network_error)?;

        check_status(response.status())?;

        let body = response.text().await.map_err(network_error)?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn check_status(status: StatusCode) -> Result<(), ApiError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Auth(status.as_u16())),
        StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited),
        s => Err(ApiError::Http(s.as_u16())),
    }
}

// Query strings carry API keys; keep them out of error messages.
fn network_error(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.without_url().to_string())
}
