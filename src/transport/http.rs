//! Async HTTP transport
//!
//! Implements Transport on top of reqwest. TLS, redirects and timeouts
//! are reqwest's defaults; no retry or pooling policy lives here.

use async_trait::async_trait;
use tracing::debug;

use super::{encode_pairs, ApiRequest, ApiResponse, Method, Transport, TransportError};

/// reqwest-backed async transport
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        debug!(
            "sending {} request to {}",
            request.method.as_str(),
            request.endpoint
        );

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.endpoint),
            Method::Post => self.client.post(&request.endpoint),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(params) = &request.params {
            builder = builder.query(&encode_pairs(params));
        }
        if let Some(data) = &request.data {
            builder = builder.form(&encode_pairs(data));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("Request failed: {e}")))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(format!("Failed to read body: {e}")))?;

        Ok(ApiResponse {
            status,
            body,
            headers,
        })
    }
}
