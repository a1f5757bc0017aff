//! Blocking HTTP transport
//!
//! Synchronous twin of [`super::http`], for callers without an async
//! runtime. Gated behind the `blocking` feature.

use tracing::debug;

use super::{encode_pairs, ApiRequest, ApiResponse, Method, TransportError};

/// Trait for sending an assembled request synchronously
pub trait BlockingTransport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed blocking transport
pub struct HttpBlockingTransport {
    client: reqwest::blocking::Client,
}

impl HttpBlockingTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpBlockingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockingTransport for HttpBlockingTransport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
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
            .map_err(|e| TransportError::Body(format!("Failed to read body: {e}")))?;

        Ok(ApiResponse {
            status,
            body,
            headers,
        })
    }
}
