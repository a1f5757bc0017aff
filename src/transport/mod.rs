//! Transport boundary
//!
//! Defines the Transport trait and implementations for the HTTP
//! clients:
//! - HttpTransport: async reqwest client (default)
//! - HttpBlockingTransport: reqwest blocking client (feature `blocking`)
//!
//! The transport only moves bytes; all parameter validation happens
//! before a request object ever reaches it.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::schema::ParamMap;

/// Error type for transport operations
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Response body error: {0}")]
    Body(String),
}

/// HTTP method for an API call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A fully assembled, validated API request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Absolute endpoint URL
    pub endpoint: String,
    pub method: Method,
    /// Form-encoded body fields (POST)
    pub data: Option<ParamMap>,
    /// Query parameters (GET)
    pub params: Option<ParamMap>,
    pub headers: HashMap<String, String>,
}

/// Transport-level view of a response: status code, text body, headers
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for sending an assembled request over the wire
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Flatten a parameter map into form/query pairs.
///
/// Null values mark absence and are dropped rather than sent as the
/// literal text "null".
pub(crate) fn encode_pairs(map: &ParamMap) -> Vec<(String, String)> {
    map.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

pub mod http;

#[cfg(feature = "blocking")]
pub mod blocking;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_pairs_drops_nulls() {
        let map = ParamMap::from([
            ("d".to_string(), json!("20191012")),
            ("v1".to_string(), json!(1234)),
            ("v5".to_string(), Value::Null),
        ]);
        let pairs = encode_pairs(&map);
        assert_eq!(
            pairs,
            vec![
                ("d".to_string(), "20191012".to_string()),
                ("v1".to_string(), "1234".to_string()),
            ]
        );
    }

    #[test]
    fn test_method_as_str() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
    }

    #[test]
    fn test_response_success_range() {
        let ok = ApiResponse {
            status: 200,
            body: String::new(),
            headers: HashMap::new(),
        };
        assert!(ok.is_success());

        let bad = ApiResponse {
            status: 400,
            ..ok.clone()
        };
        assert!(!bad.is_success());
    }
}
