//! PVOutput SDK - client library for the PVOutput solar monitoring API
//!
//! Provides unified interfaces for:
//! - Declarative per-endpoint parameter validation (schemas + rule interpreter)
//! - Async and blocking HTTP clients (reqwest)
//! - Status response parsing
//! - Configuration file loading
//!
//! Every operation validates its input against the endpoint's schema
//! before any request is sent; invalid input fails fast with a
//! [`ValidationError`] and never produces network I/O.

pub mod client;
pub mod config;
pub mod response;
pub mod schema;
pub mod transport;
pub mod validation;

// Re-export commonly used types
pub use client::endpoints::{Endpoint, DEFAULT_BASE_URL};
pub use client::{Client, ClientError};
#[cfg(feature = "blocking")]
pub use client::blocking::BlockingClient;

pub use config::{Config, ConfigError};

pub use response::{rate_limit_headers, ParseError, StatusReading};

pub use schema::registry::{self, Operation, ALERT_TYPES};
pub use schema::{EndpointSchema, FieldDefault, FieldRule, ParamMap, ValueKind};

pub use transport::http::HttpTransport;
#[cfg(feature = "blocking")]
pub use transport::blocking::{BlockingTransport, HttpBlockingTransport};
pub use transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};

pub use validation::{validate, ValidationContext, ValidationError};
