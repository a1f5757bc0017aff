//! Blocking API client
//!
//! Synchronous twin of [`super::Client`] for callers without an async
//! runtime. Same credentials, same validation pipeline, same endpoint
//! table; only the transport differs.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

use crate::config::Config;
use crate::response::{rate_limit_headers, StatusReading};
use crate::schema::ParamMap;
use crate::transport::blocking::{BlockingTransport, HttpBlockingTransport};
use crate::transport::{ApiRequest, ApiResponse};

use super::{ClientCore, ClientError};

/// Blocking interface to the monitoring API
pub struct BlockingClient<T: BlockingTransport = HttpBlockingTransport> {
    core: ClientCore,
    transport: T,
}

impl BlockingClient<HttpBlockingTransport> {
    /// Create a client with the default reqwest blocking transport
    pub fn new(apikey: impl Into<String>, systemid: u32) -> Self {
        Self::with_transport(apikey, systemid, HttpBlockingTransport::new())
    }

    /// Create a client from a loaded configuration file
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.apikey.clone(), config.systemid).donation_made(config.donation_made)
    }
}

impl<T: BlockingTransport> BlockingClient<T> {
    /// Create a client over a custom transport
    pub fn with_transport(apikey: impl Into<String>, systemid: u32, transport: T) -> Self {
        Self {
            core: ClientCore::new(apikey.into(), systemid),
            transport,
        }
    }

    /// Mark the account as donation-enabled, unlocking extended fields
    pub fn donation_made(mut self, donation_made: bool) -> Self {
        self.core.donation_made = donation_made;
        self
    }

    /// Status interval configured for the system, in minutes (default 5)
    pub fn stats_period(mut self, minutes: u32) -> Self {
        self.core.stats_period = minutes;
        self
    }

    /// Point the client at a different service base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.core.base_url = base_url.into();
        self
    }

    fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let response = self.transport.send(request)?;
        ClientCore::check_response(response)
    }

    /// Upload a live status reading
    pub fn add_status(&self, data: &mut ParamMap) -> Result<ApiResponse, ClientError> {
        let request = self.core.prepare_add_status(data)?;
        self.execute(request)
    }

    /// Upload an end-of-day output summary
    pub fn add_output(&self, data: &mut ParamMap) -> Result<ApiResponse, ClientError> {
        let request = self.core.prepare_add_output(data)?;
        self.execute(request)
    }

    /// Delete a status reading for yesterday or today
    pub fn delete_status(
        &self,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<ApiResponse, ClientError> {
        let request = self.core.prepare_delete_status(date, time)?;
        self.execute(request)
    }

    /// Fetch and parse the latest system status
    pub fn get_status(&self) -> Result<StatusReading, ClientError> {
        let request = self.core.prepare_get_status()?;
        let response = self.execute(request)?;
        Ok(StatusReading::parse(response.body.trim())?)
    }

    /// Register a callback URL for an alert type
    pub fn register_notification(
        &self,
        appid: &str,
        url: &str,
        alerttype: i64,
    ) -> Result<ApiResponse, ClientError> {
        let request = self
            .core
            .prepare_register_notification(appid, url, alerttype)?;
        self.execute(request)
    }

    /// Remove a registered callback for an alert type
    pub fn deregister_notification(
        &self,
        appid: &str,
        alerttype: i64,
    ) -> Result<ApiResponse, ClientError> {
        let request = self.core.prepare_deregister_notification(appid, alerttype)?;
        self.execute(request)
    }

    /// Probe the service for the account's rate-limit metadata
    pub fn check_rate_limit(&self) -> Result<HashMap<String, String>, ClientError> {
        let request = self.core.prepare_rate_limit_probe()?;
        let response = self.execute(request)?;
        Ok(rate_limit_headers(&response))
    }
}
