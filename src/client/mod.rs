//! API client
//!
//! `Client` is the async interface to the monitoring service; the
//! `blocking` feature adds a synchronous `BlockingClient` twin. Both
//! share `ClientCore`, which owns credentials, builds headers, and
//! validates every input mapping against the endpoint schemas before
//! a request object is handed to the transport. Invalid input never
//! reaches the network.

pub mod endpoints;

#[cfg(feature = "blocking")]
pub mod blocking;

use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDate, NaiveTime, Timelike};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::response::{rate_limit_headers, ParseError, StatusReading};
use crate::schema::registry::{self, Operation};
use crate::schema::ParamMap;
use crate::transport::http::HttpTransport;
use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};
use crate::validation::{validate, ValidationContext, ValidationError};

use endpoints::{Endpoint, DEFAULT_BASE_URL};

/// Error type for client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("HTTP 400: {0}")]
    BadRequest(String),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("date can only be yesterday or today, you provided {0}")]
    DeleteDateOutOfRange(NaiveDate),
}

/// Credentials, account flags and request assembly shared by the async
/// and blocking clients.
///
/// All methods here are synchronous and side-effect free apart from
/// default injection into caller-supplied mappings, so "validate
/// before transport" holds for both client variants by construction.
#[derive(Debug, Clone)]
pub(crate) struct ClientCore {
    pub(crate) apikey: String,
    pub(crate) systemid: u32,
    pub(crate) donation_made: bool,
    pub(crate) stats_period: u32,
    pub(crate) base_url: String,
}

impl ClientCore {
    pub(crate) fn new(apikey: String, systemid: u32) -> Self {
        Self {
            apikey,
            systemid,
            donation_made: false,
            stats_period: 5,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    fn context(&self) -> ValidationContext {
        ValidationContext::new(self.donation_made)
    }

    /// The two fixed authentication headers every call carries
    fn headers(&self) -> HashMap<String, String> {
        HashMap::from([
            ("X-Pvoutput-Apikey".to_string(), self.apikey.clone()),
            ("X-Pvoutput-SystemId".to_string(), self.systemid.to_string()),
        ])
    }

    /// Current time rounded down to the configured stats period
    fn time_by_base(&self) -> String {
        let now = Local::now();
        let period = self.stats_period.max(1);
        let minute = now.minute() - now.minute() % period;
        format!("{:02}:{:02}", now.hour(), minute)
    }

    /// Assemble a request, checking the call envelope first
    fn request(
        &self,
        endpoint: Endpoint,
        data: Option<ParamMap>,
        params: Option<ParamMap>,
        headers: Option<HashMap<String, String>>,
    ) -> Result<ApiRequest, ClientError> {
        let headers = headers.unwrap_or_else(|| self.headers());

        let mut envelope = ParamMap::new();
        if let Some(map) = &data {
            envelope.insert(
                "data".to_string(),
                Value::Object(map.clone().into_iter().collect()),
            );
        }
        if let Some(map) = &params {
            envelope.insert(
                "params".to_string(),
                Value::Object(map.clone().into_iter().collect()),
            );
        }
        envelope.insert(
            "headers".to_string(),
            Value::Object(
                headers
                    .iter()
                    .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                    .collect(),
            ),
        );
        validate(
            &mut envelope,
            registry::schema(Operation::Call),
            &self.context(),
        )?;

        Ok(ApiRequest {
            endpoint: endpoint.url(&self.base_url),
            method: endpoint.method(),
            data,
            params,
            headers,
        })
    }

    pub(crate) fn prepare_add_status(
        &self,
        data: &mut ParamMap,
    ) -> Result<ApiRequest, ClientError> {
        // the time default depends on the configured stats period, so it
        // cannot come from the schema
        if !data.contains_key("t") {
            data.insert("t".to_string(), Value::String(self.time_by_base()));
        }
        validate(data, registry::schema(Operation::AddStatus), &self.context())?;
        self.request(Endpoint::AddStatus, Some(data.clone()), None, None)
    }

    pub(crate) fn prepare_add_output(
        &self,
        data: &mut ParamMap,
    ) -> Result<ApiRequest, ClientError> {
        validate(data, registry::schema(Operation::AddOutput), &self.context())?;
        self.request(Endpoint::AddOutput, Some(data.clone()), None, None)
    }

    pub(crate) fn prepare_delete_status(
        &self,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<ApiRequest, ClientError> {
        let today = Local::now().date_naive();
        let yesterday = today - Duration::days(1);
        if date < yesterday || date > today {
            return Err(ClientError::DeleteDateOutOfRange(date));
        }

        let mut data = ParamMap::new();
        data.insert("d".to_string(), json!(date.format("%Y%m%d").to_string()));
        if let Some(time) = time {
            data.insert("t".to_string(), json!(time.format("%H:%M").to_string()));
        }
        validate(
            &mut data,
            registry::schema(Operation::DeleteStatus),
            &self.context(),
        )?;
        self.request(Endpoint::DeleteStatus, Some(data), None, None)
    }

    pub(crate) fn prepare_get_status(&self) -> Result<ApiRequest, ClientError> {
        let mut params = ParamMap::new();
        if self.donation_made {
            // donation accounts can ask for the extended data tail
            params.insert("ext".to_string(), json!(1));
            params.insert("sid".to_string(), json!(self.systemid));
        }
        self.request(Endpoint::GetStatus, None, Some(params), None)
    }

    pub(crate) fn prepare_register_notification(
        &self,
        appid: &str,
        url: &str,
        alerttype: i64,
    ) -> Result<ApiRequest, ClientError> {
        let mut data = ParamMap::from([
            ("appid".to_string(), json!(appid)),
            ("url".to_string(), json!(url)),
            ("alerttype".to_string(), json!(alerttype)),
        ]);
        validate(
            &mut data,
            registry::schema(Operation::RegisterNotification),
            &self.context(),
        )?;

        let params = ParamMap::from([
            ("appid".to_string(), json!(appid)),
            ("type".to_string(), json!(alerttype)),
            ("url".to_string(), json!(url)),
        ]);
        self.request(Endpoint::RegisterNotification, None, Some(params), None)
    }

    pub(crate) fn prepare_deregister_notification(
        &self,
        appid: &str,
        alerttype: i64,
    ) -> Result<ApiRequest, ClientError> {
        let mut data = ParamMap::from([
            ("appid".to_string(), json!(appid)),
            ("alerttype".to_string(), json!(alerttype)),
        ]);
        validate(
            &mut data,
            registry::schema(Operation::DeregisterNotification),
            &self.context(),
        )?;

        let params = ParamMap::from([
            ("appid".to_string(), json!(appid)),
            ("type".to_string(), json!(alerttype)),
        ]);
        self.request(Endpoint::DeregisterNotification, None, Some(params), None)
    }

    pub(crate) fn prepare_rate_limit_probe(&self) -> Result<ApiRequest, ClientError> {
        let mut headers = self.headers();
        headers.insert("X-Rate-Limit".to_string(), "1".to_string());
        self.request(Endpoint::GetSystem, None, Some(ParamMap::new()), Some(headers))
    }

    /// Map HTTP status codes onto errors, the 400 body being the only
    /// diagnostic the service gives back
    pub(crate) fn check_response(response: ApiResponse) -> Result<ApiResponse, ClientError> {
        debug!("response status {}", response.status);
        if response.status == 400 {
            return Err(ClientError::BadRequest(response.body.trim().to_string()));
        }
        if !response.is_success() {
            return Err(ClientError::HttpStatus {
                status: response.status,
                body: response.body.trim().to_string(),
            });
        }
        Ok(response)
    }
}

/// Async interface to the monitoring API
pub struct Client<T: Transport = HttpTransport> {
    core: ClientCore,
    transport: T,
}

impl Client<HttpTransport> {
    /// Create a client with the default reqwest transport
    pub fn new(apikey: impl Into<String>, systemid: u32) -> Self {
        Self::with_transport(apikey, systemid, HttpTransport::new())
    }

    /// Create a client from a loaded configuration file
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.apikey.clone(), config.systemid).donation_made(config.donation_made)
    }
}

impl<T: Transport> Client<T> {
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

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let response = self.transport.send(request).await?;
        ClientCore::check_response(response)
    }

    /// Upload a live status reading.
    ///
    /// Missing `t`/`d` fields are filled in (time rounded down to the
    /// stats period, date defaulting to today) and left in `data` for
    /// the caller to inspect.
    pub async fn add_status(&self, data: &mut ParamMap) -> Result<ApiResponse, ClientError> {
        let request = self.core.prepare_add_status(data)?;
        self.execute(request).await
    }

    /// Upload an end-of-day output summary
    pub async fn add_output(&self, data: &mut ParamMap) -> Result<ApiResponse, ClientError> {
        let request = self.core.prepare_add_output(data)?;
        self.execute(request).await
    }

    /// Delete a status reading.
    ///
    /// The service only accepts deletes for yesterday or today; pass a
    /// time to delete one specific reading instead of the whole day.
    pub async fn delete_status(
        &self,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<ApiResponse, ClientError> {
        let request = self.core.prepare_delete_status(date, time)?;
        self.execute(request).await
    }

    /// Fetch and parse the latest system status
    pub async fn get_status(&self) -> Result<StatusReading, ClientError> {
        let request = self.core.prepare_get_status()?;
        let response = self.execute(request).await?;
        Ok(StatusReading::parse(response.body.trim())?)
    }

    /// Register a callback URL for an alert type
    pub async fn register_notification(
        &self,
        appid: &str,
        url: &str,
        alerttype: i64,
    ) -> Result<ApiResponse, ClientError> {
        let request = self
            .core
            .prepare_register_notification(appid, url, alerttype)?;
        self.execute(request).await
    }

    /// Remove a registered callback for an alert type
    pub async fn deregister_notification(
        &self,
        appid: &str,
        alerttype: i64,
    ) -> Result<ApiResponse, ClientError> {
        let request = self.core.prepare_deregister_notification(appid, alerttype)?;
        self.execute(request).await
    }

    /// Probe the service for the account's rate-limit metadata
    pub async fn check_rate_limit(&self) -> Result<HashMap<String, String>, ClientError> {
        let request = self.core.prepare_rate_limit_probe()?;
        let response = self.execute(request).await?;
        Ok(rate_limit_headers(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Method;
    use crate::validation::ValidationError;
    use regex::Regex;

    fn core() -> ClientCore {
        ClientCore::new("testkey".to_string(), 12345)
    }

    #[test]
    fn test_headers_carry_credentials() {
        let headers = core().headers();
        assert_eq!(headers.get("X-Pvoutput-Apikey"), Some(&"testkey".to_string()));
        assert_eq!(headers.get("X-Pvoutput-SystemId"), Some(&"12345".to_string()));
    }

    #[test]
    fn test_add_status_injects_time_and_date() {
        let mut data = ParamMap::from([("v1".to_string(), json!(123))]);
        let request = core().prepare_add_status(&mut data).unwrap();

        assert_eq!(request.method, Method::Post);
        assert!(request.endpoint.ends_with("/addstatus.jsp"));

        // both defaults were injected into the caller's mapping
        let time = data.get("t").and_then(Value::as_str).unwrap();
        assert!(Regex::new(r"^([0-1][0-9]|2[0-3]):[0-5][0-9]$").unwrap().is_match(time));
        let date = data.get("d").and_then(Value::as_str).unwrap();
        assert!(Regex::new(r"^20\d{6}$").unwrap().is_match(date));
    }

    #[test]
    fn test_injected_time_respects_stats_period() {
        let mut core = core();
        core.stats_period = 15;
        let time = core.time_by_base();
        let minute: u32 = time[3..].parse().unwrap();
        assert_eq!(minute % 15, 0);
    }

    #[test]
    fn test_add_status_requires_a_reading() {
        let mut data = ParamMap::new();
        let result = core().prepare_add_status(&mut data);
        assert!(matches!(
            result,
            Err(ClientError::Validation(ValidationError::MutualExclusion(_)))
        ));
    }

    #[test]
    fn test_delete_status_window() {
        let core = core();
        let today = Local::now().date_naive();

        assert!(core.prepare_delete_status(today, None).is_ok());
        assert!(core
            .prepare_delete_status(today - Duration::days(1), None)
            .is_ok());

        for bad in [today - Duration::days(2), today + Duration::days(1)] {
            assert!(matches!(
                core.prepare_delete_status(bad, None),
                Err(ClientError::DeleteDateOutOfRange(_))
            ));
        }
    }

    #[test]
    fn test_delete_status_wire_fields() {
        let date = Local::now().date_naive();
        let time = NaiveTime::from_hms_opt(20, 13, 0).unwrap();
        let request = core().prepare_delete_status(date, Some(time)).unwrap();

        let data = request.data.unwrap();
        assert_eq!(data.get("t"), Some(&json!("20:13")));
        assert_eq!(
            data.get("d"),
            Some(&json!(date.format("%Y%m%d").to_string()))
        );
    }

    #[test]
    fn test_get_status_extended_params_need_donation() {
        let plain = core().prepare_get_status().unwrap();
        assert!(plain.params.unwrap().is_empty());

        let mut donor = core();
        donor.donation_made = true;
        let request = donor.prepare_get_status().unwrap();
        let params = request.params.unwrap();
        assert_eq!(params.get("ext"), Some(&json!(1)));
        assert_eq!(params.get("sid"), Some(&json!(12345)));
    }

    #[test]
    fn test_register_notification_builds_query() {
        let request = core()
            .prepare_register_notification("my.app.id", "http://example.com/api/", 0)
            .unwrap();
        assert_eq!(request.method, Method::Get);
        let params = request.params.unwrap();
        assert_eq!(params.get("appid"), Some(&json!("my.app.id")));
        assert_eq!(params.get("type"), Some(&json!(0)));
        assert_eq!(params.get("url"), Some(&json!("http://example.com/api/")));
    }

    #[test]
    fn test_register_notification_rejects_unknown_alert_type() {
        let result = core().prepare_register_notification("my.app.id", "http://example.com/", 2);
        assert!(matches!(
            result,
            Err(ClientError::Validation(ValidationError::ChoiceViolation { .. }))
        ));
    }

    #[test]
    fn test_deregister_notification_rejects_unknown_alert_type() {
        let result = core().prepare_deregister_notification("my.app.id", 99);
        assert!(matches!(
            result,
            Err(ClientError::Validation(ValidationError::ChoiceViolation { .. }))
        ));
    }

    #[test]
    fn test_rate_limit_probe_header() {
        let request = core().prepare_rate_limit_probe().unwrap();
        assert!(request.endpoint.ends_with("/getsystem.jsp"));
        assert_eq!(request.headers.get("X-Rate-Limit"), Some(&"1".to_string()));
        // base credentials still present
        assert!(request.headers.contains_key("X-Pvoutput-Apikey"));
    }

    #[test]
    fn test_check_response_maps_statuses() {
        let ok = ApiResponse {
            status: 200,
            body: "OK 200".to_string(),
            headers: HashMap::new(),
        };
        assert!(ClientCore::check_response(ok).is_ok());

        let bad_request = ApiResponse {
            status: 400,
            body: "Bad request: Date is older than 14 days [20190101]\n".to_string(),
            headers: HashMap::new(),
        };
        match ClientCore::check_response(bad_request) {
            Err(ClientError::BadRequest(body)) => {
                assert_eq!(body, "Bad request: Date is older than 14 days [20190101]")
            }
            other => panic!("Expected BadRequest, got {other:?}"),
        }

        let unauthorized = ApiResponse {
            status: 401,
            body: "Unauthorized".to_string(),
            headers: HashMap::new(),
        };
        assert!(matches!(
            ClientCore::check_response(unauthorized),
            Err(ClientError::HttpStatus { status: 401, .. })
        ));
    }
}
