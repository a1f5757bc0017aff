//! Endpoint URL table
//!
//! Fixed mapping from logical operation to service URL and HTTP
//! method, mirroring the r2 service catalogue.

use crate::transport::Method;

/// Production service base URL
pub const DEFAULT_BASE_URL: &str = "https://pvoutput.org/service/r2/";

/// A service endpoint on the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    AddStatus,
    AddOutput,
    DeleteStatus,
    GetStatus,
    GetSystem,
    RegisterNotification,
    DeregisterNotification,
}

impl Endpoint {
    /// Path of the endpoint relative to the service base URL
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::AddStatus => "addstatus.jsp",
            Endpoint::AddOutput => "addoutput.jsp",
            Endpoint::DeleteStatus => "deletestatus.jsp",
            Endpoint::GetStatus => "getstatus.jsp",
            Endpoint::GetSystem => "getsystem.jsp",
            Endpoint::RegisterNotification => "registernotification.jsp",
            Endpoint::DeregisterNotification => "deregisternotification.jsp",
        }
    }

    /// HTTP method the endpoint expects
    pub fn method(&self) -> Method {
        match self {
            Endpoint::AddStatus | Endpoint::AddOutput | Endpoint::DeleteStatus => Method::Post,
            Endpoint::GetStatus
            | Endpoint::GetSystem
            | Endpoint::RegisterNotification
            | Endpoint::DeregisterNotification => Method::Get,
        }
    }

    /// Absolute URL for the endpoint under the given base
    pub fn url(&self, base_url: &str) -> String {
        if base_url.ends_with('/') {
            format!("{}{}", base_url, self.path())
        } else {
            format!("{}/{}", base_url, self.path())
        }
    }
}
