//! Response parsing
//!
//! The Get Status service answers with a single comma-separated line:
//! date, time, six numeric-or-"NaN" metrics, a normalised output
//! value, and (for donation accounts asking for extended data) up to
//! six extra metrics. "NaN" tokens mark absent readings and map to
//! `None`, never to a floating NaN.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::transport::ApiResponse;

/// Error type for status-line parsing failures
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("status line too short: expected at least 9 fields, got {0}")]
    TooShort(usize),
    #[error("invalid numeric value for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// A parsed system status line
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReading {
    /// Reading date, `YYYYMMDD`
    pub d: String,
    /// Reading time, `HH:MM`
    pub t: String,
    /// Combined date and time
    pub timestamp: NaiveDateTime,
    /// Energy Generation (Wh)
    pub v1: Option<f64>,
    /// Power Exporting (W)
    pub v2: Option<f64>,
    /// Energy Consumption (Wh)
    pub v3: Option<f64>,
    /// Power Importing (W)
    pub v4: Option<f64>,
    /// Temperature (C)
    pub v5: Option<f64>,
    /// Voltage
    pub v6: Option<f64>,
    pub normalised_output: f64,
    /// Extended Values 1-6, only present for donation accounts
    pub v7: Option<f64>,
    pub v8: Option<f64>,
    pub v9: Option<f64>,
    pub v10: Option<f64>,
    pub v11: Option<f64>,
    pub v12: Option<f64>,
}

const EXTENDED_FIELDS: [&str; 6] = ["v7", "v8", "v9", "v10", "v11", "v12"];

impl StatusReading {
    /// Parse a status line into its positional fields
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 9 {
            return Err(ParseError::TooShort(fields.len()));
        }

        let d = fields[0].to_string();
        let t = fields[1].to_string();
        let timestamp = NaiveDateTime::parse_from_str(&format!("{d} {t}"), "%Y%m%d %H:%M")
            .map_err(|_| ParseError::InvalidTimestamp(format!("{d} {t}")))?;

        let normalised_output: f64 = fields[8].parse().map_err(|_| ParseError::InvalidNumber {
            field: "normalised_output",
            value: fields[8].to_string(),
        })?;

        let mut extended = [None; 6];
        for (index, raw) in fields[9..].iter().take(6).enumerate() {
            extended[index] = metric(EXTENDED_FIELDS[index], raw)?;
        }

        Ok(Self {
            d,
            t,
            timestamp,
            v1: metric("v1", fields[2])?,
            v2: metric("v2", fields[3])?,
            v3: metric("v3", fields[4])?,
            v4: metric("v4", fields[5])?,
            v5: metric("v5", fields[6])?,
            v6: metric("v6", fields[7])?,
            normalised_output,
            v7: extended[0],
            v8: extended[1],
            v9: extended[2],
            v10: extended[3],
            v11: extended[4],
            v12: extended[5],
        })
    }

    /// Whether any extended metric was present on the line
    pub fn has_extended(&self) -> bool {
        [self.v7, self.v8, self.v9, self.v10, self.v11, self.v12]
            .iter()
            .any(Option::is_some)
    }
}

/// Parse one numeric token; "NaN" marks an absent reading
fn metric(field: &'static str, raw: &str) -> Result<Option<f64>, ParseError> {
    if raw == "NaN" {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| ParseError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

/// Pick the rate-limit metadata out of a response's headers.
///
/// Header names are matched case-insensitively since reqwest
/// lowercases them.
pub fn rate_limit_headers(response: &ApiResponse) -> HashMap<String, String> {
    response
        .headers
        .iter()
        .filter(|(name, _)| name.to_ascii_lowercase().starts_with("x-rate-limit"))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
