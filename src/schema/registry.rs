//! Static catalogue of endpoint schemas
//!
//! One schema per logical API operation, built once and never mutated.
//! Field names, formats and bounds follow the PVOutput API
//! specification: https://pvoutput.org/help/api_specification.html

use std::collections::BTreeMap;

use chrono::Local;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use super::{EndpointSchema, FieldRule, ValueKind};

/// 8-digit date, `YYYYMMDD`
pub const DATE_FORMAT: &str = r"^(20\d{2})(\d{2})(\d{2})$";

/// 24-hour `HH:MM`, minutes zero-padded
pub const TIME_FORMAT: &str = r"^([0-1][0-9]|2[0-3]):[0-5][0-9]$";

/// The cumulative flag field on the add-status endpoint
pub const CUMULATIVE_FLAG: &str = "c1";

/// The energy-consumption field whose upper bound the cumulative flag relaxes
pub const CUMULATIVE_ENERGY_FIELD: &str = "v3";

/// Default upper bound on the energy-consumption reading (Wh)
pub const ENERGY_CONSUMPTION_MAX: f64 = 200_000.0;

/// Logical API operation, used to look up the matching schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Add Status service - live readings
    AddStatus,
    /// Add Output service - end of day summary
    AddOutput,
    /// Delete Status service
    DeleteStatus,
    /// Register Notification service - callback registration
    RegisterNotification,
    /// Deregister Notification service
    DeregisterNotification,
    /// Envelope for the transport call itself (data/params/headers)
    Call,
}

/// Valid notification alert type codes and their names.
///
/// Registering or deregistering a callback with a code outside this set
/// is rejected before any network call.
pub static ALERT_TYPES: Lazy<BTreeMap<i64, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        (0, "All Notifications"),
        (1, "Private Message"),
        (3, "Joined Team"),
        (4, "Added Favourite"),
        (5, "High Consumption Alert"),
        (6, "System Idle Alert"),
        (8, "Low Generation Alert"),
        (11, "Performance Alert"),
        (14, "Standby Cost Alert"),
        (15, "Extended Data V7 Alert"),
        (16, "Extended Data V8 Alert"),
        (17, "Extended Data V9 Alert"),
        (18, "Extended Data V10 Alert"),
        (19, "Extended Data V11 Alert"),
        (20, "Extended Data V12 Alert"),
        (23, "High Net Power Alert"),
        (24, "Low Net Power Alert"),
    ])
});

static ADDSTATUS: Lazy<EndpointSchema> = Lazy::new(addstatus_schema);
static ADDOUTPUT: Lazy<EndpointSchema> = Lazy::new(addoutput_schema);
static DELETESTATUS: Lazy<EndpointSchema> = Lazy::new(deletestatus_schema);
static REGISTER_NOTIFICATION: Lazy<EndpointSchema> = Lazy::new(register_notification_schema);
static DEREGISTER_NOTIFICATION: Lazy<EndpointSchema> = Lazy::new(deregister_notification_schema);
static CALL: Lazy<EndpointSchema> = Lazy::new(call_schema);

/// Look up the schema for an operation
pub fn schema(operation: Operation) -> &'static EndpointSchema {
    match operation {
        Operation::AddStatus => &ADDSTATUS,
        Operation::AddOutput => &ADDOUTPUT,
        Operation::DeleteStatus => &DELETESTATUS,
        Operation::RegisterNotification => &REGISTER_NOTIFICATION,
        Operation::DeregisterNotification => &DEREGISTER_NOTIFICATION,
        Operation::Call => &CALL,
    }
}

fn today_value() -> Value {
    Value::String(Local::now().format("%Y%m%d").to_string())
}

fn now_time_value() -> Value {
    Value::String(Local::now().format("%H:%M").to_string())
}

/// Required date field with a "today" default, shared by several schemas
fn date_field() -> FieldRule {
    FieldRule::new()
        .required()
        .kind(ValueKind::String)
        .format(DATE_FORMAT)
        .default_computed(today_value)
}

/// Required time field with a "now" default
fn time_field() -> FieldRule {
    FieldRule::new()
        .required()
        .kind(ValueKind::String)
        .format(TIME_FORMAT)
        .default_computed(now_time_value)
}

fn addstatus_schema() -> EndpointSchema {
    // Cumulative energy: with c1 set to 1, 2 or 3 the v1/v3 readings are
    // lifetime totals, which lifts the usual upper bound on v3.
    EndpointSchema::new()
        .field("d", date_field())
        .field("t", time_field())
        // Energy Generation (Wh)
        .field("v1", FieldRule::new().kind(ValueKind::Integer))
        // Power Exporting (W)
        .field("v2", FieldRule::new())
        // Energy Consumption (Wh)
        .field("v3", FieldRule::new().maxval(ENERGY_CONSUMPTION_MAX))
        // Power Importing (W)
        .field("v4", FieldRule::new())
        // Temperature (C)
        .field("v5", FieldRule::new().kind(ValueKind::Float))
        // Voltage
        .field("v6", FieldRule::new().kind(ValueKind::Float))
        // Net Flag
        .field("n", FieldRule::new().format("^1$"))
        // Cumulative Flag
        .field("c1", FieldRule::new().kind(ValueKind::Integer).format("^[123]$"))
        // Extended Values 1-6, donation only
        .field("v7", FieldRule::new().donation_required())
        .field("v8", FieldRule::new().donation_required())
        .field("v9", FieldRule::new().donation_required())
        .field("v10", FieldRule::new().donation_required())
        .field("v11", FieldRule::new().donation_required())
        .field("v12", FieldRule::new().donation_required())
        // Text Message 1, donation only
        .field("m1", FieldRule::new().maxlen(30).donation_required())
        .required_oneof(&["v1", "v2", "v3", "v4"])
}

fn addoutput_schema() -> EndpointSchema {
    EndpointSchema::new()
        .field("d", date_field())
        // Generated (Wh)
        .field("g", FieldRule::new().kind(ValueKind::Integer))
        // Exported (Wh)
        .field("e", FieldRule::new().kind(ValueKind::Integer))
        // Peak Power (W)
        .field("pp", FieldRule::new().kind(ValueKind::Integer))
        // Peak Time
        .field("pt", FieldRule::new().kind(ValueKind::String).format(TIME_FORMAT))
        // Condition
        .field(
            "cd",
            FieldRule::new().kind(ValueKind::String).format(
                "^(Fine|Partly Cloudy|Mostly Cloudy|Cloudy|Showers|Snow|Hazy|Fog|Dusty|Frost|Storm)$",
            ),
        )
        // Min / Max Temp (C)
        .field("tm", FieldRule::new().kind(ValueKind::Float))
        .field("tx", FieldRule::new().kind(ValueKind::Float))
        // Comments
        .field("cm", FieldRule::new().kind(ValueKind::String))
        // Import Peak / Off Peak / Shoulder / High Shoulder (Wh)
        .field("ip", FieldRule::new().kind(ValueKind::Integer))
        .field("io", FieldRule::new().kind(ValueKind::Integer))
        .field("is", FieldRule::new().kind(ValueKind::Integer))
        .field("ih", FieldRule::new().kind(ValueKind::Integer))
        // Consumption (Wh)
        .field("c", FieldRule::new().kind(ValueKind::Integer))
        // Export Peak / Off-Peak / Shoulder / High Shoulder (Wh)
        .field("ep", FieldRule::new().kind(ValueKind::Integer))
        .field("eo", FieldRule::new().kind(ValueKind::Integer))
        .field("es", FieldRule::new().kind(ValueKind::Integer))
        .field("eh", FieldRule::new().kind(ValueKind::Integer))
}

fn deletestatus_schema() -> EndpointSchema {
    EndpointSchema::new()
        .field(
            "d",
            FieldRule::new().required().kind(ValueKind::String).format(DATE_FORMAT),
        )
        .field("t", FieldRule::new().kind(ValueKind::String).format(TIME_FORMAT))
}

fn deregister_notification_schema() -> EndpointSchema {
    EndpointSchema::new()
        .field(
            "appid",
            FieldRule::new().required().kind(ValueKind::String).maxlen(100),
        )
        .field(
            "alerttype",
            FieldRule::new()
                .required()
                .kind(ValueKind::Integer)
                .choices(ALERT_TYPES.keys().map(|code| json!(code)).collect()),
        )
}

fn register_notification_schema() -> EndpointSchema {
    // Derived from the deregister schema by structural extension. The
    // builder returns an independent copy, so adding the url field here
    // cannot leak into the deregister rules.
    deregister_notification_schema().field(
        "url",
        FieldRule::new().required().kind(ValueKind::String).maxlen(150),
    )
}

fn call_schema() -> EndpointSchema {
    EndpointSchema::new()
        .field("data", FieldRule::new().kind(ValueKind::Object))
        .field("params", FieldRule::new().kind(ValueKind::Object))
        .field("headers", FieldRule::new().kind(ValueKind::Object))
}
