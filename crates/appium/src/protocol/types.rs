// Typed command payloads and results
//
// Request structs serialize to the exact body each command sends. Result
// structs are lenient: every field is optional and unknown fields are kept
// in `extra`, since servers disagree on what they return.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of `GET /status`
///
/// See: <https://www.w3.org/TR/webdriver2/#status>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerStatus {
    /// Whether the server can create new sessions (W3C servers only)
    pub ready: Option<bool>,
    /// Human-readable readiness message
    pub message: Option<String>,
    /// Build information (`{version, revision, time}` on Appium)
    pub build: Option<Value>,
    /// Everything else the server reported
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerStatus {
    /// Server build version, when reported
    pub fn version(&self) -> Option<&str> {
        self.build.as_ref()?.get("version")?.as_str()
    }
}

/// One entry returned by `GET /session/{id}/log/{type}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch
    pub timestamp: Option<i64>,
    /// Level name (e.g., "INFO", "SEVERE")
    pub level: Option<String>,
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /session/{id}/element(s)`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct FindElementParams<'a> {
    pub using: &'a str,
    pub value: &'a str,
}

/// Body of `POST /session/{id}/element/{elementId}/value`
///
/// `value` is the per-character split legacy servers expect; `text` is the
/// W3C field. Both are sent.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendKeysParams<'a> {
    pub value: Vec<String>,
    pub text: &'a str,
}

impl<'a> SendKeysParams<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            value: text.chars().map(String::from).collect(),
            text,
        }
    }
}

/// Body of `POST /session/{id}/appium/device/lock`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct LockParams {
    pub seconds: u64,
}

/// Body of `POST /session/{id}/appium/performanceData`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PerformanceDataParams<'a> {
    pub package_name: &'a str,
    pub data_type: &'a str,
    /// Whole milliseconds
    pub data_read_timeout: u64,
}
