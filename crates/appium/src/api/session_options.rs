// Session options for Client::new_session()
//
// The capability set requested when a session starts. Serialized into the
// new-session payload both as W3C `alwaysMatch` capabilities (with `appium:`
// vendor prefixes) and as legacy `desiredCapabilities`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Capabilities requested when starting a session
///
/// All fields are optional; unset fields are left out of the payload so the
/// server applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    /// Target platform (e.g., "Android", "iOS")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_name: Option<String>,

    /// Platform version (e.g., "14")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_version: Option<String>,

    /// Device name or UDID alias
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,

    /// Path or URL of the app under test
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,

    /// Automation engine (e.g., "UiAutomator2", "XCUITest")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_name: Option<String>,

    /// Any other capabilities, sent verbatim
    #[serde(flatten)]
    pub extra_capabilities: Map<String, Value>,
}

impl SessionOptions {
    /// Creates a new SessionOptions with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn platform_name(mut self, platform_name: impl Into<String>) -> Self {
        self.platform_name = Some(platform_name.into());
        self
    }

    pub fn platform_version(mut self, platform_version: impl Into<String>) -> Self {
        self.platform_version = Some(platform_version.into());
        self
    }

    pub fn device_name(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = Some(device_name.into());
        self
    }

    pub fn app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    pub fn automation_name(mut self, automation_name: impl Into<String>) -> Self {
        self.automation_name = Some(automation_name.into());
        self
    }

    /// Adds an arbitrary capability.
    ///
    /// The key is sent as given in both capability maps, so W3C vendor
    /// capabilities should already carry their prefix (`appium:newCommandTimeout`).
    pub fn capability(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_capabilities.insert(name.into(), value.into());
        self
    }

    fn named_capabilities(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("platformName", self.platform_name.as_deref()),
            ("platformVersion", self.platform_version.as_deref()),
            ("deviceName", self.device_name.as_deref()),
            ("app", self.app.as_deref()),
            ("automationName", self.automation_name.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }

    /// W3C `alwaysMatch` map; non-standard keys get the `appium:` prefix
    pub fn to_w3c_capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        for (key, value) in self.named_capabilities() {
            let key = if key == "platformName" {
                key.to_string()
            } else {
                format!("appium:{}", key)
            };
            caps.insert(key, Value::String(value.to_string()));
        }
        for (key, value) in &self.extra_capabilities {
            caps.insert(key.clone(), value.clone());
        }
        caps
    }

    /// Legacy JSON-wire `desiredCapabilities` map
    pub fn to_desired_capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        for (key, value) in self.named_capabilities() {
            caps.insert(key.to_string(), Value::String(value.to_string()));
        }
        for (key, value) in &self.extra_capabilities {
            caps.insert(key.clone(), value.clone());
        }
        caps
    }

    /// Body of the `POST /session` command
    pub fn to_new_session_payload(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": self.to_w3c_capabilities(),
                "firstMatch": [{}],
            },
            "desiredCapabilities": self.to_desired_capabilities(),
        })
    }
}
