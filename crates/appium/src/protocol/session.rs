// Session protocol object
//
// A server-side automation context bound to one device/app configuration.
// Lifecycle: Unstarted -> Active -> Stopped. Every command other than
// `start` requires Active and is refused locally otherwise.

use crate::api::SessionOptions;
use crate::error::{Error, Result};
use crate::protocol::Element;
use crate::protocol::types::{
    FindElementParams, LockParams, LogEntry, PerformanceDataParams, ServerStatus,
};
use crate::server::channel::Channel;
use crate::server::envelope::{ProtocolResponse, element_id};
use crate::server::transport::{Method, RequestBody};
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Lifecycle state of a [`Session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed locally, no server session yet
    Unstarted,
    /// Server session open with the given id
    Active { id: String },
    /// Stopped; terminal. Build a new `Session` to start over.
    Stopped,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Unstarted => "unstarted",
            SessionState::Active { .. } => "active",
            SessionState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Session represents one automation session on the server.
///
/// Created unstarted by [`Client::new_session`](crate::Client::new_session);
/// no network traffic happens until [`start`](Session::start).
///
/// # Example
///
/// ```ignore
/// use appium_rs::{Client, SessionOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new("http://127.0.0.1:4723/wd/hub")?;
///     let session = client.new_session(
///         SessionOptions::new()
///             .platform_name("Android")
///             .automation_name("UiAutomator2")
///             .app("/path/to/app.apk"),
///     );
///
///     session.start().await?;
///     let login = session.find_element("id", "login").await?;
///     login.click().await?;
///     session.stop().await?;
///     Ok(())
/// }
/// ```
///
/// # Concurrency
///
/// `Session` is `Send + Sync`. Commands may be issued from several tasks at
/// once; `start` and `stop` are serialized internally so transitions never
/// interleave. Other commands do not wait on a transition: one issued while
/// `stop` is in flight may still reach the server. Commands issued after
/// `stop` returns fail with `InvalidState` without sending a request.
pub struct Session {
    channel: Channel,
    options: SessionOptions,
    state: Mutex<SessionState>,
    capabilities: Mutex<Option<Map<String, Value>>>,
    transition: tokio::sync::Mutex<()>,
}

impl Session {
    pub(crate) fn new(channel: Channel, options: SessionOptions) -> Self {
        Self {
            channel,
            options,
            state: Mutex::new(SessionState::Unstarted),
            capabilities: Mutex::new(None),
            transition: tokio::sync::Mutex::new(()),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// Server-issued session id; `None` unless the session is active
    pub fn id(&self) -> Option<String> {
        match &*self.state.lock() {
            SessionState::Active { id } => Some(id.clone()),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(*self.state.lock(), SessionState::Active { .. })
    }

    /// Options this session was created with
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Capabilities the server reported when the session started
    pub fn capabilities(&self) -> Option<Map<String, Value>> {
        self.capabilities.lock().clone()
    }

    pub(crate) fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Session id, or `InvalidState` naming `operation`
    pub(crate) fn active_id(&self, operation: &str) -> Result<String> {
        match &*self.state.lock() {
            SessionState::Active { id } => Ok(id.clone()),
            other => Err(invalid_state(operation, "active", other)),
        }
    }

    fn session_path(&self, operation: &str, suffix: &str) -> Result<String> {
        let id = self.active_id(operation)?;
        Ok(format!("/session/{}{}", id, suffix))
    }

    /// Opens the session on the server.
    ///
    /// Valid only while unstarted. On failure the session stays unstarted and
    /// no id is recorded.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if already started or stopped
    /// - `Transport` / `Decode` / `Command` from the new-session command
    /// - `Decode` if the response carries no session id
    pub async fn start(&self) -> Result<()> {
        let _transition = self.transition.lock().await;

        {
            let state = self.state.lock();
            if *state != SessionState::Unstarted {
                return Err(invalid_state("start session", "unstarted", &state));
            }
        }

        let payload = self.options.to_new_session_payload();
        let response = self
            .channel
            .execute(Method::Post, "/session", Some(payload))
            .await?;

        let id = new_session_id(&response)?;
        let capabilities = response
            .value
            .get("capabilities")
            .or(Some(&response.value))
            .and_then(Value::as_object)
            .cloned();

        tracing::info!(session_id = %id, "Session started");

        *self.capabilities.lock() = capabilities;
        *self.state.lock() = SessionState::Active { id };
        Ok(())
    }

    /// Deletes the session on the server.
    ///
    /// Valid only while active. The session is stopped afterwards whatever
    /// the outcome. A rejection by the server is logged and ignored; transport
    /// and decode failures are returned.
    pub async fn stop(&self) -> Result<()> {
        let _transition = self.transition.lock().await;

        let id = self.active_id("stop session")?;
        let path = format!("/session/{}", id);
        let result = self.channel.execute(Method::Delete, &path, None).await;

        *self.state.lock() = SessionState::Stopped;

        match result {
            Ok(_) => {
                tracing::info!(session_id = %id, "Session stopped");
                Ok(())
            }
            Err(Error::Command { message, .. }) => {
                tracing::warn!(
                    session_id = %id,
                    "Server rejected session deletion, treating session as stopped: {}",
                    message
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Locates one element by strategy (e.g., "id", "xpath",
    /// "accessibility id") and selector.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the session is not active (no request is sent)
    /// - `ElementNotFound` if the server reports no match
    /// - `Decode` if the response carries no element reference
    pub async fn find_element(&self, using: &str, value: &str) -> Result<Element<'_>> {
        let path = self.session_path("find element", "/element")?;
        let response = self
            .channel
            .execute(
                Method::Post,
                &path,
                Some(serde_json::to_value(FindElementParams { using, value })?),
            )
            .await
            .map_err(|e| into_not_found(e, using, value))?;

        let id = element_id(&response.value)
            .ok_or_else(|| response.decode_error("response value carries no element reference"))?;

        tracing::debug!(element_id = %id, using, value, "Element found");

        Ok(Element::new(id, self))
    }

    /// Locates all elements matching strategy and selector.
    ///
    /// No match is an empty list, not an error.
    pub async fn find_elements(&self, using: &str, value: &str) -> Result<Vec<Element<'_>>> {
        let path = self.session_path("find elements", "/elements")?;
        let response = self
            .channel
            .execute(
                Method::Post,
                &path,
                Some(serde_json::to_value(FindElementParams { using, value })?),
            )
            .await?;

        let references = response
            .value
            .as_array()
            .ok_or_else(|| response.decode_error("expected an array of element references"))?;

        references
            .iter()
            .map(|reference| {
                element_id(reference)
                    .map(|id| Element::new(id, self))
                    .ok_or_else(|| response.decode_error("array entry carries no element reference"))
            })
            .collect()
    }

    /// Server status, scoped to this session
    pub async fn status(&self) -> Result<ServerStatus> {
        let path = self.session_path("query status", "/status")?;
        self.channel.get(&path).await
    }

    /// Log entries of the given type (e.g., "logcat", "syslog", "server")
    ///
    /// `log_type` is sent as a single percent-encoded path segment.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `log_type` is empty, `.` or `..` (no request is sent)
    pub async fn log(&self, log_type: &str) -> Result<Vec<LogEntry>> {
        let segment = path_segment(log_type)?;
        let path = self.session_path("read log", &format!("/log/{}", segment))?;
        self.channel.get(&path).await
    }

    /// Locks the device for `duration`, truncated to whole seconds.
    pub async fn lock(&self, duration: Duration) -> Result<()> {
        let path = self.session_path("lock device", "/appium/device/lock")?;
        let params = LockParams {
            seconds: duration.as_secs(),
        };
        self.channel
            .send_no_result(Method::Post, &path, params)
            .await
    }

    pub async fn unlock(&self) -> Result<()> {
        let path = self.session_path("unlock device", "/appium/device/unlock")?;
        self.channel.execute(Method::Post, &path, None).await?;
        Ok(())
    }

    /// Installs an app from its binary contents.
    ///
    /// The bytes are the request body as-is (`application/octet-stream`),
    /// not wrapped in JSON.
    pub async fn install_app(&self, app_binary: impl Into<Bytes>) -> Result<()> {
        let path = self.session_path("install app", "/appium/device/install_app")?;
        let body = RequestBody::Binary(app_binary.into());
        self.channel
            .execute_raw(Method::Post, &path, body)
            .await?;
        Ok(())
    }

    /// Reads an app binary from disk and installs it.
    pub async fn install_app_from_path(&self, app_path: impl AsRef<Path>) -> Result<()> {
        let app_path = app_path.as_ref();
        self.active_id("install app")?;

        let binary = tokio::fs::read(app_path).await.map_err(|e| {
            Error::from(e).context(format!("Failed to read app binary {}", app_path.display()))
        })?;

        self.install_app(binary).await
    }

    /// Performance data for an app package.
    ///
    /// `read_timeout` is sent as whole milliseconds; any fractional
    /// millisecond is truncated (2.5ms is sent as 2).
    pub async fn get_performance_data(
        &self,
        package_name: &str,
        data_type: &str,
        read_timeout: Duration,
    ) -> Result<Value> {
        let path = self.session_path("get performance data", "/appium/performanceData")?;
        let params = PerformanceDataParams {
            package_name,
            data_type,
            data_read_timeout: u64::try_from(read_timeout.as_millis()).unwrap_or(u64::MAX),
        };
        self.channel.send(Method::Post, &path, params).await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("server", &self.channel.base())
            .field("state", &*self.state.lock())
            .field("options", &self.options)
            .finish()
    }
}

fn invalid_state(operation: &str, expected: &str, actual: &SessionState) -> Error {
    Error::InvalidState {
        operation: operation.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

/// Session id from top-level `sessionId` (JSON wire) or `value.sessionId` (W3C)
fn new_session_id(response: &ProtocolResponse) -> Result<String> {
    if let Some(id) = &response.session_id {
        return Ok(id.clone());
    }

    response
        .value
        .get("sessionId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| response.decode_error("new session response carries no session id"))
}

/// Maps a locate-command rejection that means "no match" to `ElementNotFound`
fn into_not_found(err: Error, using: &str, value: &str) -> Error {
    match err {
        Error::Command {
            status,
            error,
            message,
            ..
        } if is_no_such_element(&status, error.as_deref(), &message) => Error::ElementNotFound {
            using: using.to_string(),
            value: value.to_string(),
            message,
        },
        other => other,
    }
}

fn is_no_such_element(status: &str, error: Option<&str>, message: &str) -> bool {
    const NO_SUCH_ELEMENT_STATUS: &str = "7";

    let message = message.to_ascii_lowercase();
    status == NO_SUCH_ELEMENT_STATUS
        || error == Some("no such element")
        || message.contains("no such element")
        || message.contains("could not be located")
}

/// Encodes caller input as exactly one URL path segment.
///
/// Dot segments are rejected since URL parsing collapses them even when
/// percent-encoded.
fn path_segment(value: &str) -> Result<String> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(Error::InvalidArgument(format!(
            "'{}' is not a valid path segment",
            value
        )));
    }
    Ok(urlencoding::encode(value).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::transport::mock::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn session_with(mock: &Arc<MockTransport>) -> Session {
        let channel = Channel::new("http://127.0.0.1:4723/wd/hub", mock.clone());
        Session::new(
            channel,
            SessionOptions::new()
                .platform_name("Android")
                .device_name("emulator-5554"),
        )
    }

    fn sent_json(mock: &MockTransport, index: usize) -> Value {
        match &mock.requests()[index].body {
            RequestBody::Json(bytes) => serde_json::from_slice(bytes).unwrap(),
            other => panic!("expected JSON body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1","value":{"platformName":"Android"}}"#)
            .reply(r#"{"status":0,"value":null}"#);
        let session = session_with(&mock);

        assert_eq!(session.state(), SessionState::Unstarted);
        assert_eq!(session.id(), None);

        session.start().await.unwrap();
        assert_eq!(
            session.state(),
            SessionState::Active {
                id: "s1".to_string()
            }
        );
        assert_eq!(session.capabilities().unwrap()["platformName"], "Android");

        session.stop().await.unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(session.id(), None);

        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].url, "http://127.0.0.1:4723/wd/hub/session");
        assert_eq!(requests[1].method, Method::Delete);
        assert_eq!(requests[1].url, "http://127.0.0.1:4723/wd/hub/session/s1");
    }

    #[tokio::test]
    async fn test_start_sends_capabilities() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1","value":{}}"#);
        let session = session_with(&mock);

        session.start().await.unwrap();

        let body = sent_json(&mock, 0);
        assert_eq!(
            body["capabilities"]["alwaysMatch"]["appium:deviceName"],
            "emulator-5554"
        );
        assert_eq!(body["desiredCapabilities"]["platformName"], "Android");
    }

    #[tokio::test]
    async fn test_start_reads_w3c_session_id() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"value":{"sessionId":"w3c-1","capabilities":{"automationName":"XCUITest"}}}"#);
        let session = session_with(&mock);

        session.start().await.unwrap();
        assert_eq!(session.id().as_deref(), Some("w3c-1"));
        assert_eq!(
            session.capabilities().unwrap()["automationName"],
            "XCUITest"
        );
    }

    #[tokio::test]
    async fn test_start_failure_leaves_session_unstarted() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":33,"value":"could not create session"}"#)
            .reply(r#"{"status":0,"value":{}}"#)
            .fail("connection reset");
        let session = session_with(&mock);

        let err = session.start().await.unwrap_err();
        assert_eq!(err.command_message(), Some("could not create session"));
        assert_eq!(session.state(), SessionState::Unstarted);

        // Success status without an id must not record one
        let err = session.start().await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert_eq!(session.id(), None);

        let err = session.start().await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(session.state(), SessionState::Unstarted);
    }

    #[tokio::test]
    async fn test_start_twice_is_invalid_state() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1"}"#);
        let session = session_with(&mock);

        session.start().await.unwrap();
        let err = session.start().await.unwrap_err();

        assert!(matches!(err, Error::InvalidState { ref actual, .. } if actual == "active"));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_no_restart_after_stop() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1"}"#)
            .reply(r#"{"status":0}"#);
        let session = session_with(&mock);

        session.start().await.unwrap();
        session.stop().await.unwrap();

        assert!(matches!(
            session.start().await,
            Err(Error::InvalidState { .. })
        ));
        assert!(matches!(
            session.stop().await,
            Err(Error::InvalidState { .. })
        ));
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_stop_before_start_is_invalid_state() {
        let mock = Arc::new(MockTransport::new());
        let session = session_with(&mock);

        let err = session.stop().await.unwrap_err();
        assert!(matches!(err, Error::InvalidState { ref actual, .. } if actual == "unstarted"));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_rejection_is_advisory() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1"}"#)
            .reply(r#"{"status":6,"value":"session already gone"}"#);
        let session = session_with(&mock);

        session.start().await.unwrap();
        session.stop().await.unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn test_stop_transport_failure_is_surfaced() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1"}"#)
            .fail("broken pipe");
        let session = session_with(&mock);

        session.start().await.unwrap();
        let err = session.stop().await.unwrap_err();

        assert!(err.is_transport());
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn test_commands_before_start_send_nothing() {
        let mock = Arc::new(MockTransport::new());
        let session = session_with(&mock);

        assert!(matches!(
            session.find_element("id", "login").await,
            Err(Error::InvalidState { .. })
        ));
        assert!(matches!(session.status().await, Err(Error::InvalidState { .. })));
        assert!(matches!(session.log("logcat").await, Err(Error::InvalidState { .. })));
        assert!(matches!(
            session.lock(Duration::from_secs(1)).await,
            Err(Error::InvalidState { .. })
        ));
        assert!(matches!(session.unlock().await, Err(Error::InvalidState { .. })));
        assert!(matches!(
            session.install_app(vec![1u8, 2, 3]).await,
            Err(Error::InvalidState { .. })
        ));
        assert!(matches!(
            session
                .get_performance_data("com.example", "cpuinfo", Duration::from_millis(5))
                .await,
            Err(Error::InvalidState { .. })
        ));

        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_find_element_legacy_reference() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1"}"#)
            .reply(r#"{"status":0,"value":{"ELEMENT":"e1"}}"#);
        let session = session_with(&mock);
        session.start().await.unwrap();

        let element = session.find_element("id", "login").await.unwrap();

        assert_eq!(element.id(), "e1");
        assert_eq!(
            mock.requests()[1].url,
            "http://127.0.0.1:4723/wd/hub/session/s1/element"
        );
        assert_eq!(sent_json(&mock, 1), json!({"using": "id", "value": "login"}));
    }

    #[tokio::test]
    async fn test_find_element_not_found() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1"}"#)
            .reply(r#"{"status":13,"value":"no such element"}"#);
        let session = session_with(&mock);
        session.start().await.unwrap();

        let err = session.find_element("id", "missing").await.unwrap_err();
        match err {
            Error::ElementNotFound {
                using,
                value,
                message,
            } => {
                assert_eq!(using, "id");
                assert_eq!(value, "missing");
                assert_eq!(message, "no such element");
            }
            other => panic!("expected ElementNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_find_element_other_rejection_stays_command_error() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1"}"#)
            .reply(r#"{"status":32,"value":"invalid selector: //*["}"#);
        let session = session_with(&mock);
        session.start().await.unwrap();

        let err = session.find_element("xpath", "//*[").await.unwrap_err();
        assert!(matches!(err, Error::Command { ref status, .. } if status == "32"));
    }

    #[tokio::test]
    async fn test_find_element_without_reference_is_decode_error() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1"}"#)
            .reply(r#"{"status":0,"value":{"id":"e1"}}"#);
        let session = session_with(&mock);
        session.start().await.unwrap();

        let err = session.find_element("id", "login").await.unwrap_err();
        assert!(matches!(err, Error::Decode { ref body, .. } if body.contains("\"id\":\"e1\"")));
    }

    #[tokio::test]
    async fn test_performance_data_truncates_to_millis() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1"}"#)
            .reply(r#"{"status":0,"value":[["user","kernel"],["1.2","0.3"]]}"#);
        let session = session_with(&mock);
        session.start().await.unwrap();

        let data = session
            .get_performance_data("com.example", "cpuinfo", Duration::from_micros(2500))
            .await
            .unwrap();

        assert_eq!(data[0][0], "user");
        assert_eq!(
            sent_json(&mock, 1),
            json!({"packageName": "com.example", "dataType": "cpuinfo", "dataReadTimeout": 2})
        );
    }

    #[tokio::test]
    async fn test_lock_truncates_to_seconds() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1"}"#)
            .reply(r#"{"status":0}"#);
        let session = session_with(&mock);
        session.start().await.unwrap();

        session.lock(Duration::from_millis(3900)).await.unwrap();
        assert_eq!(sent_json(&mock, 1), json!({"seconds": 3}));
    }

    #[test]
    fn test_no_such_element_classification() {
        assert!(is_no_such_element("7", None, "anything"));
        assert!(is_no_such_element("404", Some("no such element"), ""));
        assert!(is_no_such_element("13", None, "No such element: login"));
        assert!(is_no_such_element(
            "13",
            None,
            "An element could not be located on the page"
        ));
        assert!(is_no_such_element(
            "13",
            None,
            "Element Could Not Be Located using id=login"
        ));
        assert!(!is_no_such_element("13", None, "stale element reference"));
    }

    #[test]
    fn test_path_segment_encoding() {
        assert_eq!(path_segment("logcat").unwrap(), "logcat");
        assert_eq!(path_segment("crash/report").unwrap(), "crash%2Freport");
        assert_eq!(path_segment("a?b#c").unwrap(), "a%3Fb%23c");
        assert_eq!(path_segment("../../status").unwrap(), "..%2F..%2Fstatus");
        for bad in ["", ".", ".."] {
            assert!(matches!(path_segment(bad), Err(Error::InvalidArgument(_))));
        }
    }

    #[tokio::test]
    async fn test_log_type_stays_within_session() {
        let mock = Arc::new(MockTransport::new());
        mock.reply(r#"{"status":0,"sessionId":"s1"}"#)
            .reply(r#"{"status":0,"value":[]}"#);
        let session = session_with(&mock);
        session.start().await.unwrap();

        let entries = session.log("../../status").await.unwrap();
        assert!(entries.is_empty());
        assert_eq!(
            mock.requests()[1].url,
            "http://127.0.0.1:4723/wd/hub/session/s1/log/..%2F..%2Fstatus"
        );

        assert!(matches!(session.log("..").await, Err(Error::InvalidArgument(_))));
        assert_eq!(mock.request_count(), 2);
    }
}
