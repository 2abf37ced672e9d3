use std::collections::HashMap;
use std::time::Duration;

/// Options for the default HTTP transport created by `Client::with_options`.
///
/// None of these affect the protocol layer; they only configure how requests
/// reach the server.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Total time allowed for a single request, including reading the body.
    /// No limit when unset.
    pub timeout: Option<Duration>,
    /// Time allowed to establish the TCP/TLS connection.
    pub connect_timeout: Option<Duration>,
    /// Additional HTTP headers sent with every request.
    pub headers: Option<HashMap<String, String>>,
    /// User-Agent header. Defaults to `appium-rs/<version>`.
    pub user_agent: Option<String>,
}

impl ClientOptions {
    /// Creates a new `ClientOptions` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Replace all extra headers.
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
