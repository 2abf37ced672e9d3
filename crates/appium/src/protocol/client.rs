// Client - entry point for talking to an Appium server
//
// Holds the validated server address and the transport, and hands out
// unstarted sessions. Constructing a client or a session never touches the
// network.

use crate::api::{ClientOptions, SessionOptions};
use crate::error::{Error, Result};
use crate::protocol::Session;
use crate::protocol::types::ServerStatus;
use crate::server::channel::Channel;
use crate::server::transport::{HttpTransport, Transport};
use std::sync::Arc;
use url::Url;

/// Client for one Appium/WebDriver server.
///
/// Cheap to clone; clones share the underlying transport and its connection
/// pool.
///
/// # Example
///
/// ```ignore
/// use appium_rs::{Client, SessionOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new("http://127.0.0.1:4723/wd/hub")?;
///     println!("Server: {:?}", client.status().await?.version());
///
///     let session = client.new_session(SessionOptions::new().platform_name("iOS"));
///     session.start().await?;
///     session.stop().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    server_address: Url,
    channel: Channel,
}

impl Client {
    /// Creates a client using the default HTTP transport.
    ///
    /// # Errors
    ///
    /// `InvalidAddress` if `server_address` is not an absolute `http`/`https`
    /// URL with a host.
    pub fn new(server_address: &str) -> Result<Self> {
        Self::with_options(server_address, ClientOptions::default())
    }

    /// Creates a client whose default HTTP transport is configured by `options`.
    pub fn with_options(server_address: &str, options: ClientOptions) -> Result<Self> {
        let url = parse_server_address(server_address)?;
        let transport = HttpTransport::with_options(&options)?;
        Ok(Self::from_parts(url, Arc::new(transport)))
    }

    /// Creates a client that sends every request through `transport`.
    pub fn with_transport(server_address: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let url = parse_server_address(server_address)?;
        Ok(Self::from_parts(url, transport))
    }

    fn from_parts(server_address: Url, transport: Arc<dyn Transport>) -> Self {
        let channel = Channel::new(server_address.as_str(), transport);
        Self {
            server_address,
            channel,
        }
    }

    /// Normalized server base URL
    pub fn server_address(&self) -> &Url {
        &self.server_address
    }

    /// Creates an unstarted session bound to this server.
    ///
    /// No request is sent; call [`Session::start`] to open it.
    pub fn new_session(&self, options: SessionOptions) -> Session {
        Session::new(self.channel.clone(), options)
    }

    /// Server status via the session-independent `GET /status`.
    pub async fn status(&self) -> Result<ServerStatus> {
        self.channel.get("/status").await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("server_address", &self.server_address.as_str())
            .finish()
    }
}

/// Validates and normalizes a server base URL.
///
/// Trailing slashes on the path are removed so command paths can be appended
/// directly; query and fragment are rejected.
pub(crate) fn parse_server_address(address: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    let mut url = Url::parse(address.trim()).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported scheme '{}', expected http or https",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            "query strings and fragments are not allowed".to_string(),
        ));
    }

    let trimmed = url.path().trim_end_matches('/').to_string();
    if trimmed != url.path() {
        url.set_path(&trimmed);
    }

    Ok(url)
}
