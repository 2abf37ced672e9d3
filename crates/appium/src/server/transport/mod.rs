// Appium transport layer
//
// The transport sends one HTTP request and hands back the fully-read
// response. It knows nothing about the protocol envelope; that lives in
// `server::envelope` and `server::channel`.
// - HttpTransport: reqwest-backed default implementation
// - MockTransport: canned responses for unit tests

use bytes::Bytes;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpTransport;

/// Boxed error returned by transports; wrapped into `Error::Transport` by the channel
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Content type sent with every JSON request body
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type sent with raw binary request bodies
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP verbs used by the WebDriver protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body, no content type
    #[default]
    Empty,
    /// Serialized JSON, sent as `application/json`
    Json(Bytes),
    /// Opaque bytes, sent as `application/octet-stream`
    Binary(Bytes),
}

impl RequestBody {
    /// Content type header value for this body, if any
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Json(_) => Some(JSON_CONTENT_TYPE),
            RequestBody::Binary(_) => Some(BINARY_CONTENT_TYPE),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RequestBody::Empty => 0,
            RequestBody::Json(bytes) | RequestBody::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fully-specified request handed to a transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
}

/// A response whose body has already been read to the end
///
/// Transports must drain and release the underlying connection before
/// returning this, on success and on failure alike.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends protocol requests to the automation server.
///
/// Implementations own connection management, TLS and timeouts. They must be
/// safe to share between sessions (`Send + Sync`).
pub trait Transport: Send + Sync {
    /// Send a request and read the complete response body
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<HttpResponse, BoxError>> + Send + '_>>;
}
