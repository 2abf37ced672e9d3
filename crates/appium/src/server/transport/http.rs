use super::{BoxError, HttpRequest, HttpResponse, Method, RequestBody, Transport};
use crate::api::ClientOptions;
use crate::{Error, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

/// Default transport backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport with default settings
    pub fn new() -> Result<Self> {
        Self::with_options(&ClientOptions::default())
    }

    /// Builds a transport from client options
    pub fn with_options(options: &ClientOptions) -> Result<Self> {
        let user_agent = options
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("appium-rs/{}", env!("CARGO_PKG_VERSION")));

        let mut builder = reqwest::Client::builder().user_agent(user_agent);

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = options.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        if let Some(headers_map) = &options.headers {
            let mut headers = HeaderMap::new();
            for (k, v) in headers_map {
                let name = HeaderName::from_str(k)
                    .map_err(|e| Error::InvalidArgument(format!("Invalid header name: {}", e)))?;
                let value = HeaderValue::from_str(v)
                    .map_err(|e| Error::InvalidArgument(format!("Invalid header value: {}", e)))?;
                headers.insert(name, value);
            }
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|e| {
            Error::InvalidArgument(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// Wraps an already-configured reqwest client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<HttpResponse, BoxError>> + Send + '_>>
    {
        Box::pin(async move {
            let content_type = request.body.content_type();
            let mut builder = self.client.request(request.method.into(), &request.url);

            if let Some(content_type) = content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            builder = match request.body {
                RequestBody::Empty => builder,
                RequestBody::Json(bytes) | RequestBody::Binary(bytes) => builder.body(bytes),
            };

            let response = builder.send().await?;
            let status = response.status().as_u16();

            // Reading to the end returns the connection to the pool; dropping
            // `response` on the error path closes it.
            let body = response.bytes().await?;

            tracing::trace!(status, len = body.len(), "Response body read");

            Ok(HttpResponse { status, body })
        })
    }
}
