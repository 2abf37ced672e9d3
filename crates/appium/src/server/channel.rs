// Copyright 2026 appium-rs contributors
// Licensed under the Apache License, Version 2.0
//
// Channel - the single request/response path every command goes through
//
// A command is `{method, path, body, decode-as}`. The channel turns that into
// an HTTP request against the server base URL, hands it to the transport,
// and decodes the envelope. Nothing else in the crate builds requests.

use crate::error::{Error, Result};
use crate::server::envelope::{ProtocolResponse, decode_response};
use crate::server::transport::{HttpRequest, Method, RequestBody, Transport};
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Channel provides command execution against one automation server.
///
/// Cheap to clone; clones share the transport.
///
/// # Example
///
/// ```ignore
/// use appium_rs::server::channel::Channel;
/// use appium_rs::server::transport::Method;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct LockParams {
///     seconds: u64,
/// }
///
/// async fn example(channel: &Channel) -> Result<(), Box<dyn std::error::Error>> {
///     channel
///         .send_no_result(Method::Post, "/session/abc/appium/device/lock", LockParams { seconds: 5 })
///         .await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Channel {
    base: Arc<str>,
    transport: Arc<dyn Transport>,
}

impl Channel {
    /// Creates a new Channel for the given server base URL.
    ///
    /// A trailing `/` on `base` is dropped; command paths always start with `/`.
    pub fn new(base: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base: Arc::from(base.trim_end_matches('/')),
            transport,
        }
    }

    /// Returns the base URL this channel sends to.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Full URL for a command path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Sends a command with an optional JSON body and decodes the envelope.
    ///
    /// POST commands without a payload still send `{}` so every mutation
    /// request carries a JSON body and content type.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ProtocolResponse> {
        let body = match (body, method) {
            (Some(value), _) => RequestBody::Json(Bytes::from(serde_json::to_vec(&value)?)),
            (None, Method::Post) => RequestBody::Json(Bytes::from_static(b"{}")),
            (None, _) => RequestBody::Empty,
        };

        self.execute_raw(method, path, body).await
    }

    /// Sends a command with an already-encoded body and decodes the envelope.
    pub async fn execute_raw(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<ProtocolResponse> {
        let url = self.url(path);

        tracing::debug!(%method, url = %url, body_len = body.len(), "Sending command");

        let request = HttpRequest {
            method,
            url: url.clone(),
            body,
        };

        let response = self.transport.send(request).await.map_err(|source| {
            tracing::warn!(%method, url = %url, "Transport failure: {}", source);
            Error::Transport {
                method: method.to_string(),
                url,
                source,
            }
        })?;

        tracing::debug!(%method, path, status = response.status, "Received response");

        decode_response(method, path, &response)
    }

    /// Sends a command and decodes `value` as `R`.
    pub async fn send<P: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: P,
    ) -> Result<R> {
        let params_value = serde_json::to_value(params)?;
        self.execute(method, path, Some(params_value))
            .await?
            .value_as()
    }

    /// Sends a GET command and decodes `value` as `R`.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.execute(Method::Get, path, None).await?.value_as()
    }

    /// Sends a command whose `value` carries nothing of interest.
    ///
    /// The response is still fully read and its status checked.
    pub async fn send_no_result<P: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: P,
    ) -> Result<()> {
        let params_value = serde_json::to_value(params)?;
        self.execute(method, path, Some(params_value)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel").field("base", &self.base).finish()
    }
}
