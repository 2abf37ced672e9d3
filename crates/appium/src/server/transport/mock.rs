// In-memory transport for unit tests
//
// Replays queued responses in order and records every request it sees.

use super::{BoxError, HttpRequest, HttpResponse, Transport};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

type Reply = std::result::Result<HttpResponse, String>;

#[derive(Default)]
pub(crate) struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with the given body
    pub(crate) fn reply(&self, body: &str) -> &Self {
        self.reply_with_status(200, body)
    }

    pub(crate) fn reply_with_status(&self, status: u16, body: &str) -> &Self {
        self.replies.lock().push_back(Ok(HttpResponse {
            status,
            body: Bytes::from(body.to_string()),
        }));
        self
    }

    /// Queue a connection-level failure
    pub(crate) fn fail(&self, reason: &str) -> &Self {
        self.replies.lock().push_back(Err(reason.to_string()));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<HttpResponse, BoxError>> + Send + '_>>
    {
        self.requests.lock().push(request);
        let reply = self.replies.lock().pop_front();
        Box::pin(async move {
            match reply {
                Some(Ok(response)) => Ok(response),
                Some(Err(reason)) => Err(reason.into()),
                None => Err("mock transport has no queued reply".into()),
            }
        })
    }
}
