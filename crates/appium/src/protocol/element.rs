// Element protocol object
//
// An opaque handle to a UI element located within an active session.
// Elements are only created by Session::find_element(s).

use crate::error::Result;
use crate::protocol::Session;
use crate::protocol::types::SendKeysParams;
use crate::server::transport::Method;
use serde_json::json;

/// Element represents a UI element located within a session.
///
/// An element borrows the [`Session`] that found it, so it cannot outlive the
/// session value. Once the session is stopped, element commands fail with
/// `InvalidState` without contacting the server.
///
/// See: <https://www.w3.org/TR/webdriver2/#elements>
#[derive(Clone)]
pub struct Element<'s> {
    id: String,
    session: &'s Session,
}

impl<'s> Element<'s> {
    pub(crate) fn new(id: String, session: &'s Session) -> Self {
        Self { id, session }
    }

    /// Server-issued element id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Session this element belongs to
    pub fn session(&self) -> &'s Session {
        self.session
    }

    fn element_path(&self, operation: &str, command: &str) -> Result<String> {
        let session_id = self.session.active_id(operation)?;
        Ok(format!(
            "/session/{}/element/{}/{}",
            session_id, self.id, command
        ))
    }

    /// Clicks the element.
    pub async fn click(&self) -> Result<()> {
        let path = self.element_path("click element", "click")?;
        self.session
            .channel()
            .execute(Method::Post, &path, None)
            .await?;
        Ok(())
    }

    /// Types `text` into the element, one key stroke per character.
    ///
    /// # Errors
    ///
    /// `Command` if the server rejects the input (e.g., element not
    /// interactable).
    pub async fn send_keys(&self, text: &str) -> Result<()> {
        let path = self.element_path("send keys", "value")?;
        self.session
            .channel()
            .send_no_result(Method::Post, &path, SendKeysParams::new(text))
            .await
    }

    /// Clears the content of an editable element.
    pub async fn clear(&self) -> Result<()> {
        let path = self.element_path("clear element", "clear")?;
        self.session
            .channel()
            .send_no_result(Method::Post, &path, json!({}))
            .await
    }

    /// Visible text of the element.
    pub async fn text(&self) -> Result<String> {
        let path = self.element_path("read element text", "text")?;
        self.session.channel().get(&path).await
    }
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("session_id", &self.session.id())
            .finish()
    }
}
