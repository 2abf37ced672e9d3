//! appium-rs: Rust client for the WebDriver/Appium remote automation protocol
//!
//! This crate opens sessions against an Appium (or any JSON-wire/W3C
//! WebDriver) server, issues commands against them, and decodes the server's
//! `{status, value}` envelopes into typed results or errors.
//!
//! # Examples
//!
//! ## Start a session and interact with an element
//!
//! ```ignore
//! use appium_rs::{Client, SessionOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("http://127.0.0.1:4723/wd/hub")?;
//!     let session = client.new_session(
//!         SessionOptions::new()
//!             .platform_name("Android")
//!             .platform_version("14")
//!             .device_name("emulator-5554")
//!             .automation_name("UiAutomator2")
//!             .app("/path/to/app.apk"),
//!     );
//!
//!     session.start().await?;
//!
//!     let username = session.find_element("id", "username").await?;
//!     username.send_keys("alice").await?;
//!
//!     let submit = session.find_element("accessibility id", "Log in").await?;
//!     submit.click().await?;
//!
//!     session.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Handling a missing element
//!
//! ```ignore
//! use appium_rs::{Client, Error, SessionOptions};
//!
//! # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
//! let session = client.new_session(SessionOptions::new().platform_name("iOS"));
//! session.start().await?;
//!
//! match session.find_element("id", "promo-banner").await {
//!     Ok(banner) => banner.click().await?,
//!     Err(Error::ElementNotFound { .. }) => {}
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Device commands
//!
//! ```ignore
//! use std::time::Duration;
//! # async fn example(session: appium_rs::Session) -> Result<(), Box<dyn std::error::Error>> {
//! session.lock(Duration::from_secs(5)).await?;
//! session.unlock().await?;
//! session.install_app_from_path("build/app-debug.apk").await?;
//!
//! let cpu = session
//!     .get_performance_data("com.example.app", "cpuinfo", Duration::from_millis(500))
//!     .await?;
//! println!("{cpu}");
//! # Ok(())
//! # }
//! ```

// Internal modules (exposed for integration tests and custom transports)
#[doc(hidden)]
pub mod server;

pub mod api;
mod error;
pub mod protocol;

/// Address of a locally running Appium 1.x server.
///
/// Appium 2 drops the `/wd/hub` base path by default; pass
/// `http://127.0.0.1:4723` to [`Client::new`] for those.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4723/wd/hub";

// Re-export error types
pub use error::{Error, Result};

// Re-export client, session and element API
pub use protocol::{Client, Element, LogEntry, ServerStatus, Session, SessionState};

// Re-export options
pub use api::{ClientOptions, SessionOptions};

// Re-export transport seam
pub use server::envelope::{ELEMENT_KEY, W3C_ELEMENT_KEY};
pub use server::transport::{HttpTransport, Transport};
