// Error types for appium-rs

use thiserror::Error;

/// Result type alias for appium-rs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to an Appium server
#[derive(Debug, Error)]
pub enum Error {
    /// The server address could not be used as a base URL
    ///
    /// Raised by `Client::new` when the address does not parse, does not use
    /// `http`/`https`, or cannot carry a path.
    #[error("Invalid server address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Network-level failure (connect, TLS, timeout, body read)
    ///
    /// The request may or may not have reached the server. This is the only
    /// error class that is a reasonable candidate for a caller-level retry.
    #[error("Transport error during {method} {url}: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The response body was not a protocol envelope we could interpret
    ///
    /// `body` holds the raw response text for diagnostics.
    #[error("Failed to decode response to {method} {path}: {reason}. Raw body: {body}")]
    Decode {
        method: String,
        path: String,
        reason: String,
        body: String,
    },

    /// The server answered with a non-success status
    #[error("Command {method} {path} failed (status {status}): {message}")]
    Command {
        method: String,
        path: String,
        /// Numeric status when the server sent one, otherwise the raw status text
        status: String,
        /// W3C error code such as `no such element`, when present
        error: Option<String>,
        message: String,
    },

    /// Locating an element by strategy/selector found no match
    #[error("Element not found using '{using}' with selector '{value}': {message}")]
    ElementNotFound {
        using: String,
        value: String,
        message: String,
    },

    /// Command issued against a session that is not in the required state
    #[error("Invalid session state: cannot {operation} while session is {actual} (requires {expected})")]
    InvalidState {
        operation: String,
        expected: String,
        actual: String,
    },

    /// Invalid argument provided to a constructor or command
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error (reading an app binary from disk)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error while building a request body
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }

    /// Returns true if this is (or wraps) a network-level failure
    pub fn is_transport(&self) -> bool {
        match self {
            Error::Transport { .. } => true,
            Error::Context(_, inner) => inner.is_transport(),
            _ => false,
        }
    }

    /// Returns true if this is (or wraps) an element lookup miss
    pub fn is_element_not_found(&self) -> bool {
        match self {
            Error::ElementNotFound { .. } => true,
            Error::Context(_, inner) => inner.is_element_not_found(),
            _ => false,
        }
    }

    /// Returns the server-provided message for command failures
    pub fn command_message(&self) -> Option<&str> {
        match self {
            Error::Command { message, .. } | Error::ElementNotFound { message, .. } => {
                Some(message)
            }
            Error::Context(_, inner) => inner.command_message(),
            _ => None,
        }
    }
}
