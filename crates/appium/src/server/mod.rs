//! Protocol plumbing (internal)
//!
//! This module handles request construction, the HTTP transport seam, and
//! decoding of the `{status, value}` response envelope.
//!
//! **Note**: This module is exposed publicly only for integration testing and
//! for callers who inject their own transport. The remaining types are
//! internal implementation details and may change without notice.

#[doc(hidden)]
pub mod channel;
#[doc(hidden)]
pub mod envelope;
pub mod transport;
