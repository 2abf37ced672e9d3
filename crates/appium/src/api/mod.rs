// Public API types module
//
// Option types consumed by `Client` and `Session`. Plain structs with
// defaults and chained setters; no network activity happens here.

pub mod client_options;
pub mod session_options;

pub use client_options::ClientOptions;
pub use session_options::SessionOptions;
