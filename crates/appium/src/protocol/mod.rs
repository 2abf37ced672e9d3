// Copyright 2026 appium-rs contributors
// Licensed under the Apache License, Version 2.0
//
// Protocol Objects - Rust representations of WebDriver/Appium protocol objects
//
// Architecture:
// - Client owns the server address and transport, and creates Sessions
// - Session owns the lifecycle state and issues session-scoped commands
// - Element borrows its Session and issues element-scoped commands
// - Every command goes through server::channel::Channel

pub mod client;
pub mod element;
pub mod session;
pub mod types;

pub use client::Client;
pub use element::Element;
pub use session::{Session, SessionState};
pub use types::{LogEntry, ServerStatus};
