//! E2E test harness for wfprobe.
//!
//! Scenarios drive a real `TestManager` over HTTP against an in-process mock
//! of the management API. Some builders and assertions are only used by a
//! subset of scenarios.

#![allow(dead_code)]

pub mod scenario;
pub mod workspace;

// Re-export commonly used types
pub use assertions::{Assertion, ErrorMatch};
pub use fixtures::RunActionsFixture;
pub use mock_api::MockResponse;
pub use scenario::Scenario;
