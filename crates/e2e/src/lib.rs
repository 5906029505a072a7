//! Cloudpad E2E Test Harness
//!
//! This crate drives a real browser against a running Cloudpad deployment to
//! exercise the collaborative rich-text editing feature. It provides:
//! - an HTTP fixture client for per-test state (users, files, shares,
//!   direct-editing sessions)
//! - per-test state isolation through uniquely named folders
//! - semantic DOM accessors over the editor's stable data-attribute contract
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Scenario suites (tests/*.rs)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  isolation  ──►  fixtures  ──►  webdav   (HTTP, reqwest)    │
//! │  session    ──►  dom                     (WebDriver)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod fixtures;
pub mod isolation;
pub mod session;
pub mod user;
pub mod webdav;

pub use config::Config;
pub use dom::{Dom, MenuSlot};
pub use error::{E2eError, E2eResult};
pub use fixtures::{FixtureClient, Share, ShareOptions};
pub use isolation::{isolate, IsolateOptions, IsolatedTest};
pub use session::Session;
pub use user::{Credentials, TestUser};

/// Initialize tracing for a test binary. Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
