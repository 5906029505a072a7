//! Harness configuration
//!
//! Everything is overridable through `CLOUDPAD_*` environment variables so the
//! same test binaries run against a local docker setup or a CI deployment.

use std::path::PathBuf;
use std::time::Duration;

use crate::user::Credentials;

/// Configuration shared by fixture clients and browser sessions
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the application under test, without a trailing `/index.php`
    pub base_url: String,

    /// WebDriver endpoint (chromedriver / selenium)
    pub webdriver_url: String,

    /// Admin credentials for user provisioning
    pub admin: Credentials,

    /// Directory containing fixture files (`empty.md`, `test.md`, ...)
    pub fixtures_dir: PathBuf,

    /// Upper bound for DOM lookups before a scenario fails
    pub wait_timeout: Duration,

    /// Per-request timeout for fixture HTTP calls
    pub http_timeout: Duration,
}

impl Config {
    /// Build a configuration from the environment, falling back to the
    /// defaults of the local development setup.
    pub fn from_env() -> Self {
        let base_url = std::env::var("CLOUDPAD_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        Self {
            base_url: normalize_base_url(&base_url),
            webdriver_url: std::env::var("CLOUDPAD_WEBDRIVER_URL")
                .unwrap_or_else(|_| "http://localhost:9515".to_string()),
            admin: Credentials {
                user: std::env::var("CLOUDPAD_ADMIN_USER").unwrap_or_else(|_| "admin".to_string()),
                password: std::env::var("CLOUDPAD_ADMIN_PASSWORD")
                    .unwrap_or_else(|_| "admin".to_string()),
            },
            fixtures_dir: std::env::var("CLOUDPAD_FIXTURES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("fixtures")),
            wait_timeout: Duration::from_secs(10),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// The base URL may be configured with the `/index.php` entry point appended;
/// OCS and WebDAV paths are built relative to the stripped form.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    url.strip_suffix("/index.php").unwrap_or(url).to_string()
}
