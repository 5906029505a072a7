//! Test identities
//!
//! Every test run provisions its own users so concurrent runs never share
//! accounts. Identities are plain data passed explicitly to each fixture
//! client; there is no process-global "current auth" state.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Basic-auth credentials for HTTP fixture calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// A user owned by one test run
#[derive(Debug, Clone)]
pub struct TestUser {
    pub user_id: String,
    pub password: String,
}

impl TestUser {
    /// Create a user with a random id, unique per run
    pub fn random() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();

        Self {
            user_id: format!("test-{}", suffix.to_lowercase()),
            password: "password".to_string(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: self.user_id.clone(),
            password: self.password.clone(),
        }
    }
}
