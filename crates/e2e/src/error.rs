//! Error types for the E2E harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Request token fetch failed: {0}")]
    RequestToken(String),

    #[error("{operation} returned unexpected status {status}")]
    UnexpectedStatus {
        operation: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Invalid DAV method name: {0}")]
    DavMethod(&'static str),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("WebDriver session error: {0}")]
    WebDriverSession(#[from] fantoccini::error::NewSessionError),
}

pub type E2eResult<T> = Result<T, E2eError>;
