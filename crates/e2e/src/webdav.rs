//! Raw file access by path (WebDAV)
//!
//! Thin wrapper over the `remote.php/webdav` endpoints: content PUT/GET plus
//! the directory primitives the host page exposes through its file-operations
//! client (create directory, move, copy, remove, property fetch).

use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::user::Credentials;

/// WebDAV client bound to one identity
#[derive(Debug, Clone)]
pub struct WebDavClient {
    http: reqwest::Client,
    base_url: String,
    creds: Credentials,
}

impl WebDavClient {
    pub fn new(http: reqwest::Client, base_url: &str, creds: Credentials) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            creds,
        }
    }

    /// Absolute URL for a path under the DAV root, segment-encoded
    pub fn url(&self, path: &str) -> String {
        format!("{}/remote.php/webdav/{}", self.base_url, encode_path(path))
    }

    /// Write content to a path
    pub async fn put(
        &self,
        path: &str,
        content: Vec<u8>,
        mime_type: &str,
        request_token: Option<&str>,
    ) -> E2eResult<()> {
        let mut request = self
            .http
            .put(self.url(path))
            .basic_auth(&self.creds.user, Some(&self.creds.password))
            .header("Content-Type", mime_type)
            .body(content);

        if let Some(token) = request_token {
            request = request.header("requesttoken", token);
        }

        let response = request.send().await?;
        check_status("upload", response.status())?;
        debug!("Uploaded {}", path);
        Ok(())
    }

    /// Read content from a path
    pub async fn get(&self, path: &str) -> E2eResult<String> {
        let response = self
            .http
            .get(self.url(path))
            .basic_auth(&self.creds.user, Some(&self.creds.password))
            .send()
            .await?;

        check_status("download", response.status())?;
        Ok(response.text().await?)
    }

    /// Create a directory
    pub async fn mkcol(&self, path: &str) -> E2eResult<()> {
        let response = self
            .request(dav_method("MKCOL")?, path)
            .send()
            .await?;

        check_status("mkcol", response.status())?;
        debug!("Created directory {}", path);
        Ok(())
    }

    /// Move a path to a new destination
    pub async fn mv(&self, path: &str, destination: &str) -> E2eResult<()> {
        let response = self
            .request(dav_method("MOVE")?, path)
            .header("Destination", self.url(destination))
            .send()
            .await?;

        check_status("move", response.status())
    }

    /// Copy a path to a new destination
    pub async fn copy(&self, path: &str, destination: &str) -> E2eResult<()> {
        let response = self
            .request(dav_method("COPY")?, path)
            .header("Destination", self.url(destination))
            .send()
            .await?;

        check_status("copy", response.status())
    }

    /// Remove a file or directory
    pub async fn remove(&self, path: &str) -> E2eResult<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        check_status("delete", response.status())
    }

    /// Fetch properties for a path, including the rich-workspace ones.
    /// Returns the raw multistatus body; scenarios assert on fragments.
    pub async fn propfind(&self, path: &str, depth: u32) -> E2eResult<String> {
        let body = r#"<?xml version="1.0"?>
<d:propfind xmlns:d="DAV:" xmlns:nc="http://nextcloud.org/ns">
  <d:prop>
    <d:getlastmodified/>
    <d:getcontenttype/>
    <nc:rich-workspace-file/>
    <nc:rich-workspace/>
  </d:prop>
</d:propfind>"#;

        let response = self
            .request(dav_method("PROPFIND")?, path)
            .header("Depth", depth.to_string())
            .header("Content-Type", "application/xml")
            .body(body)
            .send()
            .await?;

        check_status("propfind", response.status())?;
        Ok(response.text().await?)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .basic_auth(&self.creds.user, Some(&self.creds.password))
    }
}

fn dav_method(name: &'static str) -> E2eResult<Method> {
    Method::from_bytes(name.as_bytes()).map_err(|_| E2eError::DavMethod(name))
}

fn check_status(operation: &'static str, status: StatusCode) -> E2eResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(E2eError::UnexpectedStatus { operation, status })
    }
}

/// Encode each path segment while keeping the separators
fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
