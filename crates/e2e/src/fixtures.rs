//! HTTP fixture client
//!
//! Seeds per-test state through the OCS and WebDAV endpoints of the
//! application under test: users, uploaded files, shares, direct-editing
//! sessions and server-side editor settings.
//!
//! A client is bound to exactly one identity. Commands that need elevated
//! rights (user provisioning) use the admin credentials from the harness
//! configuration instead of a shared mutable login.

use std::path::PathBuf;

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{E2eError, E2eResult};
use crate::user::{Credentials, TestUser};
use crate::webdav::WebDavClient;

/// Share permission bits
pub const PERMISSION_READ: u32 = 1;
pub const PERMISSION_WRITE: u32 = 2;
pub const PERMISSION_SHARE: u32 = 16;

/// Permissions the UI sets when a link share is made editable
pub const EDITABLE_SHARE_PERMISSIONS: u32 = PERMISSION_READ | PERMISSION_WRITE | PERMISSION_SHARE;

/// Public link share
pub const SHARE_TYPE_LINK: u32 = 3;
/// Share with a single user
pub const SHARE_TYPE_USER: u32 = 0;

/// A created share: opaque link token plus numeric id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub token: String,
    pub id: String,
}

/// Options for [`FixtureClient::create_share`]
#[derive(Debug, Clone)]
pub struct ShareOptions {
    pub share_type: u32,
    pub share_with: Option<String>,
    /// Upgrade the share from read-only to edit permissions
    pub edit: bool,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            share_type: SHARE_TYPE_LINK,
            share_with: None,
            edit: false,
        }
    }
}

/// Fixture client bound to one identity
#[derive(Debug, Clone)]
pub struct FixtureClient {
    http: reqwest::Client,
    base_url: String,
    creds: Credentials,
    admin: Credentials,
    fixtures_dir: PathBuf,
    dav: WebDavClient,
}

impl FixtureClient {
    pub fn new(config: &Config, creds: Credentials) -> E2eResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let dav = WebDavClient::new(http.clone(), &config.base_url, creds.clone());

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            creds,
            admin: config.admin.clone(),
            fixtures_dir: config.fixtures_dir.clone(),
            dav,
        })
    }

    /// Convenience constructor for a client acting as a test user
    pub fn for_user(config: &Config, user: &TestUser) -> E2eResult<Self> {
        Self::new(config, user.credentials())
    }

    /// Raw file access with the same identity
    pub fn dav(&self) -> &WebDavClient {
        &self.dav
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a user account (admin operation)
    pub async fn create_user(&self, user: &TestUser) -> E2eResult<()> {
        self.ocs_request(
            "user creation",
            Method::POST,
            &format!("{}/ocs/v1.php/cloud/users", self.base_url),
            &[("userid", &user.user_id), ("password", &user.password)],
            &self.admin,
        )
        .await?;

        info!("Created user {}", user.user_id);
        Ok(())
    }

    /// Delete a user account (admin operation)
    pub async fn delete_user(&self, user_id: &str) -> E2eResult<()> {
        self.ocs_request(
            "user deletion",
            Method::DELETE,
            &format!("{}/ocs/v1.php/cloud/users/{}", self.base_url, user_id),
            &[],
            &self.admin,
        )
        .await?;

        info!("Deleted user {}", user_id);
        Ok(())
    }

    /// Update a setting of the bound user, e.g. `language`
    pub async fn update_user_setting(&self, key: &str, value: &str) -> E2eResult<()> {
        self.ocs_request(
            "user setting update",
            Method::PUT,
            &format!("{}/ocs/v2.php/cloud/users/{}", self.base_url, self.creds.user),
            &[("key", key), ("value", value)],
            &self.creds,
        )
        .await?;

        info!("Updated {} {} to {}", self.creds.user, key, value);
        Ok(())
    }

    /// Resolve a CSRF-style request token. Writes through the DAV endpoints
    /// carry it as a `requesttoken` header.
    pub async fn request_token(&self) -> E2eResult<String> {
        #[derive(Debug, Deserialize)]
        struct TokenResponse {
            token: String,
        }

        let response = self
            .http
            .get(format!("{}/csrftoken", self.base_url))
            .basic_auth(&self.creds.user, Some(&self.creds.password))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(E2eError::RequestToken(format!(
                "status {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| E2eError::RequestToken(e.to_string()))?;
        Ok(body.token)
    }

    /// Upload a named fixture file to a destination path, optionally renamed
    pub async fn upload_fixture(
        &self,
        source: &str,
        mime_type: &str,
        target: &str,
    ) -> E2eResult<()> {
        let content = tokio::fs::read(self.fixtures_dir.join(source)).await?;
        let token = self.request_token().await?;

        self.dav
            .put(target, content, mime_type, Some(&token))
            .await
    }

    /// Upload literal content to a destination path
    pub async fn put_content(&self, target: &str, content: &str, mime_type: &str) -> E2eResult<()> {
        let token = self.request_token().await?;
        self.dav
            .put(target, content.as_bytes().to_vec(), mime_type, Some(&token))
            .await
    }

    /// Read a file back through the raw file endpoint
    pub async fn file_content(&self, path: &str) -> E2eResult<String> {
        self.dav.get(path).await
    }

    /// Create a share for a path.
    ///
    /// A malformed response envelope (missing token or id) is a soft failure:
    /// it is logged and reported as `None` so the scenario can keep going and
    /// fail later at a meaningful assertion instead of at fixture plumbing.
    pub async fn create_share(&self, path: &str, options: ShareOptions) -> E2eResult<Option<Share>> {
        let share_type = options.share_type.to_string();
        let mut form: Vec<(&str, &str)> = vec![("path", path), ("shareType", &share_type)];
        if let Some(share_with) = options.share_with.as_deref() {
            form.push(("shareWith", share_with));
        }

        let body: Value = self
            .ocs_request(
                "share creation",
                Method::POST,
                &self.shares_url(None),
                &form,
                &self.creds,
            )
            .await?
            .json()
            .await?;

        let share = match share_from_body(&body) {
            Some(share) => share,
            None => {
                error!("Share creation for {} returned a malformed response: {}", path, body);
                return Ok(None);
            }
        };

        info!("Share link created: {}", share.token);

        if options.edit {
            self.set_share_permissions(&share.id, EDITABLE_SHARE_PERMISSIONS)
                .await?;
            info!("Made share {} editable", share.token);
        }

        Ok(Some(share))
    }

    /// Update the permission bits of an existing share
    pub async fn set_share_permissions(&self, share_id: &str, permissions: u32) -> E2eResult<()> {
        let permissions = permissions.to_string();
        self.ocs_request(
            "share permission update",
            Method::PUT,
            &self.shares_url(Some(share_id)),
            &[("permissions", &permissions)],
            &self.creds,
        )
        .await?;
        Ok(())
    }

    /// Share a path with another user
    pub async fn share_with_user(&self, path: &str, user_id: &str) -> E2eResult<Option<Share>> {
        self.create_share(
            path,
            ShareOptions {
                share_type: SHARE_TYPE_USER,
                share_with: Some(user_id.to_string()),
                edit: false,
            },
        )
        .await
    }

    /// Request a direct-editing session for an existing file.
    ///
    /// Returns the opaque URL token from the response envelope, or `None`
    /// when the envelope shape does not match.
    pub async fn direct_edit_open(&self, path: &str) -> E2eResult<Option<String>> {
        let body: Value = self
            .ocs_request(
                "direct editing open",
                Method::POST,
                &format!(
                    "{}/ocs/v2.php/apps/files/api/v1/directEditing/open?format=json",
                    self.base_url
                ),
                &[("path", path)],
                &self.creds,
            )
            .await?
            .json()
            .await?;

        let token = direct_edit_url(&body);
        debug!("Direct editing token for {}: {:?}", path, token);
        Ok(token)
    }

    /// Request a direct-editing session that creates a new file first
    pub async fn direct_edit_create(
        &self,
        path: &str,
        editor_id: &str,
        creator_id: &str,
    ) -> E2eResult<Option<String>> {
        let body: Value = self
            .ocs_request(
                "direct editing create",
                Method::POST,
                &format!(
                    "{}/ocs/v2.php/apps/files/api/v1/directEditing/create?format=json",
                    self.base_url
                ),
                &[
                    ("path", path),
                    ("editorId", editor_id),
                    ("creatorId", creator_id),
                ],
                &self.creds,
            )
            .await?
            .json()
            .await?;

        let token = direct_edit_url(&body);
        debug!("Direct editing token for new file {}: {:?}", path, token);
        Ok(token)
    }

    /// Update a server-side setting of the rich-text editor
    pub async fn configure_editor(&self, key: &str, value: &str) -> E2eResult<()> {
        let token = self.request_token().await?;

        let response = self
            .http
            .post(format!("{}/index.php/apps/text/settings", self.base_url))
            .basic_auth(&self.creds.user, Some(&self.creds.password))
            .header("requesttoken", token)
            .form(&[("key", key), ("value", value)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(E2eError::UnexpectedStatus {
                operation: "editor settings update",
                status: response.status(),
            });
        }
        Ok(())
    }

    fn shares_url(&self, share_id: Option<&str>) -> String {
        let base = format!(
            "{}/ocs/v2.php/apps/files_sharing/api/v1/shares",
            self.base_url
        );
        match share_id {
            Some(id) => format!("{}/{}?format=json", base, id),
            None => format!("{}?format=json", base),
        }
    }

    /// Issue an OCS-convention request: form-encoded body, basic auth and the
    /// `OCS-ApiRequest` header.
    ///
    /// A non-success status fails the request; fixture setup must abort the
    /// scenario here instead of limping on with half-provisioned state.
    async fn ocs_request(
        &self,
        operation: &'static str,
        method: Method,
        url: &str,
        form: &[(&str, &str)],
        creds: &Credentials,
    ) -> E2eResult<reqwest::Response> {
        let response = self
            .http
            .request(method, url)
            .basic_auth(&creds.user, Some(&creds.password))
            .header("OCS-ApiRequest", "true")
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(E2eError::UnexpectedStatus { operation, status });
        }

        Ok(response)
    }
}

/// `ocs.data.url` from a direct-editing response, if the envelope matches
fn direct_edit_url(body: &Value) -> Option<String> {
    body.pointer("/ocs/data/url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// `{token, id}` from a share-creation response; both must be present and
/// the token non-empty. The id is numeric in some server versions and a
/// string in others.
fn share_from_body(body: &Value) -> Option<Share> {
    let data = body.pointer("/ocs/data")?;

    let token = data
        .get("token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())?;

    let id = match data.get("id")? {
        Value::String(id) if !id.is_empty() => id.clone(),
        Value::Number(id) => id.to_string(),
        _ => return None,
    };

    Some(Share {
        token: token.to_string(),
        id,
    })
}
