//! Browser session management
//!
//! Connects to a WebDriver endpoint with headless Chrome capabilities and
//! drives the login/logout and navigation of one scenario. The session hands
//! out [`Dom`] accessors bound to its client.

use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tracing::info;

use crate::config::Config;
use crate::dom::Dom;
use crate::error::E2eResult;
use crate::user::TestUser;

pub struct Session {
    client: Client,
    config: Config,
}

impl Session {
    /// Connect a fresh browser session
    pub async fn connect(config: &Config) -> E2eResult<Self> {
        let mut capabilities = serde_json::map::Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": ["--headless=new", "--disable-gpu", "--window-size=1280,900"],
            }),
        );

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(&config.webdriver_url)
            .await?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Log a user in through the login form
    pub async fn login(&self, user: &TestUser) -> E2eResult<()> {
        self.visit("login").await?;

        self.client
            .wait()
            .at_most(self.config.wait_timeout)
            .for_element(Locator::Css("input#user"))
            .await?
            .send_keys(&user.user_id)
            .await?;
        self.client
            .find(Locator::Css("input#password"))
            .await?
            .send_keys(&user.password)
            .await?;
        self.client
            .find(Locator::Css(r#"form[name="login"] button[type="submit"]"#))
            .await?
            .click()
            .await?;

        // Any app page carries the content container once the login settled.
        self.client
            .wait()
            .at_most(self.config.wait_timeout)
            .for_element(Locator::Css("#content"))
            .await?;

        info!("Logged in as {}", user.user_id);
        Ok(())
    }

    /// Drop the authenticated session state
    pub async fn logout(&self) -> E2eResult<()> {
        self.client.delete_all_cookies().await?;
        Ok(())
    }

    /// Navigate to an application path relative to the base URL
    pub async fn visit(&self, path: &str) -> E2eResult<()> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        self.client.goto(&url).await?;
        Ok(())
    }

    /// Navigate to an absolute URL, e.g. an opaque direct-editing token
    pub async fn visit_url(&self, url: &str) -> E2eResult<()> {
        self.client.goto(url).await?;
        Ok(())
    }

    /// Reload the current page
    pub async fn reload(&self) -> E2eResult<()> {
        self.client.refresh().await?;
        Ok(())
    }

    /// DOM accessors bound to this session
    pub fn dom(&self) -> Dom {
        Dom::new(self.client.clone(), self.config.wait_timeout)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// End the session and close the browser window
    pub async fn close(self) -> E2eResult<()> {
        self.client.close().await?;
        Ok(())
    }
}
