//! Shared scenario setup: one provisioned user per test, its fixture client,
//! and a logged-in browser session on demand.

use cloudpad_e2e::{Config, E2eResult, FixtureClient, Session, TestUser};

pub struct TestContext {
    pub config: Config,
    pub user: TestUser,
    pub fixtures: FixtureClient,
}

/// Provision a fresh random user for this test run
pub async fn provision_user() -> E2eResult<TestContext> {
    cloudpad_e2e::init_tracing();

    let config = Config::from_env();
    let user = TestUser::random();
    let fixtures = FixtureClient::for_user(&config, &user)?;
    fixtures.create_user(&user).await?;

    Ok(TestContext {
        config,
        user,
        fixtures,
    })
}

impl TestContext {
    /// Open a browser session logged in as this test's user
    #[allow(dead_code)]
    pub async fn login(&self) -> E2eResult<Session> {
        let session = Session::connect(&self.config).await?;
        session.login(&self.user).await?;
        Ok(session)
    }
}
