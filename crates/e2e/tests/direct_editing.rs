//! Direct editing scenarios: open or create a file through a one-shot
//! direct-edit URL and edit it without an authenticated browser session.
//!
//! These tests drive a real browser; they are ignored unless a Cloudpad
//! deployment and a WebDriver endpoint are reachable.

mod common;

use cloudpad_e2e::{E2eResult, Session};
use fantoccini::key::Key;

use common::{provision_user, TestContext};

/// Type a headline and a line of text into the opened editor, then close it
async fn edit_and_close(session: &Session) -> E2eResult<()> {
    let dom = session.dom();

    dom.type_text("# This is a headline").await?;
    dom.type_text(&String::from(char::from(Key::Enter))).await?;
    dom.type_text("Some text").await?;
    dom.type_text(&String::from(char::from(Key::Enter))).await?;

    dom.wait_for("button.icon-close").await?.click().await?;
    Ok(())
}

async fn direct_edit_token(ctx: &TestContext, path: &str) -> E2eResult<String> {
    let token = ctx.fixtures.direct_edit_open(path).await?;
    let token = token.unwrap_or_default();
    assert!(!token.is_empty(), "direct edit open should return a token");
    assert!(
        token.starts_with(ctx.fixtures.base_url()),
        "direct edit URL should live on the deployment under test: {}",
        token
    );
    Ok(token)
}

#[tokio::test]
#[ignore = "requires a running server and chromedriver"]
async fn opens_an_existing_markdown_file() -> E2eResult<()> {
    let ctx = provision_user().await?;
    ctx.fixtures
        .upload_fixture("empty.md", "text/markdown", "empty.md")
        .await?;

    let token = direct_edit_token(&ctx, "empty.md").await?;

    // The token is the only credential; the session is logged out before
    // consuming it.
    let session = ctx.login().await?;
    session.logout().await?;
    session.visit_url(&token).await?;

    let url = session.client().current_url().await?;
    assert!(
        url.as_str().contains("/apps/text/"),
        "token should route into the editor: {}",
        url
    );

    edit_and_close(&session).await?;

    // The file stays readable through the raw endpoint after the session.
    ctx.fixtures.file_content("empty.md").await?;

    session.close().await
}

#[tokio::test]
#[ignore = "requires a running server and chromedriver"]
async fn opens_an_existing_plain_text_file() -> E2eResult<()> {
    let ctx = provision_user().await?;
    ctx.fixtures
        .upload_fixture("empty.txt", "text/plain", "empty.txt")
        .await?;

    let token = direct_edit_token(&ctx, "empty.txt").await?;

    let session = Session::connect(&ctx.config).await?;
    session.visit_url(&token).await?;

    edit_and_close(&session).await?;
    ctx.fixtures.file_content("empty.txt").await?;

    session.close().await
}

#[tokio::test]
#[ignore = "requires a running server and chromedriver"]
async fn creates_a_new_file() -> E2eResult<()> {
    let ctx = provision_user().await?;

    let token = ctx
        .fixtures
        .direct_edit_create("newfile.md", "text", "textdocument")
        .await?
        .unwrap_or_default();
    assert!(!token.is_empty(), "direct edit create should return a token");

    let session = Session::connect(&ctx.config).await?;
    session.visit_url(&token).await?;

    edit_and_close(&session).await?;

    // Creating the session made the new path readable.
    ctx.fixtures.file_content("newfile.md").await?;

    session.close().await
}
