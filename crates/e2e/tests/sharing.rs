//! Sharing and raw-file fixture scenarios. Browser-free: everything here
//! talks to the HTTP endpoints directly, but still needs a running server.

mod common;

use cloudpad_e2e::fixtures::EDITABLE_SHARE_PERMISSIONS;
use cloudpad_e2e::{isolate, E2eResult, IsolateOptions, ShareOptions, TestUser};

use common::provision_user;

#[tokio::test]
#[ignore = "requires a running server"]
async fn uploaded_fixture_reads_back_identically() -> E2eResult<()> {
    let ctx = provision_user().await?;
    let isolated = isolate(
        &ctx.fixtures,
        "uploaded fixture reads back identically",
        0,
        IsolateOptions {
            source_file: "test.md".to_string(),
            ..Default::default()
        },
    )
    .await?;

    let expected = std::fs::read_to_string(ctx.config.fixtures_dir.join("test.md"))?;
    let actual = ctx.fixtures.file_content(&isolated.file_path()).await?;
    assert_eq!(actual, expected, "round-trip should be byte-identical");

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn user_share_returns_token_and_id() -> E2eResult<()> {
    let ctx = provision_user().await?;
    let isolated = isolate(
        &ctx.fixtures,
        "user share returns token and id",
        0,
        IsolateOptions::default(),
    )
    .await?;

    let recipient = TestUser::random();
    ctx.fixtures.create_user(&recipient).await?;

    let share = ctx
        .fixtures
        .share_with_user(&isolated.file_path(), &recipient.user_id)
        .await?
        .expect("share creation should return token and id");

    assert!(!share.token.is_empty());
    assert!(!share.id.is_empty());

    // Upgrading to edit permissions must not error.
    ctx.fixtures
        .set_share_permissions(&share.id, EDITABLE_SHARE_PERMISSIONS)
        .await?;

    ctx.fixtures.delete_user(&recipient.user_id).await?;

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn file_operations_work_inside_the_isolated_folder() -> E2eResult<()> {
    let ctx = provision_user().await?;
    let isolated = isolate(
        &ctx.fixtures,
        "file operations work inside the isolated folder",
        0,
        IsolateOptions {
            source_file: "test.md".to_string(),
            ..Default::default()
        },
    )
    .await?;

    let folder = &isolated.folder_name;
    let dav = ctx.fixtures.dav();

    dav.copy(
        &isolated.file_path(),
        &format!("{}/copy.md", folder),
    )
    .await?;
    dav.mv(
        &format!("{}/copy.md", folder),
        &format!("{}/moved.md", folder),
    )
    .await?;

    let content = ctx
        .fixtures
        .file_content(&format!("{}/moved.md", folder))
        .await?;
    assert!(content.contains("Hello world"));

    ctx.fixtures
        .put_content(&format!("{}/note.md", folder), "a note", "text/markdown")
        .await?;
    assert_eq!(
        ctx.fixtures
            .file_content(&format!("{}/note.md", folder))
            .await?,
        "a note"
    );

    // The folder listing advertises the rich-workspace properties.
    let multistatus = dav.propfind(folder, 0).await?;
    assert!(multistatus.contains("rich-workspace"));

    dav.remove(&format!("{}/moved.md", folder)).await?;

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn editor_settings_endpoint_accepts_a_key_value_pair() -> E2eResult<()> {
    let ctx = provision_user().await?;
    ctx.fixtures.configure_editor("workspace_enabled", "1").await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn link_share_can_be_made_editable() -> E2eResult<()> {
    let ctx = provision_user().await?;
    let isolated = isolate(
        &ctx.fixtures,
        "link share can be made editable",
        0,
        IsolateOptions::default(),
    )
    .await?;

    let share = ctx
        .fixtures
        .create_share(
            &isolated.file_path(),
            ShareOptions {
                edit: true,
                ..Default::default()
            },
        )
        .await?
        .expect("link share creation should return token and id");

    assert!(!share.token.is_empty());

    Ok(())
}
