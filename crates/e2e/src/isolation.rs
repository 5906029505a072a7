//! Per-test state isolation
//!
//! Each test works inside a uniquely named folder derived from the test title
//! and, on re-execution, the retry counter. Retried attempts therefore never
//! collide with stale state from a prior attempt. Folders are not cleaned up
//! here; environment teardown owns that.

use crate::error::E2eResult;
use crate::fixtures::FixtureClient;

/// Options for [`isolate`]
#[derive(Debug, Clone)]
pub struct IsolateOptions {
    /// Fixture file to seed the folder with
    pub source_file: String,
    /// Upload under this name instead of the source name
    pub target_file: Option<String>,
    pub mime_type: String,
}

impl Default for IsolateOptions {
    fn default() -> Self {
        Self {
            source_file: "empty.md".to_string(),
            target_file: None,
            mime_type: "text/markdown".to_string(),
        }
    }
}

/// The isolated state a test starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedTest {
    pub folder_name: String,
    pub file_name: String,
}

impl IsolatedTest {
    /// Path of the seeded file relative to the user root
    pub fn file_path(&self) -> String {
        format!("{}/{}", self.folder_name, self.file_name)
    }

    /// Files-app location showing the isolated folder. Built from the same
    /// folder name the isolation step used, so retries navigate to the
    /// folder they created.
    pub fn files_app_path(&self) -> String {
        format!("apps/files?dir=/{}", urlencoding::encode(&self.folder_name))
    }
}

/// Unique folder name for the current test attempt.
///
/// Retry 0 means "no suffix"; any positive retry appends `" (N)"`, matching
/// the display the test framework uses for re-run identification.
pub fn folder_name(test_title: &str, retry: u32) -> String {
    if retry == 0 {
        test_title.to_string()
    } else {
        format!("{} ({})", test_title, retry)
    }
}

/// Create the isolated folder for a test and seed it with a fixture file
pub async fn isolate(
    fixtures: &FixtureClient,
    test_title: &str,
    retry: u32,
    options: IsolateOptions,
) -> E2eResult<IsolatedTest> {
    let folder_name = folder_name(test_title, retry);
    let file_name = options
        .target_file
        .unwrap_or_else(|| options.source_file.clone());

    fixtures.dav().mkcol(&folder_name).await?;
    fixtures
        .upload_fixture(
            &options.source_file,
            &options.mime_type,
            &format!("{}/{}", folder_name, file_name),
        )
        .await?;

    Ok(IsolatedTest {
        folder_name,
        file_name,
    })
}
