//! Semantic DOM accessors
//!
//! Translates human concepts ("the editor", "the menu entry named X") into
//! element lookups against the stable data-attribute contract of the
//! application under test. Lookups go through the WebDriver wait-for-element
//! polling; a lookup that never resolves fails the enclosing scenario with a
//! timeout, this layer adds no retry logic of its own.

use std::time::{Duration, Instant};

use fantoccini::elements::Element;
use fantoccini::key::Key;
use fantoccini::{Client, Locator};
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// The data attributes and containers the accessors rely on. These are the
/// wire contract with the application under test; renaming one here without
/// a matching frontend change breaks every accessor built on it.
pub mod selectors {
    pub const EDITOR: &str = r#"[data-text-el="editor-container"]"#;
    pub const CONTENT_WRAPPER: &str = r#"[data-text-el="editor-content-wrapper"]"#;
    pub const MENUBAR: &str = r#"[data-text-el="menubar"]"#;
    pub const OUTLINE: &str = r#"[data-text-el="editor-outline"]"#;
    pub const TABLE_OF_CONTENTS: &str = r#"[data-text-el="editor-table-of-contents"]"#;

    /// Rendered surface of the rich-text engine
    pub const CONTENT: &str = ".ProseMirror";

    /// File-preview overlay bound to the text editing handler
    pub const VIEWER: &str = r#"#viewer[data-handler="text"]"#;
    pub const VIEWER_CLOSE: &str = "#viewer .modal-header button.header-close";
    pub const VIEWER_HEADER: &str = "#viewer .modal-header";

    /// Popper container of a currently open action submenu
    pub const OPEN_POPPER: &str = ".action-item__popper .open";

    pub const FILE_LIST: &str = ".files-fileList";
    pub const RICH_WORKSPACE: &str = "#rich-workspace";
    pub const WORKSPACE_CONTENT: &str = "#rich-workspace .ProseMirror";
    pub const EMPTY_WORKSPACE: &str = "#rich-workspace .empty-workspace";

    /// Overflow entry holding the actions that did not fit the menubar
    pub const OVERFLOW_ENTRY: &str = "remain";

    pub fn action_entry(name: &str) -> String {
        format!(r#"[data-text-action-entry="{}"]"#, name)
    }

    pub fn file_row(file_name: &str) -> String {
        format!(r#".files-fileList tr[data-file="{}"]"#, file_name)
    }

    pub fn file_row_link(file_name: &str) -> String {
        format!("{} a.name", file_row(file_name))
    }

    pub fn picker_row(entry_name: &str) -> String {
        format!(r#"#picker-filestable tr[data-entryname="{}"]"#, entry_name)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn builds_attribute_selectors() {
            assert_eq!(
                action_entry("unordered-list"),
                r#"[data-text-action-entry="unordered-list"]"#
            );
            assert_eq!(
                file_row("README.md"),
                r#".files-fileList tr[data-file="README.md"]"#
            );
            assert_eq!(
                picker_row("sub-folder"),
                r#"#picker-filestable tr[data-entryname="sub-folder"]"#
            );
        }
    }
}

/// Where a menu entry was found. The probe result is discriminated so both
/// layouts stay separately testable, but callers that do not care collapse
/// it with [`MenuSlot::into_element`].
#[derive(Debug)]
pub enum MenuSlot {
    /// Directly visible in the primary menu
    Inline(Element),
    /// Relocated into the overflow submenu
    Overflow(Element),
}

impl MenuSlot {
    pub fn into_element(self) -> Element {
        match self {
            MenuSlot::Inline(element) | MenuSlot::Overflow(element) => element,
        }
    }

    pub fn is_overflow(&self) -> bool {
        matches!(self, MenuSlot::Overflow(_))
    }
}

/// Accessor layer over one browser session, optionally scoped to a root
/// selector (e.g. the viewer modal). Unscoped lookups search the whole page.
#[derive(Clone)]
pub struct Dom {
    client: Client,
    root: Option<String>,
    timeout: Duration,
}

impl Dom {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            root: None,
            timeout,
        }
    }

    /// A copy of this accessor scoped under an explicit search root
    pub fn within(&self, root_selector: &str) -> Dom {
        Dom {
            client: self.client.clone(),
            root: Some(self.scoped(root_selector)),
            timeout: self.timeout,
        }
    }

    /// Accessors scoped to the file-preview overlay
    pub async fn viewer(&self) -> E2eResult<Dom> {
        self.wait_for(selectors::VIEWER).await?;
        Ok(self.within(selectors::VIEWER))
    }

    pub async fn editor(&self) -> E2eResult<Element> {
        self.wait_for(selectors::EDITOR).await
    }

    pub async fn content_wrapper(&self) -> E2eResult<Element> {
        self.wait_for(selectors::CONTENT_WRAPPER).await
    }

    /// The rendered rich-text surface
    pub async fn content(&self) -> E2eResult<Element> {
        self.wait_for(selectors::CONTENT).await
    }

    pub async fn outline(&self) -> E2eResult<Element> {
        self.wait_for(selectors::OUTLINE).await
    }

    pub async fn table_of_contents(&self) -> E2eResult<Element> {
        self.wait_for(selectors::TABLE_OF_CONTENTS).await
    }

    pub async fn menubar(&self) -> E2eResult<Element> {
        self.wait_for(selectors::MENUBAR).await
    }

    /// A named action in the primary menu, without the overflow fallback
    pub async fn action_entry(&self, name: &str) -> E2eResult<Element> {
        let selector = format!("{} {}", selectors::MENUBAR, selectors::action_entry(name));
        self.wait_for(&selector).await
    }

    /// Probe where a menu entry currently lives.
    ///
    /// Checks the primary menu first; when the responsive layout has pushed
    /// the action into the overflow submenu, opens that submenu and searches
    /// the popper. The probe mutates the page in the overflow case (the
    /// submenu stays open so the entry is clickable).
    pub async fn locate_menu_entry(&self, name: &str) -> E2eResult<MenuSlot> {
        // Menubar must be rendered before the inline probe is meaningful.
        self.menubar().await?;

        let inline = format!("{} {}", selectors::MENUBAR, selectors::action_entry(name));
        if let Some(element) = self.find_now(&self.scoped(&inline)).await? {
            return Ok(MenuSlot::Inline(element));
        }

        debug!("Menu entry {} not inline, probing overflow", name);
        let element = self
            .submenu_entry(selectors::OVERFLOW_ENTRY, name)
            .await?;
        Ok(MenuSlot::Overflow(element))
    }

    /// A named menu entry, wherever the layout put it
    pub async fn menu_entry(&self, name: &str) -> E2eResult<Element> {
        Ok(self.locate_menu_entry(name).await?.into_element())
    }

    /// Open the submenu of a named parent action and find a child action in
    /// the opened popper.
    pub async fn submenu_entry(&self, parent: &str, name: &str) -> E2eResult<Element> {
        self.action_entry(parent).await?.click().await?;

        // Poppers render at document level, outside any scoped root.
        let selector = format!("{} {}", selectors::OPEN_POPPER, selectors::action_entry(name));
        let element = self
            .client
            .wait()
            .at_most(self.timeout)
            .for_element(Locator::Css(&selector))
            .await?;
        Ok(element)
    }

    /// Whether a menu action is currently toggled on
    pub async fn is_active(element: &Element) -> E2eResult<bool> {
        let class = element.attr("class").await?.unwrap_or_default();
        Ok(class.split_whitespace().any(|c| c == "is-active"))
    }

    /// Row of a file in the file list
    pub async fn file_row(&self, file_name: &str) -> E2eResult<Element> {
        self.wait_for(&selectors::file_row(file_name)).await
    }

    /// Open a file from the file list
    pub async fn open_file(&self, file_name: &str) -> E2eResult<()> {
        self.wait_for(&selectors::file_row_link(file_name))
            .await?
            .click()
            .await?;
        Ok(())
    }

    /// Delete a file through its file-list action menu and wait until the
    /// row is gone.
    pub async fn delete_file(&self, file_name: &str) -> E2eResult<()> {
        let row = selectors::file_row(file_name);
        self.wait_for(&format!("{} a.name .action-menu", row))
            .await?
            .click()
            .await?;
        self.wait_for(&format!("{} a.name + .popovermenu .action-delete", row))
            .await?
            .click()
            .await?;
        self.wait_gone(&row).await
    }

    /// Open a folder from the file list and wait until the view switched to it
    pub async fn open_folder(&self, folder_name: &str) -> E2eResult<()> {
        self.open_file(folder_name).await?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let url = self.client.current_url().await?;
            if url.as_str().contains(urlencoding::encode(folder_name).as_ref())
                || url.as_str().contains(folder_name)
            {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(E2eError::Timeout(format!("navigation into {}", folder_name)));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Close the file-preview overlay and wait until it is gone
    pub async fn close_viewer(&self) -> E2eResult<()> {
        self.client
            .wait()
            .at_most(self.timeout)
            .for_element(Locator::Css(selectors::VIEWER_CLOSE))
            .await?
            .click()
            .await?;
        self.wait_gone(selectors::VIEWER_HEADER).await
    }

    /// Open the workspace editor of the current folder and return its
    /// rendered content surface.
    pub async fn open_workspace(&self) -> E2eResult<Element> {
        self.wait_for(selectors::EMPTY_WORKSPACE).await?.click().await?;
        self.content_wrapper().await?.click().await?;
        self.content().await
    }

    /// Select all content and delete it
    pub async fn clear_content(&self) -> E2eResult<Element> {
        let content = self.select_all().await?;
        content.send_keys(&String::from(char::from(Key::Backspace))).await?;
        self.content().await
    }

    /// Select everything in the content surface, leaving the selection for a
    /// following formatting action.
    pub async fn select_all(&self) -> E2eResult<Element> {
        let content = self.content().await?;
        let select_all: String = [char::from(Key::Control), 'a'].iter().collect();
        content.send_keys(&select_all).await?;
        Ok(content)
    }

    /// Type into the rendered content surface
    pub async fn type_text(&self, text: &str) -> E2eResult<Element> {
        let content = self.content().await?;
        content.click().await?;
        content.send_keys(text).await?;
        Ok(content)
    }

    /// Wait until an element below the current root contains the given text
    pub async fn wait_text_contains(&self, selector: &str, needle: &str) -> E2eResult<Element> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(element) = self.find_now(&self.scoped(selector)).await? {
                if element.text().await?.contains(needle) {
                    return Ok(element);
                }
            }
            if Instant::now() >= deadline {
                return Err(E2eError::Timeout(format!(
                    "{} to contain {:?}",
                    self.scoped(selector),
                    needle
                )));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Wait until no element below the current root matches the selector
    pub async fn wait_gone(&self, selector: &str) -> E2eResult<()> {
        let scoped = self.scoped(selector);
        let deadline = Instant::now() + self.timeout;
        loop {
            if self.client.find_all(Locator::Css(&scoped)).await?.is_empty() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(E2eError::Timeout(format!("{} to disappear", scoped)));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Wait for an element below the current root
    pub async fn wait_for(&self, selector: &str) -> E2eResult<Element> {
        let scoped = self.scoped(selector);
        let element = self
            .client
            .wait()
            .at_most(self.timeout)
            .for_element(Locator::Css(&scoped))
            .await?;
        Ok(element)
    }

    /// Snapshot lookup without polling; `None` when nothing matches right now
    async fn find_now(&self, selector: &str) -> E2eResult<Option<Element>> {
        let mut matches = self.client.find_all(Locator::Css(selector)).await?;
        if matches.is_empty() {
            Ok(None)
        } else {
            Ok(Some(matches.remove(0)))
        }
    }

    fn scoped(&self, selector: &str) -> String {
        scope(self.root.as_deref(), selector)
    }
}

/// Compose a selector below an optional root
fn scope(root: Option<&str>, selector: &str) -> String {
    match root {
        Some(root) => format!("{} {}", root, selector),
        None => selector.to_string(),
    }
}
