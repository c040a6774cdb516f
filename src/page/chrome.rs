//! [`PageDriver`] over the Chrome DevTools protocol.
//!
//! Attaches to a browser that is already running with remote debugging
//! enabled. All DOM work is done with small expressions evaluated in the
//! page, so the driver holds no element handles between calls; an
//! [`ItemHandle`] or [`ControlHandle`] is resolved again by position each
//! time it is used.

use async_trait::async_trait;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{ControlHandle, ItemHandle, PageDriver};
use crate::config::{BrowserConfig, PageConfig};
use crate::error::{Result, WalkError};

/// Driver bound to one browser tab.
pub struct ChromeDriver {
    page: Page,
    item_selector: String,
    control_selector: String,
    _browser: Browser,
    _handler: JoinHandle<()>,
}

impl std::fmt::Debug for ChromeDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeDriver")
            .field("item_selector", &self.item_selector)
            .field("control_selector", &self.control_selector)
            .finish_non_exhaustive()
    }
}

impl ChromeDriver {
    /// Connect to the browser at `browser.ws_url` and pick a tab.
    ///
    /// With `start_url` set a new tab is opened there; otherwise the first
    /// existing tab is used, falling back to a blank one.
    pub async fn attach(browser: &BrowserConfig, page: &PageConfig) -> Result<Self> {
        let ws_url = browser.ws_url.clone().ok_or_else(|| WalkError::BrowserUnavailable {
            detail: "no DevTools websocket URL configured (--ws or [browser].ws_url)".to_string(),
        })?;

        let (chrome, mut handler) = Browser::connect(ws_url.clone()).await.map_err(|e| {
            WalkError::BrowserUnavailable {
                detail: format!("connect to {ws_url} failed: {e}"),
            }
        })?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let tab = match &browser.start_url {
            Some(url) => chrome
                .new_page(url.as_str())
                .await
                .map_err(|e| WalkError::page("new_page", e.to_string()))?,
            None => {
                let existing = chrome
                    .pages()
                    .await
                    .map_err(|e| WalkError::page("pages", e.to_string()))?;
                match existing.into_iter().next() {
                    Some(tab) => tab,
                    None => {
                        warn!("No open tab found; opened a blank one. Navigate it to the list page.");
                        chrome
                            .new_page("about:blank")
                            .await
                            .map_err(|e| WalkError::page("new_page", e.to_string()))?
                    }
                }
            }
        };

        info!("Attached to browser at {}", ws_url);
        Ok(Self {
            page: tab,
            item_selector: page.item_selector.clone(),
            control_selector: page.control_selector.clone(),
            _browser: chrome,
            _handler: handler_task,
        })
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, operation: &str, js: String) -> Result<T> {
        let result = self
            .page
            .evaluate(js)
            .await
            .map_err(|e| WalkError::page(operation, e.to_string()))?;
        result
            .into_value::<T>()
            .map_err(|e| WalkError::page(operation, format!("unexpected result: {e}")))
    }

    async fn run(&self, operation: &str, js: String) -> Result<()> {
        self.page
            .evaluate(js)
            .await
            .map(|_| ())
            .map_err(|e| WalkError::page(operation, e.to_string()))
    }
}

/// JS string literal for `s`.
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn list_items_js(selector: &str) -> String {
    format!(
        "Array.from(document.querySelectorAll({sel})).map(function (el, i) {{ \
         return {{ position: i, label: el.getAttribute(\"aria-label\") }}; }})",
        sel = js_str(selector)
    )
}

fn control_labels_js(selector: &str) -> String {
    format!(
        "Array.from(document.querySelectorAll({sel})).map(function (el) {{ \
         return el.innerText || el.textContent || \"\"; }})",
        sel = js_str(selector)
    )
}

fn click_item_js(selector: &str, position: usize) -> String {
    format!(
        "Array.from(document.querySelectorAll({sel})).slice({pos}, {pos} + 1).map(function (el) {{ \
         el.scrollIntoView({{ block: \"center\" }}); \
         el.dispatchEvent(new MouseEvent(\"click\", {{ bubbles: true, cancelable: true }})); \
         return true; }}).length === 1",
        sel = js_str(selector),
        pos = position
    )
}

fn click_control_js(selector: &str, position: usize) -> String {
    format!(
        "Array.from(document.querySelectorAll({sel})).slice({pos}, {pos} + 1).map(function (el) {{ \
         el.click(); return true; }}).length === 1",
        sel = js_str(selector),
        pos = position
    )
}

fn scroll_js(fraction: f64) -> String {
    format!("window.scrollBy(0, Math.round(window.innerHeight * {fraction}))")
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn current_location(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| WalkError::page("url", e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn list_items(&self) -> Result<Vec<ItemHandle>> {
        self.eval("list_items", list_items_js(&self.item_selector))
            .await
    }

    async fn control_labels(&self) -> Result<Vec<String>> {
        self.eval("control_labels", control_labels_js(&self.control_selector))
            .await
    }

    async fn click_item(&self, item: &ItemHandle) -> Result<()> {
        let clicked: bool = self
            .eval("click_item", click_item_js(&self.item_selector, item.position))
            .await?;
        if !clicked {
            return Err(WalkError::stale(format!("item {}", item.position)));
        }
        Ok(())
    }

    async fn click_control(&self, control: &ControlHandle) -> Result<()> {
        let clicked: bool = self
            .eval(
                "click_control",
                click_control_js(&self.control_selector, control.position),
            )
            .await?;
        if !clicked {
            return Err(WalkError::stale(format!("control '{}'", control.label)));
        }
        Ok(())
    }

    async fn navigate_back(&self) -> Result<()> {
        self.run("navigate_back", "history.back()".to_string()).await
    }

    async fn scroll_down(&self, fraction: f64) -> Result<()> {
        self.run("scroll_down", scroll_js(fraction)).await
    }
}
