//! A browser tab and the DOM probes live-reload tests need.

use crate::error::{BrowserError, Result};
use crate::wait::{wait_for_result, wait_for_value, WaitConfig};
use chromiumoxide::page::Page as ChromePage;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Global set by [`Page::mark_document`]. A reload discards it.
const RELOAD_MARKER: &str = "__stokeBrowserTestMarker";

#[derive(Debug)]
pub struct Page {
    inner: ChromePage,
}

impl Page {
    pub(crate) fn new(page: ChromePage) -> Self {
        Self { inner: page }
    }

    /// Navigate and wait until `document.readyState` is `complete`.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        self.wait_for_load(WaitConfig::default()).await
    }

    pub async fn wait_for_load(&self, config: WaitConfig) -> Result<()> {
        wait_for_result(
            move || async move {
                let state: String = self.evaluate("document.readyState").await?;
                Ok(state == "complete")
            },
            config,
            "document ready",
        )
        .await
    }

    pub async fn evaluate<T>(&self, script: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.inner
            .evaluate(script)
            .await
            .map_err(BrowserError::script)?
            .into_value()
            .map_err(BrowserError::script)
    }

    /// `textContent` of the first element matching `selector`, or `None`
    /// when nothing matches.
    pub async fn text_content(&self, selector: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.textContent : null; }})()",
            js_string(selector)?
        );
        let value: Value = self.evaluate(&script).await?;
        Ok(value.as_str().map(str::to_string))
    }

    pub async fn wait_for_selector(&self, selector: &str, config: WaitConfig) -> Result<()> {
        let script = format!("!!document.querySelector({})", js_string(selector)?);
        let script = script.as_str();
        wait_for_result(
            move || self.evaluate::<bool>(script),
            config,
            &format!("selector '{selector}'"),
        )
        .await
    }

    /// Wait until the trimmed text of `selector` equals `expected`.
    pub async fn wait_for_text(&self, selector: &str, expected: &str, config: WaitConfig) -> Result<String> {
        wait_for_value(
            move || async move {
                let text = self.text_content(selector).await?;
                Ok(text.filter(|t| t.trim() == expected))
            },
            config,
            &format!("'{selector}' to read '{expected}'"),
        )
        .await
    }

    /// Tag the current document so [`Page::wait_for_reload`] can tell when
    /// it has been replaced.
    pub async fn mark_document(&self) -> Result<()> {
        let _: bool = self
            .evaluate(&format!("(window.{RELOAD_MARKER} = true)"))
            .await?;
        Ok(())
    }

    /// Wait until the marked document is gone and its replacement has loaded.
    pub async fn wait_for_reload(&self, config: WaitConfig) -> Result<()> {
        let probe = format!(
            "document.readyState === 'complete' && window.{RELOAD_MARKER} !== true"
        );
        let probe = probe.as_str();
        wait_for_result(move || self.evaluate::<bool>(probe), config, "page reload").await
    }

    pub async fn url(&self) -> Result<String> {
        self.evaluate("window.location.href").await
    }

    pub async fn title(&self) -> Result<String> {
        self.evaluate("document.title").await
    }

    pub async fn close(self) -> Result<()> {
        self.inner.close().await?;
        Ok(())
    }
}

/// Quote `value` as a JavaScript string literal.
fn js_string(value: &str) -> Result<String> {
    serde_json::to_string(value).map_err(BrowserError::script)
}
