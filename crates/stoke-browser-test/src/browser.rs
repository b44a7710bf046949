//! Chrome process lifecycle.
//!
//! A [`TestBrowser`] owns the Chrome process, the task that pumps CDP
//! events, and a throwaway profile directory. Call [`TestBrowser::close`]
//! at the end of a test; dropping it kills Chrome without a clean shutdown.

use crate::error::{BrowserError, Result};
use crate::page::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct TestBrowserConfig {
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Extra Chrome flags, appended after the defaults.
    pub args: Vec<String>,
    /// Chrome executable. Auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
}

impl TestBrowserConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn visible(mut self) -> Self {
        self.headless = false;
        self
    }

    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Honors `CHROME_PATH` so CI can point at a pinned Chromium.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os("CHROME_PATH") {
            config.chrome_path = Some(PathBuf::from(path));
        }
        config
    }

    fn chrome_args(&self, profile_dir: &std::path::Path) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 3);
        if self.headless {
            args.push("--headless".to_string());
        }
        args.push(format!("--window-size={},{}", self.window_size.0, self.window_size.1));
        // One profile per launch; parallel tests otherwise fight over the
        // ProcessSingleton lock.
        args.push(format!("--user-data-dir={}", profile_dir.display()));
        args.extend(self.args.iter().cloned());
        args
    }

    fn to_browser_config(&self, profile_dir: &std::path::Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder();
        for arg in self.chrome_args(profile_dir) {
            builder = builder.arg(arg);
        }
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path.clone());
        }

        builder.build().map_err(|reason| BrowserError::LaunchFailed {
            reason: format!("invalid browser configuration: {reason}"),
            source: None,
        })
    }
}

impl Default for TestBrowserConfig {
    fn default() -> Self {
        Self {
            headless: !cfg!(feature = "visible"),
            window_size: (1280, 800),
            args: vec![
                // Containers usually lack user namespaces. Test content only.
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
        }
    }
}

pub struct TestBrowser {
    inner: Mutex<Option<Browser>>,
    handler: JoinHandle<()>,
    _profile: TempDir,
}

impl TestBrowser {
    pub async fn launch(config: TestBrowserConfig) -> Result<Self> {
        let profile = tempfile::Builder::new().prefix("stoke-browser-test-").tempdir()?;
        let browser_config = config.to_browser_config(profile.path())?;
        debug!(headless = config.headless, profile = %profile.path().display(), "launching browser");

        let (browser, mut events) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed {
                reason: "failed to launch Chrome process".to_string(),
                source: Some(Box::new(e)),
            })?;

        // chromiumoxide only makes progress while its handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(err) = event {
                    warn!(error = %err, "browser handler error");
                }
            }
        });

        Ok(Self {
            inner: Mutex::new(Some(browser)),
            handler,
            _profile: profile,
        })
    }

    pub async fn new_page(&self) -> Result<Page> {
        let guard = self.inner.lock().await;
        let browser = guard.as_ref().ok_or(BrowserError::AlreadyClosed)?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        Ok(Page::new(page))
    }

    pub async fn close(self) -> Result<()> {
        if let Some(mut browser) = self.inner.lock().await.take() {
            debug!("closing browser");
            browser
                .close()
                .await
                .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
        }
        self.handler.abort();
        Ok(())
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}

impl Drop for TestBrowser {
    fn drop(&mut self) {
        if self.inner.get_mut().is_some() {
            warn!("TestBrowser dropped without close(); killing Chrome");
        }
        self.handler.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_dir_and_extra_args_are_passed() {
        let config = TestBrowserConfig::default().with_args(["--mute-audio"]);
        let args = config.chrome_args(std::path::Path::new("/tmp/profile"));

        assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("--mute-audio"));
        assert!(args.contains(&"--no-sandbox".to_string()));
    }

    #[test]
    fn test_visible_drops_headless_flag() {
        let args = TestBrowserConfig::default()
            .visible()
            .chrome_args(std::path::Path::new("/tmp/p"));
        assert!(!args.iter().any(|a| a == "--headless"));
    }

    #[tokio::test]
    #[ignore = "requires Chrome"]
    async fn test_launch_and_close() {
        let browser = TestBrowser::launch(TestBrowserConfig::from_env())
            .await
            .expect("failed to launch browser");
        assert!(!browser.is_closed().await);

        let page = browser.new_page().await.expect("failed to open page");
        page.navigate("about:blank").await.expect("failed to navigate");

        browser.close().await.expect("failed to close browser");
    }
}
