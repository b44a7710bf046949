//! # stoke-browser-test
//!
//! Drives headless Chrome against a running stoke dev server.
//!
//! The crate is deliberately small: launch a browser, open a page, read the
//! DOM and wait until it changes. Live-reload tests use it to watch a page
//! reload itself after a source edit.
//!
//! ```ignore
//! use stoke_browser_test::{TestBrowser, TestBrowserConfig, WaitConfig};
//!
//! let browser = TestBrowser::launch(TestBrowserConfig::default()).await?;
//! let page = browser.new_page().await?;
//! page.navigate("http://localhost:3200/index.html").await?;
//!
//! page.mark_document().await?;
//! // ... edit a source file ...
//! page.wait_for_reload(WaitConfig::default()).await?;
//! page.wait_for_text("#css-inclusion", "Overridden content!", WaitConfig::default()).await?;
//!
//! browser.close().await?;
//! ```
//!
//! Tests that need Chrome are `#[ignore]`; run them with
//! `cargo test -p stoke-browser-test -- --ignored`.

#![warn(clippy::all)]

pub mod browser;
pub mod error;
pub mod page;
pub mod wait;

pub use browser::{TestBrowser, TestBrowserConfig};
pub use error::{BrowserError, Result};
pub use page::Page;
pub use wait::{wait_for, wait_for_result, WaitConfig, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
