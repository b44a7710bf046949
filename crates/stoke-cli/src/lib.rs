//! stoke CLI - dev server that keeps the bundler and the type checker in step.
//!
//! # Architecture
//!
//! - [`cli`] - argument parsing with clap
//! - [`config`] - `stoke.config.json` loading with figment
//! - [`dev`] - static server, live-reload push channel, watcher, session
//! - [`bundler`] / [`checker`] - the external build and `tsc` processes
//! - [`ui`] - console reporter and status lines
//! - [`error`] / [`logger`] - error types and tracing setup
//!
//! The compile-cycle coordination itself lives in `stoke-core`.

pub mod bundler;
pub mod checker;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod process;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
