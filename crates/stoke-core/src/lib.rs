//! # stoke-core
//!
//! Compile-cycle coordination for the stoke dev server.
//!
//! A bundler rebuilds on every file change while a type checker runs beside
//! it. This crate correlates each type-check run with the rebuild that
//! started it, merges both result sets into the finished compilation, and
//! pushes the outcome to live-reload clients once per cycle.
//!
//! ## Architecture
//!
//! - **Compiler / CompilerHooks**: runs a [`Bundler`] pass per cycle and
//!   signals `invalidated` and `done` to subscribers
//! - **CycleCorrelator**: one one-shot channel per cycle, last cycle wins
//! - **DevCoordinator**: waits for the check, merges, pushes, reports
//! - **Entry / Rule**: stateless config shaping (`add_entry`, `override_rules`)
//!
//! The bundler, the type checker, the push transport and the console are
//! traits ([`Bundler`], [`TypeChecker`], [`Notifier`], [`Reporter`]); the
//! CLI crate provides the concrete implementations.

pub mod checker;
pub mod compiler;
pub mod coordinator;
pub mod correlator;
pub mod diagnostic;
pub mod entry;
pub mod error;
pub mod hooks;
pub mod messages;
pub mod notify;
pub mod rules;
pub mod stats;
pub mod urls;

pub use checker::TypeChecker;
pub use compiler::{wait_for_compilation, Bundler, Compiler};
pub use coordinator::{
    CoordinatorOptions, CycleOutcome, DevCoordinator, ServerBinding, DEFAULT_NOTICE_DELAY,
};
pub use correlator::{CheckResolver, CycleCorrelator, CycleId, PendingCheck};
pub use diagnostic::{parse_tsc_output, CheckReport, Diagnostic, Severity};
pub use entry::{add_entry, Entry, EntryPoints};
pub use error::{CoreError, Result};
pub use hooks::{CompilerHooks, SubscriptionId};
pub use messages::{format_message, format_messages, CycleStatus, DisplayMessages};
pub use notify::{topic, NoopNotifier, Notifier, RecordingNotifier, Reporter, SilentReporter, StartupInfo};
pub use rules::{override_rules, Rule};
pub use stats::{BuildOutput, Compilation, Stats, StatsSummary};
pub use urls::{is_unspecified_host, prepare_urls, prepare_urls_with_lan, ServerUrls};
