//! Ties the correlator, the secondary pass and the push channel to a
//! compiler's lifecycle hooks.
//!
//! On `invalidated` the coordinator announces the rebuild and, for typed
//! projects, starts the type check for the new cycle. On `done` it waits
//! for that check (only when the bundler reported no errors), merges the
//! findings into the finished compilation, pushes them to live clients and
//! reports the outcome.

use crate::checker::TypeChecker;
use crate::correlator::{CheckResolver, CycleCorrelator, PendingCheck};
use crate::diagnostic::CheckReport;
use crate::hooks::{CompilerHooks, SubscriptionId};
use crate::messages::{format_messages, CycleStatus, DisplayMessages};
use crate::notify::{topic, Notifier, Reporter, StartupInfo};
use crate::stats::{Stats, StatsSummary};
use crate::urls::prepare_urls;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Delay before the "waiting for type check" notice is shown.
pub const DEFAULT_NOTICE_DELAY: Duration = Duration::from_millis(100);

/// Where one of the dev servers listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerBinding {
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

impl ServerBinding {
    pub fn new(protocol: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
            port,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Whether the project is statically typed. Gates the secondary pass.
    pub typed: bool,
    /// Whether a person is watching the terminal. Gates the URL banner.
    pub interactive: bool,
    pub notice_delay: Duration,
    pub app: ServerBinding,
    pub cdn: ServerBinding,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            typed: false,
            interactive: false,
            notice_delay: DEFAULT_NOTICE_DELAY,
            app: ServerBinding::new("http", "0.0.0.0", 3000),
            cdn: ServerBinding::new("http", "0.0.0.0", 3200),
        }
    }
}

/// What a single `done` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Bundler results plus any merged type-check findings.
    pub merged: StatsSummary,
    pub display: DisplayMessages,
    pub status: CycleStatus,
    pub waited_for_check: bool,
    pub notice_shown: bool,
}

pub struct DevCoordinator {
    options: CoordinatorOptions,
    checker: Option<Arc<dyn TypeChecker>>,
    correlator: CycleCorrelator,
    notifier: Arc<dyn Notifier>,
    reporter: Arc<dyn Reporter>,
}

impl DevCoordinator {
    pub fn new(
        options: CoordinatorOptions,
        checker: Option<Arc<dyn TypeChecker>>,
        notifier: Arc<dyn Notifier>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        if options.typed && checker.is_none() {
            tracing::warn!("typed project without a type checker; type check results will be skipped");
        }
        Self {
            options,
            checker,
            correlator: CycleCorrelator::new(),
            notifier,
            reporter,
        }
    }

    /// Create a coordinator and subscribe it to `hooks`.
    ///
    /// Done subscribers registered after this one see the merged record;
    /// subscribers registered before it see the bundler's own results.
    pub fn attach(
        hooks: &CompilerHooks,
        options: CoordinatorOptions,
        checker: Option<Arc<dyn TypeChecker>>,
        notifier: Arc<dyn Notifier>,
        reporter: Arc<dyn Reporter>,
    ) -> (Arc<Self>, [SubscriptionId; 2]) {
        let coordinator = Arc::new(Self::new(options, checker, notifier, reporter));

        let on_invalid = coordinator.clone();
        let invalidated = hooks.on_invalidated(move || on_invalid.handle_invalidated());

        let on_done = coordinator.clone();
        let done = hooks.on_done(move |stats| {
            let coordinator = on_done.clone();
            async move {
                coordinator.handle_done(&stats).await;
            }
        });

        (coordinator, [invalidated, done])
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    fn type_checker(&self) -> Option<&Arc<dyn TypeChecker>> {
        self.checker.as_ref().filter(|_| self.options.typed)
    }

    /// Start of a cycle. Must run inside a tokio runtime when a checker is set.
    pub fn handle_invalidated(&self) {
        self.reporter.compiling();

        if let Some(checker) = self.type_checker() {
            let resolver = self.correlator.begin_cycle();
            tokio::spawn(run_check(checker.clone(), resolver));
        }
    }

    /// End of a cycle: merge, push, report.
    pub async fn handle_done(&self, stats: &Stats) -> CycleOutcome {
        let mut merged = stats.summary();
        let mut waited_for_check = false;
        let mut notice_shown = false;

        if self.type_checker().is_some() && !merged.has_errors() {
            if let Some(pending) = self.correlator.take_pending() {
                waited_for_check = true;
                let cycle = pending.cycle();
                let (report, shown) = self.await_check(pending).await;
                notice_shown = shown;

                match report {
                    Some(report) => self.merge(stats, &mut merged, report).await,
                    None => tracing::warn!(
                        cycle = %cycle,
                        "type check finished without a report; showing bundler results only"
                    ),
                }
            }
        }

        let display = format_messages(&merged);
        let status = CycleStatus::from_messages(&display);
        self.reporter.cycle_finished(&status);

        if status.is_success() && self.options.interactive {
            self.reporter.startup_info(&self.startup_info());
        }

        CycleOutcome {
            merged,
            display,
            status,
            waited_for_check,
            notice_shown,
        }
    }

    pub fn startup_info(&self) -> StartupInfo {
        let CoordinatorOptions { app, cdn, .. } = &self.options;
        StartupInfo {
            app: prepare_urls(&app.protocol, &app.host, app.port),
            cdn: prepare_urls(&cdn.protocol, &cdn.host, cdn.port),
        }
    }

    async fn await_check(&self, mut pending: PendingCheck) -> (Option<CheckReport>, bool) {
        let notice = tokio::time::sleep(self.options.notice_delay);
        tokio::pin!(notice);
        let mut shown = false;

        loop {
            tokio::select! {
                biased;
                report = &mut pending => return (report, shown),
                () = &mut notice, if !shown => {
                    shown = true;
                    self.reporter.waiting_for_type_check();
                }
            }
        }
    }

    async fn merge(&self, stats: &Stats, merged: &mut StatsSummary, report: CheckReport) {
        let CheckReport { errors, warnings } = report;
        tracing::debug!(
            errors = errors.len(),
            warnings = warnings.len(),
            "merging type check results"
        );

        merged.errors.extend(errors.iter().cloned());
        merged.warnings.extend(warnings.iter().cloned());
        stats.compilation().push_errors(errors.iter().cloned());
        stats.compilation().push_warnings(warnings.iter().cloned());

        if !errors.is_empty() {
            self.notifier.send(topic::ERRORS, json!(errors)).await;
        }
        if !warnings.is_empty() {
            self.notifier.send(topic::WARNINGS, json!(warnings)).await;
        }
    }
}

impl std::fmt::Debug for DevCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevCoordinator")
            .field("options", &self.options)
            .field("has_checker", &self.checker.is_some())
            .field("correlator", &self.correlator)
            .finish()
    }
}

async fn run_check(checker: Arc<dyn TypeChecker>, resolver: CheckResolver) {
    let cycle = resolver.cycle();
    match checker.check().await {
        Ok(diagnostics) => {
            let report = CheckReport::from_diagnostics(diagnostics);
            if !resolver.resolve(report) {
                tracing::debug!(cycle = %cycle, "discarding type check result of a superseded cycle");
            }
        }
        Err(err) => {
            // Dropping the resolver releases the waiter with no report.
            tracing::warn!(cycle = %cycle, error = %err, "type check failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::tests::ScriptedBundler;
    use crate::compiler::Compiler;
    use crate::diagnostic::Diagnostic;
    use crate::error::{CoreError, Result};
    use crate::notify::RecordingNotifier;
    use crate::stats::{BuildOutput, Compilation};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        fn events(&self) -> Vec<String> {
            self.events.lock().clone()
        }
    }

    impl Reporter for RecordingReporter {
        fn compiling(&self) {
            self.events.lock().push("compiling".to_string());
        }
        fn waiting_for_type_check(&self) {
            self.events.lock().push("waiting".to_string());
        }
        fn cycle_finished(&self, status: &CycleStatus) {
            let event = match status {
                CycleStatus::Success => "success".to_string(),
                CycleStatus::Warnings(w) => format!("warnings:{}", w.len()),
                CycleStatus::Failed { total, .. } => format!("failed:{}", total),
            };
            self.events.lock().push(event);
        }
        fn startup_info(&self, _info: &StartupInfo) {
            self.events.lock().push("startup".to_string());
        }
    }

    /// Checker that replays scripted results, each after a fixed delay.
    struct DelayedChecker {
        delay: Duration,
        results: Mutex<VecDeque<Result<Vec<Diagnostic>>>>,
    }

    impl DelayedChecker {
        fn new(delay: Duration, results: Vec<Result<Vec<Diagnostic>>>) -> Self {
            Self {
                delay,
                results: Mutex::new(results.into()),
            }
        }
    }

    #[async_trait]
    impl TypeChecker for DelayedChecker {
        async fn check(&self) -> Result<Vec<Diagnostic>> {
            let result = self.results.lock().pop_front().unwrap_or_else(|| Ok(vec![]));
            tokio::time::sleep(self.delay).await;
            result
        }
    }

    fn typed_options() -> CoordinatorOptions {
        CoordinatorOptions {
            typed: true,
            ..CoordinatorOptions::default()
        }
    }

    fn stats_with(errors: &[&str], warnings: &[&str]) -> Stats {
        Stats::new(
            Compilation::new(BuildOutput {
                errors: errors.iter().map(|s| s.to_string()).collect(),
                warnings: warnings.iter().map(|s| s.to_string()).collect(),
                assets: vec![],
            }),
            "hash",
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_merge_reaches_snapshot_and_live_record() {
        let checker = Arc::new(DelayedChecker::new(
            Duration::ZERO,
            vec![Ok(vec![
                Diagnostic::error("src/a.ts", "bad a").at(1, 1).with_code(2322),
                Diagnostic::error("src/b.ts", "bad b").at(2, 2).with_code(2322),
                Diagnostic::warning("src/c.ts", "meh").at(3, 3),
            ])],
        ));
        let notifier = Arc::new(RecordingNotifier::new());
        let coordinator = DevCoordinator::new(
            typed_options(),
            Some(checker),
            notifier.clone(),
            Arc::new(RecordingReporter::default()),
        );

        coordinator.handle_invalidated();
        let stats = stats_with(&[], &["bundler warning"]);
        let outcome = coordinator.handle_done(&stats).await;

        assert!(outcome.waited_for_check);
        assert_eq!(outcome.merged.errors.len(), 2);
        assert_eq!(outcome.merged.warnings.len(), 2);
        assert_eq!(outcome.merged.warnings[0], "bundler warning");
        assert!(outcome.merged.errors[0].starts_with("src/a.ts\n"));

        // Both views agree.
        assert_eq!(stats.summary(), outcome.merged);
    }

    #[tokio::test]
    async fn test_display_truncates_but_push_carries_everything() {
        let checker = Arc::new(DelayedChecker::new(
            Duration::ZERO,
            vec![Ok(vec![
                Diagnostic::error("src/a.ts", "one"),
                Diagnostic::error("src/b.ts", "two"),
                Diagnostic::error("src/c.ts", "three"),
            ])],
        ));
        let notifier = Arc::new(RecordingNotifier::new());
        let reporter = Arc::new(RecordingReporter::default());
        let coordinator = DevCoordinator::new(
            typed_options(),
            Some(checker),
            notifier.clone(),
            reporter.clone(),
        );

        coordinator.handle_invalidated();
        let outcome = coordinator.handle_done(&stats_with(&[], &[])).await;

        match &outcome.status {
            CycleStatus::Failed { error, total } => {
                assert!(error.starts_with("src/a.ts\n"));
                assert_eq!(*total, 3);
            }
            other => panic!("expected failure, got {:?}", other),
        }

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, topic::ERRORS);
        assert_eq!(sent[0].1.as_array().map(Vec::len), Some(3));
        assert_eq!(reporter.events(), vec!["compiling", "failed:3"]);
    }

    #[tokio::test]
    async fn test_warnings_only_push() {
        let checker = Arc::new(DelayedChecker::new(
            Duration::ZERO,
            vec![Ok(vec![Diagnostic::warning("src/a.ts", "unused")])],
        ));
        let notifier = Arc::new(RecordingNotifier::new());
        let coordinator = DevCoordinator::new(
            typed_options(),
            Some(checker),
            notifier.clone(),
            Arc::new(RecordingReporter::default()),
        );

        coordinator.handle_invalidated();
        let outcome = coordinator.handle_done(&stats_with(&[], &[])).await;

        assert_eq!(notifier.topics(), vec![topic::WARNINGS.to_string()]);
        assert!(matches!(outcome.status, CycleStatus::Warnings(ref w) if w.len() == 1));
    }

    #[tokio::test]
    async fn test_primary_errors_skip_the_wait() {
        let checker = Arc::new(DelayedChecker::new(
            Duration::from_secs(3600),
            vec![Ok(vec![Diagnostic::error("src/a.ts", "never seen")])],
        ));
        let notifier = Arc::new(RecordingNotifier::new());
        let coordinator = DevCoordinator::new(
            typed_options(),
            Some(checker),
            notifier.clone(),
            Arc::new(RecordingReporter::default()),
        );

        coordinator.handle_invalidated();
        let outcome = coordinator.handle_done(&stats_with(&["e1", "e2"], &[])).await;

        assert!(!outcome.waited_for_check);
        assert_eq!(outcome.merged.errors, vec!["e1".to_string(), "e2".to_string()]);
        assert!(notifier.sent().is_empty());
        assert_eq!(
            outcome.status,
            CycleStatus::Failed {
                error: "e1".to_string(),
                total: 2
            }
        );
    }

    #[tokio::test]
    async fn test_untyped_project_never_waits() {
        let checker = Arc::new(DelayedChecker::new(Duration::from_secs(3600), vec![]));
        let reporter = Arc::new(RecordingReporter::default());
        let coordinator = DevCoordinator::new(
            CoordinatorOptions {
                interactive: true,
                ..CoordinatorOptions::default()
            },
            Some(checker),
            Arc::new(RecordingNotifier::new()),
            reporter.clone(),
        );

        coordinator.handle_invalidated();
        let outcome = coordinator.handle_done(&stats_with(&[], &[])).await;

        assert!(!outcome.waited_for_check);
        assert!(outcome.status.is_success());
        assert_eq!(reporter.events(), vec!["compiling", "success", "startup"]);
    }

    #[tokio::test]
    async fn test_startup_info_only_when_interactive() {
        let reporter = Arc::new(RecordingReporter::default());
        let coordinator = DevCoordinator::new(
            CoordinatorOptions::default(),
            None,
            Arc::new(RecordingNotifier::new()),
            reporter.clone(),
        );

        coordinator.handle_done(&stats_with(&[], &[])).await;
        assert_eq!(reporter.events(), vec!["success"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_check_shows_notice_once() {
        let checker = Arc::new(DelayedChecker::new(
            Duration::from_secs(5),
            vec![Ok(vec![])],
        ));
        let reporter = Arc::new(RecordingReporter::default());
        let coordinator = DevCoordinator::new(
            typed_options(),
            Some(checker),
            Arc::new(RecordingNotifier::new()),
            reporter.clone(),
        );

        coordinator.handle_invalidated();
        let outcome = coordinator.handle_done(&stats_with(&[], &[])).await;

        assert!(outcome.notice_shown);
        assert!(outcome.status.is_success());
        assert_eq!(reporter.events(), vec!["compiling", "waiting", "success"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_check_shows_no_notice() {
        let checker = Arc::new(DelayedChecker::new(
            Duration::from_millis(20),
            vec![Ok(vec![])],
        ));
        let reporter = Arc::new(RecordingReporter::default());
        let coordinator = DevCoordinator::new(
            typed_options(),
            Some(checker),
            Arc::new(RecordingNotifier::new()),
            reporter.clone(),
        );

        coordinator.handle_invalidated();
        let outcome = coordinator.handle_done(&stats_with(&[], &[])).await;

        assert!(outcome.waited_for_check);
        assert!(!outcome.notice_shown);
        assert_eq!(reporter.events(), vec!["compiling", "success"]);
    }

    #[tokio::test]
    async fn test_failed_check_falls_back_to_bundler_results() {
        let checker = Arc::new(DelayedChecker::new(
            Duration::ZERO,
            vec![Err(CoreError::Checker("tsc not found".to_string()))],
        ));
        let notifier = Arc::new(RecordingNotifier::new());
        let coordinator = DevCoordinator::new(
            typed_options(),
            Some(checker),
            notifier.clone(),
            Arc::new(RecordingReporter::default()),
        );

        coordinator.handle_invalidated();
        let outcome = coordinator.handle_done(&stats_with(&[], &["w"])).await;

        assert!(outcome.waited_for_check);
        assert_eq!(outcome.merged, StatsSummary::new(vec![], vec!["w".to_string()]));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_cycle_result_is_not_merged() {
        // First check is slow and reports an error; the second is fast and clean.
        let checker = Arc::new(DelayedChecker::new(
            Duration::from_millis(50),
            vec![Ok(vec![Diagnostic::error("src/stale.ts", "stale")]), Ok(vec![])],
        ));
        let coordinator = DevCoordinator::new(
            typed_options(),
            Some(checker),
            Arc::new(RecordingNotifier::new()),
            Arc::new(RecordingReporter::default()),
        );

        coordinator.handle_invalidated();
        // Let the first check start before the next cycle replaces it.
        tokio::task::yield_now().await;
        coordinator.handle_invalidated();
        let stats = stats_with(&[], &[]);
        let outcome = coordinator.handle_done(&stats).await;

        assert!(outcome.status.is_success());
        assert!(stats.compilation().errors().is_empty());
    }

    #[tokio::test]
    async fn test_attached_coordinator_runs_before_later_subscribers() {
        let compiler = Compiler::new(Arc::new(ScriptedBundler::new(vec![])));
        let checker = Arc::new(DelayedChecker::new(
            Duration::from_millis(5),
            vec![Ok(vec![Diagnostic::error("src/a.ts", "late error")])],
        ));
        DevCoordinator::attach(
            compiler.hooks(),
            typed_options(),
            Some(checker),
            Arc::new(RecordingNotifier::new()),
            Arc::new(RecordingReporter::default()),
        );

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        compiler.hooks().on_done(move |stats: Stats| {
            let seen = seen_clone.clone();
            async move {
                *seen.lock() = stats.compilation().errors();
            }
        });

        let stats = compiler.run().await;
        assert!(stats.has_errors());
        assert_eq!(seen.lock().len(), 1);
        assert!(seen.lock()[0].contains("late error"));
    }
}
