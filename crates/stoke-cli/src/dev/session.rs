//! One dev session: the compiler, its live-reload subscriber and the
//! coordinator, wired in the order the push protocol depends on.

use crate::bundler::create_compiler;
use crate::checker::TscChecker;
use crate::config::ProjectConfig;
use crate::dev::state::status_message;
use crate::dev::{DevServer, DevServerState, FileWatcher, SharedState};
use crate::error::Result;
use crate::ui;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stoke_core::{
    topic, wait_for_compilation, Compiler, CompilerHooks, CoordinatorOptions, DevCoordinator,
    Reporter, ServerBinding, Stats, TypeChecker, DEFAULT_NOTICE_DELAY,
};

pub struct DevSession {
    root: PathBuf,
    config: ProjectConfig,
    compiler: Arc<Compiler>,
    state: SharedState,
    coordinator: Arc<DevCoordinator>,
}

impl DevSession {
    /// Create the compiler and subscribe the dev server, then the coordinator.
    ///
    /// Fails when the compiler cannot be set up.
    pub fn new(
        root: PathBuf,
        config: ProjectConfig,
        reporter: Arc<dyn Reporter>,
        interactive: bool,
    ) -> Result<Self> {
        let compiler = Arc::new(create_compiler(&config, &root)?);
        let state = Arc::new(DevServerState::new(config.statics_path(&root)));

        // Must precede the coordinator: these pushes carry the bundler's own
        // results, the coordinator adds the type-check findings after them.
        attach_live_reload(compiler.hooks(), &state);

        let typed = config.is_typed(&root);
        let checker = if typed { locate_checker(&config, &root) } else { None };
        let (coordinator, _) = DevCoordinator::attach(
            compiler.hooks(),
            coordinator_options(&config, typed, interactive),
            checker,
            state.clone(),
            reporter,
        );

        Ok(Self {
            root,
            config,
            compiler,
            state,
            coordinator,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn compiler(&self) -> &Arc<Compiler> {
        &self.compiler
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn coordinator(&self) -> &Arc<DevCoordinator> {
        &self.coordinator
    }

    pub fn server(&self) -> DevServer {
        DevServer::new(self.state.clone())
    }

    /// Run the first cycle. Fails when it finished with errors.
    pub async fn initial_build(&self) -> stoke_core::Result<Stats> {
        let compiled = wait_for_compilation(&self.compiler);
        self.compiler.run().await;
        compiled.await
    }

    /// Rebuild on every source change until `shutdown` resolves.
    pub async fn watch<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let (watcher, mut changes) = FileWatcher::new(
            self.config.src_path(&self.root),
            self.config.watch.ignore.clone(),
            self.config.watch.debounce_ms,
        )?;
        ui::info(&format!("Watching for changes in: {}", watcher.root().display()));

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                change = changes.recv() => {
                    let Some(change) = change else {
                        tracing::warn!("file watcher stopped");
                        break;
                    };
                    tracing::debug!(path = %change.path().display(), "source changed");

                    // One cycle for a burst of changes.
                    while let Ok(change) = changes.try_recv() {
                        tracing::debug!(path = %change.path().display(), "source changed");
                    }

                    tokio::select! {
                        _ = self.compiler.run() => {}
                        () = &mut shutdown => break,
                    }
                }
            }
        }

        Ok(())
    }
}

/// `invalid` on every invalidation; `hash` and the bundler's status on done.
fn attach_live_reload(hooks: &CompilerHooks, state: &SharedState) {
    let on_invalid = state.clone();
    hooks.on_invalidated(move || on_invalid.push(topic::INVALID, &Value::Null));

    let on_done = state.clone();
    hooks.on_done(move |stats| {
        let state = on_done.clone();
        async move {
            state.set_latest(stats.clone());
            state.push(topic::HASH, &Value::String(stats.hash().to_string()));
            let (status, payload) = status_message(&stats);
            state.push(status, &payload);
        }
    });
}

pub(crate) fn locate_checker(config: &ProjectConfig, root: &Path) -> Option<Arc<dyn TypeChecker>> {
    match TscChecker::locate(config.typecheck.command.clone(), root) {
        Some(checker) => Some(Arc::new(checker)),
        None => {
            ui::warning(&format!(
                "Type checker `{}` not found; continuing without type checking",
                config.typecheck.command.join(" ")
            ));
            None
        }
    }
}

pub(crate) fn coordinator_options(config: &ProjectConfig, typed: bool, interactive: bool) -> CoordinatorOptions {
    CoordinatorOptions {
        typed,
        interactive,
        notice_delay: DEFAULT_NOTICE_DELAY,
        app: ServerBinding::new("http", &config.host, config.servers.app.port),
        cdn: ServerBinding::new(config.cdn_protocol(), &config.host, config.servers.cdn.port),
    }
}
