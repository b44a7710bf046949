//! `stoke dev`: serve, watch, rebuild and type-check until Ctrl+C.

use crate::cli::DevArgs;
use crate::commands::project_root;
use crate::config::ProjectConfig;
use crate::dev::DevSession;
use crate::error::{CliError, Result};
use crate::ui::{self, ConsoleReporter};
use std::sync::Arc;
use stoke_core::CoreError;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::JoinError;

/// Execute the dev command.
///
/// A failing first cycle is reported but does not stop the server; the next
/// change triggers a new cycle. Setup failures (configuration, compiler,
/// binding the port) end the command with an error.
pub async fn execute(args: DevArgs) -> Result<()> {
    let root = project_root(&args.project)?;
    let config = ProjectConfig::load(&root, args.project.config.as_deref(), &args.overrides())?;

    ui::info("Starting the development server...");
    ui::info(&format!("Working directory: {}", root.display()));

    let interactive = ui::is_interactive();
    let reporter = Arc::new(ConsoleReporter::stdout(ui::should_use_color()));
    let session = DevSession::new(root, config, reporter, interactive)?;

    let config = session.config();
    let addr = format!("{}:{}", config.host, config.servers.cdn.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;
    if config.servers.cdn.ssl {
        ui::warning("servers.cdn.ssl only changes the advertised URLs; the dev server speaks plain HTTP");
    }

    let (stop_server, server_stopped) = oneshot::channel::<()>();
    let mut server_task = tokio::spawn(session.server().serve(listener, async move {
        let _ = server_stopped.await;
    }));

    match session.initial_build().await {
        Ok(_) => {}
        // Already reported by the console reporter.
        Err(CoreError::CompilationFailed { count }) => {
            tracing::debug!(count, "initial build finished with errors");
        }
        Err(err) => return Err(err.into()),
    }

    ui::info("Press Ctrl+C to stop");

    let watched = tokio::select! {
        result = session.watch(shutdown_signal()) => result,
        joined = &mut server_task => return Err(server_exit(joined)),
    };

    let _ = stop_server.send(());
    if let Ok(Err(err)) = server_task.await {
        tracing::warn!(error = %err, "dev server did not shut down cleanly");
    }

    watched?;
    ui::success("Development server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => ui::info("Shutting down development server..."),
        Err(err) => {
            tracing::warn!(error = %err, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

/// Error for a server task that ended before shutdown was requested.
fn server_exit(joined: std::result::Result<Result<()>, JoinError>) -> CliError {
    match joined {
        Ok(Err(err)) => err,
        Ok(Ok(())) => CliError::Server("server stopped unexpectedly".to_string()),
        Err(err) => CliError::Server(format!("server task failed: {}", err)),
    }
}
