//! `stoke build`: one compile cycle with type checking, then exit.

use crate::bundler::create_compiler;
use crate::cli::BuildArgs;
use crate::commands::project_root;
use crate::config::ProjectConfig;
use crate::dev::session::{coordinator_options, locate_checker};
use crate::error::Result;
use crate::ui::{self, ConsoleReporter};
use std::sync::Arc;
use stoke_core::{wait_for_compilation, DevCoordinator, NoopNotifier};

/// Execute the build command. Errors when the cycle has errors.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let root = project_root(&args.project)?;
    let config = ProjectConfig::load(&root, args.project.config.as_deref(), &args.overrides())?;

    let compiler = create_compiler(&config, &root)?;
    let typed = config.is_typed(&root);
    let checker = if typed { locate_checker(&config, &root) } else { None };

    DevCoordinator::attach(
        compiler.hooks(),
        coordinator_options(&config, typed, false),
        checker,
        Arc::new(NoopNotifier),
        Arc::new(ConsoleReporter::stdout(ui::should_use_color())),
    );

    let compiled = wait_for_compilation(&compiler);
    compiler.run().await;
    let stats = compiled.await?;

    ui::success(&format!(
        "Emitted {} file(s) to {} in {}ms",
        stats.compilation().assets().len(),
        config.statics_dir.display(),
        stats.duration().as_millis()
    ));
    Ok(())
}
