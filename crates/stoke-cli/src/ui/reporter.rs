//! Console rendering of compile cycles.

use owo_colors::{OwoColorize, Style};
use parking_lot::Mutex;
use std::io::Write;
use stoke_core::{CycleStatus, Reporter, ServerUrls, StartupInfo};

/// Writes cycle progress to a terminal (stdout by default).
pub struct ConsoleReporter {
    out: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl ConsoleReporter {
    pub fn stdout(color: bool) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), color)
    }

    /// Earlier output stays on screen; nothing is ever cleared.
    pub fn with_writer(out: Box<dyn Write + Send>, color: bool) -> Self {
        Self {
            out: Mutex::new(out),
            color,
        }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock();
        // A closed terminal must not take the dev server down.
        if let Err(err) = writeln!(out, "{}", text).and_then(|()| out.flush()) {
            tracing::debug!(error = %err, "console write failed");
        }
    }

    fn url_block(&self, urls: &ServerUrls) -> String {
        let mut block = format!(
            "  {}            {}",
            self.paint("Local:", Style::new().bold()),
            urls.local_url_for_terminal
        );
        if let Some(lan) = &urls.lan_url_for_terminal {
            block.push_str(&format!(
                "\n  {}  {}",
                self.paint("On Your Network:", Style::new().bold()),
                lan
            ));
        }
        block
    }
}

impl Reporter for ConsoleReporter {
    fn compiling(&self) {
        self.write("Compiling...");
    }

    fn waiting_for_type_check(&self) {
        self.write(&self.paint(
            "Files successfully emitted, waiting for typecheck results...",
            Style::new().yellow(),
        ));
    }

    fn cycle_finished(&self, status: &CycleStatus) {
        match status {
            CycleStatus::Success => {
                self.write(&self.paint("Compiled successfully!", Style::new().green()));
            }
            CycleStatus::Failed { error, total } => {
                tracing::debug!(total, "cycle failed");
                self.write(&self.paint("Failed to compile.\n", Style::new().red()));
                self.write(error);
            }
            CycleStatus::Warnings(warnings) => {
                self.write(&self.paint("Compiled with warnings.\n", Style::new().yellow()));
                self.write(&warnings.join("\n\n"));
            }
        }
    }

    fn startup_info(&self, info: &StartupInfo) {
        let banner = [
            String::new(),
            "Your server is starting and should be accessible from your browser.".to_string(),
            String::new(),
            self.url_block(&info.app),
            String::new(),
            "Your bundles and other static assets are served from your dev-server.".to_string(),
            String::new(),
            self.url_block(&info.cdn),
            String::new(),
            "Note that the development build is not optimized.".to_string(),
            format!(
                "To create a production build, use {}.",
                self.paint("npm run build", Style::new().cyan())
            ),
            String::new(),
        ];
        self.write(&banner.join("\n"));
    }
}
