//! Diagnostics produced by the secondary (type-check) pass.
//!
//! Primary compiler messages arrive already formatted as strings. Secondary
//! findings are structured, so they are normalized here into the same
//! `"<file>\n<body>"` text shape before they are merged.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static LOCATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)\): (?P<sev>error|warning) TS(?P<code>\d+): (?P<msg>.*)$")
        .expect("valid tsc location pattern")
});

static GLOBAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sev>error|warning) TS(?P<code>\d+): (?P<msg>.*)$")
        .expect("valid tsc global pattern")
});

/// Severity of a single diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One issue reported by the secondary pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Source file, absent for project-level diagnostics.
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// Numeric checker code (`2322` for `TS2322`).
    pub code: Option<u32>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            file: Some(file.into()),
            line: None,
            column: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn warning(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(file, message)
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Formatted body without the leading file line.
    ///
    /// ```
    /// use stoke_core::Diagnostic;
    ///
    /// let diag = Diagnostic::error("src/a.ts", "Cannot find name 'x'.").at(3, 7).with_code(2304);
    /// assert_eq!(
    ///     diag.body(),
    ///     "TypeScript error in src/a.ts(3,7):\nCannot find name 'x'.  TS2304"
    /// );
    /// ```
    pub fn body(&self) -> String {
        let location = match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(col)) => format!(" in {}({},{})", file, line, col),
            (Some(file), _, _) => format!(" in {}", file),
            (None, _, _) => String::new(),
        };

        let mut body = format!("TypeScript {}{}:\n{}", self.severity, location, self.message);
        if let Some(code) = self.code {
            body.push_str(&format!("  TS{}", code));
        }
        body
    }

    /// Render as `"<file>\n<body>"`, the shape primary messages use.
    pub fn format(&self) -> String {
        match &self.file {
            Some(file) => format!("{}\n{}", file, self.body()),
            None => self.body(),
        }
    }
}

/// Secondary-pass findings for one cycle, already formatted and split by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CheckReport {
    pub fn from_diagnostics<I>(diagnostics: I) -> Self
    where
        I: IntoIterator<Item = Diagnostic>,
    {
        let mut report = Self::default();
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => report.errors.push(diagnostic.format()),
                Severity::Warning => report.warnings.push(diagnostic.format()),
            }
        }
        report
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Parse `tsc --pretty false` output into diagnostics.
///
/// Lines that start with whitespace continue the previous diagnostic's
/// message (elaboration chains). Anything else that does not match is ignored.
pub fn parse_tsc_output(output: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for line in output.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(caps) = LOCATED.captures(trimmed) {
            diagnostics.push(Diagnostic {
                severity: parse_severity(&caps["sev"]),
                file: Some(caps["file"].to_string()),
                line: caps["line"].parse().ok(),
                column: caps["col"].parse().ok(),
                code: caps["code"].parse().ok(),
                message: caps["msg"].to_string(),
            });
        } else if let Some(caps) = GLOBAL.captures(trimmed) {
            diagnostics.push(Diagnostic {
                severity: parse_severity(&caps["sev"]),
                file: None,
                line: None,
                column: None,
                code: caps["code"].parse().ok(),
                message: caps["msg"].to_string(),
            });
        } else if line.starts_with(char::is_whitespace) {
            if let Some(last) = diagnostics.last_mut() {
                last.message.push('\n');
                last.message.push_str(trimmed.trim_start());
            }
        }
    }

    diagnostics
}

fn parse_severity(raw: &str) -> Severity {
    if raw == "warning" {
        Severity::Warning
    } else {
        Severity::Error
    }
}
