//! Reduce raw compiler messages to what a developer wants to read.

use crate::stats::StatsSummary;
use regex::Regex;
use std::sync::LazyLock;

static STACK_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*at\s.*(:\d+:\d+\)?|<anonymous>\)?)\s*$").expect("valid stack frame pattern"));

static LOADER_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Module [A-Za-z ]+\(from [^)]*\):?\s*$").expect("valid loader heading pattern"));

const SYNTAX_ERROR_LABEL: &str = "Syntax error:";

/// Cleaned-up messages, same order as the input with duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayMessages {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// What a finished cycle looks like to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleStatus {
    /// No errors and no warnings.
    Success,
    /// No errors; every warning is shown.
    Warnings(Vec<String>),
    /// Only the first error is shown; `total` counts all of them.
    Failed { error: String, total: usize },
}

impl CycleStatus {
    /// Apply the display policy: errors win over warnings and are truncated to one.
    pub fn from_messages(messages: &DisplayMessages) -> Self {
        if let Some(first) = messages.errors.first() {
            return CycleStatus::Failed {
                error: first.clone(),
                total: messages.errors.len(),
            };
        }
        if !messages.warnings.is_empty() {
            return CycleStatus::Warnings(messages.warnings.clone());
        }
        CycleStatus::Success
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CycleStatus::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CycleStatus::Failed { .. })
    }
}

/// Clean every message and drop duplicates.
///
/// When any error looks like a syntax error only syntax errors are kept;
/// the rest are usually knock-on effects.
pub fn format_messages(summary: &StatsSummary) -> DisplayMessages {
    let mut errors = dedupe(summary.errors.iter().map(|m| format_message(m)));
    if errors.iter().any(|e| e.contains(SYNTAX_ERROR_LABEL)) {
        errors.retain(|e| e.contains(SYNTAX_ERROR_LABEL));
    }

    DisplayMessages {
        errors,
        warnings: dedupe(summary.warnings.iter().map(|m| format_message(m))),
    }
}

/// Clean a single message.
///
/// ```
/// use stoke_core::format_message;
///
/// let raw = "./src/a.js\nModule build failed: SyntaxError: Unexpected token (1:4)\n    at Parser.raise (parser.js:10:5)";
/// assert_eq!(format_message(raw), "./src/a.js\nSyntax error: Unexpected token (1:4)");
/// ```
pub fn format_message(message: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for line in message.lines() {
        if LOADER_HEADING.is_match(line) || STACK_FRAME.is_match(line) {
            continue;
        }

        let line = line
            .replace("Module build failed: ", "")
            .replace("ModuleBuildError: ", "")
            .replace("SyntaxError:", SYNTAX_ERROR_LABEL);

        let blank = line.trim().is_empty();
        if blank && lines.last().is_none_or(|prev| prev.trim().is_empty()) {
            continue;
        }
        lines.push(if blank { String::new() } else { line.trim_end().to_string() });
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn dedupe<I: Iterator<Item = String>>(messages: I) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for message in messages {
        if !message.is_empty() && !out.contains(&message) {
            out.push(message);
        }
    }
    out
}
