//! Source watcher with per-path debouncing.
//!
//! Watches `srcDir` recursively and forwards relevant changes through a
//! channel once a path has been quiet for the debounce window, so the last
//! write of a burst is the one a rebuild sees. Hidden files and configured
//! patterns never trigger a rebuild.

use crate::error::{CliError, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    fn from_event(kind: &EventKind, path: PathBuf) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            EventKind::Remove(_) => Some(FileChange::Removed(path)),
            _ => None,
        }
    }
}

/// Whether `relative` (a path below the watched root) is excluded.
///
/// Patterns match a single path component (`node_modules`), a file-name
/// suffix (`*.swp`), or, when they contain `/`, a path prefix
/// (`generated/icons`). Hidden components are always excluded.
pub fn is_ignored(relative: &Path, patterns: &[String]) -> bool {
    let hidden_or_listed = relative.components().any(|component| {
        let Some(name) = component.as_os_str().to_str() else {
            return false;
        };
        if name.starts_with('.') && name != "." && name != ".." {
            return true;
        }
        patterns.iter().any(|pattern| match pattern.strip_prefix('*') {
            Some(suffix) => name.ends_with(suffix),
            None => !pattern.contains('/') && name == pattern,
        })
    });

    hidden_or_listed
        || patterns
            .iter()
            .filter(|pattern| pattern.contains('/'))
            .any(|prefix| relative.starts_with(prefix))
}

pub struct FileWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
    root: PathBuf,
}

impl FileWatcher {
    /// Start watching `root`. Changes arrive on the returned receiver.
    pub fn new(
        root: PathBuf,
        ignore_patterns: Vec<String>,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !root.is_dir() {
            return Err(CliError::FileNotFound(root));
        }

        let (tx, rx) = mpsc::channel(100);
        let watch_root = root.clone();

        let mut debouncer = new_debouncer(
            Duration::from_millis(debounce_ms.max(1)),
            None,
            move |result: DebounceEventResult| {
                let events = match result {
                    Ok(events) => events,
                    Err(errors) => {
                        for err in errors {
                            tracing::warn!(error = %err, "file watcher error");
                        }
                        return;
                    }
                };

                let mut seen = HashSet::new();
                for event in events {
                    for path in &event.paths {
                        if should_ignore(path, &watch_root, &ignore_patterns) {
                            continue;
                        }
                        let Some(change) = FileChange::from_event(&event.kind, path.clone()) else {
                            continue;
                        };
                        if !seen.insert(path.clone()) {
                            continue;
                        }
                        // The debouncer calls back on its own thread, outside the runtime.
                        if tx.blocking_send(change).is_err() {
                            return;
                        }
                    }
                }
            },
        )?;

        debouncer.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _debouncer: debouncer,
                root,
            },
            rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn should_ignore(path: &Path, root: &Path, patterns: &[String]) -> bool {
    match path.strip_prefix(root) {
        Ok(relative) => is_ignored(relative, patterns),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Vec<String> {
        ["node_modules", "*.swp", "generated/icons"]
            .map(String::from)
            .to_vec()
    }

    #[test]
    fn test_component_patterns() {
        assert!(is_ignored(Path::new("node_modules/react/index.js"), &patterns()));
        assert!(is_ignored(Path::new("pkg/node_modules/x.js"), &patterns()));
        assert!(!is_ignored(Path::new("my_node_modules_notes.js"), &patterns()));
    }

    #[test]
    fn test_suffix_and_prefix_patterns() {
        assert!(is_ignored(Path::new("component.js.swp"), &patterns()));
        assert!(is_ignored(Path::new("generated/icons/a.svg"), &patterns()));
        assert!(!is_ignored(Path::new("generated/fonts/a.woff"), &patterns()));
    }

    #[test]
    fn test_hidden_paths() {
        assert!(is_ignored(Path::new(".cache/x.js"), &[]));
        assert!(is_ignored(Path::new("styles/.DS_Store"), &[]));
        assert!(!is_ignored(Path::new("./component.js"), &[]));
    }

    #[test]
    fn test_outside_root_is_ignored() {
        let root = Path::new("/project/src");
        assert!(should_ignore(Path::new("/project/dist/app.js"), root, &[]));
        assert!(!should_ignore(Path::new("/project/src/app.js"), root, &[]));
    }

    #[tokio::test]
    async fn test_missing_root_is_rejected() {
        let result = FileWatcher::new(PathBuf::from("/definitely/not/here"), vec![], 100);
        assert!(matches!(result, Err(CliError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_reports_writes() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let (_watcher, mut rx) = FileWatcher::new(root.clone(), vec![], 50).unwrap();

        std::fs::write(root.join("component.js"), "export {}").unwrap();

        let change = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no change reported")
            .expect("watcher stopped");
        assert_eq!(change.path(), root.join("component.js"));
    }

    #[tokio::test]
    async fn test_second_write_inside_window_is_delivered() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let file = root.join("component.js");
        let (_watcher, mut rx) = FileWatcher::new(root.clone(), vec![], 500).unwrap();

        std::fs::write(&file, "first").unwrap();
        let change = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("first write not reported")
            .expect("watcher stopped");
        assert_eq!(change.path(), file);

        tokio::time::sleep(Duration::from_millis(100)).await;
        std::fs::write(&file, "second").unwrap();

        let change = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("second write dropped")
            .expect("watcher stopped");
        assert_eq!(change.path(), file);
    }

    #[tokio::test]
    async fn test_burst_is_reported_after_last_write() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let file = root.join("component.js");
        let (_watcher, mut rx) = FileWatcher::new(root.clone(), vec![], 300).unwrap();

        std::fs::write(&file, "").unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        std::fs::write(&file, "saved and formatted").unwrap();
        let last_write = std::time::Instant::now();

        let change = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no change reported")
            .expect("watcher stopped");
        assert_eq!(change.path(), file);
        assert!(last_write.elapsed() >= Duration::from_millis(200));
    }
}
