//! Running external tools (build commands, `tsc`) and capturing their output.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Output of a finished child process, decoded lossily.
#[derive(Debug, Clone)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// stdout and stderr, in that order, skipping empty streams.
    pub fn combined(&self) -> String {
        [self.stdout.trim_end(), self.stderr.trim_end()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Run `argv` in `cwd` and wait for it. `argv` must not be empty.
pub async fn run_captured<K, V>(
    argv: &[String],
    cwd: &Path,
    envs: impl IntoIterator<Item = (K, V)>,
) -> std::io::Result<Captured>
where
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let (program, args) = argv.split_first().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command")
    })?;

    tracing::debug!(program = %program, ?args, cwd = %cwd.display(), "spawning");
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .envs(envs)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await?;

    Ok(Captured {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Locate `program` the way a shell would: relative to `cwd` when it
/// contains a path separator, otherwise on `PATH`.
pub fn find_program(program: &str, cwd: &Path) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        let path = cwd.join(candidate);
        return path.is_file().then_some(path);
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        executable_names(program)
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

fn executable_names(program: &str) -> impl Iterator<Item = String> + '_ {
    let windows_suffixes: &[&str] = if cfg!(windows) { &[".exe", ".cmd", ".bat"] } else { &[] };
    std::iter::once(program.to_string()).chain(windows_suffixes.iter().map(move |ext| format!("{program}{ext}")))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_both_streams() {
        let argv = ["sh", "-c", "echo out; echo err >&2; exit 3"].map(String::from);
        let captured = run_captured(&argv, Path::new("."), [("STOKE_TEST", "1")])
            .await
            .unwrap();

        assert!(!captured.success());
        assert_eq!(captured.status.code(), Some(3));
        assert_eq!(captured.combined(), "out\nerr");
    }

    #[tokio::test]
    async fn test_env_is_passed() {
        let argv = ["sh", "-c", "printf %s \"$STOKE_MODE\""].map(String::from);
        let captured = run_captured(&argv, Path::new("."), [("STOKE_MODE", "development")])
            .await
            .unwrap();
        assert_eq!(captured.stdout, "development");
    }

    #[tokio::test]
    async fn test_empty_argv_is_rejected() {
        let err = run_captured(&[], Path::new("."), Vec::<(String, String)>::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_find_program() {
        assert!(find_program("sh", Path::new("/")).is_some());
        assert!(find_program("definitely-not-a-stoke-tool", Path::new("/")).is_none());

        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("bin/build"), "").unwrap();
        assert_eq!(
            find_program("./bin/build", dir.path()),
            Some(dir.path().join("./bin/build"))
        );
    }
}
