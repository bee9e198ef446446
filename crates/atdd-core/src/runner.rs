//! Bounded, streaming execution of a single test file.
//!
//! The test command runs through the platform shell with watch mode
//! suppressed. Output is captured and mirrored to this process's own
//! stdout/stderr as it arrives. The run ends on exactly one terminal event:
//! the child exits, the timeout fires, the user cancels, or the launch fails.
//! Every path resolves to a [`TestRunOutcome`]; nothing here returns an error.
//!
//! The child runs in its own process group, so a terminal Ctrl-C reaches only
//! this process. [`TestRunner::run`] listens for it and takes the whole group
//! down before returning.

use crate::paths;
use std::future::Future;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// How long a terminated child gets to exit before it is killed outright.
const KILL_GRACE: Duration = Duration::from_secs(5);
/// How long to keep reading pipes after the child is gone.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Injected only when the caller's environment leaves them unset.
const NON_INTERACTIVE_ENV: [(&str, &str); 2] = [("CI", "1"), ("VITEST_WATCH", "false")];

pub const TIMEOUT_MARKER: &str = "[timeout]";
pub const RUNNER_ERROR_MARKER: &str = "[runner error]";
pub const INTERRUPTED_MARKER: &str = "[interrupted]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunOutcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub command: String,
    /// The run was cancelled before the child finished.
    pub interrupted: bool,
}

enum Terminal {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct TestRunner {
    timeout: Duration,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `{prefix} "{relative test path}"`, the path kept as one shell word.
    pub fn command_line(root: &Path, test_file: &Path, prefix: &str) -> String {
        let relative = paths::relative_to(root, test_file);
        format!("{prefix} \"{}\"", escape_for_double_quotes(&relative.to_string_lossy()))
    }

    /// Run until the child exits, the timeout fires or Ctrl-C arrives.
    pub async fn run(&self, root: &Path, test_file: &Path, prefix: &str) -> TestRunOutcome {
        self.run_until(root, test_file, prefix, ctrl_c()).await
    }

    /// Like [`run`](Self::run), with `cancel` in place of Ctrl-C.
    pub async fn run_until<C>(
        &self,
        root: &Path,
        test_file: &Path,
        prefix: &str,
        cancel: C,
    ) -> TestRunOutcome
    where
        C: Future<Output = ()>,
    {
        let command = Self::command_line(root, test_file, prefix);
        tracing::info!(%command, timeout_ms = self.timeout.as_millis() as u64, "running test");

        let mut cmd = shell(&command);
        cmd.current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        for (key, value) in NON_INTERACTIVE_ENV {
            if std::env::var_os(key).is_none() {
                cmd.env(key, value);
            }
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("failed to launch test command: {e}");
                return TestRunOutcome {
                    success: false,
                    stdout: String::new(),
                    stderr: format!("{RUNNER_ERROR_MARKER} {e}\n"),
                    command,
                    interrupted: false,
                };
            }
        };

        let stdout_buf = Arc::new(Mutex::new(Vec::new()));
        let stderr_buf = Arc::new(Mutex::new(Vec::new()));
        let mut pumps = Vec::with_capacity(2);
        if let Some(out) = child.stdout.take() {
            pumps.push(tokio::spawn(pump(out, tokio::io::stdout(), Arc::clone(&stdout_buf))));
        }
        if let Some(err) = child.stderr.take() {
            pumps.push(tokio::spawn(pump(err, tokio::io::stderr(), Arc::clone(&stderr_buf))));
        }

        let terminal = tokio::select! {
            status = child.wait() => Terminal::Exited(status),
            _ = tokio::time::sleep(self.timeout) => Terminal::TimedOut,
            _ = cancel => Terminal::Cancelled,
        };
        let interrupted = matches!(terminal, Terminal::Cancelled);

        let (success, diagnostic) = match terminal {
            Terminal::Exited(Ok(status)) => (status.success(), None),
            Terminal::Exited(Err(e)) => (false, Some(format!("{RUNNER_ERROR_MARKER} {e}\n"))),
            Terminal::TimedOut => {
                let status = terminate(&mut child).await;
                let ms = self.timeout.as_millis();
                tracing::warn!("test run exceeded {ms}ms, terminated");
                (
                    false,
                    Some(format!(
                        "\n{TIMEOUT_MARKER} test run exceeded {ms}ms and was terminated ({})\n",
                        describe_exit(status.as_ref())
                    )),
                )
            }
            Terminal::Cancelled => {
                let status = terminate(&mut child).await;
                tracing::warn!("test run interrupted, terminated");
                (
                    false,
                    Some(format!(
                        "\n{INTERRUPTED_MARKER} test run cancelled and was terminated ({})\n",
                        describe_exit(status.as_ref())
                    )),
                )
            }
        };

        let aborts: Vec<_> = pumps.iter().map(|p| p.abort_handle()).collect();
        let drained = tokio::time::timeout(DRAIN_GRACE, async {
            for pump in pumps {
                let _ = pump.await;
            }
        })
        .await;
        if drained.is_err() {
            tracing::debug!("output pipes still open after exit, abandoning them");
            aborts.iter().for_each(|a| a.abort());
        }

        let stdout = take_text(&stdout_buf);
        let mut stderr = take_text(&stderr_buf);
        if let Some(line) = diagnostic {
            stderr.push_str(&line);
        }

        TestRunOutcome {
            success,
            stdout,
            stderr,
            command,
            interrupted,
        }
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::debug!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
fn shell(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

#[cfg(not(unix))]
fn shell(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command_line);
    cmd
}

#[cfg(unix)]
fn escape_for_double_quotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(not(unix))]
fn escape_for_double_quotes(s: &str) -> String {
    s.to_string()
}

/// Send SIGTERM to the child's process group and wait for it to exit,
/// killing it if it outlives the grace period.
async fn terminate(child: &mut Child) -> Option<ExitStatus> {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                tracing::debug!("SIGTERM failed: {e}");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = child.start_kill();
    }

    match tokio::time::timeout(KILL_GRACE, child.wait()).await {
        Ok(Ok(status)) => Some(status),
        _ => {
            let _ = child.kill().await;
            child.wait().await.ok()
        }
    }
}

fn describe_exit(status: Option<&ExitStatus>) -> String {
    let code = status
        .and_then(|s| s.code())
        .map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string());
    let signal = status.and_then(exit_signal).unwrap_or_else(|| "none".to_string());
    format!("exit code: {code}, signal: {signal}")
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<String> {
    use std::os::unix::process::ExitStatusExt;

    status.signal().map(|raw| {
        nix::sys::signal::Signal::try_from(raw)
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|_| raw.to_string())
    })
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<String> {
    None
}

/// Copy chunks from `reader` into `buf` and mirror them to `sink`.
async fn pump<R, W>(mut reader: R, mut sink: W, buf: Arc<Mutex<Vec<u8>>>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if let Ok(mut b) = buf.lock() {
                    b.extend_from_slice(&chunk[..n]);
                }
                let _ = sink.write_all(&chunk[..n]).await;
                let _ = sink.flush().await;
            }
        }
    }
}

fn take_text(buf: &Arc<Mutex<Vec<u8>>>) -> String {
    buf.lock()
        .map(|b| String::from_utf8_lossy(&b).into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;
    use tempfile::TempDir;

    fn test_file(dir: &TempDir, rel: &str) -> std::path::PathBuf {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "it('works')").unwrap();
        path
    }

    #[test]
    fn command_line_quotes_relative_path() {
        let line = TestRunner::command_line(
            Path::new("/abs"),
            Path::new("/abs/app/(public)/user/login/_tests/login.test.tsx"),
            "yarn test",
        );
        assert_eq!(line, r#"yarn test "app/(public)/user/login/_tests/login.test.tsx""#);
    }

    #[test]
    fn command_line_escapes_shell_specials() {
        let line = TestRunner::command_line(Path::new("/abs"), Path::new("/abs/$x/a\"b.test.ts"), "t");
        assert_eq!(line, r#"t "\$x/a\"b.test.ts""#);
    }

    #[tokio::test]
    async fn passing_run_captures_streams_in_order() {
        let dir = TempDir::new().unwrap();
        let file = test_file(&dir, "src/page.test.tsx");
        let outcome = TestRunner::new()
            .run(
                dir.path(),
                &file,
                "printf 'one '; printf 'two'; printf 'warn' >&2; printf ' %s' ",
            )
            .await;
        assert!(outcome.success, "{outcome:?}");
        assert_eq!(outcome.stdout, "one two src/page.test.tsx");
        assert_eq!(outcome.stderr, "warn");
        assert_eq!(
            outcome.command,
            "printf 'one '; printf 'two'; printf 'warn' >&2; printf ' %s'  \"src/page.test.tsx\""
        );
    }

    #[tokio::test]
    async fn nonzero_exit_is_failure() {
        let dir = TempDir::new().unwrap();
        let file = test_file(&dir, "a.test.ts");
        let outcome = TestRunner::new()
            .run(dir.path(), &file, "echo failing >&2; exit 3; echo")
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.stderr, "failing\n");
        assert!(!outcome.stderr.contains(TIMEOUT_MARKER));
    }

    #[tokio::test]
    async fn path_with_parentheses_is_one_argument() {
        let dir = TempDir::new().unwrap();
        let file = test_file(&dir, "app/(public)/login/page.test.tsx");
        let outcome = TestRunner::new()
            .run(dir.path(), &file, "test -f")
            .await;
        assert!(outcome.success, "{outcome:?}");
        assert!(outcome.command.contains("\"app/(public)/login/page.test.tsx\""));
    }

    #[tokio::test]
    async fn non_interactive_env_is_injected() {
        let dir = TempDir::new().unwrap();
        let file = test_file(&dir, "a.test.ts");
        let outcome = TestRunner::new()
            .run(dir.path(), &file, "printf '%s|%s' \"$CI\" \"$VITEST_WATCH\"; true")
            .await;
        let ci = std::env::var("CI").unwrap_or_else(|_| "1".to_string());
        let watch = std::env::var("VITEST_WATCH").unwrap_or_else(|_| "false".to_string());
        assert_eq!(outcome.stdout, format!("{ci}|{watch}"));
    }

    #[tokio::test]
    async fn timeout_terminates_and_fails() {
        let dir = TempDir::new().unwrap();
        let file = test_file(&dir, "a.test.ts");
        let started = Instant::now();
        let outcome = TestRunner::new()
            .with_timeout(Duration::from_millis(300))
            .run(dir.path(), &file, "echo started; sleep 30; echo")
            .await;
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!outcome.success);
        assert_eq!(outcome.stdout, "started\n");
        assert!(outcome.stderr.contains(TIMEOUT_MARKER), "{}", outcome.stderr);
        assert!(outcome.stderr.contains("300ms"), "{}", outcome.stderr);
        assert!(outcome.stderr.contains("SIGTERM"), "{}", outcome.stderr);
    }

    #[tokio::test]
    async fn cancel_terminates_process_group() {
        let dir = TempDir::new().unwrap();
        let file = test_file(&dir, "a.test.ts");
        let started = Instant::now();
        let outcome = TestRunner::new()
            .run_until(
                dir.path(),
                &file,
                "echo started; sleep 30 & wait; echo",
                tokio::time::sleep(Duration::from_millis(300)),
            )
            .await;
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!outcome.success);
        assert!(outcome.interrupted);
        assert_eq!(outcome.stdout, "started\n");
        assert!(outcome.stderr.contains(INTERRUPTED_MARKER), "{}", outcome.stderr);
        assert!(!outcome.stderr.contains(TIMEOUT_MARKER), "{}", outcome.stderr);
    }

    #[tokio::test]
    async fn completed_run_is_not_interrupted() {
        let dir = TempDir::new().unwrap();
        let file = test_file(&dir, "a.test.ts");
        let outcome = TestRunner::new()
            .run_until(dir.path(), &file, "true", std::future::pending::<()>())
            .await;
        assert!(outcome.success);
        assert!(!outcome.interrupted);
    }

    #[tokio::test]
    async fn launch_failure_is_absorbed() {
        let dir = TempDir::new().unwrap();
        let missing_root = dir.path().join("does-not-exist");
        let outcome = TestRunner::new()
            .run(&missing_root, &missing_root.join("a.test.ts"), "true")
            .await;
        assert!(!outcome.success);
        assert!(outcome.stderr.starts_with(RUNNER_ERROR_MARKER), "{}", outcome.stderr);
        assert_eq!(outcome.command, "true \"a.test.ts\"");
    }

    #[test]
    fn default_timeout_is_thirty_seconds() {
        assert_eq!(TestRunner::default().timeout(), Duration::from_millis(30_000));
    }
}
