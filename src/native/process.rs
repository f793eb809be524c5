use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::{Child, Command},
    task::JoinHandle,
    time::{Instant, timeout_at},
};

use crate::constants::{KILL_GRACE_PERIOD, MAX_OUTPUT_BYTES};

/// Program and arguments of one compile or run step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("`{program}` was not found")]
    NotFound { program: String },

    #[error("`{program}` did not finish within {limit:?}")]
    TimedOut { program: String, limit: Duration },

    #[error("Failed to {action} `{program}`: {source}")]
    Io {
        program: String,
        action: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Runs `spec` inside `cwd`, feeding `stdin` and waiting at most `limit`.
///
/// The child leads its own process group. Once the deadline passes the whole
/// group gets SIGTERM, then SIGKILL after a short grace period. Descendants left
/// behind by a child that exited on its own are killed as well.
pub async fn run(
    spec: &CommandSpec,
    cwd: &Path,
    stdin: &str,
    limit: Duration,
) -> Result<ProcessOutput, ProcessError> {
    let program = spec.program_name();
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let started = Instant::now();
    let deadline = started + limit;

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ProcessError::NotFound {
            program: program.clone(),
        },
        _ => ProcessError::Io {
            program: program.clone(),
            action: "spawn",
            source: e,
        },
    })?;
    // `Child::id` is gone once the child is reaped, the group must still be reachable.
    let pid = child.id();
    tracing::trace!(program = %program, ?pid, "Process spawned");

    let stdin_task = child.stdin.take().map(|mut handle| {
        let data = stdin.to_owned();
        tokio::spawn(async move {
            // A program that exits without reading closes the pipe early; that is not an error.
            let _ = handle.write_all(data.as_bytes()).await;
            let _ = handle.shutdown().await;
        })
    });
    let stdout_task = child.stdout.take().map(spawn_reader);
    let stderr_task = child.stderr.take().map(spawn_reader);

    let waited = timeout_at(deadline, child.wait()).await;
    let status = match waited {
        Ok(Ok(status)) => {
            kill_group(pid, Signal::Kill);
            status
        }
        Ok(Err(e)) => {
            terminate(&mut child, pid).await;
            return Err(ProcessError::Io {
                program,
                action: "wait for",
                source: e,
            });
        }
        Err(_) => {
            tracing::debug!(program = %program, ?limit, "Process timed out, terminating");
            terminate(&mut child, pid).await;
            for task in [stdout_task, stderr_task].into_iter().flatten() {
                task.abort();
            }
            if let Some(task) = stdin_task {
                task.abort();
            }
            return Err(ProcessError::TimedOut { program, limit });
        }
    };
    let elapsed = started.elapsed();

    if let Some(task) = stdin_task {
        task.abort();
    }
    let collect_deadline = Instant::now() + KILL_GRACE_PERIOD;
    let stdout = collect(stdout_task, collect_deadline).await;
    let stderr = collect(stderr_task, collect_deadline).await;

    Ok(ProcessOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        elapsed,
    })
}

fn spawn_reader<R>(reader: R) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(read_capped(reader, MAX_OUTPUT_BYTES))
}

/// Reads up to `cap` bytes and discards the rest, so a chatty program never blocks on a full pipe.
async fn read_capped<R>(mut reader: R, cap: u64) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    (&mut reader).take(cap).read_to_end(&mut buf).await?;
    tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok(buf)
}

async fn collect(task: Option<JoinHandle<io::Result<Vec<u8>>>>, deadline: Instant) -> Vec<u8> {
    let Some(mut task) = task else {
        return Vec::new();
    };

    match timeout_at(deadline, &mut task).await {
        Ok(Ok(Ok(bytes))) => bytes,
        Ok(Ok(Err(e))) => {
            tracing::warn!(error = %e, "Failed to read process output");
            Vec::new()
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Output reader task failed");
            Vec::new()
        }
        Err(_) => {
            // An escaped descendant still holds the pipe open.
            task.abort();
            Vec::new()
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Signal {
    Term,
    Kill,
}

/// Sends `signal` to the process group led by `pid`.
#[cfg(unix)]
fn kill_group(pid: Option<u32>, signal: Signal) {
    use nix::{
        sys::signal::{self, Signal as NixSignal},
        unistd::Pid,
    };

    let Some(pid) = pid else {
        return;
    };
    let signal = match signal {
        Signal::Term => NixSignal::SIGTERM,
        Signal::Kill => NixSignal::SIGKILL,
    };

    match signal::killpg(Pid::from_raw(pid as i32), signal) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => tracing::warn!(pid, ?signal, error = %e, "Failed to signal process group"),
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>, _signal: Signal) {}

async fn terminate(child: &mut Child, pid: Option<u32>) {
    kill_group(pid, Signal::Term);
    tokio::time::sleep(KILL_GRACE_PERIOD).await;
    kill_group(pid, Signal::Kill);

    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "Failed to kill process");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("/bin/sh").arg("-c").arg(script)
    }

    fn cwd() -> PathBuf {
        std::env::temp_dir()
    }

    #[tokio::test]
    async fn test_pipes_stdin_and_captures_output() {
        let output = run(&sh("cat; echo oops >&2"), &cwd(), "hello\n", Duration::from_secs(5))
            .await
            .unwrap();

        assert!(output.status.success());
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "oops\n");
    }

    #[tokio::test]
    async fn test_reports_exit_status() {
        let output = run(&sh("echo partial; exit 3"), &cwd(), "", Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stdout, "partial\n");
    }

    #[tokio::test]
    async fn test_ignoring_stdin_does_not_block() {
        let big_input = "x".repeat(1024 * 1024);
        let output = run(&sh("echo done"), &cwd(), &big_input, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(output.stdout, "done\n");
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let started = std::time::Instant::now();
        let result = run(&sh("while :; do :; done"), &cwd(), "", Duration::from_millis(300)).await;

        assert!(matches!(result, Err(ProcessError::TimedOut { .. })));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_timeout_kills_process_ignoring_sigterm() {
        let marker = std::env::temp_dir().join(format!("polyrunner_marker_{}", Uuid::new_v4()));
        let script = format!(
            "trap '' TERM; (trap '' TERM; sleep 1; touch {}) & while :; do :; done",
            marker.display()
        );

        let result = run(&sh(&script), &cwd(), "", Duration::from_millis(300)).await;
        assert!(matches!(result, Err(ProcessError::TimedOut { .. })));

        // The background descendant was part of the group and must not survive.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_orphaned_descendants_do_not_hold_output() {
        let started = std::time::Instant::now();
        let output = run(&sh("sleep 30 & echo parent"), &cwd(), "", Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(output.stdout, "parent\n");
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let spec = CommandSpec::new(format!("/nonexistent/{}", Uuid::new_v4()));
        let result = run(&spec, &cwd(), "", Duration::from_secs(1)).await;

        assert!(matches!(result, Err(ProcessError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_output_is_capped() {
        let output = run(&sh("yes | head -c 20000000"), &cwd(), "", Duration::from_secs(10))
            .await
            .unwrap();

        assert!(output.status.success());
        assert_eq!(output.stdout.len() as u64, MAX_OUTPUT_BYTES);
    }
}
