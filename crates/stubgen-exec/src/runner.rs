//! External command runner.
//!
//! Spawns one process, drains stdout and stderr concurrently while waiting
//! for it to exit, and returns both captured buffers with the exit status.

use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::drain::StreamDrain;
use crate::error::{ExecError, ExecResult};

/// Default interval between exit checks while a deadline is active.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// How long drains get to reach end of file once the process group is killed.
pub const TERMINATION_GRACE_MS: u64 = 500;

/// Exit status reported for a process that ended without an exit code
/// (terminated by a signal).
pub const SIGNALED_EXIT_STATUS: i32 = -1;

/// Outcome of one completed process execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessExecutionResult {
    exit_status: i32,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl ProcessExecutionResult {
    /// Creates a new result.
    pub fn new(exit_status: i32, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        Self {
            exit_status,
            stdout,
            stderr,
        }
    }

    /// Returns the process exit status.
    pub fn exit_status(&self) -> i32 {
        self.exit_status
    }

    /// Returns true if the process exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Returns the captured standard output.
    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    /// Returns the captured standard error.
    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// Returns standard output decoded lossily as UTF-8.
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Returns standard error decoded lossily as UTF-8.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Splits the result into `(exit_status, stdout, stderr)`.
    pub fn into_parts(self) -> (i32, Vec<u8>, Vec<u8>) {
        (self.exit_status, self.stdout, self.stderr)
    }
}

/// Configuration for the process runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Deadline covering the process and both output streams. When it
    /// expires the process group is killed. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Working directory for the process.
    pub working_dir: Option<PathBuf>,
    /// Interval between exit checks while a deadline is active.
    pub poll_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            working_dir: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl RunnerConfig {
    /// Sets the deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the deadline in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Sets the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Runs external commands with captured output.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    config: RunnerConfig,
}

impl ProcessRunner {
    /// Creates a runner with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner with the given configuration.
    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Returns the runner configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs `command` with `args` and waits for it to finish.
    ///
    /// Arguments are passed to the process as discrete tokens; no shell is
    /// involved. Both output streams start draining before the runner blocks
    /// on exit, so output volume cannot deadlock the call.
    ///
    /// On Unix the process leads its own process group. A configured
    /// deadline bounds the exit and both streams reaching end of file, so a
    /// descendant that keeps a pipe open still times the call out. On expiry
    /// the whole group is killed.
    ///
    /// # Errors
    ///
    /// - [`ExecError::SpawnFailed`] if the process cannot be started
    /// - [`ExecError::WaitFailed`] if waiting for exit fails
    /// - [`ExecError::Timeout`] if the configured deadline expires
    pub fn run<C, S>(&self, command: C, args: &[S]) -> ExecResult<ProcessExecutionResult>
    where
        C: AsRef<OsStr>,
        S: AsRef<OsStr>,
    {
        let command_name = command.as_ref().to_string_lossy().into_owned();
        let arg_list: Vec<String> = args
            .iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .collect();

        tracing::debug!(command = %command_name, args = ?arg_list, "spawning process");

        let mut cmd = Command::new(command.as_ref());
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(ref dir) = self.config.working_dir {
            cmd.current_dir(dir);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn().map_err(|source| ExecError::SpawnFailed {
            command: command_name.clone(),
            args: arg_list,
            source,
        })?;
        let mut guard = ChildGuard::new(child);

        // Both drains must be running before we block on the child.
        let stdout = drain_pipe("stdout", guard.child.stdout.take());
        let stderr = drain_pipe("stderr", guard.child.stderr.take());

        let status = match self.config.timeout {
            None => guard.wait(),
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                match guard.wait_until(deadline, self.config.poll_interval) {
                    Ok(Some(status))
                        if stdout.wait_until(deadline) && stderr.wait_until(deadline) =>
                    {
                        Ok(status)
                    }
                    Ok(_) => {
                        guard.terminate();
                        let grace = Instant::now() + Duration::from_millis(TERMINATION_GRACE_MS);
                        if !(stdout.wait_until(grace) && stderr.wait_until(grace)) {
                            tracing::warn!(
                                command = %command_name,
                                "output pipe still open after kill, detaching drains"
                            );
                        }
                        tracing::warn!(command = %command_name, ?timeout, "process group killed after deadline");
                        return Err(ExecError::Timeout {
                            command: command_name,
                            timeout,
                        });
                    }
                    Err(e) => Err(e),
                }
            }
        };
        let status = match status {
            Ok(status) => status,
            Err(source) => {
                return Err(ExecError::WaitFailed {
                    command: command_name,
                    source,
                })
            }
        };
        guard.disarm();

        let result = ProcessExecutionResult::new(
            exit_code(status),
            stdout.into_data(),
            stderr.into_data(),
        );

        tracing::debug!(
            command = %command_name,
            exit_status = result.exit_status(),
            stdout_bytes = result.stdout().len(),
            stderr_bytes = result.stderr().len(),
            "process finished"
        );

        Ok(result)
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(SIGNALED_EXIT_STATUS)
}

fn drain_pipe<R>(name: &'static str, pipe: Option<R>) -> StreamDrain
where
    R: Read + Send + 'static,
{
    match pipe {
        Some(pipe) => StreamDrain::spawn(name, pipe),
        None => StreamDrain::spawn(name, io::empty()),
    }
}

/// Owns a child process. Unless disarmed after a clean finish, dropping the
/// guard kills the process group and reaps the child.
struct ChildGuard {
    child: Child,
    reaped: bool,
    armed: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
            armed: true,
        }
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status)
    }

    /// Polls for exit until `deadline`. `Ok(None)` means the deadline passed.
    fn wait_until(
        &mut self,
        deadline: Instant,
        poll_interval: Duration,
    ) -> io::Result<Option<ExitStatus>> {
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok(Some(status));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            std::thread::sleep(poll_interval.min(remaining));
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    /// Kills the process group, then reaps the child if it has not been.
    fn terminate(&mut self) {
        self.armed = false;
        let pid = self.child.id();
        if let Err(e) = kill_group(&mut self.child, self.reaped) {
            tracing::warn!(pid, error = %e, "failed to kill process group");
        }
        if !self.reaped {
            if let Err(e) = self.child.wait() {
                tracing::warn!(pid, error = %e, "failed to reap killed process");
            }
            self.reaped = true;
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.armed {
            self.terminate();
        }
    }
}

/// Sends SIGKILL to the group led by `child`. The group outlives a reaped
/// leader while any member is alive; an empty group is not an error.
#[cfg(unix)]
fn kill_group(child: &mut Child, _reaped: bool) -> io::Result<()> {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: killpg takes no pointers. `pgid` is the group created for this
    // child by `process_group(0)`, which cannot be reused while members remain.
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child, reaped: bool) -> io::Result<()> {
    if reaped {
        return Ok(());
    }
    child.kill()
}
