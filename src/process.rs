//! Bounded subprocess execution
//!
//! Shared helper for the test runner and the behavioral validator: spawn a
//! command with piped stdio, capture both streams completely, and enforce a
//! wall-clock timeout. On timeout the child (and, on unix, its whole process
//! group) is forcibly terminated before the timeout is reported; a leaked
//! process would accumulate across evaluation units running in a loop.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Poll interval while waiting for the child to exit.
const WAIT_POLL_MS: u64 = 50;

/// Fully captured output of a completed subprocess.
#[derive(Debug)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; -1 when the process was terminated by a signal.
    pub exit_code: i32,
}

/// Outcome of a bounded subprocess run.
#[derive(Debug)]
pub enum RunOutcome {
    /// The process exited (with any exit code) within the timeout.
    Completed(CapturedOutput),
    /// The process exceeded the timeout and was killed.
    TimedOut,
}

/// Run a command to completion with a wall-clock timeout.
///
/// The command's stdout and stderr are captured in full; no truncation
/// happens at capture time. Spawn failures surface as `io::Error` so the
/// caller can distinguish a missing executable (`ErrorKind::NotFound`)
/// from other launch failures.
pub fn run_with_timeout(
    command: &mut Command,
    timeout: Duration,
) -> std::io::Result<RunOutcome> {
    command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

    // Own process group so a timeout kill reaches grandchildren too.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = command.spawn()?;

    let stdout_handle = spawn_reader(child.stdout.take());
    let stderr_handle = spawn_reader(child.stderr.take());

    let start = Instant::now();
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if start.elapsed() >= timeout {
                    kill_process_tree(&mut child);
                    let _ = child.wait();
                    let _ = stdout_handle.join();
                    let _ = stderr_handle.join();
                    return Ok(RunOutcome::TimedOut);
                }
                thread::sleep(Duration::from_millis(WAIT_POLL_MS));
            }
        }
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();

    Ok(RunOutcome::Completed(CapturedOutput {
        stdout,
        stderr,
        exit_code: status.code().unwrap_or(-1),
    }))
}

/// Drain a captured stream on a background thread.
fn spawn_reader<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_string(&mut buffer);
        }
        buffer
    })
}

/// Forcibly terminate the child and any processes it spawned.
#[cfg(unix)]
fn kill_process_tree(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let pgid = Pid::from_raw(child.id() as i32);
    if killpg(pgid, Signal::SIGKILL).is_err() {
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child) {
    let _ = child.kill();
}
