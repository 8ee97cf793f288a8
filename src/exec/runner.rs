//! Process runner: spawn, forward output verbatim, report the exit.
//!
//! Every invocation yields exactly one terminal result: either a
//! [`SpawnError`] from [`Cmd::spawn`] or a [`ProcessExit`] from
//! [`RunningProcess::wait`]. Never both.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Child;
use tokio::task::JoinHandle;

use super::{Cmd, SpawnError};

/// Upper bound for draining forwarders after the child exited.
///
/// A grandchild that inherited the pipes can keep them open forever.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

const CHUNK_SIZE: usize = 8 * 1024;

/// Terminal event of a process that did start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

impl ProcessExit {
    pub const fn with_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub const fn signaled() -> Self {
        Self { code: None }
    }

    /// Exit code 0. A signal-terminated process is never a success.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self::with_code(code),
            None => Self::signaled(),
        }
    }
}

impl std::fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "code {code}"),
            None => f.write_str("signal"),
        }
    }
}

/// A spawned child whose output is being forwarded.
#[derive(Debug)]
pub struct RunningProcess {
    child: Child,
    forwarders: Vec<JoinHandle<()>>,
}

impl RunningProcess {
    /// OS process id, if the child has not been reaped yet.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the child to exit, then let the forwarders drain.
    pub async fn wait(mut self) -> ProcessExit {
        let exit = match self.child.wait().await {
            Ok(status) => ProcessExit::from(status),
            Err(e) => {
                crate::debug!("wait failed: {}", e);
                ProcessExit::signaled()
            }
        };

        for handle in self.forwarders {
            let _ = tokio::time::timeout(DRAIN_TIMEOUT, handle).await;
        }

        exit
    }
}

impl Cmd {
    /// Spawn the process with stdout/stderr forwarded to our own streams.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self) -> Result<RunningProcess, SpawnError> {
        let mut cmd = self.command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| SpawnError {
            program: self.program_name(),
            source,
        })?;

        let mut forwarders = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            forwarders.push(tokio::spawn(forward(stdout, tokio::io::stdout())));
        }
        if let Some(stderr) = child.stderr.take() {
            forwarders.push(tokio::spawn(forward(stderr, tokio::io::stderr())));
        }

        Ok(RunningProcess { child, forwarders })
    }

    /// Spawn and wait for the exit.
    pub async fn run(&self) -> Result<ProcessExit, SpawnError> {
        Ok(self.spawn()?.wait().await)
    }

    /// Run with all streams discarded.
    pub async fn run_quiet(&self) -> Result<ProcessExit, SpawnError> {
        let mut cmd = self.command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let status = cmd.status().await.map_err(|source| SpawnError {
            program: self.program_name(),
            source,
        })?;
        Ok(ProcessExit::from(status))
    }
}

/// Copy chunks from `reader` to `writer` as they arrive, flushing each one.
async fn forward<R, W>(mut reader: R, mut writer: W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        if writer.write_all(&buf[..n]).await.is_err() {
            break;
        }
        let _ = writer.flush().await;
    }
}

// ============================================================================
// Tests
// ============================================================================
