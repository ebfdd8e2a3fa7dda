#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Subprocess plumbing: spawn, feed stdin, drain both pipes, wait.

use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    process::{Child, Command},
    time::timeout,
};

/// Errors raised while running a child process.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        source:  io::Error,
    },

    /// Reading from or waiting on the child failed.
    #[error("failed while {action}: {source}")]
    Io {
        /// What was being done.
        action: &'static str,
        /// Underlying OS error.
        source: io::Error,
    },

    /// The deadline passed before the child exited.
    #[error("process timed out after {0:?}")]
    Timeout(Duration),
}

/// Kills the child on drop unless it was awaited to completion.
struct KillOnDrop(Option<Child>);

impl KillOnDrop {
    /// Returns the guarded child.
    fn child(&mut self) -> Result<&mut Child, ProcessError> {
        self.0.as_mut().ok_or_else(|| ProcessError::Io {
            action: "accessing child",
            source: io::Error::other("child process already released"),
        })
    }

    /// Releases the child without killing it.
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        if let Some(child) = self.0.as_mut() {
            let _ = child.start_kill();
        }
    }
}

/// A program, its arguments and working directory.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments passed to the program.
    pub args:    Vec<OsString>,
    /// Working directory, inherited when `None`.
    pub cwd:     Option<PathBuf>,
}

impl CommandSpec {
    /// Starts a spec for `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args:    Vec::new(),
            cwd:     None,
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug)]
pub struct Captured {
    /// Exit status returned by the process.
    pub status: ExitStatus,
    /// Contents written to stdout.
    pub stdout: Vec<u8>,
    /// Contents written to stderr.
    pub stderr: Vec<u8>,
}

impl Captured {
    /// Stdout decoded lossily.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Stderr decoded lossily.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Runs `spec`, writes `stdin` (or attaches nothing), and collects both
/// output streams.
pub async fn run_captured(
    spec: &CommandSpec,
    stdin: Option<Vec<u8>>,
    deadline: Option<Duration>,
) -> Result<Captured, ProcessError> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
    if let Some(dir) = &spec.cwd {
        cmd.current_dir(dir);
    }

    let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: spec.program.display().to_string(),
        source,
    })?;
    let mut guard = KillOnDrop(Some(child));

    if let Some(bytes) = stdin
        && let Some(mut handle) = guard.child()?.stdin.take()
    {
        // A child that exits without reading stdin closes the pipe early;
        // the write error carries no information then.
        tokio::spawn(async move {
            let _ = handle.write_all(&bytes).await;
            let _ = handle.shutdown().await;
        });
    }

    let mut stdout = guard.child()?.stdout.take().ok_or(ProcessError::Io {
        action: "taking stdout",
        source: io::Error::other("stdout was not piped"),
    })?;
    let mut stderr = guard.child()?.stderr.take().ok_or(ProcessError::Io {
        action: "taking stderr",
        source: io::Error::other("stderr was not piped"),
    })?;

    let out_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).await.map(|_| buf)
    });
    let err_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).await.map(|_| buf)
    });

    let finish = async move {
        let mut guard = guard;
        let status = guard
            .child()?
            .wait()
            .await
            .map_err(|source| ProcessError::Io {
                action: "waiting on process",
                source,
            })?;
        let stdout = join_reader(out_task, "reading stdout").await?;
        let stderr = join_reader(err_task, "reading stderr").await?;
        guard.disarm();
        Ok::<Captured, ProcessError>(Captured {
            status,
            stdout,
            stderr,
        })
    };

    match deadline {
        Some(limit) => timeout(limit, finish)
            .await
            .map_err(|_| ProcessError::Timeout(limit))?,
        None => finish.await,
    }
}

/// Awaits a pipe reader task.
async fn join_reader(
    task: tokio::task::JoinHandle<io::Result<Vec<u8>>>,
    action: &'static str,
) -> Result<Vec<u8>, ProcessError> {
    task.await
        .map_err(|join| ProcessError::Io {
            action,
            source: io::Error::other(join),
        })?
        .map_err(|source| ProcessError::Io { action, source })
}
