// wfrun — External process execution (tee'd stdout/stderr)

use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command '{command}' failed: {status}")]
    Failed { command: String, status: ExitStatus },
    #[error("i/o error while running '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// What a finished child process wrote and how it exited.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub status: Option<ExitStatus>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

/// Runs the command lines the engine decides on.
pub trait ProcessRunner {
    /// Run a whitespace-separated command line. A non-zero exit is an error.
    ///
    /// Echoing the command line is the caller's concern.
    fn run(&mut self, command_line: &str) -> Result<CommandOutput, RunnerError>;

    /// Run silently and report only whether the command succeeded.
    fn check(&mut self, program: &str, args: &[&str]) -> bool;
}

/// Spawns real OS processes with the inherited environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Copy `source` into both `sink` and the returned buffer until EOF.
fn tee<R: Read, W: Write>(mut source: R, mut sink: W) -> std::io::Result<Vec<u8>> {
    let mut captured = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = source.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n])?;
        sink.flush()?;
        captured.extend_from_slice(&buf[..n]);
    }
    Ok(captured)
}

impl ProcessRunner for SystemRunner {
    fn run(&mut self, command_line: &str) -> Result<CommandOutput, RunnerError> {
        let command_line = command_line.trim();
        let mut parts = command_line.split_whitespace();
        let Some(program) = parts.next() else {
            return Ok(CommandOutput::default());
        };

        tracing::debug!(command = %command_line, "Spawning process");
        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let child_out = child.stdout.take();
        let child_err = child.stderr.take();
        let (stdout, stderr) = std::thread::scope(|scope| {
            let out = scope.spawn(move || match child_out {
                Some(pipe) => tee(pipe, std::io::stdout()),
                None => Ok(Vec::new()),
            });
            let err = scope.spawn(move || match child_err {
                Some(pipe) => tee(pipe, std::io::stderr()),
                None => Ok(Vec::new()),
            });
            (join(out), join(err))
        });

        settle(command_line, || child.wait(), stdout, stderr)
    }

    fn check(&mut self, program: &str, args: &[&str]) -> bool {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

/// Reap the child, then surface reader errors, then the exit status.
fn settle(
    command_line: &str,
    wait: impl FnOnce() -> std::io::Result<ExitStatus>,
    stdout: std::io::Result<Vec<u8>>,
    stderr: std::io::Result<Vec<u8>>,
) -> Result<CommandOutput, RunnerError> {
    let io_err = |source| RunnerError::Io {
        command: command_line.to_string(),
        source,
    };

    let status = wait().map_err(io_err)?;
    let stdout = stdout.map_err(io_err)?;
    let stderr = stderr.map_err(io_err)?;

    if !status.success() {
        tracing::error!(command = %command_line, %status, "Process failed");
        return Err(RunnerError::Failed {
            command: command_line.to_string(),
            status,
        });
    }

    Ok(CommandOutput {
        status: Some(status),
        stdout,
        stderr,
    })
}

fn join(
    handle: std::thread::ScopedJoinHandle<'_, std::io::Result<Vec<u8>>>,
) -> std::io::Result<Vec<u8>> {
    handle
        .join()
        .unwrap_or_else(|_| Err(std::io::Error::other("output reader thread panicked")))
}
