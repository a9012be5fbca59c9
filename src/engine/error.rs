// wfrun — Engine errors

use super::secret::SecretError;
use crate::runner::RunnerError;
use std::path::PathBuf;
use thiserror::Error;

/// Every way a script line can stop a run.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A verb was given arguments of the wrong shape.
    #[error("Invalid {verb} command: {line}")]
    InvalidArguments { verb: &'static str, line: String },

    #[error("Invalid permissions: {mode}")]
    InvalidMode { mode: String },

    #[error("Unknown command or invalid syntax : {line}")]
    UnknownCommand { line: String },

    #[error("{path} not found")]
    SourceNotFound { path: PathBuf },

    #[error("{path} is not a regular file")]
    NotAFile { path: PathBuf },

    #[error("failed to {action} {path}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("workflow '{name}' not found")]
    WorkflowNotFound { name: String },

    #[error("recursive workflow invocation: {chain}")]
    RecursiveInvocation { chain: String },

    #[error(transparent)]
    Process(#[from] RunnerError),

    #[error(transparent)]
    Secret(#[from] SecretError),
}

impl EngineError {
    pub(crate) fn invalid(verb: &'static str, line: &str) -> Self {
        EngineError::InvalidArguments {
            verb,
            line: line.to_string(),
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
