// wfrun — Script discovery (glob `*.wf` in a directory) and registry loading

use crate::workflow::{parser, WorkflowRegistry};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("invalid script pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("failed to read script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// List the script files `dir/*.<extension>`, sorted by path.
pub fn discover(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{}/*.{}", base.trim_end_matches('/'), extension);

    let entries = glob::glob(&pattern).map_err(|source| DiscoveryError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(path = %e.path().display(), "Unreadable script entry: {}", e.error());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Read and parse every discovered script, merging them in path order.
pub fn load_registry(dir: &Path, extension: &str) -> Result<WorkflowRegistry, DiscoveryError> {
    let files = discover(dir, extension)?;
    let mut parsed = Vec::with_capacity(files.len());

    for path in files {
        let text = std::fs::read_to_string(&path).map_err(|source| DiscoveryError::Read {
            path: path.clone(),
            source,
        })?;
        let workflows = parser::parse(&text);
        tracing::debug!(
            script = %path.display(),
            workflows = workflows.len(),
            "Parsed workflow script"
        );
        parsed.push(workflows);
    }

    Ok(WorkflowRegistry::from_parsed(parsed))
}
