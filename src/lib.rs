// wfrun — Line-oriented workflow script runner
// Runs named sections of `.wf` scripts: shell commands, file operations,
// variables, notifications and workflow-to-workflow calls.
// License: Apache-2.0

pub mod config;
pub mod engine;
pub mod logger;
pub mod net;
pub mod report;
pub mod runner;
pub mod workflow;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
