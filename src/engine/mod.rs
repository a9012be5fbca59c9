// wfrun — Execution engine: resolve, classify and dispatch script lines

pub mod command;
pub mod env;
pub mod error;
pub mod fs;
pub mod secret;

pub use command::Command;
pub use env::Environment;
pub use error::{EngineError, EngineResult};

use crate::report::{Level, Reporter};
use crate::runner::ProcessRunner;
use crate::workflow::{Workflow, WorkflowRegistry};
use fs::FsOutcome;

/// Compose invocations, newest first.
const COMPOSE_PLUGIN: &str = "docker compose";
const COMPOSE_LEGACY: &str = "docker-compose";

/// Whether execution should carry on after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The `exit` verb ran: stop everything and exit successfully.
    Exit,
}

/// Runs workflows from a registry against a caller-owned [`Environment`].
///
/// Lines run strictly in order; the first error aborts the whole invocation,
/// including every workflow above it in the `wf` call chain.
pub struct Engine<'r, R, O> {
    registry: &'r WorkflowRegistry,
    runner: R,
    reporter: O,
    compose_command: Option<String>,
    call_stack: Vec<String>,
}

impl<'r, R: ProcessRunner, O: Reporter> Engine<'r, R, O> {
    pub fn new(registry: &'r WorkflowRegistry, runner: R, reporter: O) -> Self {
        Self {
            registry,
            runner,
            reporter,
            compose_command: None,
            call_stack: Vec::new(),
        }
    }

    /// Use a fixed compose invocation instead of probing for one.
    pub fn with_compose_command(mut self, command: impl Into<String>) -> Self {
        let command = command.into();
        if !command.trim().is_empty() {
            self.compose_command = Some(command.trim().to_string());
        }
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn reporter(&self) -> &O {
        &self.reporter
    }

    pub fn into_parts(self) -> (R, O) {
        (self.runner, self.reporter)
    }

    /// Run the workflow called `name`.
    pub fn invoke(&mut self, env: &mut Environment, name: &str) -> EngineResult<Flow> {
        let registry = self.registry;
        let workflow = registry
            .get(name)
            .ok_or_else(|| EngineError::WorkflowNotFound {
                name: name.to_string(),
            })?;
        self.execute_workflow(workflow, env)
    }

    /// Execute every line of `workflow` in order.
    pub fn execute_workflow(
        &mut self,
        workflow: &Workflow,
        env: &mut Environment,
    ) -> EngineResult<Flow> {
        if self.call_stack.iter().any(|n| n == &workflow.name) {
            let mut chain = self.call_stack.clone();
            chain.push(workflow.name.clone());
            return Err(EngineError::RecursiveInvocation {
                chain: chain.join(" -> "),
            });
        }

        tracing::info!(
            workflow = %workflow.name,
            depth = self.call_stack.len(),
            lines = workflow.lines.len(),
            "Executing workflow"
        );
        self.call_stack.push(workflow.name.clone());
        let result = self.execute_lines(&workflow.lines, env);
        self.call_stack.pop();

        if let Err(e) = &result {
            tracing::error!(workflow = %workflow.name, error = %e, "Workflow aborted");
        }
        result
    }

    fn execute_lines(&mut self, lines: &[String], env: &mut Environment) -> EngineResult<Flow> {
        for line in lines {
            if self.execute_line(line, env)? == Flow::Exit {
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Resolve, classify and run a single raw line.
    pub fn execute_line(&mut self, raw: &str, env: &mut Environment) -> EngineResult<Flow> {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let line = env.resolve(raw)?;
        let command = Command::parse(&line)?;
        tracing::debug!(verb = command.verb(), line = %line, "Dispatching");
        self.dispatch(command, env)
    }

    fn dispatch(&mut self, command: Command, env: &mut Environment) -> EngineResult<Flow> {
        match command {
            Command::Set { key, value } => {
                self.reporter
                    .info(&format!("Variable {} set to {}", key, value));
                env.set(key, value);
            }
            Command::Run { command_line } => self.run_echoed(&command_line)?,
            Command::Echo { text } => self.reporter.plain(&text),
            Command::Exit => return Ok(Flow::Exit),
            Command::Touch { path } => match fs::touch(&path)? {
                FsOutcome::Created => self
                    .reporter
                    .success(&format!("{} created", path.display())),
                FsOutcome::AlreadyExists => self
                    .reporter
                    .info(&format!("{} already exists, skipping...", path.display())),
            },
            Command::Copy { source, dest } => match fs::copy(&source, &dest)? {
                FsOutcome::Created => self.reporter.success(&format!(
                    "{} copied to {}",
                    source.display(),
                    dest.display()
                )),
                FsOutcome::AlreadyExists => self
                    .reporter
                    .info(&format!("{} already exists, skipping...", dest.display())),
            },
            Command::Mkdir { path } => match fs::mkdir(&path)? {
                FsOutcome::Created => self
                    .reporter
                    .success(&format!("Folder {} created", path.display())),
                FsOutcome::AlreadyExists => self.reporter.info(&format!(
                    "Folder {} already exists, skipping...",
                    path.display()
                )),
            },
            Command::SetPermissions { path, mode } => {
                fs::set_permissions(&path, mode)?;
                self.reporter.success(&format!(
                    "Permissions 0{:o} set for folder/file {}",
                    mode,
                    path.display()
                ));
            }
            Command::SyncTime => {
                self.reporter.plain("Checking time...");
                self.runner.run("date")?;
            }
            Command::DockerCompose { args } => {
                let command_line = format!("{} {}", self.compose_command(), args.join(" "));
                self.run_echoed(&command_line)?;
            }
            Command::Workflow { name } => {
                let registry = self.registry;
                match registry.get(&name) {
                    Some(workflow) => {
                        self.reporter
                            .emit(Level::Description, &format!("Executing workflow: {}", name));
                        return self.execute_workflow(workflow, env);
                    }
                    None => tracing::debug!(workflow = %name, "Delegated workflow not found, ignoring"),
                }
            }
            Command::Notify { level, message } => self.reporter.emit(level, &message),
        }
        Ok(Flow::Continue)
    }

    /// Show the command line as plain output, then run it.
    fn run_echoed(&mut self, command_line: &str) -> EngineResult<()> {
        if !command_line.trim().is_empty() {
            self.reporter.plain(command_line);
        }
        self.runner.run(command_line)?;
        Ok(())
    }

    /// The compose invocation, detected once and then cached.
    fn compose_command(&mut self) -> &str {
        if self.compose_command.is_none() {
            let detected = if self.runner.check("docker", &["compose", "--version"]) {
                COMPOSE_PLUGIN
            } else {
                COMPOSE_LEGACY
            };
            tracing::debug!(command = detected, "Detected docker compose invocation");
            self.compose_command = Some(detected.to_string());
        }
        self.compose_command.as_deref().unwrap_or(COMPOSE_LEGACY)
    }
}
