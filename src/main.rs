// wfrun — Line-oriented workflow script runner
// Every `[section]` of the `*.wf` scripts in a directory becomes a subcommand.
// License: Apache-2.0

use anyhow::Context;
use clap::{CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use wfrun::config::Config;
use wfrun::engine::{Engine, Environment, Flow};
use wfrun::report::ConsoleReporter;
use wfrun::runner::SystemRunner;
use wfrun::workflow::discovery::load_registry;
use wfrun::workflow::WorkflowRegistry;

const ERROR_MARK: &str = "❌";

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug, Default)]
#[command(
    name = "wfrun",
    about = "wfrun — run workflows from .wf scripts",
    version
)]
struct Cli {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory containing the workflow scripts
    #[arg(short = 'C', long)]
    dir: Option<PathBuf>,
    /// Pre-seed a variable (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

/// Lenient first pass: only the options that decide where scripts live.
/// Workflow subcommands are unknown at this point, so errors are ignored.
fn bootstrap_args(args: &[OsString]) -> Cli {
    Cli::command()
        .ignore_errors(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .allow_external_subcommands(true)
        .try_get_matches_from(args)
        .ok()
        .and_then(|m| Cli::from_arg_matches(&m).ok())
        .unwrap_or_default()
}

/// Full CLI with one subcommand per invocable workflow.
fn build_cli(registry: &WorkflowRegistry) -> clap::Command {
    let mut cmd = Cli::command()
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .arg_required_else_help(true);

    for workflow in registry.iter() {
        let mut sub = clap::Command::new(workflow.name.clone());
        if let Some(description) = &workflow.description {
            sub = sub.about(description.clone());
        }
        cmd = cmd.subcommand(sub);
    }
    cmd
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    wfrun::logger::init();

    match run() {
        Ok(flow) => {
            tracing::debug!(?flow, "Run finished");
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("{} {:#}", ERROR_MARK, e);
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<Flow> {
    let args: Vec<OsString> = std::env::args_os().collect();
    let boot = bootstrap_args(&args);

    let cfg = load_config(boot.config.as_deref())?;
    let dir = match boot.dir {
        Some(dir) => dir,
        None => cfg.scripts_dir()?,
    };

    let registry = load_registry(&dir, cfg.extension())
        .with_context(|| format!("loading workflows from {}", dir.display()))?;
    tracing::info!(
        dir = %dir.display(),
        workflows = registry.len(),
        "Workflows loaded"
    );

    let mut cli = build_cli(&registry);
    if registry.is_empty() {
        println!("No workflow files found");
        cli.print_help()?;
        return Ok(Flow::Continue);
    }

    let matches = cli.get_matches_from(&args);
    let opts = Cli::from_arg_matches(&matches)?;
    let Some((name, _)) = matches.subcommand() else {
        return Ok(Flow::Continue);
    };

    let mut env = Environment::with_defaults();
    for (key, value) in &cfg.variables {
        env.set(key.as_str(), value.as_str());
    }
    for (key, value) in opts.vars {
        env.set(key, value);
    }

    let mut engine = Engine::new(&registry, SystemRunner::new(), ConsoleReporter)
        .with_compose_command(cfg.docker.compose_command.as_str());
    let flow = engine.invoke(&mut env, name)?;
    Ok(flow)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(p) = path {
        return Config::load_required(p)
            .with_context(|| format!("loading config {}", p.display()));
    }

    match Config::default_path() {
        Ok(default) => Ok(Config::load(&default)?),
        Err(e) => {
            tracing::warn!("Failed to locate config: {}, using defaults", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("A=b=c").unwrap(),
            ("A".to_string(), "b=c".to_string())
        );
        assert!(parse_var("=x").is_err());
        assert!(parse_var("novalue").is_err());
    }

    #[test]
    fn test_bootstrap_ignores_unknown_subcommand() {
        let cli = bootstrap_args(&os_args(&["wfrun", "-C", "ops", "deploy"]));
        assert_eq!(cli.dir, Some(PathBuf::from("ops")));
    }

    #[test]
    fn test_build_cli_registers_workflows() {
        let registry = WorkflowRegistry::from_scripts([
            "[deploy] # ship it\nrun ./deploy.sh\n[help]\necho custom help\n",
        ]);
        let matches = build_cli(&registry)
            .try_get_matches_from(["wfrun", "--set", "A=1", "deploy"])
            .unwrap();
        assert_eq!(matches.subcommand_name(), Some("deploy"));

        let opts = Cli::from_arg_matches(&matches).unwrap();
        assert_eq!(opts.vars, vec![("A".to_string(), "1".to_string())]);

        let about = build_cli(&registry)
            .find_subcommand("deploy")
            .and_then(|s| s.get_about().map(|a| a.to_string()));
        assert_eq!(about.as_deref(), Some("ship it"));
    }

    #[test]
    fn test_build_cli_rejects_unknown_workflow() {
        let registry = WorkflowRegistry::from_scripts(["[deploy]\nrun ./deploy.sh\n"]);
        assert!(build_cli(&registry)
            .try_get_matches_from(["wfrun", "nope"])
            .is_err());
    }
}
