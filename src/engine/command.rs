// wfrun — Line classification into built-in commands

use super::error::{EngineError, EngineResult};
use crate::report::Level;
use std::path::PathBuf;

/// A resolved script line with validated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: String },
    Run { command_line: String },
    Echo { text: String },
    Exit,
    Touch { path: PathBuf },
    Copy { source: PathBuf, dest: PathBuf },
    Mkdir { path: PathBuf },
    SetPermissions { path: PathBuf, mode: u32 },
    SyncTime,
    DockerCompose { args: Vec<String> },
    Workflow { name: String },
    Notify { level: Level, message: String },
}

impl Command {
    /// Classify a resolved line by its leading verb (case-insensitive).
    ///
    /// The verb is everything up to the first space; the remainder is passed
    /// on with its original casing.
    pub fn parse(line: &str) -> EngineResult<Self> {
        let (verb, tail) = line.split_once(' ').unwrap_or((line, ""));
        let verb = verb.to_lowercase();

        let command = match verb.as_str() {
            "set" => {
                let (key, value) = tail
                    .split_once('=')
                    .ok_or_else(|| EngineError::invalid("set", line))?;
                if key.is_empty() || value.is_empty() {
                    return Err(EngineError::invalid("set", line));
                }
                Command::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            "run" => Command::Run {
                command_line: tail.trim().to_string(),
            },
            "echo" => Command::Echo {
                text: tail.to_string(),
            },
            "exit" => Command::Exit,
            "touch" => {
                let path = tail.trim();
                if path.is_empty() {
                    return Err(EngineError::invalid("touch", line));
                }
                Command::Touch {
                    path: PathBuf::from(path),
                }
            }
            "copy" | "cp" => {
                let mut args = tail.split_whitespace();
                match (args.next(), args.next()) {
                    (Some(source), Some(dest)) => Command::Copy {
                        source: PathBuf::from(source),
                        dest: PathBuf::from(dest),
                    },
                    _ => return Err(EngineError::invalid("copy", line)),
                }
            }
            "mkdir" => {
                let path = tail
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| EngineError::invalid("mkdir", line))?;
                Command::Mkdir {
                    path: PathBuf::from(path),
                }
            }
            "set_permissions" => {
                let args: Vec<&str> = tail.split_whitespace().collect();
                if args.len() < 2 {
                    return Err(EngineError::invalid("set_permissions", line));
                }
                let mode = parse_mode(args[1])?;
                Command::SetPermissions {
                    path: PathBuf::from(args[0]),
                    mode,
                }
            }
            "sync_time" => Command::SyncTime,
            "docker_compose" => {
                let args: Vec<String> = tail.split_whitespace().map(str::to_string).collect();
                if args.is_empty() {
                    return Err(EngineError::invalid("docker_compose", line));
                }
                Command::DockerCompose { args }
            }
            "wf" => {
                let name = tail
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| EngineError::invalid("wf", line))?;
                Command::Workflow {
                    name: name.to_string(),
                }
            }
            "notify" => notify(Level::Plain, tail),
            "notify_success" => notify(Level::Success, tail),
            "notify_error" => notify(Level::Error, tail),
            "notify_warning" => notify(Level::Warning, tail),
            "notify_info" => notify(Level::Info, tail),
            _ => {
                return Err(EngineError::UnknownCommand {
                    line: line.to_string(),
                })
            }
        };

        Ok(command)
    }

    /// Lower-case verb name, for logging.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Set { .. } => "set",
            Command::Run { .. } => "run",
            Command::Echo { .. } => "echo",
            Command::Exit => "exit",
            Command::Touch { .. } => "touch",
            Command::Copy { .. } => "copy",
            Command::Mkdir { .. } => "mkdir",
            Command::SetPermissions { .. } => "set_permissions",
            Command::SyncTime => "sync_time",
            Command::DockerCompose { .. } => "docker_compose",
            Command::Workflow { .. } => "wf",
            Command::Notify { .. } => "notify",
        }
    }
}

/// Octal permission bits; anything but ASCII digits 0-7 is rejected.
fn parse_mode(raw: &str) -> EngineResult<u32> {
    let invalid = || EngineError::InvalidMode {
        mode: raw.to_string(),
    };
    if raw.is_empty() || !raw.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return Err(invalid());
    }
    u32::from_str_radix(raw, 8).map_err(|_| invalid())
}

fn notify(level: Level, tail: &str) -> Command {
    let message = tail.trim();
    let message = message
        .strip_prefix('"')
        .and_then(|m| m.strip_suffix('"'))
        .unwrap_or(message);
    Command::Notify {
        level,
        message: message.to_string(),
    }
}
