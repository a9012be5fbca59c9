// wfrun — Severity-tagged user output

use std::io::Write;

/// Channel a message is printed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Unadorned text (`echo`, `notify`, echoed command lines).
    Plain,
    Info,
    Success,
    Warning,
    Error,
    /// Section-style heading, e.g. entering a delegated workflow.
    Description,
}

impl Level {
    fn marker(self) -> &'static str {
        match self {
            Level::Plain => "",
            Level::Info => "ℹ️  ",
            Level::Success => "✅ ",
            Level::Warning => "⚠️  ",
            Level::Error => "❌ ",
            Level::Description => "▶ ",
        }
    }
}

/// Sink for everything the engine prints to the user.
pub trait Reporter {
    fn emit(&mut self, level: Level, message: &str);

    fn plain(&mut self, message: &str) {
        self.emit(Level::Plain, message);
    }

    fn info(&mut self, message: &str) {
        self.emit(Level::Info, message);
    }

    fn success(&mut self, message: &str) {
        self.emit(Level::Success, message);
    }
}

/// Prints to the terminal; errors go to stderr, everything else to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn emit(&mut self, level: Level, message: &str) {
        let line = format!("{}{}", level.marker(), message);
        if level == Level::Error {
            eprintln!("{}", line);
        } else {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    }
}

/// A captured message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Collects messages in memory.
impl Reporter for Vec<Message> {
    fn emit(&mut self, level: Level, message: &str) {
        self.push(Message::new(level, message));
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn emit(&mut self, level: Level, message: &str) {
        (**self).emit(level, message);
    }
}
