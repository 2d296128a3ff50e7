//! Console reporting
//!
//! An explicit reporter instance is threaded through constructors
//! instead of a process-global logger; suppression is per instance.

use colored::Colorize;

/// Leveled console reporter with a suppress switch.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    /// Create a reporter; `quiet` disables all output.
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{}", message.green());
        }
    }

    pub fn warn(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message.yellow());
        }
    }

    pub fn error(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message.red());
        }
    }
}
