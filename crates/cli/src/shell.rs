//! Blocking user interaction: one-shot messages and yes/no questions.

use console::style;
use dialoguer::Confirm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// What the core needs from a user interface.
pub trait Shell {
    /// Show a message and return once the user has seen it.
    fn message(&self, level: MessageLevel, title: &str, body: &str);

    /// Ask a yes/no question; `false` means the caller must not proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Terminal implementation backed by `dialoguer`.
pub struct TerminalShell {
    assume_yes: bool,
}

impl TerminalShell {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Shell for TerminalShell {
    fn message(&self, level: MessageLevel, title: &str, body: &str) {
        match level {
            MessageLevel::Info => println!("{}", style(title).green().bold()),
            MessageLevel::Warning => println!("{}", style(title).yellow().bold()),
            MessageLevel::Error => eprintln!("{}", style(title).red().bold()),
        }
        if body.is_empty() {
            return;
        }
        if level == MessageLevel::Error {
            eprintln!("{body}");
        } else {
            println!("{body}");
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match Confirm::new().with_prompt(prompt).default(false).interact() {
            Ok(answer) => answer,
            Err(err) => {
                // No terminal to ask on: treat as "no".
                log::warn!("Cannot ask for confirmation ({err}); pass --yes to proceed");
                false
            }
        }
    }
}
