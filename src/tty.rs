//! Terminal I/O utilities for CLI.
//!
//! Provides TTY detection and user prompting.

use std::io::{self, BufRead, IsTerminal, Write};

use retemplate::template::Confirm;

pub fn is_stdin_tty() -> bool {
    io::stdin().is_terminal()
}

pub fn is_stderr_tty() -> bool {
    io::stderr().is_terminal()
}

pub fn prompt(message: &str) -> retemplate::Result<String> {
    eprint!("{}", message);
    io::stderr().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line).map_err(|e| {
        retemplate::Error::internal_io(
            format!("Failed to read input: {}", e),
            Some("read stdin".to_string()),
        )
    })?;

    Ok(line.trim().to_string())
}

/// Print status message to stderr if running in a terminal.
pub fn status(message: &str) {
    if is_stderr_tty() {
        eprintln!("{}", message);
    }
}

/// Asks on the terminal; declines when stdin is not interactive.
pub struct TtyConfirm;

impl Confirm for TtyConfirm {
    fn confirm(&self, message: &str) -> retemplate::Result<bool> {
        if !(is_stdin_tty() && is_stderr_tty()) {
            return Ok(false);
        }
        let answer = prompt(&format!("{} [y/N] ", message))?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

// log_status! macro is defined in lib.rs (#[macro_export]) and available crate-wide.
