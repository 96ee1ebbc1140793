//! Operator console.
//!
//! Status lines are plain human-readable text for the person running the
//! harness. Diagnostics go through `tracing` instead.

/// Sink for status lines
pub trait Console {
    fn status(&self, line: &str);
}

/// Prints status lines to stdout
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn status(&self, line: &str) {
        println!("{}", line);
    }
}
