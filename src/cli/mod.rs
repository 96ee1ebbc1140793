//! CLI module for operator-facing console output and report formatting.

pub mod console;
pub mod output;
