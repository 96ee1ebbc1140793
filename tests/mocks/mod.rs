//! Mock implementations for testing without a running simulator.
//!
//! Provides an in-memory vehicle session whose sensor data and failure modes
//! are configured per test, plus console and viewer sinks that record what
//! the checks sent them.

pub mod sim;

pub use sim::*;
