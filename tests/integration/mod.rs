//! Integration tests for airsim-preflight.
//!
//! Checks and the full run are driven through the mock session in
//! `mocks`; the AirSim client is exercised against a loopback msgpack-rpc
//! server.

pub mod full_run_tests;
pub mod output_tests;
