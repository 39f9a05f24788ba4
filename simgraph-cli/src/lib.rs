//! Support library for the simgraph CLI binary.
//!
//! Exposes the command pipeline and logging setup so tests can drive a run
//! without forking a subprocess.

pub mod cli;
pub mod logging;
