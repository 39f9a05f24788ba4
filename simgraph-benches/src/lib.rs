//! Benchmark support crate for simgraph.
//!
//! Provides seeded synthetic vector sources, a brute-force recall oracle and
//! parameter types shared by the Criterion NN-Descent benchmarks.

pub mod error;
pub mod params;
pub mod recall;
pub mod source;
