// crates/quotient-script/src/lib.rs

//! Assertion scripts for the quotient e-graph: a small versioned format
//! (declarations + commands), JSONL io helpers, a seeded random generator
//! and a naive quadratic closure used as a differential oracle in tests and
//! benchmarks.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub mod format;
pub mod generator;
pub mod io;
pub mod naive;
pub mod runner;

pub use format::*;
pub use generator::*;
pub use naive::*;
pub use runner::*;
