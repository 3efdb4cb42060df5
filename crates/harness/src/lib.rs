//! Differential testing harness for page-table memory simulators.
//!
//! This crate drives a trusted reference simulator and a candidate simulator with
//! identical arguments and compares their standard output byte-for-byte. It provides:
//! 1. **Cases:** Configuration, trace-file and argument-tuple types plus the error taxonomy.
//! 2. **Enumeration:** Exhaustive product-with-repetition sweeps and randomized fuzz sampling.
//! 3. **Runner:** Child-process invocation of both collaborators and verdict derivation.
//! 4. **Sessions:** The sweep driver (full tally) and the fuzz loop (stop on first mismatch).
//! 5. **Configuration:** Binary paths, trace directory, depth and sampling policies.
//!
//! The simulators themselves are opaque; the only contract is
//! `<binary> <firstLevelBits> <physicalMemoryBits> <trace>...`.

/// Common types (configurations, trace files, argument tuples, verdicts, errors).
pub mod common;
/// Harness configuration (defaults, policies, JSON loading, validation).
pub mod config;
/// Case generation (exhaustive plans and fuzz samplers).
pub mod enumerate;
/// Collaborator invocation and output comparison.
pub mod runner;
/// Sweep and fuzz session drivers and their report lines.
pub mod session;
/// Pass/fail accounting.
pub mod stats;
/// Trace file discovery.
pub mod traces;

/// Root configuration type; use `HarnessConfig::default()` or load from JSON.
pub use crate::config::HarnessConfig;
/// Error type returned by every fallible harness operation.
pub use crate::common::HarnessError;
/// Runs one argument tuple against both collaborators.
pub use crate::runner::CaseRunner;
/// Accumulated pass/fail counts of a sweep.
pub use crate::stats::RunSummary;
