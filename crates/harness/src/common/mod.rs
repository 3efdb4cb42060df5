//! Common types shared by every part of the harness.
//!
//! This module provides the data model the enumerators produce and the runner consumes:
//! 1. **Case Types:** Trace files, simulator configurations and complete argument tuples.
//! 2. **Outcomes:** Captured collaborator output, verdicts and per-case results.
//! 3. **Error Handling:** The harness error taxonomy.

/// Case data model (configurations, trace files, tuples, verdicts).
pub mod case;

/// Error types.
pub mod error;

pub use case::{ArgumentTuple, CaseResult, CapturedOutput, Configuration, TraceFile, Verdict};
pub use error::HarnessError;
