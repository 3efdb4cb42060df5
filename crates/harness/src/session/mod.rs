//! Session drivers.
//!
//! A session wires an enumerator to a [`CaseRunner`](crate::runner::CaseRunner) and a
//! report sink:
//! 1. **Sweep:** Finite exhaustive enumeration; every verdict is tallied and the sweep
//!    always runs to the end.
//! 2. **Fuzz:** Random cases until the first mismatch, an optional case limit, or an
//!    external interrupt.

/// Fuzz loop driver.
pub mod fuzz;

/// Report line formats.
pub mod report;

/// Exhaustive sweep driver.
pub mod sweep;

pub use fuzz::{FuzzReport, FuzzSession};
pub use sweep::Sweep;
