//! Case generation.
//!
//! Two policies produce argument tuples for the runner:
//! 1. **Exhaustive:** Every trace sequence of the requested length(s), with repetition,
//!    order-sensitive, as a finite and restartable lazy iterator.
//! 2. **Fuzz:** Independent random draws of a configuration and a trace tuple.

/// Exhaustive product-with-repetition enumeration.
pub mod exhaustive;

/// Randomized configuration and trace-tuple sampling.
pub mod fuzz;

pub use exhaustive::{ExhaustiveCases, ExhaustivePlan};
pub use fuzz::{ConfigSampler, TracePool};
