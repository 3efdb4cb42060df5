//! # Unit Components
//!
//! Tests grouped by library module: the case data model, configuration,
//! trace discovery, both enumerators, the runner, accounting and the two
//! session drivers.




/// Exhaustive enumeration order and counts.
pub mod exhaustive;





/// Sequential and pooled sweeps.
pub mod sweep;
