//! Harness error taxonomy.
//!
//! Every failure the harness can surface to the operator. It covers:
//! 1. **Comparison:** A mismatch that ends a fuzz session.
//! 2. **Collaborators:** Launch failures and abnormal exits of either binary.
//! 3. **Setup:** Configuration ranges, trace discovery and config loading.
//! 4. **Reporting:** Failures writing case lines to the report sink.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::case::ArgumentTuple;

/// Errors produced by the harness.
///
/// None of these are retried: every collaborator run is deterministic in its
/// arguments, so a second attempt cannot change the outcome.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The two collaborators disagreed during a fuzz session.
    ///
    /// Carries the running case index and the exact tuple for reproduction.
    #[error("case {index}: outputs differ for arguments `{tuple}`")]
    Mismatch {
        /// One-based index of the failing case within the session.
        index: u64,
        /// Arguments both collaborators received.
        tuple: ArgumentTuple,
    },

    /// A collaborator binary could not be launched.
    #[error("failed to launch {}: {source}", .binary.display())]
    ProcessSpawn {
        /// Program that failed to start.
        binary: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A collaborator exited abnormally, so its output is not comparable.
    #[error("{binary} exited with {status} for arguments `{tuple}`: {diagnostic}")]
    ProcessExit {
        /// Collaborator label.
        binary: String,
        /// Human-readable exit status.
        status: String,
        /// Arguments the collaborator received.
        tuple: ArgumentTuple,
        /// Excerpt of what the collaborator printed before exiting.
        diagnostic: String,
    },

    /// A configuration value is outside its permitted range.
    #[error("configuration out of range: {0}")]
    ConfigurationRange(String),

    /// The trace directory could not be listed.
    #[error("cannot list trace directory {}: {source}", .dir.display())]
    TraceDiscovery {
        /// Directory that was listed.
        dir: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A fuzz session was started without any trace files.
    #[error("no trace files available to sample from")]
    NoTraces,

    /// A configuration file could not be read or parsed.
    #[error("cannot load config {}: {reason}", .path.display())]
    ConfigLoad {
        /// Path of the configuration file.
        path: PathBuf,
        /// Parse or I/O failure description.
        reason: String,
    },

    /// Writing to the report sink failed.
    #[error("failed to write report: {0}")]
    Report(#[from] io::Error),

    /// A sweep worker thread panicked.
    #[error("sweep worker {0} panicked")]
    WorkerPanicked(usize),
}

impl HarnessError {
    /// Whether this error is a collaborator disagreement rather than a harness fault.
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }
}
