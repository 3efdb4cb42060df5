//! Case data model.
//!
//! A case is one invocation of both simulators. It is described by:
//! 1. **Configuration:** The address-space split (`firstLevelBits`, `physicalMemoryBits`).
//! 2. **Trace Files:** An ordered list of input traces, repetition allowed.
//! 3. **Result:** Both captured outputs and the derived verdict.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::HarnessError;

/// A trace file consumed by the simulators.
///
/// Identity is the filesystem path. The contents are opaque to the harness.
/// Cloning is cheap so argument tuples can share paths freely.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceFile(Arc<Path>);

impl TraceFile {
    /// Wraps a path as a trace file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Arc::from(path.into()))
    }

    /// Returns the path of the trace.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for TraceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Address-space split passed to both simulators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Configuration {
    pub(crate) first_level_bits: u32,
    pub(crate) physical_memory_bits: u32,
}

impl Configuration {
    /// Creates a configuration, rejecting zero-width fields.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ConfigurationRange`] if either field is zero.
    pub fn new(first_level_bits: u32, physical_memory_bits: u32) -> Result<Self, HarnessError> {
        if first_level_bits == 0 || physical_memory_bits == 0 {
            return Err(HarnessError::ConfigurationRange(format!(
                "firstLevelBits ({first_level_bits}) and physicalMemoryBits \
                 ({physical_memory_bits}) must both be positive"
            )));
        }
        Ok(Self {
            first_level_bits,
            physical_memory_bits,
        })
    }

    /// Size in bits of the first-level page-table index.
    pub const fn first_level_bits(self) -> u32 {
        self.first_level_bits
    }

    /// Size in bits of physical memory.
    pub const fn physical_memory_bits(self) -> u32 {
        self.physical_memory_bits
    }

    /// Whether `firstLevelBits <= physicalMemoryBits - reserved_bits`.
    ///
    /// A physical size smaller than the reservation never satisfies the budget.
    pub const fn satisfies_bit_budget(self, reserved_bits: u32) -> bool {
        match self.physical_memory_bits.checked_sub(reserved_bits) {
            Some(limit) => self.first_level_bits <= limit,
            None => false,
        }
    }
}

/// One complete test case: a configuration plus an ordered trace list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArgumentTuple {
    configuration: Configuration,
    traces: Vec<TraceFile>,
}

impl ArgumentTuple {
    /// Builds a tuple. Trace order is significant.
    pub const fn new(configuration: Configuration, traces: Vec<TraceFile>) -> Self {
        Self {
            configuration,
            traces,
        }
    }

    /// The configuration part.
    pub const fn configuration(&self) -> Configuration {
        self.configuration
    }

    /// The trace part, in invocation order.
    pub fn traces(&self) -> &[TraceFile] {
        &self.traces
    }

    /// Serializes the tuple into the collaborator argument vector:
    /// `firstLevelBits`, `physicalMemoryBits`, then every trace path.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(self.traces.len() + 2);
        args.push(OsString::from(self.configuration.first_level_bits.to_string()));
        args.push(OsString::from(
            self.configuration.physical_memory_bits.to_string(),
        ));
        args.extend(self.traces.iter().map(|t| t.path().as_os_str().to_owned()));
        args
    }

    /// Trace paths joined by single spaces.
    pub fn trace_label(&self) -> String {
        self.traces
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Formats as the argument vector, ready to paste after a binary name.
impl fmt::Display for ArgumentTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.configuration.first_level_bits, self.configuration.physical_memory_bits
        )?;
        for trace in &self.traces {
            write!(f, " {trace}")?;
        }
        Ok(())
    }
}

/// Everything a collaborator produced for one invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Full standard output.
    pub stdout: Vec<u8>,
    /// Full standard error.
    pub stderr: Vec<u8>,
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    /// A clean exit with the given standard output.
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
            exit_code: Some(0),
        }
    }

    /// Whether the process exited with status 0.
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Outcome of comparing the two captured outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Outputs are identical.
    Pass,
    /// Outputs differ.
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// A tuple, both raw outputs and the verdict. Never persisted.
#[derive(Clone, Debug)]
pub struct CaseResult {
    /// The arguments both collaborators received.
    pub tuple: ArgumentTuple,
    /// Reference collaborator output.
    pub reference: CapturedOutput,
    /// Candidate collaborator output.
    pub candidate: CapturedOutput,
    /// Derived verdict.
    pub verdict: Verdict,
}
