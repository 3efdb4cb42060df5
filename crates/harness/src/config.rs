//! Configuration system for the differential harness.
//!
//! This module defines every knob the sweep and fuzz sessions read. It provides:
//! 1. **Defaults:** Collaborator paths, trace directory and the fuzz sampling bounds.
//! 2. **Structures:** Top-level config plus the sweep and fuzz sections.
//! 3. **Enums:** Exit-status policy, sweep depth mode and configuration sampling policy.
//!
//! Configuration is read from a JSON file (`HarnessConfig::from_json_file`) or taken from
//! `HarnessConfig::default()`; the CLI layers its flags on top of either.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::HarnessError;

/// Default configuration constants for the harness.
mod defaults {
    /// Directory listed at startup for trace files.
    pub const TRACE_DIR: &str = "../mtraces";

    /// Trusted simulator.
    pub const REFERENCE_BINARY: &str = "./memsim";

    /// Simulator under test.
    pub const CANDIDATE_BINARY: &str = "./memsimhw";

    /// Sequential sweep.
    pub const SWEEP_WORKERS: usize = 1;

    /// Smallest sampled first-level index width.
    pub const FIRST_LEVEL_MIN: u32 = 1;

    /// Largest sampled first-level index width.
    ///
    /// 12 page-offset bits plus 19 leaves a non-empty second level in a 32-bit address.
    pub const FIRST_LEVEL_MAX: u32 = 19;

    /// Smallest sampled physical memory width (one 4 KiB frame).
    pub const PHYSICAL_MIN: u32 = 12;

    /// Largest sampled physical memory width (4 GiB).
    pub const PHYSICAL_MAX: u32 = 32;

    /// Longest sampled trace tuple.
    pub const MAX_ARITY: u32 = 3;

    /// Bits withheld from the first level under the bit-budget policy.
    pub const RESERVED_BITS: u32 = 11;
}

/// How a non-zero collaborator exit is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ExitPolicy {
    /// A non-zero exit aborts the session with `ProcessExit`.
    #[default]
    Fatal,
    /// The exit code is compared alongside stdout; differing codes fail the case.
    Compare,
}

/// Which trace-tuple lengths an exhaustive sweep covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DepthMode {
    /// Only tuples of exactly `maxTraceCount` traces.
    #[default]
    Exact,
    /// Every length from 0 up to `maxTraceCount`, shortest first.
    Cumulative,
}

/// How the fuzzer draws a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SamplingPolicy {
    /// Both widths drawn uniformly and independently.
    #[default]
    Independent,
    /// Physical width first, then the first-level width bounded by
    /// `physicalMemoryBits - reserved_bits`.
    BitBudget,
}

/// An inclusive range of bit widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BitRange {
    /// Lower bound (inclusive).
    pub min: u32,
    /// Upper bound (inclusive).
    pub max: u32,
}

impl BitRange {
    /// Creates a range `min..=max`.
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether `bits` lies inside the range.
    pub const fn contains(self, bits: u32) -> bool {
        self.min <= bits && bits <= self.max
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use pagediff_core::config::{DepthMode, HarnessConfig, SamplingPolicy};
///
/// let json = r#"{
///     "trace_dir": "traces",
///     "sweep": { "depth": "Cumulative", "workers": 4 },
///     "fuzz": { "policy": "BitBudget", "seed": 7 }
/// }"#;
///
/// let config: HarnessConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.sweep.depth, DepthMode::Cumulative);
/// assert_eq!(config.fuzz.policy, SamplingPolicy::BitBudget);
/// assert_eq!(config.fuzz.max_arity, 3);
/// assert_eq!(config.reference_binary.to_str(), Some("./memsim"));
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    /// Directory listed for trace files.
    #[serde(default = "HarnessConfig::default_trace_dir")]
    pub trace_dir: PathBuf,
    /// Trusted simulator binary.
    #[serde(default = "HarnessConfig::default_reference_binary")]
    pub reference_binary: PathBuf,
    /// Simulator binary under test.
    #[serde(default = "HarnessConfig::default_candidate_binary")]
    pub candidate_binary: PathBuf,
    /// Treatment of non-zero collaborator exits.
    #[serde(default)]
    pub exit_policy: ExitPolicy,
    /// Exhaustive sweep settings.
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Fuzz session settings.
    #[serde(default)]
    pub fuzz: FuzzConfig,
}

impl HarnessConfig {
    fn default_trace_dir() -> PathBuf {
        PathBuf::from(defaults::TRACE_DIR)
    }

    fn default_reference_binary() -> PathBuf {
        PathBuf::from(defaults::REFERENCE_BINARY)
    }

    fn default_candidate_binary() -> PathBuf {
        PathBuf::from(defaults::CANDIDATE_BINARY)
    }

    /// Reads and parses a JSON configuration file, then validates it.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ConfigLoad`] if the file cannot be read or parsed,
    /// or [`HarnessError::ConfigurationRange`] if a value is out of range.
    pub fn from_json_file(path: &Path) -> Result<Self, HarnessError> {
        let text = fs::read_to_string(path).map_err(|e| HarnessError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| HarnessError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the generators could not honour.
    ///
    /// Checked once up front so samplers never have to reject a draw.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ConfigurationRange`] describing the first bad value.
    pub fn validate(&self) -> Result<(), HarnessError> {
        self.sweep.validate()?;
        self.fuzz.validate()
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            trace_dir: Self::default_trace_dir(),
            reference_binary: Self::default_reference_binary(),
            candidate_binary: Self::default_candidate_binary(),
            exit_policy: ExitPolicy::default(),
            sweep: SweepConfig::default(),
            fuzz: FuzzConfig::default(),
        }
    }
}

/// Exhaustive sweep settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Which tuple lengths are generated.
    #[serde(default)]
    pub depth: DepthMode,
    /// Cases in flight at once; 1 runs strictly sequentially.
    #[serde(default = "SweepConfig::default_workers")]
    pub workers: usize,
}

impl SweepConfig {
    const fn default_workers() -> usize {
        defaults::SWEEP_WORKERS
    }

    /// Rejects a zero-sized worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ConfigurationRange`] if `workers` is 0.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.workers == 0 {
            return Err(HarnessError::ConfigurationRange(
                "sweep.workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            depth: DepthMode::default(),
            workers: defaults::SWEEP_WORKERS,
        }
    }
}

/// Fuzz session settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FuzzConfig {
    /// Configuration sampling policy.
    #[serde(default)]
    pub policy: SamplingPolicy,
    /// Range of sampled first-level widths.
    #[serde(default = "FuzzConfig::default_first_level_bits")]
    pub first_level_bits: BitRange,
    /// Range of sampled physical memory widths.
    #[serde(default = "FuzzConfig::default_physical_memory_bits")]
    pub physical_memory_bits: BitRange,
    /// Longest sampled trace tuple (tuples of 1..=max_arity traces).
    #[serde(default = "FuzzConfig::default_max_arity")]
    pub max_arity: u32,
    /// Bits withheld from the first level under [`SamplingPolicy::BitBudget`].
    #[serde(default = "FuzzConfig::default_reserved_bits")]
    pub reserved_bits: u32,
    /// RNG seed; drawn from entropy and logged when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Stop cleanly after this many passing cases; unbounded when absent.
    #[serde(default)]
    pub max_cases: Option<u64>,
}

impl FuzzConfig {
    const fn default_first_level_bits() -> BitRange {
        BitRange::new(defaults::FIRST_LEVEL_MIN, defaults::FIRST_LEVEL_MAX)
    }

    const fn default_physical_memory_bits() -> BitRange {
        BitRange::new(defaults::PHYSICAL_MIN, defaults::PHYSICAL_MAX)
    }

    const fn default_max_arity() -> u32 {
        defaults::MAX_ARITY
    }

    const fn default_reserved_bits() -> u32 {
        defaults::RESERVED_BITS
    }

    /// Checks the sampling ranges, arity and bit budget.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ConfigurationRange`] describing the first bad value.
    pub fn validate(&self) -> Result<(), HarnessError> {
        for (name, range) in [
            ("first_level_bits", self.first_level_bits),
            ("physical_memory_bits", self.physical_memory_bits),
        ] {
            if range.min == 0 || range.min > range.max {
                return Err(HarnessError::ConfigurationRange(format!(
                    "fuzz.{name} must satisfy 1 <= min <= max, got {}..={}",
                    range.min, range.max
                )));
            }
        }
        if self.max_arity == 0 {
            return Err(HarnessError::ConfigurationRange(
                "fuzz.max_arity must be at least 1".to_string(),
            ));
        }
        if self.policy == SamplingPolicy::BitBudget {
            // Smallest physical width must leave room for the smallest first level.
            let floor = self.physical_memory_bits.min.checked_sub(self.reserved_bits);
            if floor.is_none_or(|limit| limit < self.first_level_bits.min) {
                return Err(HarnessError::ConfigurationRange(format!(
                    "fuzz.physical_memory_bits.min ({}) leaves no first-level width of at \
                     least {} after reserving {} bits",
                    self.physical_memory_bits.min, self.first_level_bits.min, self.reserved_bits
                )));
            }
        }
        Ok(())
    }
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            policy: SamplingPolicy::default(),
            first_level_bits: Self::default_first_level_bits(),
            physical_memory_bits: Self::default_physical_memory_bits(),
            max_arity: defaults::MAX_ARITY,
            reserved_bits: defaults::RESERVED_BITS,
            seed: None,
            max_cases: None,
        }
    }
}
