//! Sweep accounting and reporting.
//!
//! Tracks the verdict tally of an exhaustive sweep. It provides:
//! 1. **Counts:** PASS and FAIL totals, whose sum is the number of cases run.
//! 2. **Timing:** Wall-clock duration since the accumulator was created.
//! 3. **Summary:** The two closing report lines.
//!
//! The accumulator is created when a sweep starts and handed back to the caller when it
//! ends; there is no process-wide counter.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::common::Verdict;

/// Verdict tally of one sweep.
#[derive(Clone, Debug)]
pub struct RunSummary {
    start_time: Instant,
    passed: u64,
    failed: u64,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    /// Starts an empty tally.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            passed: 0,
            failed: 0,
        }
    }

    /// Counts one verdict.
    pub const fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail => self.failed += 1,
        }
    }

    /// Cases whose outputs matched.
    pub const fn passed(&self) -> u64 {
        self.passed
    }

    /// Cases whose outputs differed.
    pub const fn failed(&self) -> u64 {
        self.failed
    }

    /// Every case recorded.
    pub const fn total(&self) -> u64 {
        self.passed + self.failed
    }

    /// Whether every recorded case passed.
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Time since the tally started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Writes `"<n> cases PASSED"` and `"<n> cases FAILED"`.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn write_summary(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{} cases PASSED", self.passed)?;
        writeln!(out, "{} cases FAILED", self.failed)
    }
}
