//! Fuzz loop driver.
//!
//! Each iteration draws a configuration and a trace tuple independently, runs the case
//! and prints one line on success. The first mismatch ends the session with
//! [`HarnessError::Mismatch`] carrying the failing tuple. Without a case limit the loop
//! only ends on a mismatch, a harness error or an external interrupt.

use std::io::Write;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::report;
use crate::common::{ArgumentTuple, HarnessError, Verdict};
use crate::enumerate::{ConfigSampler, TracePool};
use crate::runner::{CaseRunner, Collaborator};

/// Outcome of a fuzz session that stopped without a mismatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FuzzReport {
    /// Cases run, all of which passed.
    pub cases: u64,
    /// Seed the session ran with.
    pub seed: u64,
}

/// A seeded fuzz session.
#[derive(Debug)]
pub struct FuzzSession<'a, R, C> {
    runner: &'a CaseRunner<R, C>,
    sampler: ConfigSampler,
    pool: TracePool<'a>,
    rng: StdRng,
    seed: u64,
    max_cases: Option<u64>,
}

impl<'a, R: Collaborator, C: Collaborator> FuzzSession<'a, R, C> {
    /// Creates a session. A missing `seed` is drawn from entropy and logged so the
    /// session can be replayed.
    pub fn new(
        runner: &'a CaseRunner<R, C>,
        sampler: ConfigSampler,
        pool: TracePool<'a>,
        seed: Option<u64>,
        max_cases: Option<u64>,
    ) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        info!(seed, pool = pool.len(), policy = ?sampler.policy(), "fuzz session seeded");
        Self {
            runner,
            sampler,
            pool,
            rng: StdRng::seed_from_u64(seed),
            seed,
            max_cases,
        }
    }

    /// Seed driving this session.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws the next case without running it.
    pub fn next_case(&mut self) -> ArgumentTuple {
        let configuration = self.sampler.sample(&mut self.rng);
        let traces = self.pool.sample(&mut self.rng);
        ArgumentTuple::new(configuration, traces)
    }

    /// Runs cases until a mismatch or the case limit, printing each passing case to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Mismatch`] for the first disagreeing case, or any
    /// collaborator or report error, all of which end the session.
    pub fn run(&mut self, out: &mut dyn Write) -> Result<FuzzReport, HarnessError> {
        let mut index = 0_u64;
        loop {
            if self.max_cases.is_some_and(|limit| index >= limit) {
                info!(cases = index, "fuzz case limit reached");
                return Ok(FuzzReport {
                    cases: index,
                    seed: self.seed,
                });
            }
            index += 1;

            let tuple = self.next_case();
            debug!(case = index, args = %tuple, "fuzz case drawn");
            let result = self.runner.run(tuple)?;
            match result.verdict {
                Verdict::Pass => report::write_fuzz_pass(out, index, &result.tuple)?,
                Verdict::Fail => {
                    // The mismatch outranks a sink that can no longer be flushed.
                    if let Err(err) = out.flush() {
                        warn!(error = %err, "could not flush fuzz report");
                    }
                    return Err(HarnessError::Mismatch {
                        index,
                        tuple: result.tuple,
                    });
                }
            }
        }
    }
}
