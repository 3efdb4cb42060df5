//! Randomized case sampling.
//!
//! Provides the two independent draws a fuzz iteration makes:
//! 1. **Configuration:** Uniform within the configured bit ranges, optionally under a bit budget.
//! 2. **Trace tuple:** Uniform over the pool of every tuple of 1..=`max_arity` traces.
//!
//! The trace pool is addressed arithmetically: index `i` is decoded into an arity and
//! a base-`T` digit string, so a pool of `T + T^2 + T^3` tuples is never materialised.

use rand::Rng;

use crate::common::{Configuration, HarnessError, TraceFile};
use crate::config::{BitRange, FuzzConfig, SamplingPolicy};

/// Draws configurations that satisfy the configured ranges by construction.
#[derive(Clone, Debug)]
pub struct ConfigSampler {
    policy: SamplingPolicy,
    first_level_bits: BitRange,
    physical_memory_bits: BitRange,
    reserved_bits: u32,
}

impl ConfigSampler {
    /// Builds a sampler from the fuzz section of the harness config.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ConfigurationRange`] if the ranges cannot be honoured,
    /// for example a bit budget that leaves no room for the smallest first level.
    pub fn from_config(config: &FuzzConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        Ok(Self {
            policy: config.policy,
            first_level_bits: config.first_level_bits,
            physical_memory_bits: config.physical_memory_bits,
            reserved_bits: config.reserved_bits,
        })
    }

    /// The active policy.
    pub const fn policy(&self) -> SamplingPolicy {
        self.policy
    }

    /// Draws one configuration.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Configuration {
        let (first_level_bits, physical_memory_bits) = match self.policy {
            SamplingPolicy::Independent => (
                rng.gen_range(self.first_level_bits.min..=self.first_level_bits.max),
                rng.gen_range(self.physical_memory_bits.min..=self.physical_memory_bits.max),
            ),
            SamplingPolicy::BitBudget => {
                let physical =
                    rng.gen_range(self.physical_memory_bits.min..=self.physical_memory_bits.max);
                // Validation guarantees physical - reserved >= first_level_bits.min.
                let ceiling = physical
                    .saturating_sub(self.reserved_bits)
                    .min(self.first_level_bits.max)
                    .max(self.first_level_bits.min);
                (
                    rng.gen_range(self.first_level_bits.min..=ceiling),
                    physical,
                )
            }
        };
        Configuration {
            first_level_bits,
            physical_memory_bits,
        }
    }
}

/// Every trace tuple of 1..=`max_arity` traces, in product order.
///
/// Arity-1 tuples come first, then arity 2, and so on; within one arity the
/// first position varies slowest.
#[derive(Clone, Debug)]
pub struct TracePool<'a> {
    traces: &'a [TraceFile],
    max_arity: u32,
    len: u64,
}

impl<'a> TracePool<'a> {
    /// Creates the pool over `traces`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::NoTraces`] if `traces` is empty, or
    /// [`HarnessError::ConfigurationRange`] if `max_arity` is zero or the pool size
    /// overflows a `u64`.
    pub fn new(traces: &'a [TraceFile], max_arity: u32) -> Result<Self, HarnessError> {
        if traces.is_empty() {
            return Err(HarnessError::NoTraces);
        }
        if max_arity == 0 {
            return Err(HarnessError::ConfigurationRange(
                "trace tuple arity must be at least 1".to_string(),
            ));
        }
        let t = traces.len() as u64;
        let len = (1..=max_arity)
            .try_fold(0_u64, |acc, k| {
                t.checked_pow(k).and_then(|n| acc.checked_add(n))
            })
            .ok_or_else(|| {
                HarnessError::ConfigurationRange(format!(
                    "{} traces at arity up to {max_arity} overflow the tuple pool",
                    traces.len()
                ))
            })?;
        Ok(Self {
            traces,
            max_arity,
            len,
        })
    }

    /// Number of tuples in the pool.
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Always false; construction rejects an empty trace set.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The tuple at `index` in pool order, or `None` past the end of the pool.
    pub fn get(&self, index: u64) -> Option<Vec<TraceFile>> {
        (index < self.len).then(|| self.locate(index))
    }

    /// Draws one tuple uniformly from the pool.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<TraceFile> {
        self.locate(rng.gen_range(0..self.len))
    }

    /// Splits a pool index into its arity block and the offset inside it.
    ///
    /// `index` must be below `len`; the last block absorbs whatever remains.
    fn locate(&self, mut index: u64) -> Vec<TraceFile> {
        let t = self.traces.len() as u64;
        let mut block = 1_u64;
        for arity in 1..self.max_arity {
            block *= t;
            if index < block {
                return self.decode(index, arity as usize);
            }
            index -= block;
        }
        self.decode(index, self.max_arity as usize)
    }

    fn decode(&self, mut index: u64, arity: usize) -> Vec<TraceFile> {
        let t = self.traces.len() as u64;
        let mut digits = vec![0_usize; arity];
        for digit in digits.iter_mut().rev() {
            *digit = (index % t) as usize;
            index /= t;
        }
        digits.into_iter().map(|d| self.traces[d].clone()).collect()
    }
}
