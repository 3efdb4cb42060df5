//! Exhaustive case enumeration.
//!
//! Generates trace sequences as an odometer over indices into the trace set: the
//! rightmost position advances fastest, so the order matches a depth-first descent
//! that appends each trace in turn. Nothing is copied per level; each yielded tuple
//! is built once from the current odometer state.

use crate::common::{ArgumentTuple, Configuration, TraceFile};
use crate::config::DepthMode;

/// A finite description of an exhaustive sweep.
///
/// Iterating a plan (by reference) starts a fresh enumeration every time.
#[derive(Clone, Debug)]
pub struct ExhaustivePlan<'a> {
    configuration: Configuration,
    traces: &'a [TraceFile],
    max_trace_count: usize,
    depth: DepthMode,
}

impl<'a> ExhaustivePlan<'a> {
    /// Creates a plan over `traces` with tuples of up to `max_trace_count` traces.
    pub const fn new(
        configuration: Configuration,
        traces: &'a [TraceFile],
        max_trace_count: usize,
        depth: DepthMode,
    ) -> Self {
        Self {
            configuration,
            traces,
            max_trace_count,
            depth,
        }
    }

    /// The configuration shared by every tuple.
    pub const fn configuration(&self) -> Configuration {
        self.configuration
    }

    /// Number of tuples the plan yields, or `None` if it does not fit in a `u64`.
    ///
    /// `T^K` for [`DepthMode::Exact`] and `T^0 + ... + T^K` for
    /// [`DepthMode::Cumulative`]. An empty trace set always yields one tuple.
    pub fn case_count(&self) -> Option<u64> {
        if self.traces.is_empty() {
            return Some(1);
        }
        let t = self.traces.len() as u64;
        let depth = u32::try_from(self.max_trace_count).ok()?;
        match self.depth {
            DepthMode::Exact => t.checked_pow(depth),
            DepthMode::Cumulative => (0..=depth).try_fold(0_u64, |acc, k| {
                t.checked_pow(k).and_then(|n| acc.checked_add(n))
            }),
        }
    }

    /// Starts a new enumeration.
    pub fn iter(&self) -> ExhaustiveCases<'a> {
        let first_len = match self.depth {
            DepthMode::Exact => self.max_trace_count,
            DepthMode::Cumulative => 0,
        };
        ExhaustiveCases {
            configuration: self.configuration,
            traces: self.traces,
            max_len: self.max_trace_count,
            odometer: if self.traces.is_empty() {
                Vec::new()
            } else {
                vec![0; first_len]
            },
            done: false,
        }
    }
}

impl<'a> IntoIterator for &ExhaustivePlan<'a> {
    type Item = ArgumentTuple;
    type IntoIter = ExhaustiveCases<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over the tuples of an [`ExhaustivePlan`].
#[derive(Clone, Debug)]
pub struct ExhaustiveCases<'a> {
    configuration: Configuration,
    traces: &'a [TraceFile],
    max_len: usize,
    /// Index into `traces` for every position of the current tuple.
    odometer: Vec<usize>,
    done: bool,
}

impl ExhaustiveCases<'_> {
    fn current(&self) -> ArgumentTuple {
        ArgumentTuple::new(
            self.configuration,
            self.odometer
                .iter()
                .map(|&i| self.traces[i].clone())
                .collect(),
        )
    }

    /// Moves to the next sequence of the same length; false once it wraps.
    fn advance(&mut self) -> bool {
        for digit in self.odometer.iter_mut().rev() {
            *digit += 1;
            if *digit < self.traces.len() {
                return true;
            }
            *digit = 0;
        }
        false
    }
}

impl Iterator for ExhaustiveCases<'_> {
    type Item = ArgumentTuple;

    fn next(&mut self) -> Option<ArgumentTuple> {
        if self.done {
            return None;
        }
        let tuple = self.current();

        if self.traces.is_empty() {
            self.done = true;
        } else if !self.advance() {
            // Exact plans start at max_len, so this only grows cumulative plans.
            let len = self.odometer.len();
            if len < self.max_len {
                self.odometer = vec![0; len + 1];
            } else {
                self.done = true;
            }
        }
        Some(tuple)
    }
}
