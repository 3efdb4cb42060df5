//! Exhaustive sweep driver.
//!
//! Runs every tuple of an [`ExhaustivePlan`] and tallies the verdicts. It provides:
//! 1. **Sequential mode:** One case at a time, the reference behaviour.
//! 2. **Worker pool:** Up to `workers` cases in flight on scoped threads. Workers pull
//!    tuples from a shared iterator and send results to the calling thread, which is the
//!    single aggregation point: it reorders results so report lines and counts are
//!    identical to the sequential run. Workers run at most `2 * workers` cases ahead of
//!    the last reported one, so a slow case never buffers the rest of the sweep.
//!
//! FAIL never stops a sweep. A spawn or exit error does: remaining workers stop pulling
//! new cases, finish the one in flight, and are joined before the error is returned.

use std::collections::BTreeMap;
use std::io::Write;
use std::iter::Enumerate;
use std::sync::mpsc;
use std::thread;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use super::report;
use crate::common::{ArgumentTuple, CaseResult, HarnessError};
use crate::enumerate::{ExhaustiveCases, ExhaustivePlan};
use crate::runner::{CaseRunner, Collaborator};
use crate::stats::RunSummary;

type Outcome = (usize, Result<CaseResult, HarnessError>);

/// A configured exhaustive sweep.
#[derive(Debug)]
pub struct Sweep<'a, R, C> {
    runner: &'a CaseRunner<R, C>,
    plan: ExhaustivePlan<'a>,
    workers: usize,
}

impl<'a, R: Collaborator, C: Collaborator> Sweep<'a, R, C> {
    /// Creates a sweep of `plan` with `workers` cases in flight (at least one).
    pub fn new(runner: &'a CaseRunner<R, C>, plan: ExhaustivePlan<'a>, workers: usize) -> Self {
        Self {
            runner,
            plan,
            workers: workers.max(1),
        }
    }

    /// Runs every case, writing the header, one line per case and the summary to `out`.
    ///
    /// Returns the tally; FAIL verdicts are counted, not raised.
    ///
    /// # Errors
    ///
    /// Returns the first [`HarnessError::ProcessSpawn`] or [`HarnessError::ProcessExit`]
    /// raised by a case, [`HarnessError::WorkerPanicked`] if a worker died, or
    /// [`HarnessError::Report`] if `out` cannot be written.
    pub fn run(&self, out: &mut dyn Write) -> Result<RunSummary, HarnessError> {
        report::write_sweep_header(out, self.plan.configuration())?;
        match self.plan.case_count() {
            Some(count) => info!(cases = count, workers = self.workers, "starting sweep"),
            None => info!(workers = self.workers, "starting sweep of more than u64::MAX cases"),
        }

        let mut summary = RunSummary::new();
        if self.workers == 1 {
            self.run_sequential(out, &mut summary)?;
        } else {
            self.run_pooled(out, &mut summary)?;
        }

        summary.write_summary(out)?;
        info!(
            passed = summary.passed(),
            failed = summary.failed(),
            elapsed_ms = summary.elapsed().as_millis(),
            "sweep finished"
        );
        Ok(summary)
    }

    fn run_sequential(
        &self,
        out: &mut dyn Write,
        summary: &mut RunSummary,
    ) -> Result<(), HarnessError> {
        for tuple in &self.plan {
            let result = self.runner.run(tuple)?;
            record(out, summary, &result)?;
        }
        Ok(())
    }

    fn run_pooled(&self, out: &mut dyn Write, summary: &mut RunSummary) -> Result<(), HarnessError> {
        let queue = WorkQueue::new(self.plan.iter(), self.workers.saturating_mul(2));
        let runner = self.runner;

        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<Outcome>();
            let handles: Vec<_> = (0..self.workers)
                .map(|worker| {
                    let tx = tx.clone();
                    let queue = &queue;
                    scope.spawn(move || {
                        let _halt_on_panic = HaltOnPanic(queue);
                        let mut ran = 0_u64;
                        while let Some((index, tuple)) = queue.take() {
                            ran += 1;
                            if tx.send((index, runner.run(tuple))).is_err() {
                                break;
                            }
                        }
                        debug!(worker, cases = ran, "sweep worker finished");
                    })
                })
                .collect();
            drop(tx);

            let drained = drain_in_order(&rx, &queue, out, summary);
            queue.halt();
            drop(rx);

            let mut joined = Ok(());
            for (worker, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() && joined.is_ok() {
                    joined = Err(HarnessError::WorkerPanicked(worker));
                }
            }
            drained.and(joined)
        })
    }
}

/// Shared cursor over the plan, gated by a fixed number of credits.
///
/// A worker spends one credit per case it takes and the aggregator returns one per
/// case it reports. Credits are spent in enumeration order, so at most `window`
/// cases are running or waiting to be reported at any time.
struct WorkQueue<'a> {
    state: Mutex<QueueState<'a>>,
    ready: Condvar,
}

struct QueueState<'a> {
    cases: Enumerate<ExhaustiveCases<'a>>,
    credits: usize,
    exhausted: bool,
    halted: bool,
}

impl<'a> WorkQueue<'a> {
    fn new(cases: ExhaustiveCases<'a>, window: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                cases: cases.enumerate(),
                credits: window.max(1),
                exhausted: false,
                halted: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Blocks until a credit is free, then takes the next case.
    ///
    /// Running dry spends no credit and wakes every waiter, since no further release
    /// is owed to them.
    fn take(&self) -> Option<(usize, ArgumentTuple)> {
        let mut state = self.state.lock();
        while state.credits == 0 && !state.exhausted && !state.halted {
            self.ready.wait(&mut state);
        }
        if state.exhausted || state.halted {
            return None;
        }
        match state.cases.next() {
            Some(case) => {
                state.credits -= 1;
                Some(case)
            }
            None => {
                state.exhausted = true;
                let _ = self.ready.notify_all();
                None
            }
        }
    }

    /// Returns the credit of a reported case.
    fn release(&self) {
        self.state.lock().credits += 1;
        let _ = self.ready.notify_one();
    }

    /// Wakes every blocked worker and stops handing out cases.
    fn halt(&self) {
        self.state.lock().halted = true;
        let _ = self.ready.notify_all();
    }
}

/// Halts the queue if its worker unwinds, so the others do not wait forever on
/// credits the dead worker's case will never return.
struct HaltOnPanic<'q, 'a>(&'q WorkQueue<'a>);

impl Drop for HaltOnPanic<'_, '_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.halt();
        }
    }
}

/// Reports outcomes in enumeration order as they arrive out of order.
///
/// Returns at the first error in that order, or once every sender is gone.
fn drain_in_order(
    rx: &mpsc::Receiver<Outcome>,
    queue: &WorkQueue<'_>,
    out: &mut dyn Write,
    summary: &mut RunSummary,
) -> Result<(), HarnessError> {
    let mut pending: BTreeMap<usize, Result<CaseResult, HarnessError>> = BTreeMap::new();
    let mut next_index = 0;
    for (index, outcome) in rx {
        let previous = pending.insert(index, outcome);
        debug_assert!(previous.is_none(), "case {index} reported twice");
        while let Some(outcome) = pending.remove(&next_index) {
            next_index += 1;
            record(out, summary, &outcome?)?;
            queue.release();
        }
    }
    Ok(())
}

fn record(
    out: &mut dyn Write,
    summary: &mut RunSummary,
    result: &CaseResult,
) -> Result<(), HarnessError> {
    report::write_sweep_case(out, result)?;
    summary.record(result.verdict);
    Ok(())
}
