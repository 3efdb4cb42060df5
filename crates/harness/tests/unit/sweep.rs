//! # Sweep Tests
//!
//! Full-sweep accounting, report ordering and the worker pool's equivalence with
//! the sequential run.

use crate::common::init_tracing;
use crate::common::fixtures::{configuration, lines, traces};
use crate::common::mocks::{
    EchoSimulator, MockSimulator, PickySimulator, RiggedSimulator, StallingSimulator,
};
use pagediff_core::HarnessError;
use pagediff_core::common::{CapturedOutput, TraceFile};
use pagediff_core::config::{DepthMode, ExitPolicy};
use pagediff_core::enumerate::ExhaustivePlan;
use pagediff_core::runner::CaseRunner;
use pagediff_core::session::Sweep;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_sweep_reports_every_case() {
    let files = traces(&["t1", "t2"]);
    let runner = CaseRunner::new(EchoSimulator::new(), EchoSimulator::new(), ExitPolicy::Fatal);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, 1, DepthMode::Exact);

    let mut out = Vec::new();
    let summary = Sweep::new(&runner, plan, 1).run(&mut out).unwrap();

    assert_eq!(
        lines(&out),
        vec![
            "FIRST PAGE SIZE BIT : 8",
            "PHYSICAL MEMORY SIZE : 20",
            "t1 : PASS",
            "t2 : PASS",
            "2 cases PASSED",
            "0 cases FAILED",
        ]
    );
    assert_eq!(summary.total(), 2);
    assert_eq!(runner.reference().calls(), 2);
    assert_eq!(runner.candidate().calls(), 2);
}

#[test]
fn test_sweep_continues_past_failures() {
    let files = traces(&["a", "b", "c"]);
    let runner = CaseRunner::new(
        EchoSimulator::new(),
        RiggedSimulator::wrong_on(&[2, 5, 9]),
        ExitPolicy::Fatal,
    );
    let plan = ExhaustivePlan::new(configuration(6, 18), &files, 2, DepthMode::Exact);

    let mut out = Vec::new();
    let summary = Sweep::new(&runner, plan, 1).run(&mut out).unwrap();

    assert_eq!(summary.total(), 9);
    assert_eq!(summary.failed(), 3);
    assert_eq!(summary.passed(), 6);
    let report = lines(&out);
    assert_eq!(report[3], "a b : FAIL");
    assert_eq!(report[6], "b b : FAIL");
    assert_eq!(report[10], "c c : FAIL");
    assert_eq!(report[11], "6 cases PASSED");
    assert_eq!(report[12], "3 cases FAILED");
}

#[rstest]
#[case(2)]
#[case(3)]
#[case(8)]
fn test_pooled_sweep_matches_sequential(#[case] workers: usize) {
    init_tracing();
    let files = traces(&["gcc", "sort", "bzip", "mcf"]);
    let picky = || PickySimulator { needle: "sort" };

    let sequential_runner = CaseRunner::new(EchoSimulator::new(), picky(), ExitPolicy::Fatal);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, 3, DepthMode::Cumulative);
    let mut sequential_out = Vec::new();
    let sequential = Sweep::new(&sequential_runner, plan.clone(), 1)
        .run(&mut sequential_out)
        .unwrap();

    let pooled_runner = CaseRunner::new(EchoSimulator::new(), picky(), ExitPolicy::Fatal);
    let mut pooled_out = Vec::new();
    let pooled = Sweep::new(&pooled_runner, plan, workers)
        .run(&mut pooled_out)
        .unwrap();

    assert_eq!(lines(&pooled_out), lines(&sequential_out));
    assert_eq!(pooled.passed(), sequential.passed());
    assert_eq!(pooled.failed(), sequential.failed());
    // 1 + 4 + 16 + 64 tuples; those without "sort" number 1 + 3 + 9 + 27.
    assert_eq!(pooled.total(), 85);
    assert_eq!(pooled.passed(), 40);
}

#[rstest]
#[case(2)]
#[case(4)]
fn test_pooled_sweep_does_not_run_ahead_of_slow_case(#[case] workers: usize) {
    init_tracing();
    let files: Vec<TraceFile> = (0..400).map(|i| TraceFile::new(format!("t{i:03}"))).collect();
    let runner = CaseRunner::new(
        StallingSimulator::new("t000", Duration::from_millis(300)),
        EchoSimulator::new(),
        ExitPolicy::Fatal,
    );
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, 1, DepthMode::Exact);

    let mut out = Vec::new();
    let summary = Sweep::new(&runner, plan, workers).run(&mut out).unwrap();

    // Case 0 holds one of the 2 * workers slots; the others may finish, nothing more.
    let window = 2 * workers as u64;
    assert!(
        runner.reference().completed_during_stall() < window,
        "{} cases ran behind the stalled one",
        runner.reference().completed_during_stall()
    );
    assert_eq!(summary.total(), 400);
    assert!(summary.all_passed());
    assert_eq!(lines(&out)[2], "t000 : PASS");
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(16)]
fn test_pooled_sweep_finishes_when_plan_runs_dry(#[case] trace_count: usize) {
    let files: Vec<TraceFile> = (0..trace_count).map(|i| TraceFile::new(format!("t{i}"))).collect();
    let runner = CaseRunner::new(EchoSimulator::new(), EchoSimulator::new(), ExitPolicy::Fatal);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, 1, DepthMode::Exact);
    let summary = Sweep::new(&runner, plan, 8).run(&mut Vec::<u8>::new()).unwrap();
    assert_eq!(summary.total(), trace_count as u64);
}

#[test]
fn test_zero_workers_runs_sequentially() {
    let files = traces(&["t1"]);
    let runner = CaseRunner::new(EchoSimulator::new(), EchoSimulator::new(), ExitPolicy::Fatal);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, 2, DepthMode::Exact);
    let summary = Sweep::new(&runner, plan, 0).run(&mut Vec::<u8>::new()).unwrap();
    assert_eq!(summary.total(), 1);
}

#[test]
fn test_sweep_stops_on_spawn_error() {
    let files = traces(&["t1", "t2", "t3"]);
    let mut reference = MockSimulator::new();
    reference.expect_invoke().times(1).returning(|_| {
        Err(HarnessError::ProcessSpawn {
            binary: PathBuf::from("./memsim"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        })
    });
    let mut candidate = MockSimulator::new();
    candidate.expect_invoke().never();

    let runner = CaseRunner::new(reference, candidate, ExitPolicy::Fatal);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, 1, DepthMode::Exact);
    let mut out = Vec::new();
    let err = Sweep::new(&runner, plan, 1).run(&mut out).unwrap_err();

    assert!(matches!(err, HarnessError::ProcessSpawn { .. }));
    assert!(!lines(&out).iter().any(|l| l.contains("cases PASSED")));
}

#[test]
fn test_pooled_sweep_surfaces_exit_error() {
    let files = traces(&["t1", "t2", "t3", "t4"]);
    let mut reference = MockSimulator::new();
    reference.expect_label().return_const("memsim".to_string());
    reference.expect_invoke().returning(|args| {
        if args.iter().any(|a| a == "t3") {
            Ok(CapturedOutput {
                stdout: Vec::new(),
                stderr: b"cannot open trace".to_vec(),
                exit_code: Some(1),
            })
        } else {
            Ok(CapturedOutput::success("ok\n"))
        }
    });
    let mut candidate = MockSimulator::new();
    candidate
        .expect_invoke()
        .returning(|_| Ok(CapturedOutput::success("ok\n")));

    let runner = CaseRunner::new(reference, candidate, ExitPolicy::Fatal);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, 1, DepthMode::Exact);
    let mut out = Vec::new();
    let err = Sweep::new(&runner, plan, 4).run(&mut out).unwrap_err();

    assert!(matches!(err, HarnessError::ProcessExit { .. }));
    // Cases before the failing one are still reported in order.
    let report = lines(&out);
    assert_eq!(report[2], "t1 : PASS");
    assert_eq!(report[3], "t2 : PASS");
    assert_eq!(report.len(), 4);
}

#[test]
fn test_broken_report_sink_is_an_error() {
    struct ClosedSink;
    impl io::Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let files = traces(&["t1"]);
    let runner = CaseRunner::new(EchoSimulator::new(), EchoSimulator::new(), ExitPolicy::Fatal);
    let plan = ExhaustivePlan::new(configuration(8, 20), &files, 1, DepthMode::Exact);
    let err = Sweep::new(&runner, plan, 1).run(&mut ClosedSink).unwrap_err();
    assert!(matches!(err, HarnessError::Report(_)));
}
