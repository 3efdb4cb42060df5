//! Report line formats.
//!
//! Downstream scripts grep these lines, so their shape is fixed.

use std::io::{self, Write};

use crate::common::{ArgumentTuple, CaseResult, Configuration};

/// Writes the two sweep header lines naming the configuration under test.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn write_sweep_header(out: &mut dyn Write, configuration: Configuration) -> io::Result<()> {
    writeln!(
        out,
        "FIRST PAGE SIZE BIT : {}",
        configuration.first_level_bits()
    )?;
    writeln!(
        out,
        "PHYSICAL MEMORY SIZE : {}",
        configuration.physical_memory_bits()
    )
}

/// Writes `<trace> <trace> ... : PASS|FAIL`.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn write_sweep_case(out: &mut dyn Write, result: &CaseResult) -> io::Result<()> {
    writeln!(out, "{} : {}", result.tuple.trace_label(), result.verdict)
}

/// Writes `<index> [<a>, <b>, '<trace>', ...] PASSED`.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn write_fuzz_pass(out: &mut dyn Write, index: u64, tuple: &ArgumentTuple) -> io::Result<()> {
    writeln!(out, "{index} {} PASSED", fuzz_label(tuple))
}

/// Bracketed argument list: widths bare, trace paths quoted.
pub fn fuzz_label(tuple: &ArgumentTuple) -> String {
    let configuration = tuple.configuration();
    let mut label = format!(
        "[{}, {}",
        configuration.first_level_bits(),
        configuration.physical_memory_bits()
    );
    for trace in tuple.traces() {
        label.push_str(&format!(", '{trace}'"));
    }
    label.push(']');
    label
}
