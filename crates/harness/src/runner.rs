//! Collaborator invocation and output comparison.
//!
//! This module runs one argument tuple against both simulators. It performs:
//! 1. **Invocation:** Spawns each collaborator with the same argument vector and waits
//!    for it to exit with stdout and stderr fully captured.
//! 2. **Exit checks:** Applies the [`ExitPolicy`] to abnormal exits.
//! 3. **Comparison:** Derives the verdict from the two captures.
//!
//! A case never leaves a child behind: each collaborator is spawned, waited on and
//! reaped before the next one starts, on success and on every error path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::common::{ArgumentTuple, CaseResult, CapturedOutput, HarnessError, Verdict};
use crate::config::ExitPolicy;

/// Longest diagnostic excerpt carried in a [`HarnessError::ProcessExit`].
const DIAGNOSTIC_LIMIT: usize = 240;

/// A simulator reachable through the shared CLI contract.
///
/// Implementations must be safe to invoke from several sweep workers at once.
pub trait Collaborator: Send + Sync {
    /// Name used in logs and errors.
    fn label(&self) -> String;

    /// Runs the simulator with `args` and captures everything it produced.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ProcessSpawn`] if the simulator cannot be started.
    fn invoke(&self, args: &[OsString]) -> Result<CapturedOutput, HarnessError>;
}

/// A simulator binary on disk, run as a child process.
#[derive(Clone, Debug)]
pub struct ProcessCollaborator {
    program: PathBuf,
}

impl ProcessCollaborator {
    /// Wraps the binary at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Path of the binary.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Collaborator for ProcessCollaborator {
    fn label(&self) -> String {
        self.program.display().to_string()
    }

    fn invoke(&self, args: &[OsString]) -> Result<CapturedOutput, HarnessError> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| HarnessError::ProcessSpawn {
                binary: self.program.clone(),
                source,
            })?;

        Ok(CapturedOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
        })
    }
}

/// Runs tuples against a reference and a candidate collaborator.
#[derive(Debug)]
pub struct CaseRunner<R, C> {
    reference: R,
    candidate: C,
    exit_policy: ExitPolicy,
}

impl<R: Collaborator, C: Collaborator> CaseRunner<R, C> {
    /// Pairs the two collaborators under the given exit policy.
    pub const fn new(reference: R, candidate: C, exit_policy: ExitPolicy) -> Self {
        Self {
            reference,
            candidate,
            exit_policy,
        }
    }

    /// The trusted collaborator.
    pub const fn reference(&self) -> &R {
        &self.reference
    }

    /// The collaborator under test.
    pub const fn candidate(&self) -> &C {
        &self.candidate
    }

    /// Runs `tuple` on both collaborators and compares their output.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ProcessSpawn`] if either binary cannot be launched, or
    /// [`HarnessError::ProcessExit`] if one exits abnormally under [`ExitPolicy::Fatal`].
    /// A mismatch is not an error here; it is reported through the verdict.
    pub fn run(&self, tuple: ArgumentTuple) -> Result<CaseResult, HarnessError> {
        let args = tuple.to_args();

        let reference = self.reference.invoke(&args)?;
        self.check_exit(&self.reference, &reference, &tuple)?;
        let candidate = self.candidate.invoke(&args)?;
        self.check_exit(&self.candidate, &candidate, &tuple)?;

        let verdict = compare(&reference, &candidate, self.exit_policy);
        debug!(case = %tuple, %verdict, "case finished");

        Ok(CaseResult {
            tuple,
            reference,
            candidate,
            verdict,
        })
    }

    fn check_exit(
        &self,
        collaborator: &dyn Collaborator,
        output: &CapturedOutput,
        tuple: &ArgumentTuple,
    ) -> Result<(), HarnessError> {
        if output.succeeded() {
            if !output.stderr.is_empty() {
                warn!(
                    binary = %collaborator.label(),
                    case = %tuple,
                    stderr = %excerpt(&output.stderr),
                    "collaborator wrote to stderr; stderr is not compared"
                );
            }
            return Ok(());
        }
        if self.exit_policy == ExitPolicy::Compare {
            debug!(
                binary = %collaborator.label(),
                code = ?output.exit_code,
                "non-zero exit folded into comparison"
            );
            return Ok(());
        }

        Err(HarnessError::ProcessExit {
            binary: collaborator.label(),
            status: output
                .exit_code
                .map_or_else(|| "a signal".to_string(), |code| format!("status {code}")),
            tuple: tuple.clone(),
            diagnostic: diagnostic(output),
        })
    }
}

/// Derives the verdict of two captures. Symmetric in its first two arguments.
///
/// Only stdout is compared, plus the exit code under [`ExitPolicy::Compare`].
pub fn compare(a: &CapturedOutput, b: &CapturedOutput, policy: ExitPolicy) -> Verdict {
    let same_exit = match policy {
        ExitPolicy::Fatal => true,
        ExitPolicy::Compare => a.exit_code == b.exit_code,
    };
    if same_exit && a.stdout == b.stdout {
        Verdict::Pass
    } else {
        Verdict::Fail
    }
}

/// What an abnormally exiting collaborator said last.
///
/// The simulators print usage errors on stdout, so the last stdout line stands in
/// when stderr is empty.
fn diagnostic(output: &CapturedOutput) -> String {
    if !output.stderr.is_empty() {
        return excerpt(&output.stderr);
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    match stdout.lines().rev().find(|line| !line.trim().is_empty()) {
        Some(line) => excerpt(line.as_bytes()),
        None => "<no output>".to_string(),
    }
}

fn excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.chars().count() <= DIAGNOSTIC_LIMIT {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(DIAGNOSTIC_LIMIT).collect();
    cut.push_str("...");
    cut
}
