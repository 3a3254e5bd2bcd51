//! Interpretation of pip's exit code and output.
//!
//! pip reports no structured result, so whether anything changed is read
//! from its English status lines. This is a heuristic: a reworded or
//! translated message from pip makes every run look unchanged, and a
//! translated "not installed" turns an idempotent uninstall into a failure.
//! Keep every text match in this module so it can be replaced by a
//! structured check once pip offers one.

use crate::params::PackageState;
use crate::runner::CommandOutput;

const INSTALLED_MARKER: &str = "Successfully installed";
const UNINSTALLED_MARKER: &str = "Successfully uninstalled";
const NOT_INSTALLED_MARKER: &str = "not installed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { changed: bool },
    Failed { rc: i32 },
}

/// pip exits 1 when asked to uninstall something that is not there.
pub fn is_idempotent_uninstall(state: PackageState, output: &CommandOutput) -> bool {
    state == PackageState::Absent && output.rc == 1 && output.stdout.contains(NOT_INSTALLED_MARKER)
}

pub fn detect_change(state: PackageState, stdout: &str) -> bool {
    match state {
        PackageState::Absent => stdout.contains(UNINSTALLED_MARKER),
        PackageState::Present | PackageState::Latest => stdout.contains(INSTALLED_MARKER),
    }
}

pub fn classify(state: PackageState, output: &CommandOutput) -> Outcome {
    if is_idempotent_uninstall(state, output) {
        tracing::warn!("Package already absent, treating pip exit code 1 as success");
    } else if !output.success() {
        return Outcome::Failed { rc: output.rc };
    }

    Outcome::Succeeded {
        changed: detect_change(state, &output.stdout),
    }
}
