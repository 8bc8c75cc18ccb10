//! ScanVerdict value object
//! Explicit classification of the scan command's exit code instead of
//! overloading the error channel for expected codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one scan command execution.
///
/// Exit codes 0, 1 and 3 are expected outcomes of the scan tool; only
/// genuinely unexpected codes (2 = bad parameters, anything else) become
/// `ToolError`. Code 3 is reserved by the tool with no documented meaning;
/// it is kept distinct but treated as non-error throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanVerdict {
    /// Exit code 0: image passed the configured policies.
    Pass,
    /// Exit code 1: the scan ran to completion but a policy failed.
    PolicyFail,
    /// Exit code 3: reserved tool meaning, passed through as non-error.
    PassThrough,
    /// Any other exit code: the tool itself failed.
    ToolError(i64),
}

impl ScanVerdict {
    pub fn from_exit_code(exit_code: i64) -> Self {
        match exit_code {
            0 => ScanVerdict::Pass,
            1 => ScanVerdict::PolicyFail,
            3 => ScanVerdict::PassThrough,
            other => ScanVerdict::ToolError(other),
        }
    }

    /// Whether the captured report can be handed back to the caller.
    pub fn is_success(&self) -> bool {
        !matches!(self, ScanVerdict::ToolError(_))
    }
}

impl fmt::Display for ScanVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanVerdict::Pass => write!(f, "pass"),
            ScanVerdict::PolicyFail => write!(f, "policy-fail"),
            ScanVerdict::PassThrough => write!(f, "pass-through"),
            ScanVerdict::ToolError(code) => write!(f, "tool-error({})", code),
        }
    }
}
