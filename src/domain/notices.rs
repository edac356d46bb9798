//! Structured results that drive user-facing toasts.
//!
//! The engine never sends a notification itself; it hands one of these back
//! with every mutating call.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub success: bool,
    pub title: String,
    pub message: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Notice {
    /// A single-record mutation that went through.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            title: "Success".to_string(),
            message: message.into(),
            total: 1,
            succeeded: 1,
            failed: 0,
        }
    }

    /// A set-style mutation that touched `changed` of `total` records.
    pub fn counted(action: &str, changed: usize, total: usize) -> Self {
        let failed = total.saturating_sub(changed);
        let (success, title) = outcome(changed, failed);

        Self {
            success,
            title: title.to_string(),
            message: format!("{action}: {changed} of {total} leads updated"),
            total,
            succeeded: changed,
            failed,
        }
    }

    /// Batch summary, e.g. "10 of 12 succeeded, 2 failed: ...".
    pub fn batch(succeeded: usize, reasons: &[String], skipped: usize) -> Self {
        let failed = reasons.len();
        let total = succeeded + failed + skipped;
        let (success, title) = outcome(succeeded, failed + skipped);

        let mut message = format!("{succeeded} of {total} succeeded");
        if failed > 0 {
            message.push_str(&format!(", {failed} failed: {}", reasons.join("; ")));
        }
        if skipped > 0 {
            message.push_str(&format!(", {skipped} not processed"));
        }

        Self {
            success,
            title: title.to_string(),
            message,
            total,
            succeeded,
            failed,
        }
    }
}

fn outcome(succeeded: usize, not_succeeded: usize) -> (bool, &'static str) {
    match (succeeded, not_succeeded) {
        (_, 0) => (true, "Success"),
        (0, _) => (false, "Failed"),
        _ => (false, "Partial Success"),
    }
}
