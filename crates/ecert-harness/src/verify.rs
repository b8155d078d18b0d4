//! Output comparison and verification.

use serde::{Deserialize, Serialize};

/// Result of verifying a single fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Name of the test case (suffixed with the mode for `both` cases).
    pub case_name: String,
    /// Fixture family.
    pub family: String,
    /// Contract section the case exercises.
    pub section: String,
    /// Mode the case ran under.
    pub mode: String,
    pub passed: bool,
    /// Expected observable output.
    pub expected: String,
    /// Actual observable output.
    pub actual: String,
    /// Diff if the case failed.
    pub diff: Option<String>,
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    /// Build a summary from a list of results.
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        Self {
            total,
            passed,
            failed,
            results,
        }
    }

    /// Returns true if all cases passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Sort results so reports are byte-stable across runs.
pub fn sort_results(results: &mut [VerificationResult]) {
    results.sort_by(|a, b| {
        a.family
            .cmp(&b.family)
            .then_with(|| a.mode.cmp(&b.mode))
            .then_with(|| a.case_name.cmp(&b.case_name))
    });
}
