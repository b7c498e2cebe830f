//! Run result types.
//!
//! Contains types for representing the outcome of an engine run.

use std::path::PathBuf;
use std::time::Duration;

/// Status of a single directory invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationStatus {
    /// Tool ran (the exit code was accepted by the policy)
    Success,
    /// Not executed (dry run, or duplicate of an earlier invocation)
    Skipped,
    /// Tool could not run, or the exit-code policy rejected its result
    Failed(String),
}

impl InvocationStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationStatus::Success | InvocationStatus::Skipped)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, InvocationStatus::Failed(_))
    }
}

impl std::fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvocationStatus::Success => write!(f, "success"),
            InvocationStatus::Skipped => write!(f, "skipped"),
            InvocationStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Outcome of one external tool invocation.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    /// Pipeline the directory belongs to
    pub pipeline: String,
    /// Source subdirectory
    pub source: PathBuf,
    /// Sheet output path
    pub sheet: PathBuf,
    /// Data output path
    pub data: PathBuf,
    /// Arguments passed to the tool (executable excluded)
    pub args: Vec<String>,
    /// Exit code reported by the tool, if it ran
    pub exit_code: Option<i32>,
    /// Invocation status
    pub status: InvocationStatus,
    /// Invocation duration
    pub duration: Duration,
}

impl InvocationResult {
    /// Create a result with `Success` status and no exit code yet.
    pub fn new(
        pipeline: impl Into<String>,
        source: PathBuf,
        sheet: PathBuf,
        data: PathBuf,
        args: Vec<String>,
    ) -> Self {
        Self {
            pipeline: pipeline.into(),
            source,
            sheet,
            data,
            args,
            exit_code: None,
            status: InvocationStatus::Success,
            duration: Duration::ZERO,
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: InvocationStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the exit code.
    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Set the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Output files this invocation is expected to produce.
    pub fn outputs(&self) -> [&PathBuf; 2] {
        [&self.sheet, &self.data]
    }
}

/// Result of a complete engine run.
#[derive(Debug, Default)]
pub struct RunResult {
    /// Results for each invocation, in execution order
    pub invocations: Vec<InvocationResult>,
    /// Names of the pipelines that were processed
    pub pipelines: Vec<String>,
    /// Total run duration
    pub total_duration: Duration,
}

impl RunResult {
    /// Create a new empty run result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an invocation result.
    pub fn add_result(&mut self, result: InvocationResult) {
        self.invocations.push(result);
    }

    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    /// Get the number of successful invocations.
    pub fn success_count(&self) -> usize {
        self.invocations.iter().filter(|r| matches!(r.status, InvocationStatus::Success)).count()
    }

    /// Get the number of skipped invocations.
    pub fn skipped_count(&self) -> usize {
        self.invocations.iter().filter(|r| matches!(r.status, InvocationStatus::Skipped)).count()
    }

    /// Get the number of failed invocations.
    pub fn failed_count(&self) -> usize {
        self.invocations.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Check if the overall run succeeded (no failures).
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get failed invocation results.
    pub fn failures(&self) -> Vec<&InvocationResult> {
        self.invocations.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Invocations of one pipeline.
    pub fn for_pipeline<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a InvocationResult> {
        self.invocations.iter().filter(move |r| r.pipeline == name)
    }

    /// Format a summary of the run.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        let success = self.success_count();
        let skipped = self.skipped_count();
        let failed = self.failed_count();
        let total = self.invocations.len();

        if failed > 0 {
            lines.push(format!(
                "Packing failed: {} processed, {} skipped, {} failed ({} total)",
                success, skipped, failed, total
            ));
            for invocation in self.failures() {
                lines.push(format!(
                    "  - {}: {}: {}",
                    invocation.pipeline,
                    invocation.source.display(),
                    invocation.status
                ));
            }
        } else {
            lines.push(format!(
                "Packing succeeded: {} processed, {} skipped ({} total) in {:?}",
                success, skipped, total, self.total_duration
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(name: &str, status: InvocationStatus) -> InvocationResult {
        InvocationResult::new(
            "ui",
            PathBuf::from(format!("/src/{}", name)),
            PathBuf::from(format!("/out/{}.png", name)),
            PathBuf::from(format!("/out/{}.json", name)),
            vec![],
        )
        .with_status(status)
    }

    #[test]
    fn test_invocation_status_display() {
        assert_eq!(InvocationStatus::Success.to_string(), "success");
        assert_eq!(InvocationStatus::Skipped.to_string(), "skipped");
        assert_eq!(InvocationStatus::Failed("boom".to_string()).to_string(), "failed: boom");
    }

    #[test]
    fn test_invocation_status_is_success() {
        assert!(InvocationStatus::Success.is_success());
        assert!(InvocationStatus::Skipped.is_success());
        assert!(!InvocationStatus::Failed("x".to_string()).is_success());
    }

    #[test]
    fn test_run_result_counts() {
        let mut result = RunResult::new();
        result.add_result(invocation("a", InvocationStatus::Success));
        result.add_result(invocation("b", InvocationStatus::Skipped));
        result.add_result(invocation("c", InvocationStatus::Failed("not found".to_string())));

        assert_eq!(result.success_count(), 1);
        assert_eq!(result.skipped_count(), 1);
        assert_eq!(result.failed_count(), 1);
        assert!(!result.is_success());
        assert_eq!(result.for_pipeline("ui").count(), 3);
        assert_eq!(result.for_pipeline("other").count(), 0);
    }

    #[test]
    fn test_run_result_summary_failure_lists_directories() {
        let mut result = RunResult::new();
        result.add_result(invocation("c", InvocationStatus::Failed("not found".to_string())));

        let summary = result.summary();
        assert!(summary.contains("Packing failed"));
        assert!(summary.contains("/src/c"));
        assert!(summary.contains("not found"));
    }

    #[test]
    fn test_run_result_summary_success() {
        let mut result = RunResult::new();
        result.add_result(invocation("a", InvocationStatus::Success));

        let summary = result.with_duration(Duration::from_millis(100)).summary();
        assert!(summary.contains("Packing succeeded"));
        assert!(summary.contains("1 processed"));
    }

    #[test]
    fn test_invocation_outputs() {
        let inv = invocation("a", InvocationStatus::Success);
        assert_eq!(inv.outputs(), [&PathBuf::from("/out/a.png"), &PathBuf::from("/out/a.json")]);
    }
}
