//! Build report types.
//!
//! Contains types for representing the outcome of pipeline stages.

use std::time::Duration;

/// Status of a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    /// Stage completed
    Success,
    /// Stage failed with error
    Failed(String),
}

impl StageStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, StageStatus::Success)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, StageStatus::Failed(_))
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Success => write!(f, "success"),
            StageStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of running a single pipeline stage.
#[derive(Debug, Clone)]
pub struct StageReport {
    /// Stage identifier (e.g. "emit:cjs", "bundle:umd", "patch")
    pub stage_id: String,
    /// Stage status
    pub status: StageStatus,
    /// Number of files written by the stage
    pub files_written: usize,
    /// Stage duration
    pub duration: Duration,
}

impl StageReport {
    /// Create a successful report.
    pub fn success(stage_id: String, files_written: usize, duration: Duration) -> Self {
        Self { stage_id, status: StageStatus::Success, files_written, duration }
    }

    /// Create a failed report.
    pub fn failed(stage_id: String, error: String, duration: Duration) -> Self {
        Self { stage_id, status: StageStatus::Failed(error), files_written: 0, duration }
    }

    /// Check if this stage succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a complete pipeline run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Reports for each stage, in branch order
    pub stages: Vec<StageReport>,
    /// Total pipeline duration
    pub total_duration: Duration,
}

impl BuildReport {
    /// Create a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stage report.
    pub fn add_stage(&mut self, report: StageReport) {
        self.stages.push(report);
    }

    /// Get the number of successful stages.
    pub fn success_count(&self) -> usize {
        self.stages.iter().filter(|r| r.is_success()).count()
    }

    /// Get the number of failed stages.
    pub fn failed_count(&self) -> usize {
        self.stages.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Check if the whole run succeeded (no failures).
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Total number of files written across all stages.
    pub fn files_written(&self) -> usize {
        self.stages.iter().map(|r| r.files_written).sum()
    }

    /// Get failed stage reports, in branch order.
    pub fn failures(&self) -> Vec<&StageReport> {
        self.stages.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Format a summary of the pipeline run.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        let success = self.success_count();
        let failed = self.failed_count();
        let total = self.stages.len();

        if failed > 0 {
            lines.push(format!(
                "Build failed: {} succeeded, {} failed ({} stages)",
                success, failed, total
            ));
            for stage in self.failures() {
                lines.push(format!("  - {}: {}", stage.stage_id, stage.status));
            }
        } else {
            lines.push(format!(
                "Build succeeded: {} stages, {} files in {:?}",
                total,
                self.files_written(),
                self.total_duration
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_status_display() {
        assert_eq!(StageStatus::Success.to_string(), "success");
        assert_eq!(StageStatus::Failed("error".to_string()).to_string(), "failed: error");
    }

    #[test]
    fn test_stage_status_is_success() {
        assert!(StageStatus::Success.is_success());
        assert!(!StageStatus::Failed("error".to_string()).is_success());
    }

    #[test]
    fn test_stage_report_success() {
        let report =
            StageReport::success("emit:esm".to_string(), 12, Duration::from_millis(100));

        assert!(report.is_success());
        assert_eq!(report.files_written, 12);
    }

    #[test]
    fn test_stage_report_failed() {
        let report = StageReport::failed(
            "bundle:umd".to_string(),
            "bundler exited with status 1".to_string(),
            Duration::from_millis(50),
        );

        assert!(!report.is_success());
        assert_eq!(report.files_written, 0);
    }

    #[test]
    fn test_build_report_counts() {
        let mut report = BuildReport::new();
        report.add_stage(StageReport::success("emit:esm".to_string(), 4, Duration::ZERO));
        report.add_stage(StageReport::failed(
            "emit:cjs".to_string(),
            "error".to_string(),
            Duration::ZERO,
        ));

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_build_report_files_written() {
        let mut report = BuildReport::new();
        report.add_stage(StageReport::success("emit:esm".to_string(), 4, Duration::ZERO));
        report.add_stage(StageReport::success("emit:cjs".to_string(), 6, Duration::ZERO));

        assert_eq!(report.files_written(), 10);
    }

    #[test]
    fn test_build_report_summary_success() {
        let mut report = BuildReport::new();
        report.add_stage(StageReport::success(
            "emit:esm".to_string(),
            3,
            Duration::from_millis(100),
        ));
        report.total_duration = Duration::from_millis(120);

        let summary = report.summary();
        assert!(summary.contains("Build succeeded"));
        assert!(summary.contains("1 stages"));
        assert!(summary.contains("3 files"));
    }

    #[test]
    fn test_build_report_summary_failure_names_stage() {
        let mut report = BuildReport::new();
        report.add_stage(StageReport::success("emit:esm".to_string(), 3, Duration::ZERO));
        report.add_stage(StageReport::failed(
            "bundle:esm".to_string(),
            "bundler exited with status 2".to_string(),
            Duration::ZERO,
        ));

        let summary = report.summary();
        assert!(summary.contains("Build failed"));
        assert!(summary.contains("- bundle:esm: failed: bundler exited with status 2"));
    }
}
