use crate::application::dto::DocumentSummary;
use crate::sbom_analysis::domain::VulnerabilityReport;
use crate::shared::error::ExitCode;
use std::fmt;

/// Output stages that run off the loaded graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CsvExport,
    TreeRender,
    VulnerabilityReport,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::CsvExport => "CSV export",
            Stage::TreeRender => "dependency tree",
            Stage::VulnerabilityReport => "vulnerability report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one stage ended
#[derive(Debug)]
pub enum StageOutcome {
    Written { destination: String },
    Disabled,
    Failed { error: anyhow::Error },
}

#[derive(Debug)]
pub struct StageResult {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

impl StageResult {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, StageOutcome::Failed { .. })
    }
}

/// RunSummary - Response DTO of a complete run
///
/// A stage failure never aborts the other stages; it is recorded here and
/// turned into the process exit code at the CLI boundary.
#[derive(Debug)]
pub struct RunSummary {
    pub document: DocumentSummary,
    pub cycles_detected: usize,
    pub stages: Vec<StageResult>,
    /// Present when the advisory stage ran, even if writing the report failed
    pub report: Option<VulnerabilityReport>,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &StageResult> {
        self.stages.iter().filter(|result| result.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.stages.iter().any(StageResult::is_failure)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.has_failures() {
            ExitCode::StageFailed
        } else {
            ExitCode::Success
        }
    }
}
